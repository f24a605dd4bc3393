use chrono::{Local, NaiveDate};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use super::{PersistenceGateway, decode_row, decode_rows, finish, owned_by};
use crate::core::models::{CalculationInput, SalaryCalculation, Table};
use crate::core::session::{AuthUser, Session};
use crate::errors::GatewayError;
use crate::gateway::Outcome;
use crate::store::{Embed, Select, TableStore};

/// Employee columns embedded in calculation listings.
const EMPLOYEE_SUMMARY: Embed = Embed {
    table: Table::Employees,
    foreign_key: "employee_id",
    columns: &["full_name", "employee_code"],
};

/// Title given to calculations saved without one, e.g. `Calcul du 05/03/2026`.
#[must_use]
pub fn default_title(date: NaiveDate) -> String {
    format!("Calcul du {}", date.format("%d/%m/%Y"))
}

/// Pay period given to calculations saved without one, e.g. `2026-03`.
#[must_use]
pub fn default_period(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl<S: TableStore> PersistenceGateway<S> {
    /// Stores a new calculation, optionally linked to an employee.
    /// Calculations are never updated in place.
    #[tracing::instrument(level = "info", skip(self, session, input))]
    pub async fn save_calculation(
        &self,
        session: &Session,
        input: CalculationInput,
        employee_id: Option<Uuid>,
    ) -> Outcome<Option<SalaryCalculation>> {
        let result = match session.require_user() {
            Ok(user) => self.insert_calculation(user, input, employee_id).await.map(Some),
            Err(e) => Err(e),
        };
        finish("save_calculation", result)
    }

    /// Lists the session user's calculations, newest first, with the linked
    /// employee's name and code.
    #[tracing::instrument(level = "info", skip(self, session))]
    pub async fn get_calculations(
        &self,
        session: &Session,
        employee_id: Option<Uuid>,
    ) -> Outcome<Vec<SalaryCalculation>> {
        let result = match session.require_user() {
            Ok(user) => self.fetch_calculations(user, employee_id).await,
            Err(e) => Err(e),
        };
        finish("get_calculations", result)
    }

    #[tracing::instrument(level = "info", skip(self, session))]
    pub async fn delete_calculation(&self, session: &Session, id: Uuid) -> Outcome<()> {
        let result = match session.require_user() {
            Ok(user) => self
                .store
                .delete(user, Table::SalaryCalculations, &owned_by(id, user))
                .await
                .map(|removed| info!(%id, removed, "Calculation delete applied")),
            Err(e) => Err(e),
        };
        finish("delete_calculation", result)
    }

    async fn insert_calculation(
        &self,
        user: &AuthUser,
        input: CalculationInput,
        employee_id: Option<Uuid>,
    ) -> Result<SalaryCalculation, GatewayError> {
        let today = Local::now().date_naive();
        let row = json!({
            "user_id": user.id,
            "employee_id": employee_id,
            "title": non_blank(input.title).unwrap_or_else(|| default_title(today)),
            "input_data": input.input,
            "result_data": input.result,
            "period": non_blank(input.period).unwrap_or_else(|| default_period(today)),
        });

        let stored = self
            .store
            .insert(user, Table::SalaryCalculations, row)
            .await?;
        let calculation: SalaryCalculation = decode_row(Table::SalaryCalculations, stored)?;
        info!(
            calculation_id = %calculation.id,
            period = %calculation.period,
            "Calculation saved"
        );
        Ok(calculation)
    }

    pub(super) async fn fetch_calculations(
        &self,
        user: &AuthUser,
        employee_id: Option<Uuid>,
    ) -> Result<Vec<SalaryCalculation>, GatewayError> {
        let mut query = Select::table(Table::SalaryCalculations)
            .eq("user_id", user.id)
            .order_desc("created_at")
            .embed(EMPLOYEE_SUMMARY);
        if let Some(employee_id) = employee_id {
            query = query.eq("employee_id", employee_id);
        }

        let rows = self.store.select(user, &query).await?;
        decode_rows(Table::SalaryCalculations, rows)
    }
}

use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use super::{PersistenceGateway, decode_row, decode_rows, finish, owned_by, owned_row, timestamp};
use crate::core::models::{Employee, EmployeeInput, Table};
use crate::core::session::{AuthUser, Session};
use crate::errors::GatewayError;
use crate::gateway::Outcome;
use crate::store::{Select, TableStore};

impl<S: TableStore> PersistenceGateway<S> {
    /// Inserts a new employee, or updates employee `id` when the session's
    /// user owns it.
    #[tracing::instrument(level = "info", skip(self, session, input))]
    pub async fn save_employee(
        &self,
        session: &Session,
        input: EmployeeInput,
        id: Option<Uuid>,
    ) -> Outcome<Option<Employee>> {
        let result = match session.require_user() {
            Ok(user) => self.write_employee(user, &input, id).await.map(Some),
            Err(e) => Err(e),
        };
        finish("save_employee", result)
    }

    /// Lists the session user's employees, newest first.
    #[tracing::instrument(level = "info", skip_all)]
    pub async fn get_employees(&self, session: &Session) -> Outcome<Vec<Employee>> {
        let result = match session.require_user() {
            Ok(user) => self.fetch_employees(user).await,
            Err(e) => Err(e),
        };
        finish("get_employees", result)
    }

    #[tracing::instrument(level = "info", skip(self, session))]
    pub async fn delete_employee(&self, session: &Session, id: Uuid) -> Outcome<()> {
        let result = match session.require_user() {
            Ok(user) => self
                .store
                .delete(user, Table::Employees, &owned_by(id, user))
                .await
                .map(|removed| info!(%id, removed, "Employee delete applied")),
            Err(e) => Err(e),
        };
        finish("delete_employee", result)
    }

    async fn write_employee(
        &self,
        user: &AuthUser,
        input: &EmployeeInput,
        id: Option<Uuid>,
    ) -> Result<Employee, GatewayError> {
        let mut row = owned_row(input, user)?;
        let now = timestamp();
        row.insert("updated_at".to_string(), now.clone());

        let stored = match id {
            Some(id) => {
                self.store
                    .update(user, Table::Employees, &owned_by(id, user), Value::Object(row))
                    .await?
            }
            None => {
                row.insert("created_at".to_string(), now);
                self.store
                    .insert(user, Table::Employees, Value::Object(row))
                    .await?
            }
        };

        let employee: Employee = decode_row(Table::Employees, stored)?;
        info!(employee_id = %employee.id, updated = id.is_some(), "Employee saved");
        Ok(employee)
    }

    pub(super) async fn fetch_employees(
        &self,
        user: &AuthUser,
    ) -> Result<Vec<Employee>, GatewayError> {
        let query = Select::table(Table::Employees)
            .eq("user_id", user.id)
            .order_desc("created_at");
        let rows = self.store.select(user, &query).await?;
        decode_rows(Table::Employees, rows)
    }
}

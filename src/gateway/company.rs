use serde_json::Value;
use tracing::info;

use super::{PersistenceGateway, decode_row, finish, owned_by, owned_row, timestamp};
use crate::core::models::{Company, CompanyInput, Table};
use crate::core::session::{AuthUser, Session};
use crate::errors::GatewayError;
use crate::gateway::Outcome;
use crate::store::{Select, TableStore};

impl<S: TableStore> PersistenceGateway<S> {
    /// Updates the session user's company, or creates it if none exists yet.
    ///
    /// The existence check and the write are separate round trips; two
    /// concurrent first saves for the same user can both insert.
    #[tracing::instrument(level = "info", skip_all)]
    pub async fn save_company(
        &self,
        session: &Session,
        input: CompanyInput,
    ) -> Outcome<Option<Company>> {
        let result = match session.require_user() {
            Ok(user) => self.write_company(user, &input).await.map(Some),
            Err(e) => Err(e),
        };
        finish("save_company", result)
    }

    /// Returns the session user's company; `None` when not onboarded yet.
    #[tracing::instrument(level = "info", skip_all)]
    pub async fn get_company(&self, session: &Session) -> Outcome<Option<Company>> {
        let result = match session.require_user() {
            Ok(user) => self.fetch_company(user).await,
            Err(e) => Err(e),
        };
        finish("get_company", result)
    }

    async fn write_company(
        &self,
        user: &AuthUser,
        input: &CompanyInput,
    ) -> Result<Company, GatewayError> {
        let existing = self.fetch_company(user).await?;

        let mut row = owned_row(input, user)?;
        let now = timestamp();
        row.insert("updated_at".to_string(), now.clone());

        let stored = match existing {
            Some(company) => {
                self.store
                    .update(
                        user,
                        Table::Companies,
                        &owned_by(company.id, user),
                        Value::Object(row),
                    )
                    .await?
            }
            None => {
                row.insert("created_at".to_string(), now);
                self.store
                    .insert(user, Table::Companies, Value::Object(row))
                    .await?
            }
        };

        let company: Company = decode_row(Table::Companies, stored)?;
        info!(company_id = %company.id, "Company saved");
        Ok(company)
    }

    pub(super) async fn fetch_company(
        &self,
        user: &AuthUser,
    ) -> Result<Option<Company>, GatewayError> {
        let query = Select::table(Table::Companies).eq("user_id", user.id);
        match self.store.select_single(user, &query).await {
            Ok(row) => decode_row(Table::Companies, row).map(Some),
            Err(GatewayError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

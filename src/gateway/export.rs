use chrono::Utc;
use tracing::info;

use super::{PersistenceGateway, finish};
use crate::core::models::{EXPORT_FORMAT_VERSION, ExportSnapshot};
use crate::core::session::{AuthUser, Session};
use crate::errors::GatewayError;
use crate::gateway::Outcome;
use crate::store::TableStore;

impl<S: TableStore> PersistenceGateway<S> {
    /// Snapshot of everything the session's user owns.
    ///
    /// The three reads run concurrently; if any of them fails the whole
    /// export fails and no partial snapshot is returned.
    #[tracing::instrument(level = "info", skip_all)]
    pub async fn export_user_data(&self, session: &Session) -> Outcome<Option<ExportSnapshot>> {
        let result = match session.require_user() {
            Ok(user) => self.build_snapshot(user).await.map(Some),
            Err(e) => Err(e),
        };
        finish("export_user_data", result)
    }

    async fn build_snapshot(&self, user: &AuthUser) -> Result<ExportSnapshot, GatewayError> {
        let (employees, calculations, company) = futures::try_join!(
            self.fetch_employees(user),
            self.fetch_calculations(user, None),
            self.fetch_company(user)
        )?;

        info!(
            employees = employees.len(),
            calculations = calculations.len(),
            has_company = company.is_some(),
            "User data exported"
        );

        Ok(ExportSnapshot {
            version: EXPORT_FORMAT_VERSION.to_string(),
            exported_at: Utc::now(),
            user_id: user.id,
            employees,
            calculations,
            company,
        })
    }
}

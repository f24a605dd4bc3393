use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Version tag stamped on every export snapshot.
pub const EXPORT_FORMAT_VERSION: &str = "1.0";

/// Tables owned by the hosted store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Employees,
    Companies,
    SalaryCalculations,
}

impl Table {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Table::Employees => "employees",
            Table::Companies => "companies",
            Table::SalaryCalculations => "salary_calculations",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: Uuid,
    pub user_id: Uuid,
    pub full_name: String,
    pub employee_code: Option<String>,
    pub position: Option<String>,
    pub department: Option<String>,
    pub employment_type: Option<String>,
    pub base_salary: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Employee form payload as submitted by the dashboard.
///
/// Optional columns use `Option<Option<T>>`: `None` leaves the column out of
/// the written row, `Some(None)` clears it, `Some(Some(v))` sets it.
///
/// `user_id` may be present on stale payloads; it is always replaced by the
/// session's user before anything reaches the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmployeeInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    pub full_name: String,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub employee_code: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub position: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub department: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub employment_type: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub base_salary: Option<Option<Decimal>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// Registre du Commerce et du Crédit Mobilier number.
    pub rccm: Option<String>,
    /// Tax identification number.
    pub nif: Option<String>,
    /// Social security registration number.
    pub cnss: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Company profile payload. Optional columns follow the same
/// omitted/cleared/set convention as [`EmployeeInput`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    pub name: String,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub city: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub rccm: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub nif: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub cnss: Option<Option<String>>,
}

/// Reads a field that was present in the payload, so an explicit `null`
/// becomes `Some(None)` rather than `None`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Employee fields embedded in calculation listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeSummary {
    pub full_name: String,
    pub employee_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryCalculation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub employee_id: Option<Uuid>,
    pub title: String,
    pub input_data: Value,
    pub result_data: Value,
    pub period: String,
    pub created_at: DateTime<Utc>,
    #[serde(
        rename = "employees",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub employee: Option<EmployeeSummary>,
}

/// A payroll computation to persist. Missing `title` and `period` are
/// derived from the current local date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalculationInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub input: Value,
    #[serde(default)]
    pub result: Value,
    #[serde(default)]
    pub period: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub user_id: Uuid,
    pub employees: Vec<Employee>,
    pub calculations: Vec<SalaryCalculation>,
    pub company: Option<Company>,
}

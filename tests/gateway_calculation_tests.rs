mod common;

use chrono::Local;
use common::{calculation_row, employee_row, session_for};
use paie::core::models::{CalculationInput, Table};
use paie::core::session::Session;
use paie::gateway::{default_period, default_title};
use paie::store::memory::StoreOp;
use paie::store::{Filter, MemoryStore};
use paie::PersistenceGateway;
use serde_json::{Value, json};
use uuid::Uuid;

fn payload() -> CalculationInput {
    CalculationInput {
        input: json!({ "salaire_base": 3000000, "primes": 250000 }),
        result: json!({ "cnss_salarie": 162500, "rts": 187500, "net": 2900000 }),
        ..CalculationInput::default()
    }
}

#[tokio::test]
async fn test_save_calculation_applies_defaults() {
    let user = Uuid::new_v4();
    let gateway = PersistenceGateway::new(MemoryStore::new());

    let outcome = gateway
        .save_calculation(&session_for(user), payload(), None)
        .await;

    let today = Local::now().date_naive();
    let calculation = outcome.into_result().unwrap().unwrap();
    assert_eq!(calculation.employee_id, None);
    assert_eq!(calculation.user_id, user);
    assert_eq!(calculation.period, default_period(today));
    assert!(calculation.title.starts_with("Calcul "));
    assert_eq!(calculation.title, default_title(today));
    assert_eq!(calculation.result_data["net"], 2900000);

    let rows = gateway.store().rows(Table::SalaryCalculations);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["employee_id"], Value::Null);
}

#[tokio::test]
async fn test_save_calculation_keeps_explicit_title_and_period() {
    let user = Uuid::new_v4();
    let employee = Uuid::new_v4();
    let gateway = PersistenceGateway::new(MemoryStore::new());
    let mut input = payload();
    input.title = Some("Paie de janvier".to_string());
    input.period = Some("2026-01".to_string());

    let outcome = gateway
        .save_calculation(&session_for(user), input, Some(employee))
        .await;

    let calculation = outcome.into_result().unwrap().unwrap();
    assert_eq!(calculation.title, "Paie de janvier");
    assert_eq!(calculation.period, "2026-01");
    assert_eq!(calculation.employee_id, Some(employee));

    let calls = gateway.store().calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].op, StoreOp::Insert);
}

#[tokio::test]
async fn test_save_calculation_without_session_fails() {
    let gateway = PersistenceGateway::new(MemoryStore::new());

    let outcome = gateway
        .save_calculation(&Session::Anonymous, payload(), None)
        .await;

    assert_eq!(outcome.error(), Some("No authenticated session"));
    assert!(gateway.store().calls().is_empty());
}

#[tokio::test]
async fn test_get_calculations_embeds_employee_and_filters() {
    let user = Uuid::new_v4();
    let employee = Uuid::new_v4();
    let store = MemoryStore::new();
    store.seed(
        Table::Employees,
        employee_row(employee, user, "Aissatou Barry", "2025-12-01T08:00:00Z"),
    );
    store.seed(
        Table::SalaryCalculations,
        calculation_row(Uuid::new_v4(), user, Some(employee), "2026-01-31T17:00:00Z"),
    );
    store.seed(
        Table::SalaryCalculations,
        calculation_row(Uuid::new_v4(), user, None, "2026-02-28T17:00:00Z"),
    );
    store.seed(
        Table::SalaryCalculations,
        calculation_row(Uuid::new_v4(), Uuid::new_v4(), None, "2026-03-01T17:00:00Z"),
    );
    let gateway = PersistenceGateway::new(store);
    let session = session_for(user);

    let all = gateway.get_calculations(&session, None).await;
    assert!(all.is_ok());
    let all = all.into_payload();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].employee_id, None);
    assert!(all[0].employee.is_none());
    let summary = all[1].employee.as_ref().unwrap();
    assert_eq!(summary.full_name, "Aissatou Barry");
    assert_eq!(summary.employee_code.as_deref(), Some("EMP-001"));

    let linked = gateway
        .get_calculations(&session, Some(employee))
        .await
        .into_payload();
    assert_eq!(linked.len(), 1);
    assert_eq!(linked[0].employee_id, Some(employee));

    let last = gateway.store().calls().pop().unwrap();
    assert!(last.filters.contains(&Filter::eq("employee_id", employee)));
    assert!(last.filters.contains(&Filter::eq("user_id", user)));
}

#[tokio::test]
async fn test_get_calculations_failure_yields_empty_list() {
    let store = MemoryStore::new();
    store.fail_table(Table::SalaryCalculations, "timeout");
    let gateway = PersistenceGateway::new(store);

    let outcome = gateway
        .get_calculations(&session_for(Uuid::new_v4()), None)
        .await;

    assert_eq!(
        outcome.to_json(Some("calculations")),
        json!({ "ok": false, "error": "timeout", "calculations": [] })
    );
}

#[tokio::test]
async fn test_delete_calculation_is_scoped_to_owner() {
    let owner = Uuid::new_v4();
    let id = Uuid::new_v4();
    let store = MemoryStore::new();
    store.seed(
        Table::SalaryCalculations,
        calculation_row(id, owner, None, "2026-01-31T17:00:00Z"),
    );
    let gateway = PersistenceGateway::new(store);

    let outcome = gateway
        .delete_calculation(&session_for(Uuid::new_v4()), id)
        .await;
    assert!(outcome.is_ok());
    assert_eq!(gateway.store().rows(Table::SalaryCalculations).len(), 1);

    let outcome = gateway.delete_calculation(&session_for(owner), id).await;
    assert!(outcome.is_ok());
    assert!(gateway.store().rows(Table::SalaryCalculations).is_empty());

    let calls = gateway.store().calls();
    assert_eq!(calls.len(), 2);
    assert!(calls.iter().all(|c| c.op == StoreOp::Delete
        && c.table == Table::SalaryCalculations
        && c.filters.len() == 2
        && c.filters.contains(&Filter::eq("id", id))
        && c.filters.iter().any(|f| f.column == "user_id")));
    assert!(calls[1].filters.contains(&Filter::eq("user_id", owner)));
}

#[tokio::test]
async fn test_delete_calculation_without_session_fails() {
    let gateway = PersistenceGateway::new(MemoryStore::new());

    let outcome = gateway
        .delete_calculation(&Session::Anonymous, Uuid::new_v4())
        .await;

    assert_eq!(outcome.error(), Some("No authenticated session"));
    assert_eq!(
        outcome.to_json(None),
        json!({ "ok": false, "error": "No authenticated session" })
    );
    assert!(gateway.store().calls().is_empty());
}

#![allow(dead_code)]

use paie::core::session::Session;
use serde_json::{Value, json};
use uuid::Uuid;

pub fn session_for(user_id: Uuid) -> Session {
    Session::authenticated(user_id, Some("rh@example.gn".to_string()), "test-token")
}

pub fn employee_row(id: Uuid, user_id: Uuid, full_name: &str, created_at: &str) -> Value {
    json!({
        "id": id,
        "user_id": user_id,
        "full_name": full_name,
        "employee_code": "EMP-001",
        "position": "Comptable",
        "department": "Finance",
        "employment_type": "CDI",
        "base_salary": 3500000,
        "created_at": created_at,
        "updated_at": created_at,
    })
}

pub fn company_row(id: Uuid, user_id: Uuid, name: &str) -> Value {
    json!({
        "id": id,
        "user_id": user_id,
        "name": name,
        "address": "Avenue de la République",
        "city": "Conakry",
        "phone": "+224 620 00 00 00",
        "email": "contact@example.gn",
        "rccm": "GN.TCC.2024.B.01234",
        "nif": "123456789",
        "cnss": "0987654",
        "created_at": "2026-01-10T08:00:00Z",
        "updated_at": null,
    })
}

pub fn calculation_row(
    id: Uuid,
    user_id: Uuid,
    employee_id: Option<Uuid>,
    created_at: &str,
) -> Value {
    json!({
        "id": id,
        "user_id": user_id,
        "employee_id": employee_id,
        "title": "Calcul du 01/02/2026",
        "input_data": { "salaire_brut": 3500000 },
        "result_data": { "net": 3150000 },
        "period": "2026-02",
        "created_at": created_at,
    })
}

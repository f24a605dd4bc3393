mod common;

use common::{company_row, employee_row, session_for};
use paie::clients::PostgrestClient;
use paie::core::models::{CompanyInput, EmployeeInput, Table};
use paie::core::session::AuthUser;
use paie::errors::GatewayError;
use paie::store::{Filter, Select, TableStore};
use paie::PersistenceGateway;
use serde_json::json;
use url::Url;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> PostgrestClient {
    let base = Url::parse(&server.uri()).unwrap();
    PostgrestClient::with_client(reqwest::Client::new(), &base, "anon-key".to_string()).unwrap()
}

fn auth(id: Uuid) -> AuthUser {
    AuthUser {
        id,
        email: None,
        access_token: "test-token".to_string(),
    }
}

#[tokio::test]
async fn test_select_renders_filters_and_auth_headers() {
    let server = MockServer::start().await;
    let user = Uuid::new_v4();
    let row = employee_row(Uuid::new_v4(), user, "Kadiatou Diallo", "2026-01-01T08:00:00Z");

    Mock::given(method("GET"))
        .and(path("/rest/v1/employees"))
        .and(query_param("select", "*"))
        .and(query_param("user_id", format!("eq.{user}")))
        .and(query_param("order", "created_at.desc"))
        .and(header("apikey", "anon-key"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row])))
        .expect(1)
        .mount(&server)
        .await;

    let query = Select::table(Table::Employees)
        .eq("user_id", user)
        .order_desc("created_at");
    let rows = client_for(&server).select(&auth(user), &query).await.unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["full_name"], "Kadiatou Diallo");
}

#[tokio::test]
async fn test_missing_single_row_maps_to_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/companies"))
        .and(header("accept", "application/vnd.pgrst.object+json"))
        .respond_with(ResponseTemplate::new(406).set_body_json(json!({
            "code": "PGRST116",
            "details": "The result contains 0 rows",
            "hint": null,
            "message": "JSON object requested, multiple (or no) rows returned"
        })))
        .mount(&server)
        .await;

    let user = Uuid::new_v4();
    let err = client_for(&server)
        .select_single(&auth(user), &Select::table(Table::Companies).eq("user_id", user))
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::NotFound));

    let gateway = PersistenceGateway::new(client_for(&server));
    let outcome = gateway.get_company(&session_for(user)).await;
    assert!(outcome.is_ok());
    assert!(outcome.payload().is_none());
}

#[tokio::test]
async fn test_several_company_rows_fail_instead_of_reading_as_absent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/companies"))
        .respond_with(ResponseTemplate::new(406).set_body_json(json!({
            "code": "PGRST116",
            "details": "The result contains 2 rows",
            "hint": null,
            "message": "JSON object requested, multiple (or no) rows returned"
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/companies"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let gateway = PersistenceGateway::new(client_for(&server));
    let session = session_for(Uuid::new_v4());

    let outcome = gateway.get_company(&session).await;
    assert_eq!(
        outcome.error(),
        Some("JSON object requested, multiple (or no) rows returned")
    );
    assert!(outcome.payload().is_none());

    let input = CompanyInput {
        name: "Kindia Agro".to_string(),
        ..CompanyInput::default()
    };
    let outcome = gateway.save_company(&session, input).await;
    assert!(!outcome.is_ok());
}

#[tokio::test]
async fn test_insert_requests_representation() {
    let server = MockServer::start().await;
    let user = Uuid::new_v4();
    let stored = company_row(Uuid::new_v4(), user, "Nzérékoré Bois");

    Mock::given(method("POST"))
        .and(path("/rest/v1/companies"))
        .and(header("prefer", "return=representation"))
        .and(header("accept", "application/vnd.pgrst.object+json"))
        .and(body_partial_json(json!({ "name": "Nzérékoré Bois" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(stored.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let row = client_for(&server)
        .insert(&auth(user), Table::Companies, json!({ "name": "Nzérékoré Bois" }))
        .await
        .unwrap();

    assert_eq!(row, stored);
}

#[tokio::test]
async fn test_update_and_delete_send_scoping_filters() {
    let server = MockServer::start().await;
    let user = Uuid::new_v4();
    let id = Uuid::new_v4();
    let stored = employee_row(id, user, "Oumar Keita", "2026-01-01T08:00:00Z");

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/employees"))
        .and(query_param("id", format!("eq.{id}")))
        .and(query_param("user_id", format!("eq.{user}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(stored.clone()))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/employees"))
        .and(query_param("id", format!("eq.{id}")))
        .and(query_param("user_id", format!("eq.{user}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([stored])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let filters = [Filter::eq("id", id), Filter::eq("user_id", user)];

    let updated = client
        .update(&auth(user), Table::Employees, &filters, json!({ "position": "Gérant" }))
        .await
        .unwrap();
    assert_eq!(updated["id"], id.to_string());

    let removed = client
        .delete(&auth(user), Table::Employees, &filters)
        .await
        .unwrap();
    assert_eq!(removed, 1);
}

#[tokio::test]
async fn test_store_fault_message_reaches_outcome_verbatim() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/employees"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "23505",
            "details": "Key (employee_code)=(EMP-001) already exists.",
            "hint": null,
            "message": "duplicate key value violates unique constraint \"employees_employee_code_key\""
        })))
        .mount(&server)
        .await;

    let gateway = PersistenceGateway::new(client_for(&server));
    let input = EmployeeInput {
        full_name: "Doublon".to_string(),
        employee_code: Some(Some("EMP-001".to_string())),
        ..EmployeeInput::default()
    };

    let outcome = gateway
        .save_employee(&session_for(Uuid::new_v4()), input, None)
        .await;

    assert_eq!(
        outcome.error(),
        Some("duplicate key value violates unique constraint \"employees_employee_code_key\"")
    );
}

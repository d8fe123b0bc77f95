mod common;

use autocheck::error::Error;
use autocheck::model::ContactInfo;
use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const NUMBER_RPC: &str = "/rest/v1/rpc/generate_client_number";
const CREDENTIALS_RPC: &str = "/rest/v1/rpc/generate_client_credentials";

fn contact() -> ContactInfo {
    ContactInfo::new("Ana Silva", "+351 912 000 111", "ana@example.com").unwrap()
}

#[tokio::test]
async fn test_client_number_retried_once() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(NUMBER_RPC))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(NUMBER_RPC))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("CL-000124")))
        .expect(1)
        .mount(&server)
        .await;

    let shop = common::shop(&server);
    let number = shop.clients().generate_client_number().await.unwrap();
    assert_eq!(number, "CL-000124");
}

#[tokio::test]
async fn test_client_number_fails_after_second_attempt() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(NUMBER_RPC))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "code": "P0001",
            "message": "sequence exhausted"
        })))
        .expect(2)
        .mount(&server)
        .await;

    let shop = common::shop(&server);
    let result = shop.clients().generate_client_number().await;
    assert!(matches!(result, Err(Error::Api { .. })));
}

async fn mount_number_and_insert(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(NUMBER_RPC))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("CL-000200")))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/clients"))
        .and(header("Prefer", "return=representation"))
        .and(header("Accept", "application/vnd.pgrst.object+json"))
        .and(body_partial_json(json!({
            "client_number": "CL-000200",
            "customer_name": "Ana Silva",
            "customer_email": "ana@example.com"
        })))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(common::client_row("c200", "CL-000200", "Ana Silva")),
        )
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_create_client_issues_credentials() {
    let server = MockServer::start().await;
    mount_number_and_insert(&server).await;

    Mock::given(method("POST"))
        .and(path(CREDENTIALS_RPC))
        .and(body_json(json!({ "client_id_input": "c200" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "password": "k7Qp2x"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let shop = common::shop(&server);
    let saved = shop.clients().create_client(&contact()).await.unwrap();

    assert_eq!(saved.client.client_number, "CL-000200");
    assert!(saved.client.is_complete());
    assert_eq!(saved.password.as_deref(), Some("k7Qp2x"));
}

#[tokio::test]
async fn test_credentials_failure_keeps_client() {
    let server = MockServer::start().await;
    mount_number_and_insert(&server).await;

    Mock::given(method("POST"))
        .and(path(CREDENTIALS_RPC))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let shop = common::shop(&server);
    let saved = shop.clients().create_client(&contact()).await.unwrap();

    assert_eq!(saved.client.id, "c200");
    assert_eq!(saved.password, None);
}

#[tokio::test]
async fn test_recover_incomplete_client() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/clients"))
        .and(query_param("id", "eq.c9"))
        .and(body_partial_json(json!({ "customer_name": "Rui Costa" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(common::client_row("c9", "CL-000009", "Rui Costa")),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(CREDENTIALS_RPC))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": false, "error": "exists" })))
        .expect(1)
        .mount(&server)
        .await;

    let shop = common::shop(&server);
    let clients = shop.clients();

    // blank fields never reach the server
    assert!(!clients
        .recover_incomplete("c9", "Rui Costa", " ", "rui@example.com")
        .await
        .unwrap());

    assert!(clients
        .recover_incomplete("c9", "Rui Costa", "+351 913 555 000", "rui@example.com")
        .await
        .unwrap());
}

#[tokio::test]
async fn test_pending_client_cannot_get_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/clients"))
        .and(query_param("client_number", "eq.CL-000010"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": "c10",
            "client_number": "CL-000010",
            "customer_name": "Pending"
        }])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/clients"))
        .and(query_param("id", "eq.c10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": "c10",
            "client_number": "CL-000010",
            "customer_name": "Pending"
        }])))
        .mount(&server)
        .await;

    let shop = common::shop(&server);
    let client = shop.clients().find_by_number("CL-000010").await.unwrap();
    assert_eq!(shop.clients().find_by_id("c10").await.unwrap(), client);
    assert!(!client.is_complete());
    assert!(matches!(
        shop.clients().credentials_for(&client).await,
        Err(Error::Validation(_))
    ));
}

mod common;

use autocheck::checkout::CheckoutForm;
use autocheck::error::Error;
use autocheck::media::MediaItem;
use autocheck::model::{Client, ClientRow};
use autocheck::parts::PartsForm;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client() -> Client {
    let row: ClientRow =
        serde_json::from_value(common::client_row("c1", "CL-000123", "Ana Silva")).unwrap();
    Client::from(row)
}

fn echo_row(id: &str, blob: &str) -> serde_json::Value {
    let mut row = json!({
        "id": id,
        "client_id": "c1",
        "vehicle_details": {},
        "general_media": [],
        "status": "draft",
        "created_at": "2026-10-19T10:00:00Z"
    });
    row[blob] = json!([]);
    row
}

#[tokio::test]
async fn test_parts_session_upserts_by_id() {
    let server = MockServer::start().await;
    let mut form = PartsForm::for_client(&client()).unwrap();
    form.vehicle.license_plate = "AA-00-BB".to_string();
    let part = form.add_part();
    form.update_part(&part, |entry| {
        entry.part_name = "Brake pads".to_string();
        entry.serial_number = "BP-778".to_string();
        entry.justification = "Worn below 3mm".to_string();
    })
    .unwrap();
    form.add_part_media(&part, MediaItem::from_bytes("old-pads.png", vec![1, 2]).unwrap())
        .unwrap();

    Mock::given(method("POST"))
        .and(path_regex(&format!(
            r"^/storage/v1/object/checkin-media/parts/{}/[0-9a-f-]+\.png$",
            form.session_id
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Key": "k" })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/parts_service_sessions"))
        .and(query_param("on_conflict", "id"))
        .and(body_partial_json(json!({
            "id": form.session_id,
            "client_id": "c1",
            "parts_data": [{ "partName": "Brake pads", "serialNumber": "BP-778" }],
            "vehicle_details": { "customerName": "Ana Silva", "licensePlate": "AA-00-BB" }
        })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(echo_row(&form.session_id, "parts_data")),
        )
        .expect(2)
        .mount(&server)
        .await;

    let shop = common::shop(&server);
    let saved = form.save(&shop, &client()).await.unwrap();
    assert_eq!(saved.id, form.session_id);
    assert!(form.parts()[0].media.iter().all(MediaItem::is_uploaded));

    // saving again only rewrites the row
    form.save(&shop, &client()).await.unwrap();
}

#[tokio::test]
async fn test_failed_upload_keeps_bytes_for_retry() {
    let server = MockServer::start().await;
    let mut form = PartsForm::for_client(&client()).unwrap();
    form.general_media
        .add(MediaItem::from_bytes("bay.png", b"BAY-PHOTO".to_vec()).unwrap());

    Mock::given(method("POST"))
        .and(path_regex(r"^/storage/v1/object/checkin-media/parts/"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "busy" })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/storage/v1/object/checkin-media/parts/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Key": "k" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/parts_service_sessions"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(echo_row(&form.session_id, "parts_data")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let shop = common::shop(&server);
    assert!(form.save(&shop, &client()).await.is_err());
    assert!(!form.general_media.iter().any(MediaItem::is_uploaded));
    assert_eq!(form.general_media.iter().next().unwrap().data(), b"BAY-PHOTO");

    form.save(&shop, &client()).await.unwrap();
    assert!(form.general_media.iter().all(MediaItem::is_uploaded));

    let uploads: Vec<_> = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|request| request.url.path().starts_with("/storage/"))
        .collect();
    assert_eq!(uploads.len(), 2);
    for upload in &uploads {
        assert!(upload
            .body
            .windows(b"BAY-PHOTO".len())
            .any(|window| window == b"BAY-PHOTO"));
    }
}

#[tokio::test]
async fn test_sessions_need_a_complete_client() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let pending = Client::from(ClientRow {
        id: "c2".to_string(),
        client_number: "CL-000002".to_string(),
        customer_name: Some("Pending".to_string()),
        customer_phone: None,
        customer_email: None,
        created_at: None,
        updated_at: None,
    });

    let shop = common::shop(&server);
    assert!(matches!(
        PartsForm::new().save(&shop, &pending).await,
        Err(Error::Validation(_))
    ));
    assert!(matches!(
        CheckoutForm::new().save(&shop, &pending).await,
        Err(Error::Validation(_))
    ));
}

#[tokio::test]
async fn test_checkout_session_records_approvals() {
    let server = MockServer::start().await;
    let mut form = CheckoutForm::for_client(&client()).unwrap();
    form.set_approved(0, true).unwrap();
    form.set_approved(8, true).unwrap();
    form.add_item_media(8, MediaItem::from_bytes("invoice.jpg", vec![9]).unwrap())
        .unwrap();

    Mock::given(method("POST"))
        .and(path_regex(r"^/storage/v1/object/checkin-media/checkout/.+\.jpg$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Key": "k" })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/checkout_sessions"))
        .and(query_param("on_conflict", "id"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(echo_row(&form.session_id, "checkout_items")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let shop = common::shop(&server);
    let saved = form.save(&shop, &client()).await.unwrap();
    assert_eq!(saved.client_id, "c1");
    assert_eq!(form.approved_count(), 2);

    let requests = server.received_requests().await.unwrap();
    let upsert = requests
        .iter()
        .find(|request| request.url.path() == "/rest/v1/checkout_sessions")
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&upsert.body).unwrap();
    assert_eq!(body["checkout_items"].as_array().unwrap().len(), 12);
    assert_eq!(body["checkout_items"][8]["approved"], true);
    assert!(body["checkout_items"][8]["media"][0]["url"]
        .as_str()
        .unwrap()
        .contains("/storage/v1/object/public/checkin-media/checkout/"));
    assert!(body["vehicle_details"]["checkoutDate"].is_string());
}

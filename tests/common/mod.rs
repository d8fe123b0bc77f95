#![allow(dead_code)]

use std::time::Duration;

use autocheck::config::ClientOptions;
use autocheck::AutoCheck;
use serde_json::{json, Value};
use wiremock::MockServer;

pub const ANON_KEY: &str = "test_anon_key";

/// A client pointed at the mock server, with a short retry pause
pub fn shop(server: &MockServer) -> AutoCheck {
    shop_with(server, ClientOptions::default())
}

pub fn shop_with(server: &MockServer, options: ClientOptions) -> AutoCheck {
    let options = options.with_client_number_retry_delay(Duration::from_millis(20));
    AutoCheck::new_with_options(&server.uri(), ANON_KEY, options).unwrap()
}

pub fn client_row(id: &str, number: &str, name: &str) -> Value {
    json!({
        "id": id,
        "client_number": number,
        "customer_name": name,
        "customer_phone": "+351 912 000 111",
        "customer_email": "ana@example.com",
        "created_at": "2026-10-01T09:00:00Z",
        "updated_at": "2026-10-01T09:00:00Z"
    })
}

/// Unsigned-looking JWT whose payload carries `sub`; only the claims are read
pub fn access_token(sub: &str) -> String {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(
        json!({
            "sub": sub,
            "exp": 4102444800i64,
            "email": "mechanic@shop.example",
            "role": "authenticated"
        })
        .to_string(),
    );
    let signature = URL_SAFE_NO_PAD.encode("signature");
    format!("{}.{}.{}", header, payload, signature)
}

pub fn auth_body(sub: &str) -> Value {
    json!({
        "access_token": access_token(sub),
        "token_type": "bearer",
        "expires_in": 3600,
        "refresh_token": "test_refresh_token",
        "user": {
            "id": sub,
            "email": "mechanic@shop.example",
            "role": "authenticated"
        }
    })
}

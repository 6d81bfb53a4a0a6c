use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::{Value, json};

use wms_api::config::ApiConfig;
use wms_auth::{JwtClaims, Role};
use wms_core::UserId;

const JWT_SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod (in-memory store), bound to an ephemeral port.
        let app = wms_api::app::build_app(&ApiConfig::in_memory(JWT_SECRET))
            .await
            .expect("failed to build app");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post(&self, token: &str, path: &str, body: Value) -> (StatusCode, Value) {
        let res = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .unwrap();
        (res.status(), res.json().await.unwrap())
    }

    async fn put(&self, token: &str, path: &str, body: Value) -> (StatusCode, Value) {
        let res = self
            .client
            .put(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .unwrap();
        (res.status(), res.json().await.unwrap())
    }

    async fn get(&self, token: &str, path: &str) -> (StatusCode, Value) {
        let res = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .unwrap();
        (res.status(), res.json().await.unwrap())
    }

    async fn delete(&self, token: &str, path: &str) -> (StatusCode, Value) {
        let res = self
            .client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .unwrap();
        (res.status(), res.json().await.unwrap())
    }

    /// POST and return the new record's id, asserting 201.
    async fn create(&self, token: &str, path: &str, body: Value) -> String {
        let (status, body) = self.post(token, path, body).await;
        assert_eq!(status, StatusCode::CREATED, "POST {path} failed: {body}");
        body["data"]["id"].as_str().unwrap().to_string()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(roles: &[&'static str]) -> (String, UserId) {
    let now = Utc::now();
    let claims = JwtClaims {
        sub: UserId::new(),
        roles: roles.iter().map(|r| Role::new(*r)).collect(),
        issued_at: now,
        expires_at: now + ChronoDuration::minutes(10),
    };

    let token = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("failed to encode jwt");
    (token, claims.sub)
}

/// warehouse -> zone -> aisle -> rack -> level, plus a bin type.
/// Returns (warehouse_id, level_id, bin_type_id).
async fn seed_layout(srv: &TestServer, token: &str) -> (String, String, String) {
    let warehouse = srv
        .create(token, "/api/warehouses", json!({"code": "WH1", "name": "Main DC"}))
        .await;
    let zone = srv
        .create(
            token,
            "/api/zones",
            json!({"warehouse_id": warehouse, "code": "Z1", "name": "Bulk", "zone_type": "storage"}),
        )
        .await;
    let aisle = srv
        .create(token, "/api/aisles", json!({"zone_id": zone, "code": "A"}))
        .await;
    let rack = srv
        .create(token, "/api/racks", json!({"aisle_id": aisle, "code": "R1"}))
        .await;
    let level = srv
        .create(token, "/api/levels", json!({"rack_id": rack, "code": "L0", "position": 0}))
        .await;
    let bin_type = srv
        .create(
            token,
            "/api/bin_types",
            json!({"code": "TOTE", "name": "Tote", "width_cm": 40, "height_cm": 30, "depth_cm": 60}),
        )
        .await;
    (warehouse, level, bin_type)
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn().await;
    let res = srv.client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn auth_required_for_api_routes() {
    let srv = TestServer::spawn().await;

    let res = srv.client.get(srv.url("/api/bins")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["data"], Value::Null);
    assert_eq!(body["error"], "unauthorized");

    let res = srv
        .client
        .get(srv.url("/api/bins"))
        .bearer_auth("not-a-jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn whoami_reflects_token() {
    let srv = TestServer::spawn().await;
    let (token, sub) = mint_jwt(&["viewer"]);

    let (status, body) = srv.get(&token, "/api/whoami").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user_id"], sub.to_string());
    assert!(body["data"]["roles"].as_array().unwrap().iter().any(|r| r == "viewer"));
    assert!(
        body["data"]["permissions"]
            .as_array()
            .unwrap()
            .iter()
            .any(|p| p == "bins.read")
    );
}

#[tokio::test]
async fn bin_lifecycle_create_update_soft_delete() {
    let srv = TestServer::spawn().await;
    let (token, sub) = mint_jwt(&["admin"]);
    let (_, level, bin_type) = seed_layout(&srv, &token).await;

    // Create
    let (status, created) = srv
        .post(
            &token,
            "/api/bins",
            json!({"level_id": level, "bin_type_id": bin_type, "code": "A-01-01"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["success"], true);
    assert_eq!(created["data"]["status"], "available");
    assert_eq!(created["data"]["created_by"], sub.to_string());
    assert_eq!(created["data"]["updated_by"], sub.to_string());
    assert_eq!(created["data"]["deleted_at"], Value::Null);
    let id = created["data"]["id"].as_str().unwrap().to_string();

    // Fetch one
    let (status, fetched) = srv.get(&token, &format!("/api/bins/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["data"]["code"], "A-01-01");

    // Update (partial) stamps the editor
    let (editor_token, editor) = mint_jwt(&["manager"]);
    let (status, updated) = srv
        .put(&editor_token, &format!("/api/bins/{id}"), json!({"status": "blocked"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["status"], "blocked");
    assert_eq!(updated["data"]["code"], "A-01-01");
    assert_eq!(updated["data"]["created_by"], sub.to_string());
    assert_eq!(updated["data"]["updated_by"], editor.to_string());

    // Filtered list
    let (status, listed) = srv
        .get(&token, &format!("/api/bins?level_id={level}&status=blocked"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["data"]["total"], 1);
    assert_eq!(listed["data"]["items"][0]["id"], id.as_str());

    // Soft delete
    let (status, deleted) = srv.delete(&token, &format!("/api/bins/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["message"], "record archived");
    assert_eq!(deleted["data"]["deleted_by"], sub.to_string());

    let (status, body) = srv.get(&token, &format!("/api/bins/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let (_, listed) = srv.get(&token, "/api/bins").await;
    assert_eq!(listed["data"]["total"], 0);

    let (status, _) = srv.delete(&token, &format!("/api/bins/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stock_records_are_hard_deleted() {
    let srv = TestServer::spawn().await;
    let (admin, _) = mint_jwt(&["admin"]);
    let (warehouse, _, _) = seed_layout(&srv, &admin).await;
    let product = srv
        .create(
            &admin,
            "/api/products",
            json!({"sku": "SKU-9", "name": "Carton", "unit_of_measure": "each"}),
        )
        .await;

    // Operators may write stock.
    let (operator, _) = mint_jwt(&["operator"]);
    let inventory = srv
        .create(
            &operator,
            "/api/inventory",
            json!({"warehouse_id": warehouse, "product_id": product, "quantity": 40, "reserved": 5}),
        )
        .await;

    // ...but not delete it.
    let (status, _) = srv.delete(&operator, &format!("/api/inventory/{inventory}")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, deleted) = srv.delete(&admin, &format!("/api/inventory/{inventory}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["message"], "record deleted");

    let (status, _) = srv.get(&admin, &format!("/api/inventory/{inventory}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn viewers_cannot_write() {
    let srv = TestServer::spawn().await;
    let (token, _) = mint_jwt(&["viewer"]);

    let (status, body) = srv
        .post(&token, "/api/warehouses", json!({"code": "WH1", "name": "Main"}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    let (status, _) = srv.get(&token, "/api/warehouses").await;
    assert_eq!(status, StatusCode::OK);

    // Access-control collections are not visible to viewers at all.
    let (status, _) = srv.get(&token, "/api/users").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn invalid_input_is_rejected_with_envelope() {
    let srv = TestServer::spawn().await;
    let (token, _) = mint_jwt(&["admin"]);

    // Validation
    let (status, body) = srv
        .post(&token, "/api/warehouses", json!({"code": "", "name": "Main"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    // Malformed body
    let (status, body) = srv
        .post(&token, "/api/warehouses", json!({"name": "Main"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    // Dangling reference
    let (status, body) = srv
        .post(
            &token,
            "/api/zones",
            json!({
                "warehouse_id": UserId::new().to_string(),
                "code": "Z1",
                "name": "Bulk",
                "zone_type": "storage",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "invalid_reference");

    // Bad and unknown ids
    let (status, body) = srv.get(&token, "/api/zones/not-a-uuid").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_id");

    let (status, _) = srv
        .get(&token, &format!("/api/zones/{}", UserId::new()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Bad pagination
    let (status, _) = srv.get(&token, "/api/zones?limit=abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = srv.get(&token, "/api/zones?limit=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_paginates_in_creation_order() {
    let srv = TestServer::spawn().await;
    let (token, _) = mint_jwt(&["admin"]);

    for sku in ["SKU-1", "SKU-2", "SKU-3"] {
        srv.create(
            &token,
            "/api/products",
            json!({"sku": sku, "name": format!("Product {sku}"), "unit_of_measure": "each"}),
        )
        .await;
    }

    let (status, page) = srv.get(&token, "/api/products?limit=2&offset=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["data"]["total"], 3);
    assert_eq!(page["data"]["limit"], 2);
    assert_eq!(page["data"]["offset"], 1);
    let skus: Vec<_> = page["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["sku"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(skus, vec!["SKU-2", "SKU-3"]);

    let (_, page) = srv.get(&token, "/api/products?sku=SKU-1").await;
    assert_eq!(page["data"]["total"], 1);
}

#[tokio::test]
async fn stored_roles_grant_permissions() {
    let srv = TestServer::spawn().await;
    let (admin, _) = mint_jwt(&["admin"]);

    let perm = srv
        .create(&admin, "/api/permissions", json!({"name": "products.*"}))
        .await;
    srv.create(
        &admin,
        "/api/roles",
        json!({"name": "catalog_editor", "permission_ids": [perm]}),
    )
    .await;

    let (editor, _) = mint_jwt(&["catalog_editor"]);
    let (status, _) = srv
        .post(
            &editor,
            "/api/products",
            json!({"sku": "SKU-7", "name": "Label roll", "unit_of_measure": "roll"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = srv.get(&editor, "/api/bins").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn put_on_missing_or_archived_record_is_not_found() {
    let srv = TestServer::spawn().await;
    let (token, _) = mint_jwt(&["admin"]);

    let (status, body) = srv
        .put(&token, &format!("/api/warehouses/{}", UserId::new()), json!({"name": "Renamed"}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "not_found");

    let id = srv
        .create(&token, "/api/warehouses", json!({"code": "WH9", "name": "Overflow"}))
        .await;
    let (status, _) = srv.delete(&token, &format!("/api/warehouses/{id}")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = srv
        .put(&token, &format!("/api/warehouses/{id}"), json!({"name": "Renamed"}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    // Still archived after the rejected write.
    let (status, _) = srv.get(&token, &format!("/api/warehouses/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn referenced_records_cannot_be_deleted() {
    let srv = TestServer::spawn().await;
    let (token, _) = mint_jwt(&["admin"]);
    let (warehouse, _, _) = seed_layout(&srv, &token).await;

    let (status, body) = srv.delete(&token, &format!("/api/warehouses/{warehouse}")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "conflict");

    let (status, _) = srv.get(&token, &format!("/api/warehouses/{warehouse}")).await;
    assert_eq!(status, StatusCode::OK);

    let perm = srv
        .create(&token, "/api/permissions", json!({"name": "bins.read"}))
        .await;
    let role = srv
        .create(&token, "/api/roles", json!({"name": "auditor", "permission_ids": [perm]}))
        .await;

    let (status, _) = srv.delete(&token, &format!("/api/permissions/{perm}")).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // The role stays editable.
    let (status, updated) = srv
        .put(&token, &format!("/api/roles/{role}"), json!({"description": "read-only"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["description"], "read-only");
}

#[tokio::test]
async fn unknown_routes_and_query_keys_get_envelopes() {
    let srv = TestServer::spawn().await;
    let (token, _) = mint_jwt(&["admin"]);

    let (status, body) = srv.get(&token, "/api/shelves").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "not_found");

    let res = srv.client.get(srv.url("/nowhere")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "not_found");

    let (status, body) = srv.get(&token, "/api/bins?stauts=blocked").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use copydesk_api::app::{router_with, services::AppServices};
use copydesk_auth::{Company, Hs256JwtValidator, JwtClaims, RoleName, User, UserStore};
use copydesk_core::UserId;
use copydesk_infra::InMemoryDirectory;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::json;

const JWT_SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    directory: Arc<InMemoryDirectory>,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, over a directory the test controls.
        let directory = Arc::new(InMemoryDirectory::new());
        let services = Arc::new(AppServices::in_memory(directory.clone()).unwrap());
        let jwt = Arc::new(Hs256JwtValidator::new(JWT_SECRET));
        let app = router_with(services, jwt);

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
            directory,
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn add_user(&self, name: &str, role: RoleName) -> (UserId, String) {
        let user = User::new(name, format!("{}@example.com", name.to_lowercase()), role);
        let id = user.id;
        self.directory.insert_user(user).unwrap();
        (id, mint_jwt(JWT_SECRET, id))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(jwt_secret: &str, sub: UserId) -> String {
    let claims = JwtClaims::for_user(sub, Utc::now(), ChronoDuration::minutes(10));

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .expect("failed to encode jwt")
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn().await;
    let res = srv.client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let srv = TestServer::spawn().await;

    let res = srv.client.get(srv.url("/me/permissions")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "unauthenticated");

    let forged = mint_jwt("some-other-secret", UserId::new());
    let res = srv.get("/rbac/roles", &forged).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn my_permissions_reflect_role_defaults() {
    let srv = TestServer::spawn().await;
    let (id, token) = srv.add_user("Gina", RoleName::Guest);

    let res = srv.get("/me/permissions", &token).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["userId"], id.to_string());
    assert_eq!(
        body["permissions"],
        json!(["comments:read", "companies:read", "content:read"])
    );
}

#[tokio::test]
async fn can_endpoint_answers_for_the_caller() {
    let srv = TestServer::spawn().await;
    let (_, token) = srv.add_user("Rex", RoleName::Reviewer);

    let res = srv.get("/me/can?action=content:approve&resource=blog_posts", &token).await;
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["allowed"], true);
    assert_eq!(body["resource"], "blog_posts");

    let res = srv.get("/me/can?action=content:create", &token).await;
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["allowed"], false);

    let res = srv.get("/me/can?resource=blog_posts", &token).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn catalog_is_readable_by_any_authenticated_user() {
    let srv = TestServer::spawn().await;
    let (_, token) = srv.add_user("Gus", RoleName::Guest);

    let res = srv.get("/rbac/roles", &token).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["roles"].as_array().unwrap().len(), 4);

    let res = srv.get("/rbac/permissions", &token).await;
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["permissions"].as_array().unwrap().len(), 38);

    let res = srv.get("/rbac/roles/guest/permissions", &token).await;
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["role"], "guest");
    assert_eq!(body["permissions"].as_array().unwrap().len(), 3);

    let res = srv.get("/rbac/roles/owner/permissions", &token).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn company_search_is_gated_on_companies_read() {
    let srv = TestServer::spawn().await;
    srv.directory.insert_company(Company::new("Acme Roasters")).unwrap();
    srv.directory.insert_company(Company::new("Globex")).unwrap();
    let (guest, token) = srv.add_user("Gale", RoleName::Guest);

    let res = srv.get("/companies?search=acme", &token).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["companies"].as_array().unwrap().len(), 1);
    assert_eq!(body["companies"][0]["name"], "Acme Roasters");

    // A deactivated caller loses every permission, companies:read included.
    let mut user = srv.directory.find_user_by_id(guest).await.unwrap().unwrap();
    user.is_active = false;
    srv.directory.insert_user(user).unwrap();

    let res = srv.get("/companies", &token).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "forbidden");
    assert!(body["message"].as_str().unwrap().contains("companies:read"));
}

#[tokio::test]
async fn guest_cannot_deactivate_users() {
    let srv = TestServer::spawn().await;
    let (_, guest_token) = srv.add_user("Gwen", RoleName::Guest);
    let (target, _) = srv.add_user("Tess", RoleName::Editor);

    let res = srv
        .client
        .post(srv.url(&format!("/admin/users/{target}/deactivate")))
        .bearer_auth(&guest_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["message"].as_str().unwrap().contains("users:update"));

    let stored = srv.directory.find_user_by_id(target).await.unwrap().unwrap();
    assert!(stored.is_active);
}

#[tokio::test]
async fn admin_assigns_roles_and_lists_users() {
    let srv = TestServer::spawn().await;
    let (_, admin_token) = srv.add_user("Ada", RoleName::Admin);
    let (target, target_token) = srv.add_user("Tom", RoleName::Guest);

    let res = srv
        .client
        .put(srv.url(&format!("/admin/users/{target}/role")))
        .bearer_auth(&admin_token)
        .json(&json!({ "role": "editor", "customPermissions": ["library:read"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = srv.get("/me/can?action=library:read", &target_token).await;
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["allowed"], true);

    let res = srv.get("/admin/users?role=editor&limit=10", &admin_token).await;
    assert_eq!(res.status(), StatusCode::OK);
    let page: serde_json::Value = res.json().await.unwrap();
    assert_eq!(page["totalCount"], 1);
    assert_eq!(page["totalPages"], 1);
    assert_eq!(page["currentPage"], 1);
    assert_eq!(page["users"][0]["id"], target.to_string());
    assert_eq!(page["users"][0]["role"], "editor");
}

#[tokio::test]
async fn unknown_role_and_bad_paging_are_bad_requests() {
    let srv = TestServer::spawn().await;
    let (_, admin_token) = srv.add_user("Ada", RoleName::Admin);
    let (target, _) = srv.add_user("Tom", RoleName::Guest);

    let res = srv
        .client
        .put(srv.url(&format!("/admin/users/{target}/role")))
        .bearer_auth(&admin_token)
        .json(&json!({ "role": "owner" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = srv.get("/admin/users?limit=1000", &admin_token).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = srv
        .client
        .post(srv.url("/admin/users/not-a-uuid/activate"))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn permissions_outside_role_are_reported() {
    let srv = TestServer::spawn().await;
    let (_, admin_token) = srv.add_user("Ada", RoleName::Admin);
    let (target, _) = srv.add_user("Gil", RoleName::Guest);

    let res = srv
        .client
        .put(srv.url(&format!("/admin/users/{target}/permissions")))
        .bearer_auth(&admin_token)
        .json(&json!({ "permissions": ["content:read", "users:read"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["invalidPermissions"], json!(["users:read"]));
}

#[tokio::test]
async fn deactivation_takes_effect_on_the_next_request() {
    let srv = TestServer::spawn().await;
    let (_, admin_token) = srv.add_user("Ada", RoleName::Admin);
    let (target, target_token) = srv.add_user("Eve", RoleName::Editor);

    let res = srv
        .client
        .post(srv.url(&format!("/admin/users/{target}/deactivate")))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = srv.get("/me/permissions", &target_token).await;
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["permissions"], json!([]));

    // Unknown targets are accepted without effect.
    let res = srv
        .client
        .post(srv.url(&format!("/admin/users/{}/activate", UserId::new())))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}

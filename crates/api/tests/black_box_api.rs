use reqwest::StatusCode;
use serde_json::{json, Value};

use tutoria_api::config::ApiConfig;
use tutoria_core::UserId;

struct TestServer {
    base_url: String,
    admin: UserId,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let admin = UserId::new();
        let config = ApiConfig {
            bootstrap_admins: vec![admin],
            seed_demo: true,
            ..ApiConfig::default()
        };

        // Same router as prod, but bound to an ephemeral port.
        let app = tutoria_api::app::build_app(&config).expect("failed to build app");
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
            admin,
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn send(req: reqwest::RequestBuilder, user: UserId) -> (StatusCode, Value) {
    let res = req
        .header("x-user-id", user.to_string())
        .send()
        .await
        .unwrap();
    let status = res.status();
    let body = res.json::<Value>().await.unwrap_or(Value::Null);
    (status, body)
}

/// The pending request that asked for exactly `roles`.
async fn pending_request(
    client: &reqwest::Client,
    srv: &TestServer,
    roles: &[&str],
) -> Value {
    let (status, body) = send(client.get(srv.url("/admin/access-requests")), srv.admin).await;
    assert_eq!(status, StatusCode::OK);
    body.as_array()
        .unwrap()
        .iter()
        .find(|r| {
            let requested: Vec<&str> = r["requested_roles"]
                .as_array()
                .unwrap()
                .iter()
                .map(|b| b["role"].as_str().unwrap())
                .collect();
            requested == roles
        })
        .cloned()
        .expect("seeded request not found")
}

#[tokio::test]
async fn identity_header_is_required() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.get(srv.url("/whoami")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(srv.url("/whoami"))
        .header("x-user-id", "not-a-uuid")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn bootstrap_admin_sees_administrator_tab() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (status, body) = send(client.get(srv.url("/whoami")), srv.admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["roles"][0]["role"], "administrator");
    assert_eq!(body["roles"][0]["badge"], "secondary");

    let (_, nav) = send(client.get(srv.url("/navigation")), srv.admin).await;
    assert_eq!(nav["state"]["active_tab"], "home");
    let tabs: Vec<&str> = nav["visible_tabs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["tab"].as_str().unwrap())
        .collect();
    assert_eq!(tabs, vec!["home", "administrator"]);

    let (status, nav) = send(
        client
            .post(srv.url("/navigation/tab"))
            .json(&json!({ "tab": "administrator" })),
        srv.admin,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(nav["state"]["active_sub_tab"], "validate-users");

    let (status, body) = send(
        client
            .post(srv.url("/navigation/sub-tab"))
            .json(&json!({ "sub_tab": "sessions-by-tutor" })),
        srv.admin,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_sub_tab");
}

#[tokio::test]
async fn users_without_roles_are_kept_out() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let nobody = UserId::new();

    let (status, body) = send(client.get(srv.url("/admin/access-requests")), nobody).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    let (status, body) = send(
        client
            .post(srv.url("/navigation/tab"))
            .json(&json!({ "tab": "verifier" })),
        nobody,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "unauthorized_tab");

    let (_, panel) = send(client.get(srv.url("/dashboard")), nobody).await;
    assert_eq!(panel["panel"]["tab"], "home");
    assert!(panel["quick_access"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn review_grants_roles_and_revocation_evicts() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let request = pending_request(&client, &srv, &["tutor", "verifier"]).await;
    let id = request["id"].as_str().unwrap().to_string();
    let applicant: UserId = request["applicant"].as_str().unwrap().parse().unwrap();
    let review = format!("/admin/access-requests/{id}/review");

    let (status, draft) = send(client.post(srv.url(&review)), srv.admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(draft["undecided"], json!(["tutor", "verifier"]));

    let (status, draft) = send(
        client
            .put(srv.url(&format!("{review}/roles/tutor")))
            .json(&json!({ "approved": true })),
        srv.admin,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(draft["complete"], false);

    let (status, body) = send(client.post(srv.url(&format!("{review}/submit"))), srv.admin).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "incomplete_decision");

    let (status, body) = send(
        client
            .put(srv.url(&format!("{review}/roles/administrator")))
            .json(&json!({ "approved": true })),
        srv.admin,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_role");

    send(
        client
            .put(srv.url(&format!("{review}/roles/verifier")))
            .json(&json!({ "approved": false })),
        srv.admin,
    )
    .await;

    let (status, resolved) = send(client.post(srv.url(&format!("{review}/submit"))), srv.admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        resolved["decisions"],
        json!([
            { "role": "tutor", "approved": true },
            { "role": "verifier", "approved": false },
        ])
    );
    assert_eq!(resolved["granted"], json!(["tutor"]));

    let (_, queue) = send(client.get(srv.url("/admin/access-requests")), srv.admin).await;
    assert!(queue.as_array().unwrap().iter().all(|r| r["id"] != id.as_str()));

    // Applicant now has the tutor tab and a quick-access card for it.
    let (_, panel) = send(client.get(srv.url("/dashboard")), applicant).await;
    assert_eq!(panel["quick_access"][0]["target"], "tutor");
    let (status, _) = send(
        client
            .post(srv.url("/navigation/tab"))
            .json(&json!({ "tab": "tutor" })),
        applicant,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        client.delete(srv.url(&format!("/admin/users/{applicant}/roles/tutor"))),
        srv.admin,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["revoked"], true);

    let (_, nav) = send(client.get(srv.url("/navigation")), applicant).await;
    assert_eq!(nav["state"], json!({ "active_tab": "home", "active_sub_tab": null }));
    assert_eq!(nav["visible_tabs"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn revoking_requires_a_valid_user_id() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (status, body) = send(
        client.delete(srv.url("/admin/users/not-a-uuid/roles/tutor")),
        srv.admin,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_id");

    let (status, body) = send(
        client.delete(srv.url(&format!("/admin/users/{}/roles/janitor", UserId::new()))),
        srv.admin,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_role");

    let (status, body) = send(
        client.delete(srv.url(&format!("/admin/users/{}/roles/tutor", UserId::new()))),
        srv.admin,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["revoked"], false);
}

#[tokio::test]
async fn toggling_and_discarding_drafts() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let request = pending_request(&client, &srv, &["verifier"]).await;
    let id = request["id"].as_str().unwrap();
    let review = format!("/admin/access-requests/{id}/review");

    send(client.post(srv.url(&review)), srv.admin).await;
    for _ in 0..2 {
        send(
            client
                .put(srv.url(&format!("{review}/roles/verifier")))
                .json(&json!({ "approved": true })),
            srv.admin,
        )
        .await;
    }

    let (status, draft) = send(client.get(srv.url(&review)), srv.admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(draft["entries"][0]["decision"], "undecided");

    let (status, _) = send(client.delete(srv.url(&review)), srv.admin).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(client.get(srv.url(&review)), srv.admin).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "no_open_draft");

    let (status, _) = send(
        client.post(srv.url(&format!("/admin/access-requests/{}/review", UserId::new()))),
        srv.admin,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

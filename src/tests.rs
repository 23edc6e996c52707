//! Integration tests for the planner backend.

use std::sync::Arc;

use jsonwebtoken::EncodingKey;
use reqwest::Client;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::auth::IdentityClaims;
use crate::catalog::Catalog;
use crate::config::Config;
use crate::db::{init_database, Repository};
use crate::{create_router, AppState};

const TEST_SECRET: &str = "test-secret";

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.sqlite");

        // Initialize database
        let pool = init_database(&db_path).await.expect("Failed to init DB");
        let repo = Arc::new(Repository::new(pool));

        // Create config
        let config = Config {
            auth_secret: Some(TEST_SECRET.to_string()),
            db_path,
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "warn".to_string(),
        };

        let state = AppState {
            repo,
            catalog: Arc::new(Catalog::generate()),
            config: Arc::new(config),
        };

        let app = create_router(state);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        // Spawn server
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        TestFixture {
            client: Client::new(),
            base_url,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Mint an identity token the way the external identity provider would.
fn token_for(uid: &str, name: &str) -> String {
    let claims = IdentityClaims {
        sub: uid.to_string(),
        name: Some(name.to_string()),
        email: Some(format!("{}@example.com", uid)),
        picture: None,
        exp: u64::MAX / 2,
    };
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_mutations_require_identity() {
    let fixture = TestFixture::new().await;

    // No token at all
    let resp = fixture
        .client
        .post(fixture.url("/api/builds"))
        .json(&json!({ "name": "Nope", "characterId": "amon" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    let resp2 = fixture
        .client
        .get(fixture.url("/api/builds"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp2.status(), 401);

    // Garbage token is rejected outright, even on a public route
    let resp3 = fixture
        .client
        .get(fixture.url("/api/users"))
        .bearer_auth("not-a-token")
        .send()
        .await
        .unwrap();
    assert_eq!(resp3.status(), 401);
}

#[tokio::test]
async fn test_public_routes_work_signed_out() {
    let fixture = TestFixture::new().await;

    for path in ["/api/users", "/api/catalog"] {
        let resp = fixture.client.get(fixture.url(path)).send().await.unwrap();
        assert_eq!(resp.status(), 200, "{}", path);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["success"], true);
    }
}

#[tokio::test]
async fn test_sign_in_upserts_user_idempotently() {
    let fixture = TestFixture::new().await;
    let token = token_for("alice", "Alice");

    for _ in 0..2 {
        let resp = fixture
            .client
            .post(fixture.url("/api/session"))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["data"]["uid"], "alice");
        assert_eq!(body["data"]["displayName"], "Alice");
    }

    let users_resp = fixture
        .client
        .get(fixture.url("/api/users"))
        .send()
        .await
        .unwrap();
    let users_body: Value = users_resp.json().await.unwrap();
    let users = users_body["data"].as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["uid"], "alice");
    assert_eq!(users[0]["email"], "alice@example.com");
    assert_eq!(users[0]["photoURL"], Value::Null);
}

#[tokio::test]
async fn test_build_create_get_round_trip() {
    let fixture = TestFixture::new().await;
    let token = token_for("alice", "Alice");

    let payload = json!({
        "name": "Raid Build",
        "characterId": "amon",
        "skillPoints": { "amon-green-s1": 3, "amon-green-s8": 1 },
        "gear": {
            "Weapon 1": { "name": "Hellwalker", "rarity": "legendary", "type": "Shotgun" }
        },
        "activeGear": ["Weapon 1", "Shield"]
    });

    let create_resp = fixture
        .client
        .post(fixture.url("/api/builds"))
        .bearer_auth(&token)
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(create_resp.status(), 200);
    let create_body: Value = create_resp.json().await.unwrap();
    let created = &create_body["data"];
    assert_eq!(created["userId"], "alice");
    assert_eq!(created["name"], "Raid Build");
    let id = created["id"].as_str().unwrap();
    assert_ne!(id, "new");

    let get_resp = fixture
        .client
        .get(fixture.url(&format!("/api/builds/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(get_resp.status(), 200);
    let get_body: Value = get_resp.json().await.unwrap();
    let fetched = &get_body["data"];

    // Equal to what was sent, modulo the store-assigned fields
    assert_eq!(fetched["name"], payload["name"]);
    assert_eq!(fetched["characterId"], payload["characterId"]);
    assert_eq!(fetched["skillPoints"], payload["skillPoints"]);
    assert_eq!(fetched["gear"]["Weapon 1"]["name"], "Hellwalker");
    assert_eq!(fetched["gear"]["Weapon 1"]["rarity"], "legendary");
    assert_eq!(fetched["activeGear"], payload["activeGear"]);
    assert_eq!(fetched["id"], id);
    assert_eq!(fetched["userId"], "alice");
    assert!(fetched["createdAt"].as_str().unwrap().len() > 0);
}

#[tokio::test]
async fn test_create_clamps_skill_points() {
    let fixture = TestFixture::new().await;
    let token = token_for("alice", "Alice");

    let resp = fixture
        .client
        .post(fixture.url("/api/builds"))
        .bearer_auth(&token)
        .json(&json!({
            "name": "Overcapped",
            "characterId": "amon",
            "skillPoints": {
                "amon-green-s1": 99,
                "amon-green-s8": 3,
                "not-a-skill": 42
            }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();

    // Passive clamps to 5, augment to 1, unresolvable ids pass through
    assert_eq!(body["data"]["skillPoints"]["amon-green-s1"], 5);
    assert_eq!(body["data"]["skillPoints"]["amon-green-s8"], 1);
    assert_eq!(body["data"]["skillPoints"]["not-a-skill"], 42);
}

#[tokio::test]
async fn test_update_merges_fields() {
    let fixture = TestFixture::new().await;
    let token = token_for("alice", "Alice");

    let create_body: Value = fixture
        .client
        .post(fixture.url("/api/builds"))
        .bearer_auth(&token)
        .json(&json!({
            "name": "Original",
            "characterId": "amon",
            "skillPoints": { "amon-green-s1": 2 },
            "activeGear": ["Weapon 1"]
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = create_body["data"]["id"].as_str().unwrap();

    // Rename only; everything else must survive the merge
    let update_resp = fixture
        .client
        .put(fixture.url(&format!("/api/builds/{}", id)))
        .bearer_auth(&token)
        .json(&json!({ "name": "Renamed" }))
        .send()
        .await
        .unwrap();
    assert_eq!(update_resp.status(), 200);

    let fetched: Value = fixture
        .client
        .get(fixture.url(&format!("/api/builds/{}", id)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["data"]["name"], "Renamed");
    assert_eq!(fetched["data"]["characterId"], "amon");
    assert_eq!(fetched["data"]["skillPoints"]["amon-green-s1"], 2);
    assert_eq!(fetched["data"]["activeGear"], json!(["Weapon 1"]));

    // Points provided together with a character switch clamp under the new
    // character
    let update2 = fixture
        .client
        .put(fixture.url(&format!("/api/builds/{}", id)))
        .bearer_auth(&token)
        .json(&json!({
            "characterId": "vex",
            "skillPoints": { "vex-green-s1": 50 }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(update2.status(), 200);

    let fetched2: Value = fixture
        .client
        .get(fixture.url(&format!("/api/builds/{}", id)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched2["data"]["skillPoints"]["vex-green-s1"], 5);
}

#[tokio::test]
async fn test_builds_are_owner_scoped() {
    let fixture = TestFixture::new().await;
    let alice = token_for("alice", "Alice");
    let bob = token_for("bob", "Bob");

    let create_body: Value = fixture
        .client
        .post(fixture.url("/api/builds"))
        .bearer_auth(&alice)
        .json(&json!({ "name": "Alice's", "characterId": "amon" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = create_body["data"]["id"].as_str().unwrap();

    // Bob cannot modify or delete Alice's build
    let update_resp = fixture
        .client
        .put(fixture.url(&format!("/api/builds/{}", id)))
        .bearer_auth(&bob)
        .json(&json!({ "name": "Bob's now" }))
        .send()
        .await
        .unwrap();
    assert_eq!(update_resp.status(), 403);
    let update_body: Value = update_resp.json().await.unwrap();
    assert_eq!(update_body["error"]["code"], "FORBIDDEN");

    let delete_resp = fixture
        .client
        .delete(fixture.url(&format!("/api/builds/{}", id)))
        .bearer_auth(&bob)
        .send()
        .await
        .unwrap();
    assert_eq!(delete_resp.status(), 403);

    // But anyone can read it
    let get_resp = fixture
        .client
        .get(fixture.url(&format!("/api/builds/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(get_resp.status(), 200);

    // Bob's own list does not include it
    let list_body: Value = fixture
        .client
        .get(fixture.url("/api/builds"))
        .bearer_auth(&bob)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list_body["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_user_builds_listed_oldest_first() {
    let fixture = TestFixture::new().await;
    let token = token_for("alice", "Alice");

    for name in ["First", "Second", "Third"] {
        let resp = fixture
            .client
            .post(fixture.url("/api/builds"))
            .bearer_auth(&token)
            .json(&json!({ "name": name, "characterId": "amon" }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
    }

    let body: Value = fixture
        .client
        .get(fixture.url("/api/users/alice/builds"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["First", "Second", "Third"]);
}

#[tokio::test]
async fn test_not_found_errors() {
    let fixture = TestFixture::new().await;
    let token = token_for("alice", "Alice");

    let get_resp = fixture
        .client
        .get(fixture.url("/api/builds/non-existent-id"))
        .send()
        .await
        .unwrap();
    assert_eq!(get_resp.status(), 404);
    let body: Value = get_resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let update_resp = fixture
        .client
        .put(fixture.url("/api/builds/non-existent-id"))
        .bearer_auth(&token)
        .json(&json!({ "name": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(update_resp.status(), 404);

    let delete_resp = fixture
        .client
        .delete(fixture.url("/api/builds/non-existent-id"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(delete_resp.status(), 404);
}

#[tokio::test]
async fn test_build_view_resolves_and_filters() {
    let fixture = TestFixture::new().await;
    let token = token_for("alice", "Alice");

    let create_body: Value = fixture
        .client
        .post(fixture.url("/api/builds"))
        .bearer_auth(&token)
        .json(&json!({
            "name": "Showcase",
            "characterId": "amon",
            "skillPoints": { "amon-green-s1": 3, "amon-green-s2": 0 },
            "gear": {
                "Weapon 1": { "name": "Hellwalker", "rarity": "legendary" },
                "Shield": { "name": "" },
                "Repkit": { "name": "Med-Unit" }
            },
            "activeGear": ["Weapon 1", "Shield", "Repkit"]
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = create_body["data"]["id"].as_str().unwrap();

    let view_body: Value = fixture
        .client
        .get(fixture.url(&format!("/api/builds/{}/view", id)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let view = &view_body["data"];

    assert_eq!(view["name"], "Showcase");

    let gear = view["gear"].as_array().unwrap();
    assert_eq!(gear.len(), 2);
    assert_eq!(gear[0]["slot"], "Weapon 1");
    assert_eq!(gear[0]["name"], "Hellwalker");
    assert_eq!(gear[0]["rarity"], "legendary");
    assert_eq!(gear[1]["slot"], "Repkit");

    let skills = view["skills"].as_array().unwrap();
    assert_eq!(skills.len(), 1);
    assert_eq!(skills[0]["name"], "Passive Skill 1");
    assert_eq!(skills[0]["points"], 3);
}

#[tokio::test]
async fn test_catalog_endpoint() {
    let fixture = TestFixture::new().await;

    let body: Value = fixture
        .client
        .get(fixture.url("/api/catalog"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let characters = body["data"]["characters"].as_array().unwrap();
    assert_eq!(characters.len(), 4);
    assert_eq!(characters[0]["id"], "amon");
    assert_eq!(characters[0]["name"], "Amon");

    let green = &characters[0]["trees"]["green"];
    assert_eq!(green["name"], "Green Tree");
    let skills = green["skills"].as_array().unwrap();
    assert_eq!(skills.len(), 37);
    assert_eq!(skills[0]["id"], "amon-green-s1");
    assert_eq!(skills[0]["type"], "passive");
    assert_eq!(skills[0]["maxPoints"], 5);
    assert_eq!(skills[36]["type"], "capstone");
    assert_eq!(skills[36]["maxPoints"], 1);
}

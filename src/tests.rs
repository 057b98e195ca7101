//! Integration tests for the heroes backend.

use axum::{routing::get, Json, Router};
use reqwest::Client;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::import::{run_import, ImportOptions};
use crate::test_support::{spawn_stub, stub_client, test_state};
use crate::{create_router, AppState};

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    state: AppState,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        let (state, temp_dir) = test_state().await;
        let app = create_router(state.clone());

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

        // Redirects are asserted, not followed
        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();

        TestFixture {
            client,
            base_url,
            state,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn create_hero(&self, body: Value) -> Value {
        let resp = self
            .client
            .post(self.url("/api/superheroes"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);
        let body: Value = resp.json().await.unwrap();
        body["data"].clone()
    }
}

fn hero(name: &str, edad: i64, planeta: &str, poderes: &[&str]) -> Value {
    json!({
        "nombreSuperHeroe": name,
        "nombreReal": "Nombre Real",
        "edad": edad,
        "planetaOrigen": planeta,
        "debilidad": "Ninguna",
        "poderes": poderes,
        "aliados": [],
        "enemigos": []
    })
}

fn chile() -> Value {
    json!({
        "name": "Chile",
        "capital": "Santiago",
        "borders": ["ARG", "BOL", "PER"],
        "area": 756102.0,
        "population": 19116209,
        "gini": 44.4,
        "timezones": ["UTC-06:00", "UTC-04:00"],
        "region": "Americas",
        "subregion": "South America"
    })
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
async fn test_superhero_crud() {
    let fixture = TestFixture::new().await;

    // Create
    let created = fixture
        .create_hero(hero("Spider-Man", 25, "Tierra", &["Trepar paredes"]))
        .await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["nombreSuperHeroe"], "Spider-Man");
    assert_eq!(created["autor"], "Isabel");

    // Get
    let resp = fixture
        .client
        .get(fixture.url(&format!("/api/superheroes/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["edad"], 25);

    // Update
    let resp = fixture
        .client
        .put(fixture.url(&format!("/api/superheroes/{}", id)))
        .json(&hero("Spider-Man", 26, "Tierra", &["Trepar paredes", "Sentido arácnido"]))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["id"], id.as_str());
    assert_eq!(body["data"]["edad"], 26);
    assert_eq!(body["data"]["poderes"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["createdAt"], created["createdAt"]);

    // List
    let resp = fixture
        .client
        .get(fixture.url("/api/superheroes"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // Delete returns the removed record
    let resp = fixture
        .client
        .delete(fixture.url(&format!("/api/superheroes/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["id"], id.as_str());

    // Gone
    let resp = fixture
        .client
        .get(fixture.url(&format!("/api/superheroes/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_superhero_validation_errors() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/superheroes"))
        .json(&json!({ "nombreSuperHeroe": "X", "nombreReal": "Logan" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    let fields: Vec<&str> = body["error"]["details"]["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["nombreSuperHeroe", "edad", "poderes"]);

    // Malformed JSON uses the same envelope
    let resp = fixture
        .client
        .post(fixture.url("/api/superheroes"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_missing_and_malformed_ids() {
    let fixture = TestFixture::new().await;
    let missing = uuid::Uuid::new_v4();

    for path in [
        format!("/api/superheroes/{}", missing),
        format!("/api/countries/{}", missing),
    ] {
        let resp = fixture.client.get(fixture.url(&path)).send().await.unwrap();
        assert_eq!(resp.status(), 404, "{}", path);
    }

    let resp = fixture
        .client
        .put(fixture.url(&format!("/api/superheroes/{}", missing)))
        .json(&hero("Wolverine", 150, "Tierra", &["Regeneración"]))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    // Nothing was created by the failed update
    let resp = fixture
        .client
        .get(fixture.url("/api/superheroes"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert!(body["data"].as_array().unwrap().is_empty());

    for path in ["/api/superheroes/not-an-id", "/api/countries/12345"] {
        let resp = fixture.client.delete(fixture.url(path)).send().await.unwrap();
        assert_eq!(resp.status(), 400, "{}", path);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }
}

#[tokio::test]
async fn test_search_and_veterans() {
    let fixture = TestFixture::new().await;
    fixture
        .create_hero(hero("Superman", 35, "Krypton", &["Volar", "Fuerza"]))
        .await;
    fixture
        .create_hero(hero("Batman", 40, "Tierra", &["Inteligencia", "Artes marciales"]))
        .await;
    fixture
        .create_hero(hero("Robin", 18, "Tierra", &["Acrobacia", "Combate"]))
        .await;

    let resp = fixture
        .client
        .get(fixture.url("/api/superheroes/search/nombreSuperHeroe/man"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let resp = fixture
        .client
        .get(fixture.url("/api/superheroes/search/autor/Isabel"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let resp = fixture
        .client
        .get(fixture.url("/api/superheroes/veterans"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let veterans = body["data"].as_array().unwrap();
    assert_eq!(veterans.len(), 1);
    assert_eq!(veterans[0]["nombreSuperHeroe"], "Batman");
}

#[tokio::test]
async fn test_country_crud() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/countries"))
        .json(&chile())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    let id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["population"], "19116209");
    assert_eq!(body["data"]["area"], 756102.0);
    assert_eq!(body["data"]["author"], "ISABENSA");

    let mut changes = chile();
    changes["capital"] = json!("Santiago de Chile");
    changes["area"] = json!(756000.5);
    let resp = fixture
        .client
        .put(fixture.url(&format!("/api/countries/{}", id)))
        .json(&changes)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["capital"], "Santiago de Chile");
    assert_eq!(body["data"]["area"], 756000.5);

    // Countries never show up as superheroes
    let resp = fixture
        .client
        .get(fixture.url("/api/superheroes"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert!(body["data"].as_array().unwrap().is_empty());

    let resp = fixture
        .client
        .delete(fixture.url(&format!("/api/countries/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = fixture
        .client
        .get(fixture.url(&format!("/api/countries/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_country_routes_ignore_superheroes() {
    let fixture = TestFixture::new().await;
    let created = fixture
        .create_hero(hero("Aquaman", 40, "Atlantis", &["Nadar"]))
        .await;
    let id = created["id"].as_str().unwrap();

    let resp = fixture
        .client
        .get(fixture.url(&format!("/api/countries/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = fixture
        .client
        .delete(fixture.url(&format!("/api/countries/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = fixture
        .client
        .get(fixture.url(&format!("/api/superheroes/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_country_validation() {
    let fixture = TestFixture::new().await;

    let mut invalid = chile();
    invalid["borders"] = json!(["arg"]);
    invalid["gini"] = json!(120);
    let resp = fixture
        .client
        .post(fixture.url("/api/countries"))
        .json(&invalid)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    let fields: Vec<&str> = body["error"]["details"]["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["borders", "gini"]);
}

#[tokio::test]
async fn test_imported_countries_are_served() {
    let fixture = TestFixture::new().await;
    let upstream = spawn_stub(Router::new().route(
        "/all",
        get(|| async {
            Json(json!([{
                "name": { "common": "España" },
                "capital": ["Madrid"],
                "population": 47000000,
                "area": 505990,
                "region": "Europe",
                "subregion": "Southern Europe",
                "borders": ["FRA", "PRT"],
                "timezones": ["UTC+1"],
                "languages": { "spa": "Spanish" }
            }]))
        }),
    ))
    .await;

    let options = ImportOptions {
        author: fixture.state.config.import_author.clone(),
        spanish_only: true,
        replace: false,
    };
    let report = run_import(&fixture.state.repo, &stub_client(&upstream, 3), &options)
        .await
        .unwrap();
    assert_eq!(report.inserted, 1);

    let resp = fixture
        .client
        .get(fixture.url("/api/countries"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let countries = body["data"].as_array().unwrap();
    assert_eq!(countries.len(), 1);
    assert_eq!(countries[0]["name"], "España");
    assert_eq!(countries[0]["population"], "47000000");
    assert_eq!(countries[0]["area"], 505990.0);

    let resp = fixture
        .client
        .get(fixture.url("/paises/dashboard"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let html = resp.text().await.unwrap();
    assert!(html.contains("España"));
    assert!(html.contains("Madrid"));
}

#[tokio::test]
async fn test_html_delete_redirects_with_message() {
    let fixture = TestFixture::new().await;
    let created = fixture
        .create_hero(hero("Flash", 30, "Tierra", &["Velocidad"]))
        .await;
    let id = created["id"].as_str().unwrap();

    let resp = fixture
        .client
        .post(fixture.url(&format!("/superheroes/delete/{}/confirm", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 303);
    assert_eq!(
        resp.headers()["location"],
        "/superheroes/listado?message=deleted"
    );

    let resp = fixture
        .client
        .post(fixture.url(&format!("/superheroes/delete/{}/confirm", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    assert!(resp
        .headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/html"));
}

use chrono::{Duration, NaiveDate};
use reqwest::StatusCode;
use serde_json::{json, Value};

use greenvast_api::{build_app, AppState};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, fresh store per server, bound to an ephemeral port.
        let app = build_app(AppState::new("v0.1"));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
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

fn snapshot(weeks_ago: i64, price: f64) -> Value {
    let base = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
    let date = base - Duration::weeks(weeks_ago);
    json!({
        "commodity": "Maize",
        "market": "Kericho",
        "date": format!("{date}T00:00:00"),
        "unit": "kg",
        "avgPrice": price,
    })
}

async fn post(client: &reqwest::Client, url: String, body: Value) -> (StatusCode, Value) {
    let res = client.post(url).json(&body).send().await.unwrap();
    let status = res.status();
    let body = res.json::<Value>().await.unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn health_reports_service() {
    let server = TestServer::spawn().await;
    let body: Value = reqwest::get(server.url("/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["ok"], json!(true));
    assert_eq!(body["service"], json!("greenvast-ai"));
}

#[tokio::test]
async fn train_then_predict_price() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let rows: Vec<Value> = (0..4).map(|i| snapshot(i, 32.0 + i as f64)).collect();
    let (status, report) = post(&client, server.url("/train/price"), json!({"rows": rows})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["pairCount"], json!(1));
    assert_eq!(report["modelVersion"], json!("v0.1"));
    assert!(report["trainedAt"].is_string());

    let (status, body) = post(
        &client,
        server.url("/predict/price"),
        json!({"commodity": " maize ", "market": "KERICHO"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["commodity"], json!("maize"));
    assert_eq!(body["unit"], json!("kg"));
    assert_eq!(body["historyCount"], json!(4));
    let confidence = body["confidence"].as_f64().unwrap();
    assert!((0.2..=0.9).contains(&confidence));
    let (low, price, high) = (
        body["low"].as_f64().unwrap(),
        body["price"].as_f64().unwrap(),
        body["high"].as_f64().unwrap(),
    );
    assert!(low < price && price < high);

    let (status, overview) = {
        let res = client.get(server.url("/models/price")).send().await.unwrap();
        (res.status(), res.json::<Value>().await.unwrap())
    };
    assert_eq!(status, StatusCode::OK);
    assert_eq!(overview["pairs"][0]["commodity"], json!("maize"));
    assert_eq!(overview["pairs"][0]["count"], json!(4));
}

#[tokio::test]
async fn empty_rows_and_unknown_pairs_are_rejected() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (status, body) = post(&client, server.url("/train/price"), json!({"rows": []})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("validation_error"));

    let (status, body) = post(
        &client,
        server.url("/predict/price"),
        json!({"commodity": "Beans", "market": "Eldoret"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("not_found"));
}

#[tokio::test]
async fn reset_clears_trained_pairs() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (status, _) = post(
        &client,
        server.url("/train/price"),
        json!({"rows": [snapshot(0, 30.0)]}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let res = client
        .delete(server.url("/models/price"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let (status, _) = post(
        &client,
        server.url("/predict/price"),
        json!({"commodity": "Maize", "market": "Kericho"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn crop_yield_prediction() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (status, body) = post(
        &client,
        server.url("/predict/yield/crop"),
        json!({
            "crop": "Maize",
            "areaHa": 1.2,
            "county": "Kericho",
            "history": [
                {"season": "LR23", "quantity": 2400, "unit": "kg", "areaHa": 1.1},
                {"season": "SR23", "quantity": 2100, "unit": "kg", "areaHa": 1.0}
            ],
            "rainfall": 820,
            "outbreakRisk": 0.1
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["low"].as_f64() < body["mid"].as_f64());
    assert!(body["mid"].as_f64() < body["high"].as_f64());
    assert_eq!(body["unit"], json!("kg"));
    assert_eq!(body["assumptions"].as_array().unwrap().len(), 3);

    let (status, body) = post(
        &client,
        server.url("/predict/yield/crop"),
        json!({"crop": "Maize", "areaHa": 0, "county": "Kericho"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("validation_error"));
}

#[tokio::test]
async fn livestock_yield_predictions() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (status, dairy) = post(
        &client,
        server.url("/predict/yield/livestock"),
        json!({
            "type": "Dairy",
            "headCount": 8,
            "sessionsPerDay": 2,
            "avgMilkLpd": 9.5,
            "droughtRisk": 0.1
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dairy["unit"], json!("litres_per_session"));
    assert!(dairy["low"].as_f64() < dairy["mid"].as_f64());
    assert!(dairy["mid"].as_f64() < dairy["high"].as_f64());

    let (status, beef) = post(
        &client,
        server.url("/predict/yield/livestock"),
        json!({
            "type": "Beef",
            "headCount": 20,
            "droughtRisk": 0.2,
            "outbreakRisk": 0.1,
            "history": [{"headsReady": 6, "liveweightKg": 320}]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(beef["headsReady"].as_f64().unwrap() > 0.0);
    assert_eq!(beef["liveweightKgRange"].as_array().unwrap().len(), 2);

    let (status, body) = post(
        &client,
        server.url("/predict/yield/livestock"),
        json!({"type": "Poultry", "headCount": 100}),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], json!("unsupported_type"));
}

#[tokio::test]
async fn advisory_actions() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (status, body) = post(&client, server.url("/advisory"), json!({"forecast": []})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["action"], json!("watch"));
    assert_eq!(body["icon"], json!("eye"));

    let plant: Vec<Value> = (1..=3)
        .map(|d| json!({"date": format!("2024-05-0{d}"), "pop": 70, "rain": 6, "tempMax": 25}))
        .collect();
    let (_, body) = post(&client, server.url("/advisory"), json!({"forecast": plant})).await;
    assert_eq!(body["action"], json!("plant"));
    assert!(body["text_sw"].as_str().unwrap().contains("kupanda"));

    // 2024-05-07 is a Tuesday.
    let (_, body) = post(
        &client,
        server.url("/advisory"),
        json!({"forecast": [
            {"date": "2024-05-06", "pop": 55, "tempMax": 27},
            {"date": "2024-05-07", "pop": 30, "tempMax": 27},
            {"date": "2024-05-08", "pop": 10, "tempMax": 27}
        ]}),
    )
    .await;
    assert_eq!(body["action"], json!("wait"));
    assert_eq!(body["icon"], json!("umbrella"));
    assert!(body["text_en"].as_str().unwrap().contains("Tuesday"));
}

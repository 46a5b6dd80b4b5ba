//! End-to-end tests for the webhook service.
//!
//! Each test spins up fake WAQI and LINE reply servers plus the real app
//! on random ports, then drives a conversation with signed webhook posts.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use asthma_intake::app;
use asthma_intake::channels::line::{SIGNATURE_HEADER, sign};
use asthma_intake::config::AppConfig;

const SECRET: &str = "integration-secret";

type Sent = Arc<Mutex<Vec<Value>>>;

async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://127.0.0.1:{port}")
}

/// Fake WAQI: returns `aqi` for every city, or an error status if `None`.
async fn start_fake_waqi(aqi: Option<i64>) -> String {
    let app = Router::new().route(
        "/feed/{city}/",
        get(move |Path(_city): Path<String>| async move {
            Json(match aqi {
                Some(v) => serde_json::json!({"status": "ok", "data": {"aqi": v}}),
                None => serde_json::json!({"status": "error", "data": "Unknown station"}),
            })
        }),
    );
    serve(app).await
}

/// Fake LINE reply endpoint recording every request body.
async fn start_fake_line() -> (String, Sent) {
    let sent: Sent = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route(
            "/v2/bot/message/reply",
            post(|State(sent): State<Sent>, Json(body): Json<Value>| async move {
                sent.lock().await.push(body);
                Json(serde_json::json!({}))
            }),
        )
        .with_state(Arc::clone(&sent));
    (serve(app).await, sent)
}

struct Harness {
    base: String,
    sent: Sent,
    http: reqwest::Client,
}

impl Harness {
    async fn start(aqi: Option<i64>) -> Self {
        let waqi = start_fake_waqi(aqi).await;
        let (line, sent) = start_fake_line().await;

        let env: HashMap<&str, String> = HashMap::from([
            ("CHANNEL_ACCESS_TOKEN", "access".to_string()),
            ("CHANNEL_SECRET", SECRET.to_string()),
            ("AQICN_API", "aqi-token".to_string()),
            ("AQICN_BASE_URL", waqi),
            ("LINE_API_BASE_URL", line),
            ("AQICN_TIMEOUT_SECS", "5".to_string()),
        ]);
        let config = AppConfig::from_lookup(|k| env.get(k).cloned()).unwrap();
        let built = app::build(&config).unwrap();
        let base = serve(built.router).await;

        Self {
            base,
            sent,
            http: reqwest::Client::new(),
        }
    }

    async fn say(&self, user_id: &str, text: &str) -> reqwest::StatusCode {
        let body = serde_json::json!({
            "destination": "U0",
            "events": [{
                "type": "message",
                "replyToken": format!("rt-{text}"),
                "source": {"type": "user", "userId": user_id},
                "message": {"type": "text", "id": "1", "text": text}
            }]
        })
        .to_string();
        let sig = sign(SECRET, body.as_bytes());

        self.http
            .post(format!("{}/callback", self.base))
            .header("content-type", "application/json")
            .header(SIGNATURE_HEADER, sig)
            .body(body)
            .send()
            .await
            .unwrap()
            .status()
    }

    async fn last_text(&self) -> String {
        let sent = self.sent.lock().await;
        sent.last().unwrap()["messages"][0]["text"]
            .as_str()
            .unwrap()
            .to_string()
    }

    async fn last_quick_reply_texts(&self) -> Vec<String> {
        let sent = self.sent.lock().await;
        sent.last().unwrap()["messages"][0]["quickReply"]["items"]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|i| i["action"]["text"].as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }

    async fn complete_intake(&self, user_id: &str) {
        for text in [
            "ประเมิน",
            "30",
            "smoker:n",
            "family:y",
            "อาการ:ไอ",
            "symptom:done",
            "เมือง:กรุงเทพ",
        ] {
            assert_eq!(self.say(user_id, text).await, reqwest::StatusCode::OK);
        }
    }
}

#[tokio::test]
async fn full_intake_with_live_aqi() {
    let h = Harness::start(Some(150)).await;
    h.complete_intake("U1").await;

    let report = h.last_text().await;
    assert!(report.contains("อายุ: 30"), "{report}");
    assert!(report.contains("สูบบุหรี่: ไม่ใช่"));
    assert!(report.contains("ครอบครัว: มี"));
    assert!(report.contains("อาการ: ไอ"));
    assert!(report.contains("AQI (กรุงเทพ): 150"));
    // 2 (family) + 1 symptom + 2 (AQI) = 5
    assert!(report.contains("ระดับความเสี่ยง: ปานกลาง"));
    assert_eq!(h.sent.lock().await.len(), 7);

    // Session is gone after the report.
    h.say("U1", "30").await;
    assert!(h.last_text().await.contains("ประเมิน"));
}

#[tokio::test]
async fn aqi_failure_reports_unavailable() {
    let h = Harness::start(None).await;
    h.complete_intake("U1").await;

    let report = h.last_text().await;
    assert!(report.contains("AQI (กรุงเทพ): ไม่สามารถดึงค่าได้"), "{report}");
    // 2 (family) + 1 symptom = 3
    assert!(report.contains("ระดับความเสี่ยง: ปานกลาง"));
}

#[tokio::test]
async fn quick_replies_follow_the_step() {
    let h = Harness::start(Some(20)).await;
    h.say("U1", "ประเมิน").await;
    assert!(h.last_quick_reply_texts().await.is_empty());

    h.say("U1", "30").await;
    assert_eq!(h.last_quick_reply_texts().await, vec!["smoker:y", "smoker:n"]);

    h.say("U1", "nonsense answer").await;
    assert_eq!(h.last_quick_reply_texts().await, vec!["smoker:y", "smoker:n"]);

    h.say("U1", "smoker:y").await;
    assert_eq!(h.last_quick_reply_texts().await, vec!["family:y", "family:n"]);

    h.say("U1", "family:n").await;
    let symptoms = h.last_quick_reply_texts().await;
    assert_eq!(symptoms.len(), 6);
    assert_eq!(symptoms.last().map(String::as_str), Some("symptom:done"));

    h.say("U1", "symptom:done").await;
    assert_eq!(h.last_quick_reply_texts().await.len(), 4);
}

#[tokio::test]
async fn unsigned_request_is_rejected() {
    let h = Harness::start(Some(20)).await;
    let resp = h
        .http
        .post(format!("{}/callback", h.base))
        .header(SIGNATURE_HEADER, "bm9wZQ==")
        .body(r#"{"events": []}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
    assert!(h.sent.lock().await.is_empty());
}

#[tokio::test]
async fn health_counts_sessions() {
    let h = Harness::start(Some(20)).await;
    h.say("U1", "ประเมิน").await;
    h.say("U2", "ประเมิน").await;

    let health: Value = tokio::time::timeout(
        Duration::from_secs(5),
        h.http.get(format!("{}/health", h.base)).send(),
    )
    .await
    .unwrap()
    .unwrap()
    .json()
    .await
    .unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["active_sessions"], 2);
}

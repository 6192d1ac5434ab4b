use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post},
};
use once_cell::sync::Lazy;
use reqwest::Client;
use serde_json::{Value, json};
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));
static BACKEND: Lazy<String> = Lazy::new(spawn_mock_backend);

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        PID.store(pid as i32, Ordering::SeqCst);
        REGISTER.call_once(|| unsafe {
            libc::atexit(on_exit);
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn backend_routes() -> Router {
    Router::new()
        .route(
            "/api/chat",
            post(|Json(body): Json<Value>| async move {
                let message = body["message"].as_str().unwrap_or_default();
                let action = if message.contains("panic") {
                    Some("trigger_panic")
                } else if message.contains("hopeless") {
                    Some("trigger_helpline")
                } else {
                    None
                };
                Json(json!({ "response": "I'm here with you.", "action": action }))
            }),
        )
        .route(
            "/api/request_help",
            post(|Json(body): Json<Value>| async move {
                match body["message"].as_str() {
                    Some("need help") => (StatusCode::OK, Json(json!({ "after_hours": true }))),
                    Some("login") => (StatusCode::UNAUTHORIZED, Json(json!({}))),
                    _ => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({ "error": "Counselor queue is full" })),
                    ),
                }
            }),
        )
        .route("/api/log_stress", post(|| async { Json(json!({ "status": "ok" })) }))
        .route("/api/stress_history", get(|| async { Json(json!([])) }))
        .route(
            "/api/resources",
            get(|| async {
                Json(json!([{
                    "url": "https://example.org/breathing",
                    "category": "anxiety",
                    "type": "video",
                    "title": "Box breathing"
                }]))
            }),
        )
}

/// Runs the mock backend on its own thread so it outlives any single test runtime.
fn spawn_mock_backend() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock backend");
    listener.set_nonblocking(true).expect("nonblocking listener");
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("mock backend runtime");
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).expect("tokio listener");
            axum::serve(listener, backend_routes())
                .await
                .expect("mock backend stopped");
        });
    });
    format!("http://{addr}")
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!(
        "wellness_companion_http_{}_{}.json",
        std::process::id(),
        nanos
    ));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/session")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let data_path = unique_data_path();
    let child = Command::new(env!("CARGO_BIN_EXE_wellness_companion"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", data_path)
        .env("WELLNESS_BACKEND_URL", BACKEND.as_str())
        .env("WELLNESS_USERNAME", "Sam")
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn post_json(client: &Client, url: String, body: Value) -> (StatusCode, Value) {
    let response = client.post(url).json(&body).send().await.unwrap();
    let status = StatusCode::from_u16(response.status().as_u16()).unwrap();
    let text = response.text().await.unwrap();
    let value = serde_json::from_str(&text).unwrap_or(Value::String(text));
    (status, value)
}

async fn session(client: &Client, server: &TestServer) -> Value {
    client
        .get(format!("{}/api/session", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_index_greets_configured_user() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;

    let page = Client::new()
        .get(format!("{}/", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("Hi Sam"));
}

#[tokio::test]
async fn http_triage_after_hours_shows_peer_line() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let url = format!("{}/api/triage", server.base_url);

    post_json(&client, url.clone(), json!({ "type": "open" })).await;
    let (status, body) = post_json(
        &client,
        url.clone(),
        json!({ "type": "answer_safety", "in_danger": false }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["snapshot"]["triage"]["state"]["step"], "form");

    let (status, body) = post_json(
        &client,
        url.clone(),
        json!({ "type": "submit", "severity": "high", "message": "need help" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let triage = &body["snapshot"]["triage"];
    assert_eq!(triage["state"]["step"], "confirmation");
    assert_eq!(triage["confirmation"]["peer_line"]["number"], "123-456-7890");

    post_json(&client, url, json!({ "type": "close" })).await;
}

#[tokio::test]
async fn http_triage_unauthorized_navigates_to_login() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let url = format!("{}/api/triage", server.base_url);

    post_json(&client, url.clone(), json!({ "type": "open" })).await;
    post_json(
        &client,
        url.clone(),
        json!({ "type": "answer_safety", "in_danger": false }),
    )
    .await;
    let (status, body) = post_json(
        &client,
        url,
        json!({ "type": "submit", "severity": "low", "message": "login" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["snapshot"]["triage"]["state"]["step"], "closed");
    let effects = body["effects"].as_array().unwrap();
    assert!(
        effects
            .iter()
            .any(|effect| effect["type"] == "navigate" && effect["path"] == "/login")
    );
}

#[tokio::test]
async fn http_triage_rejects_empty_message() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let url = format!("{}/api/triage", server.base_url);

    post_json(&client, url.clone(), json!({ "type": "open" })).await;
    post_json(
        &client,
        url.clone(),
        json!({ "type": "answer_safety", "in_danger": false }),
    )
    .await;
    let (status, _) = post_json(
        &client,
        url.clone(),
        json!({ "type": "submit", "severity": "medium", "message": "   " }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let snapshot = session(&client, &server).await;
    assert_eq!(snapshot["triage"]["state"]["step"], "form");
    post_json(&client, url, json!({ "type": "close" })).await;
}

#[tokio::test]
async fn http_stress_check_routes_high_intensity_to_crisis() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let url = format!("{}/api/stress-check", server.base_url);

    post_json(&client, url.clone(), json!({ "type": "start" })).await;
    post_json(
        &client,
        url.clone(),
        json!({ "type": "select_source", "source": "exam_deadline" }),
    )
    .await;
    post_json(
        &client,
        url.clone(),
        json!({ "type": "set_intensity", "intensity": 8 }),
    )
    .await;
    let (status, body) = post_json(&client, url.clone(), json!({ "type": "confirm_intensity" })).await;

    assert_eq!(status, StatusCode::OK);
    let check = &body["snapshot"]["stress_check"];
    assert_eq!(check["state"]["step"], "crisis");
    assert_eq!(check["band"], "severe");

    let (status, _) = post_json(&client, url.clone(), json!({ "type": "select_time", "minutes": 5 })).await;
    assert_eq!(status, StatusCode::CONFLICT);

    post_json(&client, url, json!({ "type": "cancel" })).await;
}

#[tokio::test]
async fn http_stress_check_five_minutes_prefills_chat() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let url = format!("{}/api/stress-check", server.base_url);

    post_json(&client, url.clone(), json!({ "type": "start" })).await;
    post_json(
        &client,
        url.clone(),
        json!({ "type": "select_source", "source": "sleep" }),
    )
    .await;
    post_json(&client, url.clone(), json!({ "type": "confirm_intensity" })).await;
    let (status, body) = post_json(&client, url, json!({ "type": "select_time", "minutes": 5 })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["snapshot"]["stress_check"]["state"]["step"], "closed");
    assert_eq!(
        body["effects"][0]["text"],
        "I'm feeling stressed about Sleep (Level 5). Can we talk for 5 minutes?"
    );
}

#[tokio::test]
async fn http_chat_panic_action_shows_breathing_overlay() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let (status, body) = post_json(
        &client,
        format!("{}/api/chat", server.base_url),
        json!({ "message": "I think I'm having a panic attack" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let transcript = body["snapshot"]["chat"]["transcript"].as_array().unwrap();
    assert_eq!(transcript.last().unwrap()["text"], "I'm here with you.");

    let overlay = &body["snapshot"]["escalation"]["overlay"];
    assert_eq!(overlay["visible"], true);
    assert_eq!(overlay["phase"]["phase"], "inhale");

    let (_, body) = post_json(
        &client,
        format!("{}/api/escalation/panic/close", server.base_url),
        json!({}),
    )
    .await;
    assert_eq!(body["snapshot"]["escalation"]["overlay"]["visible"], false);
}

#[tokio::test]
async fn http_helpline_banner_is_cleared_with_chat() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let (status, body) = post_json(
        &client,
        format!("{}/api/chat", server.base_url),
        json!({ "message": "everything feels hopeless" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let escalation = &body["snapshot"]["escalation"];
    assert_eq!(escalation["banner"]["call_href"], "tel:988");
    assert_eq!(escalation["helpline_modal_open"], true);

    let (_, body) = post_json(
        &client,
        format!("{}/api/escalation/request-counselor", server.base_url),
        json!({}),
    )
    .await;
    assert_eq!(body["snapshot"]["triage"]["state"]["step"], "safety_check");

    post_json(
        &client,
        format!("{}/api/escalation/helpline/close", server.base_url),
        json!({}),
    )
    .await;
    post_json(
        &client,
        format!("{}/api/triage", server.base_url),
        json!({ "type": "close" }),
    )
    .await;

    let (status, body) = post_json(
        &client,
        format!("{}/api/chat/clear", server.base_url),
        json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["snapshot"]["escalation"]["banner"].is_null());
    assert!(body["snapshot"]["chat"]["transcript"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn http_water_without_droplets_conflicts() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let water = format!("{}/api/progress/water", server.base_url);

    let droplets = session(&client, &server).await["progress"]["droplets"]
        .as_u64()
        .unwrap();
    for _ in 0..droplets {
        let (status, _) = post_json(&client, water.clone(), json!({})).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, _) = post_json(&client, water.clone(), json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = post_json(
        &client,
        format!("{}/api/progress/tasks/walk", server.base_url),
        json!({ "completed": true, "points": 3 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["snapshot"]["progress"]["droplets"], 3);

    let (status, _) = post_json(&client, water, json!({})).await;
    assert_eq!(status, StatusCode::OK);

    post_json(
        &client,
        format!("{}/api/progress/tasks/walk", server.base_url),
        json!({ "completed": false, "points": 3 }),
    )
    .await;
}

#[tokio::test]
async fn http_sleep_calculator_validates_wake_time() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let ok = client
        .get(format!("{}/api/tools/sleep?wake=07:00", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(ok.status().is_success());
    let bedtimes: Value = ok.json().await.unwrap();
    assert_eq!(bedtimes.as_array().unwrap().len(), 3);

    let bad = client
        .get(format!("{}/api/tools/sleep?wake=25:99", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(bad.status().as_u16(), 400);
}

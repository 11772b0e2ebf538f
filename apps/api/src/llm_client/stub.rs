//! Scripted local chat-completions endpoint used by client and scorer tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{extract::State, http::HeaderMap, http::StatusCode, routing::post, Router};
use serde_json::{json, Value};

#[derive(Default)]
struct Recorded {
    hits: usize,
    bodies: Vec<Value>,
    auth_headers: Vec<String>,
}

#[derive(Clone)]
struct StubState {
    script: Arc<Vec<(u16, String)>>,
    delay: Duration,
    recorded: Arc<Mutex<Recorded>>,
}

/// Replies with the scripted `(status, body)` pairs in order, repeating the
/// last one once the script runs out.
pub(crate) struct StubServer {
    addr: SocketAddr,
    recorded: Arc<Mutex<Recorded>>,
}

impl StubServer {
    pub(crate) async fn start(script: Vec<(u16, String)>) -> Self {
        Self::start_delayed(script, Duration::ZERO).await
    }

    /// Like `start`, but holds every reply for `delay` after recording the hit.
    pub(crate) async fn start_delayed(script: Vec<(u16, String)>, delay: Duration) -> Self {
        let recorded = Arc::new(Mutex::new(Recorded::default()));
        let state = StubState {
            script: Arc::new(script),
            delay,
            recorded: Arc::clone(&recorded),
        };
        let app = Router::new()
            .route("/chat/completions", post(reply))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, recorded }
    }

    pub(crate) fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub(crate) fn hits(&self) -> usize {
        self.recorded.lock().unwrap().hits
    }

    pub(crate) fn bodies(&self) -> Vec<Value> {
        self.recorded.lock().unwrap().bodies.clone()
    }

    pub(crate) fn auth_headers(&self) -> Vec<String> {
        self.recorded.lock().unwrap().auth_headers.clone()
    }
}

async fn reply(
    State(state): State<StubState>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    let index = {
        let mut recorded = state.recorded.lock().unwrap();
        let index = recorded.hits;
        recorded.hits += 1;
        recorded
            .bodies
            .push(serde_json::from_str(&body).unwrap_or(Value::Null));
        if let Some(auth) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
            recorded.auth_headers.push(auth.to_string());
        }
        index
    };
    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }

    let (status, body) = state
        .script
        .get(index)
        .or_else(|| state.script.last())
        .cloned()
        .unwrap_or((500, String::new()));
    (StatusCode::from_u16(status).unwrap(), body)
}

/// Wraps `content` in a minimal chat-completions success envelope.
pub(crate) fn chat_body(content: &str) -> String {
    json!({
        "choices": [{ "message": { "role": "assistant", "content": content } }],
        "usage": { "prompt_tokens": 10, "completion_tokens": 5 }
    })
    .to_string()
}

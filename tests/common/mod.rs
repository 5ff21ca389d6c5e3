#![allow(dead_code)]
//! In-process mock coordinator for integration tests.
//!
//! Statement-protocol requests (the initial POST and every continuation GET)
//! are answered from a scripted queue, one step per request, so each test
//! spells out the exact response sequence it exercises. Introspection
//! endpoints serve fixed responses configured per test.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use serde_json::Value;

/// One scripted answer to a statement-protocol request.
pub enum Step {
    /// 200 with this JSON body.
    Json(Value),
    /// Raw status with an optional text body.
    Status(u16, Option<String>),
    /// 302 redirect to the given location.
    Redirect(String),
    /// Respond after the delay.
    Delayed(Duration, Box<Step>),
}

struct Fixed {
    code: u16,
    body: String,
}

struct MockState {
    steps: Mutex<VecDeque<Step>>,
    statement_headers: Mutex<Option<HeaderMap>>,
    info: Mutex<Fixed>,
    nodes: Mutex<Fixed>,
    kill_status: Mutex<u16>,
    kill_delay: Mutex<Duration>,
    cancel_status: Mutex<u16>,
    statement_requests: AtomicUsize,
    cancels: AtomicUsize,
    kills: AtomicUsize,
    info_requests: AtomicUsize,
}

/// Handle to one running mock coordinator, bound to an ephemeral port.
pub struct MockCoordinator {
    pub host: String,
    pub port: u16,
    state: Arc<MockState>,
}

impl MockCoordinator {
    pub async fn start() -> Self {
        let state = Arc::new(MockState {
            steps: Mutex::new(VecDeque::new()),
            statement_headers: Mutex::new(None),
            info: Mutex::new(Fixed {
                code: 404,
                body: String::new(),
            }),
            nodes: Mutex::new(Fixed {
                code: 200,
                body: "[]".to_string(),
            }),
            kill_status: Mutex::new(204),
            kill_delay: Mutex::new(Duration::ZERO),
            cancel_status: Mutex::new(204),
            statement_requests: AtomicUsize::new(0),
            cancels: AtomicUsize::new(0),
            kills: AtomicUsize::new(0),
            info_requests: AtomicUsize::new(0),
        });

        let app = Router::new()
            .route("/v1/statement", axum::routing::post(post_statement))
            .route(
                "/v1/statement/{id}/{seq}",
                get(next_step).delete(delete_statement),
            )
            .route("/v1/query/{id}", get(get_query).delete(delete_query))
            .route("/v1/node", get(get_nodes))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock coordinator");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve mock");
        });

        Self {
            host: addr.ip().to_string(),
            port: addr.port(),
            state,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    pub fn next_uri(&self, id: &str, seq: u32) -> String {
        format!("{}/v1/statement/{}/{}", self.base_url(), id, seq)
    }

    pub fn info_uri(&self, id: &str) -> String {
        format!("{}/v1/query/{}", self.base_url(), id)
    }

    /// Append one step to the statement-protocol script.
    pub fn push(&self, step: Step) {
        self.state.steps.lock().unwrap().push_back(step);
    }

    /// Configure the `GET /v1/query/{id}` response.
    pub fn set_info(&self, code: u16, body: Value) {
        *self.state.info.lock().unwrap() = Fixed {
            code,
            body: body.to_string(),
        };
    }

    pub fn set_info_text(&self, code: u16, body: &str) {
        *self.state.info.lock().unwrap() = Fixed {
            code,
            body: body.to_string(),
        };
    }

    /// Configure the `GET /v1/node` response.
    pub fn set_nodes(&self, code: u16, body: &str) {
        *self.state.nodes.lock().unwrap() = Fixed {
            code,
            body: body.to_string(),
        };
    }

    pub fn set_kill_status(&self, code: u16) {
        *self.state.kill_status.lock().unwrap() = code;
    }

    /// Delay `DELETE /v1/query/{id}` responses, simulating an unresponsive
    /// coordinator. The kill counter increments only once the delay elapses.
    pub fn set_kill_delay(&self, delay: Duration) {
        *self.state.kill_delay.lock().unwrap() = delay;
    }

    pub fn set_cancel_status(&self, code: u16) {
        *self.state.cancel_status.lock().unwrap() = code;
    }

    /// Headers of the most recent `POST /v1/statement`.
    pub fn statement_header(&self, name: &str) -> Option<String> {
        self.state
            .statement_headers
            .lock()
            .unwrap()
            .as_ref()
            .and_then(|headers| headers.get(name))
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string())
    }

    pub fn statement_requests(&self) -> usize {
        self.state.statement_requests.load(Ordering::SeqCst)
    }

    pub fn cancels(&self) -> usize {
        self.state.cancels.load(Ordering::SeqCst)
    }

    pub fn kills(&self) -> usize {
        self.state.kills.load(Ordering::SeqCst)
    }

    pub fn info_requests(&self) -> usize {
        self.state.info_requests.load(Ordering::SeqCst)
    }
}

async fn post_statement(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.statement_requests.fetch_add(1, Ordering::SeqCst);
    *state.statement_headers.lock().unwrap() = Some(headers);
    serve_next(&state).await
}

async fn next_step(State(state): State<Arc<MockState>>) -> Response {
    serve_next(&state).await
}

async fn delete_statement(State(state): State<Arc<MockState>>) -> Response {
    state.cancels.fetch_add(1, Ordering::SeqCst);
    let code = *state.cancel_status.lock().unwrap();
    status_response(code, String::new())
}

async fn get_query(State(state): State<Arc<MockState>>) -> Response {
    state.info_requests.fetch_add(1, Ordering::SeqCst);
    let fixed = state.info.lock().unwrap();
    status_response(fixed.code, fixed.body.clone())
}

async fn delete_query(State(state): State<Arc<MockState>>) -> Response {
    let delay = *state.kill_delay.lock().unwrap();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    state.kills.fetch_add(1, Ordering::SeqCst);
    let code = *state.kill_status.lock().unwrap();
    status_response(code, String::new())
}

async fn get_nodes(State(state): State<Arc<MockState>>) -> Response {
    let fixed = state.nodes.lock().unwrap();
    status_response(fixed.code, fixed.body.clone())
}

async fn serve_next(state: &MockState) -> Response {
    let mut step = match state.steps.lock().unwrap().pop_front() {
        Some(step) => step,
        None => {
            return status_response(500, "mock coordinator script exhausted".to_string());
        }
    };
    loop {
        match step {
            Step::Delayed(delay, inner) => {
                tokio::time::sleep(delay).await;
                step = *inner;
            }
            Step::Json(body) => return Json(body).into_response(),
            Step::Status(code, body) => {
                return status_response(code, body.unwrap_or_default());
            }
            Step::Redirect(location) => {
                return (StatusCode::FOUND, [(header::LOCATION, location)]).into_response();
            }
        }
    }
}

fn status_response(code: u16, body: String) -> Response {
    let status = StatusCode::from_u16(code).expect("valid status code");
    (status, body).into_response()
}

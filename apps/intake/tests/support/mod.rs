//! Fake intake backend served by axum on an ephemeral port.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode, Uri},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use intake::progress::{ProgressDisplay, ProgressView};
use intake::render::ResultPanel;
use intake::{HttpIntakeClient, Mode};
use reqwest::Url;

pub const FAST_POLL: Duration = Duration::from_millis(20);

#[derive(Debug, Clone)]
pub struct ReceivedFile {
    pub field: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct Recorded {
    pub fields: HashMap<String, String>,
    pub file: Option<ReceivedFile>,
    pub submit_paths: Vec<String>,
    pub progress_paths: Vec<String>,
}

struct Script {
    submit: (StatusCode, String),
    progress: VecDeque<(StatusCode, String)>,
}

#[derive(Clone)]
pub struct FakeBackend {
    script: Arc<Mutex<Script>>,
    recorded: Arc<Mutex<Recorded>>,
}

impl FakeBackend {
    pub fn new(submit_status: StatusCode, submit_body: &str) -> Self {
        Self {
            script: Arc::new(Mutex::new(Script {
                submit: (submit_status, submit_body.to_string()),
                progress: VecDeque::new(),
            })),
            recorded: Arc::new(Mutex::new(Recorded::default())),
        }
    }

    /// Queues a raw progress response body.
    pub fn then_progress(self, status: StatusCode, body: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .progress
            .push_back((status, body.to_string()));
        self
    }

    pub fn recorded(&self) -> std::sync::MutexGuard<'_, Recorded> {
        self.recorded.lock().unwrap()
    }

    /// Serves the fake and returns its base URL.
    pub async fn spawn(&self) -> Url {
        let app = Router::new()
            .route("/submit", post(handle_submit))
            .route("/sandbox-submit", post(handle_submit))
            .route("/progress/:session_id", get(handle_progress))
            .route("/sandbox-progress/:session_id", get(handle_progress))
            .with_state(self.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr: SocketAddr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Url::parse(&format!("http://{addr}")).unwrap()
    }
}

async fn handle_submit(
    State(backend): State<FakeBackend>,
    uri: Uri,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut fields = HashMap::new();
    let mut file = None;

    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.unwrap().to_vec();
                file = Some(ReceivedFile {
                    field: name,
                    file_name,
                    content_type,
                    bytes,
                });
            }
            None => {
                let value = field.text().await.unwrap();
                fields.insert(name, value);
            }
        }
    }

    {
        let mut recorded = backend.recorded.lock().unwrap();
        recorded.fields = fields;
        recorded.file = file;
        recorded.submit_paths.push(uri.path().to_string());
    }

    let (status, body) = backend.script.lock().unwrap().submit.clone();
    (status, [(header::CONTENT_TYPE, "application/json")], body)
}

async fn handle_progress(
    State(backend): State<FakeBackend>,
    Path(_session_id): Path<String>,
    uri: Uri,
) -> impl IntoResponse {
    backend
        .recorded
        .lock()
        .unwrap()
        .progress_paths
        .push(uri.path().to_string());

    let (status, body) = backend
        .script
        .lock()
        .unwrap()
        .progress
        .pop_front()
        .unwrap_or((StatusCode::OK, r#"{"status":"processing"}"#.to_string()));
    (status, [(header::CONTENT_TYPE, "application/json")], body)
}

pub fn client(base_url: Url, mode: Mode) -> HttpIntakeClient {
    HttpIntakeClient::new(base_url, mode, Duration::from_secs(5)).unwrap()
}

#[derive(Default)]
pub struct RecordingView {
    pub progress: Vec<ProgressDisplay>,
    pub results: Vec<ResultPanel>,
}

impl ProgressView for RecordingView {
    fn show_progress(&mut self, display: &ProgressDisplay) {
        self.progress.push(display.clone());
    }

    fn show_result(&mut self, panel: &ResultPanel) {
        self.results.push(panel.clone());
    }
}

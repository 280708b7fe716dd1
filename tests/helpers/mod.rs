use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use turnstile::authz::errors::AuthzError;
use turnstile::authz::snapshot::{PermissionSource, SnapshotPayload, SnapshotStore};
use turnstile::authz::Catalog;
use turnstile::settings::Settings;
use turnstile::web::{router, AppState};

/// Permission source that replays a scripted sequence of responses and
/// counts how often it was called. Once the script runs out it keeps
/// serving the last payload.
pub struct ScriptedSource {
    responses: Mutex<VecDeque<Result<SnapshotPayload, AuthzError>>>,
    last: Mutex<SnapshotPayload>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            last: Mutex::new(SnapshotPayload::default()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn push_ok(self, permissions: &[&str], role_id: Option<&str>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(payload(permissions, role_id)));
        self
    }

    pub fn push_err(self) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(AuthzError::MalformedPayload("scripted failure".into())));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PermissionSource for ScriptedSource {
    async fn fetch(&self) -> Result<SnapshotPayload, AuthzError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(p)) => {
                *self.last.lock().unwrap() = p.clone();
                Ok(p)
            }
            Some(Err(e)) => Err(e),
            None => Ok(self.last.lock().unwrap().clone()),
        }
    }
}

pub fn payload(permissions: &[&str], role_id: Option<&str>) -> SnapshotPayload {
    SnapshotPayload {
        permissions: permissions.iter().map(|s| s.to_string()).collect(),
        role_id: role_id.map(str::to_string),
    }
}

/// Bind the real router on an ephemeral port and return its base URL.
pub async fn spawn_app(source: Arc<ScriptedSource>) -> String {
    let state = AppState {
        settings: Arc::new(Settings::default()),
        catalog: Arc::new(Catalog::builtin()),
        store: Arc::new(SnapshotStore::new(source)),
    };
    let app = router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server error");
    });
    format!("http://{addr}")
}

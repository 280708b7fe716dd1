//! The cached effective-permission snapshot and its lifecycle.
//!
//! One snapshot per subject, replaced wholesale and never patched: readers
//! holding the old `Arc` keep a consistent view until they next look. The
//! store broadcasts replacements over a watch channel so guards can
//! re-check when the snapshot changes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::authz::errors::AuthzError;
use crate::authz::evaluator::PermissionSet;

/// Wire shape of the permission-fetch collaborator's response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotPayload {
    pub permissions: Vec<String>,
    #[serde(default)]
    pub role_id: Option<String>,
}

/// An immutable point-in-time view of a subject's effective permissions.
#[derive(Debug, Clone)]
pub struct PermissionSnapshot {
    pub permissions: PermissionSet,
    pub role_id: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

impl PermissionSnapshot {
    pub fn from_parts(permissions: Vec<String>, role_id: Option<String>) -> Self {
        Self {
            permissions: permissions.into(),
            role_id,
            fetched_at: Utc::now(),
        }
    }

    pub fn from_payload(payload: SnapshotPayload) -> Self {
        Self::from_parts(payload.permissions, payload.role_id)
    }

    /// Zero permissions. Installed when the collaborator fails: unknown
    /// means denied, never undetermined.
    pub fn empty() -> Self {
        Self::from_parts(Vec::new(), None)
    }
}

/// Pending means no fetch has resolved yet; render guards treat it as
/// not-yet-authorized rather than forbidden-then-flashed.
#[derive(Debug, Clone)]
pub enum SnapshotState {
    Pending,
    Ready(Arc<PermissionSnapshot>),
}

impl SnapshotState {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn permissions(&self) -> Option<&PermissionSet> {
        match self {
            Self::Pending => None,
            Self::Ready(snap) => Some(&snap.permissions),
        }
    }
}

/// The permission-fetch collaborator seam.
#[async_trait]
pub trait PermissionSource: Send + Sync {
    async fn fetch(&self) -> Result<SnapshotPayload, AuthzError>;
}

/// Fetches the current subject's effective permissions from the backend API.
pub struct HttpPermissionSource {
    client: reqwest::Client,
    url: String,
}

impl HttpPermissionSource {
    pub fn new(base_url: &str, path: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: format!("{}{}", base_url.trim_end_matches('/'), path),
        }
    }
}

#[async_trait]
impl PermissionSource for HttpPermissionSource {
    async fn fetch(&self) -> Result<SnapshotPayload, AuthzError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|source| AuthzError::SnapshotFetch {
                url: self.url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthzError::UpstreamStatus {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        response
            .json::<SnapshotPayload>()
            .await
            .map_err(|e| AuthzError::MalformedPayload(e.to_string()))
    }
}

/// Why the cached snapshot is being discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidationReason {
    /// Login succeeded: fetch the new subject's permissions.
    Login,
    /// Logout: drop the snapshot, nothing to fetch.
    Logout,
    /// A downstream request came back 403 while the cache said yes: the
    /// snapshot is stale, re-sync it.
    Forbidden,
}

/// Holds the current [`SnapshotState`] and coordinates its replacement.
pub struct SnapshotStore {
    source: Arc<dyn PermissionSource>,
    tx: watch::Sender<SnapshotState>,
    refetching: AtomicBool,
}

impl SnapshotStore {
    pub fn new(source: Arc<dyn PermissionSource>) -> Self {
        let (tx, _rx) = watch::channel(SnapshotState::Pending);
        Self {
            source,
            tx,
            refetching: AtomicBool::new(false),
        }
    }

    pub fn current(&self) -> SnapshotState {
        self.tx.borrow().clone()
    }

    /// Observe snapshot replacements. The receiver always sees the latest
    /// state, not an event backlog.
    pub fn subscribe(&self) -> watch::Receiver<SnapshotState> {
        self.tx.subscribe()
    }

    /// Fetch and install a fresh snapshot. A collaborator failure installs
    /// an empty snapshot instead of propagating: fail closed.
    pub async fn refresh(&self) -> SnapshotState {
        let snapshot = match self.source.fetch().await {
            Ok(payload) => {
                let snap = PermissionSnapshot::from_payload(payload);
                tracing::debug!(
                    permissions = snap.permissions.len(),
                    role_id = ?snap.role_id,
                    "installed fresh permission snapshot"
                );
                snap
            }
            Err(error) => {
                tracing::warn!(%error, "permission fetch failed, installing empty snapshot");
                PermissionSnapshot::empty()
            }
        };
        let state = SnapshotState::Ready(Arc::new(snapshot));
        self.tx.send_replace(state.clone());
        state
    }

    /// The current snapshot, fetching once if none has resolved yet.
    pub async fn ensure(&self) -> SnapshotState {
        let current = self.current();
        if current.is_pending() {
            self.refresh().await
        } else {
            current
        }
    }

    pub async fn invalidate(&self, reason: InvalidationReason) {
        match reason {
            InvalidationReason::Logout => {
                tracing::debug!("dropping permission snapshot on logout");
                self.tx.send_replace(SnapshotState::Pending);
            }
            InvalidationReason::Login => {
                self.refresh().await;
            }
            InvalidationReason::Forbidden => {
                // Coalesce a burst of 403s into a single re-sync.
                if self
                    .refetching
                    .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                    .is_ok()
                {
                    self.refresh().await;
                    self.refetching.store(false, Ordering::SeqCst);
                } else {
                    tracing::debug!("permission re-sync already in flight, coalescing");
                }
            }
        }
    }
}

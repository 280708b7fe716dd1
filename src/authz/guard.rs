//! Route and render guards.
//!
//! A guard translates an evaluator answer into a control-flow decision:
//! abort navigation with a redirect, or render/hide a piece of UI. Guards
//! are stateless — every navigation attempt re-runs the full check against
//! the snapshot current at that moment.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::authz::errors::AuthzError;
use crate::authz::evaluator::{
    has_all_permissions, has_any_permission, has_permission, PermissionSet,
};
use crate::authz::snapshot::SnapshotState;

/// What a guarded route demands of the subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    Single(String),
    Any(Vec<String>),
    All(Vec<String>),
}

impl Requirement {
    /// Build from the wire form: a mode string plus a permission list.
    pub fn from_parts(mode: &str, require: Vec<String>) -> Result<Self, AuthzError> {
        match mode {
            "single" => {
                let count = require.len();
                let mut it = require.into_iter();
                match (it.next(), it.next()) {
                    (Some(p), None) => Ok(Self::Single(p)),
                    _ => Err(AuthzError::InvalidRequirement(format!(
                        "mode `single` takes exactly one permission, got {count}"
                    ))),
                }
            }
            "any" => Ok(Self::Any(require)),
            "all" => Ok(Self::All(require)),
            other => Err(AuthzError::InvalidRequirement(format!(
                "unknown mode `{other}` (expected `single`, `any`, or `all`)"
            ))),
        }
    }

    /// Empty `Any` never grants; empty `All` always does.
    pub fn satisfied_by(&self, granted: &PermissionSet) -> bool {
        match self {
            Self::Single(p) => has_permission(p, granted),
            Self::Any(ps) => has_any_permission(ps, granted),
            Self::All(ps) => has_all_permissions(ps, granted),
        }
    }
}

/// Outcome of one guard evaluation. Terminal per navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Unauthenticated,
    Unauthorized,
    Authorized,
}

pub fn evaluate_guard(
    is_authenticated: bool,
    granted: &PermissionSet,
    requirement: &Requirement,
) -> GuardState {
    if !is_authenticated {
        return GuardState::Unauthenticated;
    }
    if requirement.satisfied_by(granted) {
        GuardState::Authorized
    } else {
        GuardState::Unauthorized
    }
}

/// Redirect targets the router collaborator supplies.
#[derive(Debug, Clone)]
pub struct RouteTargets {
    pub login_path: String,
    pub default_redirect: String,
}

impl Default for RouteTargets {
    fn default() -> Self {
        Self {
            login_path: "/login".to_string(),
            default_redirect: "/".to_string(),
        }
    }
}

/// The navigation instruction handed to the router.
///
/// An unauthenticated visitor is sent to login with the attempted path
/// preserved in the `redirect` search parameter; an authenticated but
/// unauthorized one is sent to the default landing route with no return
/// memory — there is nothing for them to come back to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum RouteVerdict {
    Proceed,
    RedirectToLogin { location: String },
    RedirectToDefault { location: String },
}

pub fn route_verdict(state: GuardState, attempted_path: &str, targets: &RouteTargets) -> RouteVerdict {
    match state {
        GuardState::Authorized => RouteVerdict::Proceed,
        GuardState::Unauthenticated => RouteVerdict::RedirectToLogin {
            location: format!(
                "{}?redirect={}",
                targets.login_path,
                urlencoding::encode(attempted_path)
            ),
        },
        GuardState::Unauthorized => RouteVerdict::RedirectToDefault {
            location: targets.default_redirect.clone(),
        },
    }
}

/// Render-or-not decision for conditional UI. Strictly advisory: the
/// backend re-validates every mutation regardless.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderDecision {
    Render,
    Fallback,
}

/// A pending snapshot renders the fallback — never a flash of content the
/// loaded permissions would forbid.
pub fn render_decision(
    snapshot: &SnapshotState,
    is_authenticated: bool,
    requirement: &Requirement,
) -> RenderDecision {
    if !is_authenticated {
        return RenderDecision::Fallback;
    }
    match snapshot {
        SnapshotState::Pending => RenderDecision::Fallback,
        SnapshotState::Ready(snap) => {
            if requirement.satisfied_by(&snap.permissions) {
                RenderDecision::Render
            } else {
                RenderDecision::Fallback
            }
        }
    }
}

/// Associates guard checks with navigation attempts so a superseded
/// attempt's verdict is discarded instead of applying a stale redirect.
#[derive(Debug, Default)]
pub struct NavigationTracker {
    current: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationAttempt {
    id: u64,
}

impl NavigationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new attempt, superseding any attempt still in flight.
    pub fn begin(&self) -> NavigationAttempt {
        let id = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        NavigationAttempt { id }
    }

    pub fn is_current(&self, attempt: &NavigationAttempt) -> bool {
        self.current.load(Ordering::SeqCst) == attempt.id
    }

    /// Apply a verdict only if its attempt has not been superseded.
    pub fn commit(&self, attempt: &NavigationAttempt, verdict: RouteVerdict) -> Option<RouteVerdict> {
        self.is_current(attempt).then_some(verdict)
    }
}

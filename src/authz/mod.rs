//! Role-based permission model: the catalog of `resource:action`
//! identifiers, wildcard-aware evaluation, effective-set aggregation, the
//! editing state machine, and the guard primitives built on top.
//!
//! Everything here is advisory from the backend's point of view: the API
//! re-validates every mutating request, so hiding UI or aborting navigation
//! is convenience, not the security boundary.

pub mod aggregate;
pub mod catalog;
pub mod errors;
pub mod evaluator;
pub mod guard;
pub mod selection;
pub mod snapshot;

pub use catalog::{Catalog, PermissionDef, Role};
pub use errors::AuthzError;
pub use evaluator::{
    has_all_permissions, has_any_permission, has_permission, PermissionSet, GLOBAL_WILDCARD,
    WILDCARD_ACTION,
};
pub use guard::{
    evaluate_guard, render_decision, route_verdict, GuardState, NavigationTracker, RenderDecision,
    Requirement, RouteTargets, RouteVerdict,
};
pub use snapshot::{
    HttpPermissionSource, InvalidationReason, PermissionSnapshot, PermissionSource,
    SnapshotPayload, SnapshotState, SnapshotStore,
};

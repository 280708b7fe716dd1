//! Combining role-derived and directly-granted permissions.
//!
//! Direct grants are additive only: there is no revoke semantics, so the
//! effective set is a plain union. Normalization is an optional physical
//! cleanup — evaluation treats a normalized and an unnormalized set as
//! equivalent.

use std::collections::HashSet;

use crate::authz::evaluator::{resource_of, PermissionSet, GLOBAL_WILDCARD, WILDCARD_ACTION};

/// The set actually evaluated for a subject: union of the role's
/// permissions and the subject's direct grants.
pub fn effective_permissions(role: &PermissionSet, direct: &PermissionSet) -> PermissionSet {
    role.union(direct)
}

/// Drop individual-action entries for any resource whose `resource:*` or
/// `resource:all` wildcard is held. Wildcard entries themselves and the
/// global `*` are always kept.
///
/// Purely a storage-size reduction: [`crate::authz::evaluator::has_permission`]
/// answers identically before and after.
pub fn normalize(set: &PermissionSet) -> PermissionSet {
    let wildcarded: HashSet<&str> = set
        .iter()
        .filter_map(|p| {
            p.split_once(':')
                .filter(|(_, action)| *action == "*" || *action == WILDCARD_ACTION)
                .map(|(resource, _)| resource)
        })
        .collect();

    set.iter()
        .filter(|p| {
            if p.as_str() == GLOBAL_WILDCARD {
                return true;
            }
            if let Some((_, action)) = p.split_once(':') {
                if action == "*" || action == WILDCARD_ACTION {
                    return true;
                }
            }
            !wildcarded.contains(resource_of(p))
        })
        .cloned()
        .collect()
}

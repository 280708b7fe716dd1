//! Wildcard-aware permission checks.
//!
//! All checks operate on plain `"resource:action"` strings against an
//! immutable [`PermissionSet`] snapshot. Evaluation is pure: no I/O, no
//! errors, no panics — a malformed query string degrades to matching the
//! whole string as the resource.

use std::collections::HashSet;

/// Grants every permission the system knows about.
pub const GLOBAL_WILDCARD: &str = "*";

/// The catalog's concrete "every action on this resource" action. Entries
/// like `users:all` grant the same as the synthetic `users:*` wildcard.
pub const WILDCARD_ACTION: &str = "all";

/// An unordered set of granted permission strings for one subject.
///
/// Duplicates are inert and insertion order is irrelevant. A set is built
/// fresh from each snapshot fetch and never patched in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet(HashSet<String>);

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, permission: &str) -> bool {
        self.0.contains(permission)
    }

    pub fn insert(&mut self, permission: impl Into<String>) {
        self.0.insert(permission.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    pub fn union(&self, other: &PermissionSet) -> PermissionSet {
        Self(self.0.union(&other.0).cloned().collect())
    }

    /// Sorted copy, for deterministic wire responses and assertions.
    pub fn sorted(&self) -> Vec<String> {
        let mut v: Vec<String> = self.0.iter().cloned().collect();
        v.sort();
        v
    }
}

impl FromIterator<String> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> FromIterator<&'a str> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self(iter.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for PermissionSet {
    fn from(v: Vec<String>) -> Self {
        v.into_iter().collect()
    }
}

/// The resource prefix of a permission string. A string with no `:` is
/// treated as a bare resource with an empty action.
pub(crate) fn resource_of(permission: &str) -> &str {
    permission
        .split_once(':')
        .map(|(resource, _)| resource)
        .unwrap_or(permission)
}

/// Check one `"resource:action"` query against a granted set.
///
/// Match order, short-circuiting on the first hit: exact membership, the
/// global `*` wildcard, the `resource:*` wildcard, then the catalog's
/// `resource:all` entry (which grants identically to the wildcard).
pub fn has_permission(permission: &str, granted: &PermissionSet) -> bool {
    if granted.contains(permission) {
        return true;
    }
    if granted.contains(GLOBAL_WILDCARD) {
        return true;
    }
    let resource = resource_of(permission);
    if granted.contains(&format!("{resource}:*")) {
        return true;
    }
    granted.contains(&format!("{resource}:{WILDCARD_ACTION}"))
}

/// True iff at least one of `required` is granted.
///
/// An empty `required` list never authorizes — "grant if any of nothing"
/// is a non-grant, the fail-closed complement of [`has_all_permissions`].
pub fn has_any_permission<S: AsRef<str>>(required: &[S], granted: &PermissionSet) -> bool {
    required.iter().any(|p| has_permission(p.as_ref(), granted))
}

/// True iff every element of `required` is granted.
///
/// An empty `required` list is vacuously satisfied: "require nothing"
/// always passes.
pub fn has_all_permissions<S: AsRef<str>>(required: &[S], granted: &PermissionSet) -> bool {
    required.iter().all(|p| has_permission(p.as_ref(), granted))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(perms: &[&str]) -> PermissionSet {
        perms.iter().copied().collect()
    }

    #[test]
    fn test_exact_match() {
        let granted = set(&["users:read", "teams:create"]);
        assert!(has_permission("users:read", &granted));
        assert!(has_permission("teams:create", &granted));
        assert!(!has_permission("users:create", &granted));
    }

    #[test]
    fn test_global_wildcard_grants_everything() {
        let granted = set(&["*"]);
        assert!(has_permission("users:read", &granted));
        assert!(has_permission("teams:delete", &granted));
        assert!(has_permission("anything:at-all", &granted));
        assert!(has_permission("not-even-a-pair", &granted));
    }

    #[test]
    fn test_resource_wildcard_no_cross_resource_leakage() {
        let granted = set(&["teams:*"]);
        assert!(has_permission("teams:create", &granted));
        assert!(has_permission("teams:delete", &granted));
        assert!(!has_permission("users:create", &granted));
    }

    #[test]
    fn test_all_action_grants_like_wildcard() {
        let granted = set(&["users:all"]);
        assert!(has_permission("users:read", &granted));
        assert!(has_permission("users:delete", &granted));
        assert!(!has_permission("teams:read", &granted));
    }

    #[test]
    fn test_no_accidental_wildcard_inference() {
        // Without "*", "x:*", or "x:all" the check is pure membership.
        let granted = set(&["x:y", "other:z"]);
        assert!(has_permission("x:y", &granted));
        assert!(!has_permission("x:z", &granted));
        assert!(!has_permission("x:*", &granted));
    }

    #[test]
    fn test_malformed_query_degrades_to_resource() {
        // No colon: the whole string is the resource with an empty action.
        let granted = set(&["standalone:*"]);
        assert!(has_permission("standalone", &granted));

        let exact = set(&["standalone"]);
        assert!(has_permission("standalone", &exact));
        assert!(!has_permission("standalone", &set(&["other:*"])));
    }

    #[test]
    fn test_empty_granted_set_denies() {
        let granted = PermissionSet::new();
        assert!(!has_permission("users:read", &granted));
        assert!(!has_permission("*", &granted));
    }

    #[test]
    fn test_any_empty_required_is_non_grant() {
        let granted = set(&["*"]);
        let required: [&str; 0] = [];
        assert!(!has_any_permission(&required, &granted));
    }

    #[test]
    fn test_all_empty_required_is_vacuously_true() {
        let granted = PermissionSet::new();
        let required: [&str; 0] = [];
        assert!(has_all_permissions(&required, &granted));
    }

    #[test]
    fn test_any_matches_one_of_several() {
        let granted = set(&["users:read"]);
        assert!(has_any_permission(&["users:all", "users:read"], &granted));
        assert!(!has_any_permission(&["users:all", "users:create"], &granted));
    }

    #[test]
    fn test_all_requires_every_element() {
        let granted = set(&["users:read", "teams:read"]);
        assert!(has_all_permissions(&["users:read", "teams:read"], &granted));
        assert!(!has_all_permissions(&["users:read", "teams:create"], &granted));
        // A resource wildcard satisfies each member of its group.
        let wild = set(&["teams:*", "users:read"]);
        assert!(has_all_permissions(&["users:read", "teams:create", "teams:delete"], &wild));
    }

    #[test]
    fn test_duplicates_are_inert() {
        let granted: PermissionSet = vec![
            "users:read".to_string(),
            "users:read".to_string(),
            "teams:read".to_string(),
        ]
        .into();
        assert_eq!(granted.len(), 2);
        assert!(has_permission("users:read", &granted));
    }

    #[test]
    fn test_union() {
        let a = set(&["users:read"]);
        let b = set(&["teams:read", "users:read"]);
        let u = a.union(&b);
        assert_eq!(u.sorted(), vec!["teams:read", "users:read"]);
    }
}

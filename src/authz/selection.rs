//! Permission-assignment editing state.
//!
//! Mirrors the role form's checkbox behavior as a pure state machine over
//! catalog ids. Within a resource group, the wildcard entry and the
//! individual entries are mutually exclusive: selecting the wildcard clears
//! the individuals, and completing the individuals promotes the selection
//! to the wildcard. Deselecting the wildcard does NOT restore the
//! individuals — there is no undo memory.

use std::collections::HashSet;
use std::sync::Arc;

use crate::authz::catalog::Catalog;
use crate::authz::evaluator::PermissionSet;

#[derive(Debug, Clone)]
pub struct SelectionState {
    catalog: Arc<Catalog>,
    selected: HashSet<String>,
}

impl SelectionState {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            selected: HashSet::new(),
        }
    }

    /// Seed from an existing role's permission ids. Ids the catalog does
    /// not know are dropped.
    pub fn with_selected<S: AsRef<str>>(catalog: Arc<Catalog>, ids: &[S]) -> Self {
        let selected = ids
            .iter()
            .map(|s| s.as_ref())
            .filter(|id| catalog.contains(id))
            .map(str::to_string)
            .collect();
        Self { catalog, selected }
    }

    /// Flip one permission. Unknown ids are a no-op.
    ///
    /// Toggling the group's wildcard id behaves like [`toggle_wildcard`].
    /// Toggling an individual while the group wildcard is selected is a
    /// no-op (the form renders those checkboxes disabled). Toggling on the
    /// last unselected individual of a group that has a wildcard promotes
    /// the whole group to the wildcard.
    ///
    /// [`toggle_wildcard`]: Self::toggle_wildcard
    pub fn toggle(&mut self, id: &str) {
        let Some(def) = self.catalog.get(id) else {
            return;
        };
        if def.is_wildcard() {
            let resource = def.resource.clone();
            self.toggle_wildcard(&resource);
            return;
        }

        if self.selected.contains(id) {
            self.selected.remove(id);
            return;
        }

        let resource = def.resource.clone();
        if self.wildcard_selected(&resource) {
            return;
        }

        if let Some(wildcard) = self.catalog.wildcard_for(&resource) {
            let (selected, total) = self.counts(&resource);
            if selected + 1 == total {
                // This toggle completes the group: promote to the wildcard.
                let wildcard_id = wildcard.id.clone();
                self.clear_individuals(&resource);
                self.selected.insert(wildcard_id);
                return;
            }
        }
        self.selected.insert(id.to_string());
    }

    /// Toggle a resource group's wildcard. On: clear the group's individuals
    /// and select the wildcard. Off: deselect the wildcard only, leaving the
    /// individuals cleared. No-op for resources without a wildcard entry.
    pub fn toggle_wildcard(&mut self, resource: &str) {
        let Some(wildcard) = self.catalog.wildcard_for(resource) else {
            return;
        };
        let wildcard_id = wildcard.id.clone();
        if self.selected.contains(&wildcard_id) {
            self.selected.remove(&wildcard_id);
        } else {
            self.clear_individuals(resource);
            self.selected.insert(wildcard_id);
        }
    }

    /// Replace the whole selection with every group's wildcard (groups
    /// without a wildcard entry end up unselected).
    pub fn select_all(&mut self) {
        self.selected = self
            .catalog
            .iter()
            .filter(|d| d.is_wildcard())
            .map(|d| d.id.clone())
            .collect();
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn wildcard_selected(&self, resource: &str) -> bool {
        self.catalog
            .wildcard_for(resource)
            .is_some_and(|w| self.selected.contains(&w.id))
    }

    /// (selected, total) over a group's individual entries, for the
    /// `3/5` style badge.
    pub fn counts(&self, resource: &str) -> (usize, usize) {
        let individuals = self.catalog.individuals_for(resource);
        let selected = individuals
            .iter()
            .filter(|d| self.selected.contains(&d.id))
            .count();
        (selected, individuals.len())
    }

    /// Sorted for deterministic submission payloads.
    pub fn selected_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.selected.iter().cloned().collect();
        ids.sort();
        ids
    }

    pub fn permission_set(&self) -> PermissionSet {
        self.selected.iter().cloned().collect()
    }

    fn clear_individuals(&mut self, resource: &str) {
        let ids: Vec<String> = self
            .catalog
            .individuals_for(resource)
            .iter()
            .map(|d| d.id.clone())
            .collect();
        for id in ids {
            self.selected.remove(&id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> SelectionState {
        SelectionState::new(Arc::new(Catalog::builtin()))
    }

    #[test]
    fn test_toggle_selects_and_deselects() {
        let mut s = state();
        s.toggle("users:read");
        assert!(s.is_selected("users:read"));
        s.toggle("users:read");
        assert!(!s.is_selected("users:read"));
    }

    #[test]
    fn test_unknown_id_is_a_noop() {
        let mut s = state();
        s.toggle("users:frobnicate");
        s.toggle("nonsense");
        assert!(s.selected_ids().is_empty());
    }

    #[test]
    fn test_wildcard_clears_individuals() {
        let mut s = state();
        s.toggle("users:read");
        s.toggle("users:create");
        s.toggle_wildcard("users");
        assert!(s.is_selected("users:all"));
        assert!(!s.is_selected("users:read"));
        assert!(!s.is_selected("users:create"));
        assert_eq!(s.selected_ids(), vec!["users:all"]);
    }

    #[test]
    fn test_wildcard_off_does_not_restore_individuals() {
        let mut s = state();
        s.toggle("users:read");
        s.toggle_wildcard("users");
        s.toggle_wildcard("users");
        // Round trip is lossy by design.
        assert!(s.selected_ids().is_empty());
    }

    #[test]
    fn test_completing_a_group_promotes_to_wildcard() {
        let mut s = state();
        s.toggle("users:read");
        s.toggle("users:create");
        s.toggle("users:update");
        assert!(!s.is_selected("users:all"));
        s.toggle("users:delete");
        assert_eq!(s.selected_ids(), vec!["users:all"]);
        assert!(!s.is_selected("users:delete"));
    }

    #[test]
    fn test_individual_toggle_while_wildcard_selected_is_noop() {
        let mut s = state();
        s.toggle_wildcard("users");
        s.toggle("users:read");
        assert_eq!(s.selected_ids(), vec!["users:all"]);
    }

    #[test]
    fn test_group_without_wildcard_never_promotes() {
        let mut s = state();
        s.toggle("own_schedule:view");
        s.toggle("own_schedule:request");
        let ids = s.selected_ids();
        assert_eq!(ids, vec!["own_schedule:request", "own_schedule:view"]);
    }

    #[test]
    fn test_toggling_wildcard_id_directly() {
        let mut s = state();
        s.toggle("teams:read");
        s.toggle("teams:all");
        assert_eq!(s.selected_ids(), vec!["teams:all"]);
    }

    #[test]
    fn test_select_all_replaces_selection_with_wildcards() {
        let mut s = state();
        s.toggle("own_schedule:view");
        s.toggle("users:read");
        s.select_all();
        let ids = s.selected_ids();
        assert!(ids.contains(&"users:all".to_string()));
        assert!(ids.contains(&"settings:all".to_string()));
        // own_schedule has no wildcard, so nothing of it survives select_all.
        assert!(!ids.iter().any(|id| id.starts_with("own_schedule")));
        assert!(!ids.contains(&"users:read".to_string()));
    }

    #[test]
    fn test_counts_badge() {
        let mut s = state();
        assert_eq!(s.counts("users"), (0, 4));
        s.toggle("users:read");
        s.toggle("users:create");
        assert_eq!(s.counts("users"), (2, 4));
        s.toggle_wildcard("users");
        // Wildcard selection leaves the individual count at zero; display
        // logic shows total/total off wildcard_selected.
        assert_eq!(s.counts("users"), (0, 4));
        assert!(s.wildcard_selected("users"));
    }

    #[test]
    fn test_seeding_drops_unknown_ids() {
        let s = SelectionState::with_selected(
            Arc::new(Catalog::builtin()),
            &["users:read", "users:bogus", "teams:all"],
        );
        assert_eq!(s.selected_ids(), vec!["teams:all", "users:read"]);
    }
}

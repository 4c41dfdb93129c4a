use crate::catalog::{Catalog, Phase};
use crate::error::{CycleError, Result};
use crate::paths::CHECKLIST_KEY;
use crate::storage::Backing;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// ChecklistState
// ---------------------------------------------------------------------------

/// phase id → item id → done. Only completed items are kept, so an absent
/// entry and `false` mean the same thing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChecklistState(BTreeMap<String, BTreeMap<String, bool>>);

impl ChecklistState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_done(&self, phase_id: &str, item_id: &str) -> bool {
        self.0
            .get(phase_id)
            .and_then(|items| items.get(item_id))
            .copied()
            .unwrap_or(false)
    }

    pub fn set(&mut self, phase_id: &str, item_id: &str, done: bool) {
        if done {
            self.0
                .entry(phase_id.to_string())
                .or_default()
                .insert(item_id.to_string(), true);
        } else if let Some(items) = self.0.get_mut(phase_id) {
            items.remove(item_id);
            if items.is_empty() {
                self.0.remove(phase_id);
            }
        }
    }

    pub fn clear_phase(&mut self, phase_id: &str) {
        self.0.remove(phase_id);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of completed items recorded for a phase, ignoring ids the phase
    /// doesn't define.
    pub fn completed_in(&self, phase: &Phase) -> usize {
        phase
            .checklist
            .iter()
            .filter(|item| self.is_done(&phase.id, &item.id))
            .count()
    }

    /// Drop entries whose phase or item is not in `catalog`, and entries
    /// stored as `false`. Returns how many entries were dropped.
    fn retain_known(&mut self, catalog: &Catalog) -> usize {
        let mut dropped = 0;
        self.0.retain(|phase_id, items| {
            let Ok(phase) = catalog.get_phase(phase_id) else {
                dropped += items.len();
                return false;
            };
            let before = items.len();
            items.retain(|item_id, done| *done && phase.has_item(item_id));
            dropped += before - items.len();
            !items.is_empty()
        });
        dropped
    }
}

// ---------------------------------------------------------------------------
// ChecklistStore
// ---------------------------------------------------------------------------

/// Checklist completion per phase, written through to the persistence port on
/// every mutation.
pub struct ChecklistStore {
    catalog: Arc<Catalog>,
    state: ChecklistState,
    backing: Backing,
}

impl ChecklistStore {
    /// Hydrate from `backing`. Absent, corrupt or unreadable data yields an
    /// empty state.
    pub fn open(catalog: Arc<Catalog>, mut backing: Backing) -> Self {
        let mut state: ChecklistState = backing.hydrate(CHECKLIST_KEY).unwrap_or_default();
        let dropped = state.retain_known(&catalog);
        if dropped > 0 {
            tracing::warn!(dropped, "ignoring checklist entries not in the catalog");
        }
        Self {
            catalog,
            state,
            backing,
        }
    }

    pub fn state(&self) -> &ChecklistState {
        &self.state
    }

    pub fn is_degraded(&self) -> bool {
        self.backing.is_degraded()
    }

    /// Flip an item and return its new value.
    pub fn toggle_item(&mut self, phase_id: &str, item_id: &str) -> Result<bool> {
        self.check(phase_id, item_id)?;
        let done = !self.state.is_done(phase_id, item_id);
        self.state.set(phase_id, item_id, done);
        self.save();
        Ok(done)
    }

    pub fn set_item(&mut self, phase_id: &str, item_id: &str, done: bool) -> Result<()> {
        self.check(phase_id, item_id)?;
        self.state.set(phase_id, item_id, done);
        self.save();
        Ok(())
    }

    /// Completion of every item in the phase, missing items `false`.
    pub fn get_state(&self, phase_id: &str) -> Result<BTreeMap<String, bool>> {
        let phase = self.catalog.get_phase(phase_id)?;
        Ok(phase
            .checklist
            .iter()
            .map(|item| (item.id.clone(), self.state.is_done(phase_id, &item.id)))
            .collect())
    }

    pub fn reset(&mut self, phase_id: &str) -> Result<()> {
        self.catalog.get_phase(phase_id)?;
        self.state.clear_phase(phase_id);
        self.save();
        Ok(())
    }

    pub fn reset_all(&mut self) {
        self.state = ChecklistState::new();
        self.save();
    }

    /// Replace the whole state, e.g. with a copy pulled from the remote mirror.
    pub fn replace(&mut self, mut state: ChecklistState) {
        state.retain_known(&self.catalog);
        self.state = state;
        self.save();
    }

    fn check(&self, phase_id: &str, item_id: &str) -> Result<()> {
        let phase = self.catalog.get_phase(phase_id)?;
        if !phase.has_item(item_id) {
            return Err(CycleError::UnknownItem {
                phase: phase_id.to_string(),
                item: item_id.to_string(),
            });
        }
        Ok(())
    }

    fn save(&mut self) {
        self.backing.persist(CHECKLIST_KEY, &self.state);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::{self, NoticeKind, Notifier};
    use crate::storage::tests::BrokenStorage;
    use crate::storage::{FileStorage, MemoryStorage, Storage};
    use serde_json::json;
    use tempfile::TempDir;

    fn store_on(storage: Arc<dyn Storage>) -> ChecklistStore {
        ChecklistStore::open(
            Arc::new(Catalog::builtin()),
            Backing::new(storage, Notifier::silent()),
        )
    }

    #[test]
    fn toggle_twice_restores_original() {
        let mut store = store_on(Arc::new(MemoryStorage::new()));
        assert!(store.toggle_item("p1", "c2").unwrap());
        assert!(!store.toggle_item("p1", "c2").unwrap());
        assert_eq!(store.state(), &ChecklistState::new());
    }

    #[test]
    fn get_state_defaults_missing_to_false() {
        let mut store = store_on(Arc::new(MemoryStorage::new()));
        store.set_item("p2", "c3", true).unwrap();
        let state = store.get_state("p2").unwrap();
        assert_eq!(state.len(), 4);
        assert_eq!(state["c3"], true);
        assert_eq!(state["c1"], false);
    }

    #[test]
    fn unknown_phase_and_item_are_typed() {
        let mut store = store_on(Arc::new(MemoryStorage::new()));
        assert!(matches!(
            store.toggle_item("p42", "c1"),
            Err(CycleError::UnknownPhase(_))
        ));
        assert!(matches!(
            store.toggle_item("p1", "c42"),
            Err(CycleError::UnknownItem { .. })
        ));
        assert!(store.state().is_empty());
    }

    #[test]
    fn reset_clears_only_that_phase() {
        let mut store = store_on(Arc::new(MemoryStorage::new()));
        store.set_item("p1", "c1", true).unwrap();
        store.set_item("p4", "c1", true).unwrap();
        store.reset("p1").unwrap();
        assert!(!store.state().is_done("p1", "c1"));
        assert!(store.state().is_done("p4", "c1"));
        assert!(store.reset("nope").is_err());
    }

    #[test]
    fn mutations_survive_a_fresh_instance() {
        let dir = TempDir::new().unwrap();
        let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(dir.path()));
        let mut store = store_on(storage.clone());
        store.toggle_item("p3", "c4").unwrap();
        store.toggle_item("p5", "c1").unwrap();
        let before = store.state().clone();

        let reopened = store_on(Arc::new(FileStorage::new(dir.path())));
        assert_eq!(reopened.state(), &before);
    }

    #[test]
    fn corrupt_payload_starts_empty() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("checklist.json"), "\u{0}garbage").unwrap();
        let store = store_on(Arc::new(FileStorage::new(dir.path())));
        assert!(store.state().is_empty());
        assert!(!store.is_degraded());
    }

    #[test]
    fn invalid_utf8_state_is_discarded_and_overwritten() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("checklist.json"), [0xff, 0xfe, 0x00]).unwrap();
        let mut store = store_on(Arc::new(FileStorage::new(dir.path())));
        assert!(store.state().is_empty());
        assert!(!store.is_degraded());

        store.toggle_item("p1", "c1").unwrap();
        let reopened = store_on(Arc::new(FileStorage::new(dir.path())));
        assert!(reopened.state().is_done("p1", "c1"));
    }

    #[test]
    fn wrong_shape_starts_empty() {
        let storage = MemoryStorage::new();
        storage.save("checklist", &json!({ "p1": "yes" })).unwrap();
        let store = store_on(Arc::new(storage));
        assert!(store.state().is_empty());
    }

    #[test]
    fn hydration_drops_stale_entries() {
        let storage = MemoryStorage::new();
        storage
            .save(
                "checklist",
                &json!({ "p1": { "c1": true, "c9": true }, "p8": { "c1": true }, "p2": { "c2": false } }),
            )
            .unwrap();
        let store = store_on(Arc::new(storage));
        let mut expected = ChecklistState::new();
        expected.set("p1", "c1", true);
        assert_eq!(store.state(), &expected);
    }

    #[test]
    fn write_failure_keeps_memory_authoritative() {
        let (notifier, rx) = notice::channel();
        let mut store = ChecklistStore::open(
            Arc::new(Catalog::builtin()),
            Backing::new(Arc::new(BrokenStorage), notifier),
        );
        assert!(store.toggle_item("p1", "c1").unwrap());
        assert!(store.toggle_item("p1", "c2").unwrap());
        assert!(store.state().is_done("p1", "c1"));
        assert!(store.is_degraded());

        let kinds: Vec<NoticeKind> = rx.try_iter().map(|n| n.kind).collect();
        assert_eq!(kinds, vec![NoticeKind::PersistenceUnavailable]);
    }
}

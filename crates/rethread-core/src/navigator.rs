use crate::catalog::{Catalog, Phase, DECISION_GATE_PHASE};
use crate::error::Result;
use crate::paths::NAVIGATOR_KEY;
use crate::storage::Backing;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// What gets persisted: the id of the phase being viewed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigatorState {
    pub current: String,
}

/// Pointer into the catalog by sequence number. Moves clamp at both ends and
/// the cycle never terminates.
pub struct Navigator {
    catalog: Arc<Catalog>,
    position: u32,
    backing: Backing,
}

impl Navigator {
    /// Start at the persisted phase, or at sequence 1 if there is none or it
    /// no longer exists.
    pub fn open(catalog: Arc<Catalog>, mut backing: Backing) -> Self {
        let saved: Option<NavigatorState> = backing.hydrate(NAVIGATOR_KEY);
        let mut nav = Self {
            catalog,
            position: 1,
            backing,
        };
        if let Some(state) = saved {
            nav.restore(&state.current);
        }
        nav
    }

    /// Navigator starting at sequence 1 that persists nothing.
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            position: 1,
            backing: Backing::ephemeral(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.backing.is_degraded()
    }

    pub fn position(&self) -> u32 {
        self.position
    }

    pub fn current(&self) -> &Phase {
        // position is only ever set to a sequence the catalog contains
        self.catalog
            .phase_at(self.position)
            .unwrap_or_else(|| self.catalog.first())
    }

    pub fn next(&mut self) -> &Phase {
        if self.position < self.catalog.max_sequence() {
            self.move_to(self.position + 1);
        }
        self.current()
    }

    pub fn prev(&mut self) -> &Phase {
        if self.position > 1 {
            self.move_to(self.position - 1);
        }
        self.current()
    }

    /// Move to `phase_id`. On `UnknownPhase` the position is unchanged.
    pub fn jump_to(&mut self, phase_id: &str) -> Result<&Phase> {
        let sequence = self.catalog.get_phase(phase_id)?.sequence;
        self.move_to(sequence);
        Ok(self.current())
    }

    pub fn jump_to_decision_gate(&mut self) -> Result<&Phase> {
        self.jump_to(DECISION_GATE_PHASE)
    }

    /// Move to `phase_id`, or to the first phase if the catalog lacks it.
    /// Unlike `jump_to` this never fails, and the result is always written.
    pub fn adopt(&mut self, phase_id: &str) -> &Phase {
        self.restore(phase_id);
        let state = self.state();
        self.backing.persist(NAVIGATOR_KEY, &state);
        self.current()
    }

    /// Set the position without persisting; unknown ids fall back to the
    /// first phase.
    fn restore(&mut self, phase_id: &str) {
        match self.catalog.get_phase(phase_id) {
            Ok(phase) => self.position = phase.sequence,
            Err(_) => {
                tracing::warn!(phase = phase_id, "saved phase not in catalog, starting at 1");
                self.position = 1;
            }
        }
    }

    pub fn state(&self) -> NavigatorState {
        NavigatorState {
            current: self.current().id.clone(),
        }
    }

    fn move_to(&mut self, sequence: u32) {
        if sequence == self.position {
            return;
        }
        self.position = sequence;
        let state = self.state();
        self.backing.persist(NAVIGATOR_KEY, &state);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CycleError;
    use crate::notice::Notifier;
    use crate::storage::{MemoryStorage, Storage};
    use serde_json::json;

    fn nav() -> Navigator {
        Navigator::new(Arc::new(Catalog::builtin()))
    }

    #[test]
    fn starts_at_first_phase() {
        let nav = nav();
        assert_eq!(nav.position(), 1);
        assert_eq!(nav.current().id, "p1");
    }

    #[test]
    fn prev_at_start_is_clamped() {
        let mut nav = nav();
        assert_eq!(nav.prev().sequence, 1);
        assert_eq!(nav.position(), 1);
    }

    #[test]
    fn next_clamps_at_end_without_wrapping() {
        let mut nav = nav();
        for _ in 0..20 {
            nav.next();
        }
        assert_eq!(nav.position(), 7);
        assert_eq!(nav.next().id, "p7");
        assert_eq!(nav.prev().id, "p6");
    }

    #[test]
    fn jump_to_unknown_leaves_position() {
        let mut nav = nav();
        nav.next();
        let err = nav.jump_to("p99").unwrap_err();
        assert!(matches!(err, CycleError::UnknownPhase(_)));
        assert_eq!(nav.position(), 2);
    }

    #[test]
    fn jump_to_decision_gate() {
        let mut nav = nav();
        assert_eq!(nav.jump_to_decision_gate().unwrap().id, "p3");
        assert_eq!(nav.jump_to("p6").unwrap().sequence, 6);
    }

    #[test]
    fn position_persists() {
        let storage = MemoryStorage::new();
        let backing = || Backing::new(Arc::new(storage.clone()), Notifier::silent());
        let catalog = Arc::new(Catalog::builtin());

        let mut nav = Navigator::open(catalog.clone(), backing());
        nav.jump_to("p5").unwrap();

        let reopened = Navigator::open(catalog, backing());
        assert_eq!(reopened.current().id, "p5");
        assert_eq!(storage.load("navigator").unwrap(), Some(json!({ "current": "p5" })));
    }

    #[test]
    fn stale_saved_phase_falls_back() {
        let storage = MemoryStorage::new();
        storage.save("navigator", &json!({ "current": "p8" })).unwrap();
        let nav = Navigator::open(
            Arc::new(Catalog::builtin()),
            Backing::new(Arc::new(storage), Notifier::silent()),
        );
        assert_eq!(nav.position(), 1);
    }

    #[test]
    fn adopt_unknown_phase_writes_first() {
        let storage = MemoryStorage::new();
        storage.save("navigator", &json!({ "current": "p1" })).unwrap();
        let mut nav = Navigator::open(
            Arc::new(Catalog::builtin()),
            Backing::new(Arc::new(storage.clone()), Notifier::silent()),
        );
        nav.jump_to("p4").unwrap();
        storage.save("navigator", &json!({ "current": "p8" })).unwrap();

        assert_eq!(nav.adopt("p1").id, "p1");
        assert_eq!(storage.load("navigator").unwrap(), Some(json!({ "current": "p1" })));

        assert_eq!(nav.adopt("p99").id, "p1");
        assert_eq!(nav.adopt("p6").sequence, 6);
        assert_eq!(storage.load("navigator").unwrap(), Some(json!({ "current": "p6" })));
    }
}

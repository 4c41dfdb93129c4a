use crate::paths::ROTATION_KEY;
use crate::storage::Backing;
use crate::types::WeekLabel;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub lead: String,
    pub challenger: String,
}

impl Assignment {
    pub fn new(lead: impl Into<String>, challenger: impl Into<String>) -> Self {
        Self {
            lead: lead.into(),
            challenger: challenger.into(),
        }
    }
}

/// Lead/challenger pairs for both weeks. Names are free text; empty is allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRotation {
    pub week_a: Assignment,
    pub week_b: Assignment,
    #[serde(default)]
    pub swapped: bool,
}

impl Default for RoleRotation {
    fn default() -> Self {
        Self {
            week_a: Assignment::new("You", "Moaz"),
            week_b: Assignment::new("Moaz", "You"),
            swapped: false,
        }
    }
}

impl RoleRotation {
    pub fn assignment(&self, week: WeekLabel) -> &Assignment {
        match week {
            WeekLabel::A => &self.week_a,
            WeekLabel::B => &self.week_b,
        }
    }

    fn assignment_mut(&mut self, week: WeekLabel) -> &mut Assignment {
        match week {
            WeekLabel::A => &mut self.week_a,
            WeekLabel::B => &mut self.week_b,
        }
    }

    /// Exchange the two weeks' assignments and flip `swapped`. An involution.
    pub fn swapped(mut self) -> Self {
        std::mem::swap(&mut self.week_a, &mut self.week_b);
        self.swapped = !self.swapped;
        self
    }
}

// ---------------------------------------------------------------------------
// RotationStore
// ---------------------------------------------------------------------------

pub struct RotationStore {
    rotation: RoleRotation,
    backing: Backing,
}

impl RotationStore {
    /// Hydrate from `backing`, falling back to `initial` when nothing usable
    /// is stored.
    pub fn open(mut backing: Backing, initial: RoleRotation) -> Self {
        let rotation = backing.hydrate(ROTATION_KEY).unwrap_or(initial);
        Self { rotation, backing }
    }

    pub fn rotation(&self) -> &RoleRotation {
        &self.rotation
    }

    pub fn is_degraded(&self) -> bool {
        self.backing.is_degraded()
    }

    pub fn get_assignment(&self, week: WeekLabel) -> &Assignment {
        self.rotation.assignment(week)
    }

    pub fn set_assignment(&mut self, week: WeekLabel, assignment: Assignment) {
        *self.rotation.assignment_mut(week) = assignment;
        self.save();
    }

    pub fn swap(&mut self) -> &RoleRotation {
        self.rotation = std::mem::take(&mut self.rotation).swapped();
        self.save();
        &self.rotation
    }

    pub fn replace(&mut self, rotation: RoleRotation) {
        self.rotation = rotation;
        self.save();
    }

    fn save(&mut self) {
        self.backing.persist(ROTATION_KEY, &self.rotation);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::Notifier;
    use crate::storage::{FileStorage, MemoryStorage, Storage};
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn memory_store() -> RotationStore {
        RotationStore::open(Backing::ephemeral(), RoleRotation::default())
    }

    #[test]
    fn swap_twice_is_identity() {
        let mut store = memory_store();
        let original = store.rotation().clone();
        store.swap();
        assert_ne!(store.rotation(), &original);
        store.swap();
        assert_eq!(store.rotation(), &original);
    }

    #[test]
    fn swap_exchanges_slots_and_flips_flag() {
        let mut store = memory_store();
        store.set_assignment(WeekLabel::A, Assignment::new("Ahmad", "Moaz"));
        store.set_assignment(WeekLabel::B, Assignment::new("Moaz", "Ahmad"));

        let after = store.swap().clone();
        assert_eq!(after.week_a, Assignment::new("Moaz", "Ahmad"));
        assert_eq!(after.week_b, Assignment::new("Ahmad", "Moaz"));
        assert!(after.swapped);
    }

    #[test]
    fn empty_names_are_allowed() {
        let mut store = memory_store();
        store.set_assignment(WeekLabel::B, Assignment::new("", ""));
        assert_eq!(store.get_assignment(WeekLabel::B).lead, "");
    }

    #[test]
    fn persisted_across_instances() {
        let dir = TempDir::new().unwrap();
        let backing = || Backing::new(Arc::new(FileStorage::new(dir.path())), Notifier::silent());

        let mut store = RotationStore::open(backing(), RoleRotation::default());
        store.set_assignment(WeekLabel::A, Assignment::new("Ahmad", "Moaz"));
        store.swap();
        let expected = store.rotation().clone();

        let reopened = RotationStore::open(backing(), RoleRotation::default());
        assert_eq!(reopened.rotation(), &expected);
    }

    #[test]
    fn missing_swapped_flag_defaults_false() {
        let storage = MemoryStorage::new();
        storage
            .save(
                "rotation",
                &json!({
                    "week_a": { "lead": "A1", "challenger": "A2" },
                    "week_b": { "lead": "B1", "challenger": "B2" }
                }),
            )
            .unwrap();
        let store = RotationStore::open(
            Backing::new(Arc::new(storage), Notifier::silent()),
            RoleRotation::default(),
        );
        assert!(!store.rotation().swapped);
        assert_eq!(store.get_assignment(WeekLabel::A).lead, "A1");
    }

    #[test]
    fn corrupt_rotation_uses_initial() {
        let storage = MemoryStorage::new();
        storage.save("rotation", &json!("nonsense")).unwrap();
        let initial = RoleRotation {
            week_a: Assignment::new("X", "Y"),
            week_b: Assignment::new("Y", "X"),
            swapped: false,
        };
        let store = RotationStore::open(
            Backing::new(Arc::new(storage), Notifier::silent()),
            initial.clone(),
        );
        assert_eq!(store.rotation(), &initial);
    }
}

//! Completion percentages derived from the catalog and checklist state.
//! Nothing here is cached; every call recomputes from its inputs.

use crate::catalog::{Catalog, Phase};
use crate::checklist::ChecklistState;
use crate::types::WeekLabel;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    pub percent: u32,
}

impl Progress {
    pub fn new(completed: usize, total: usize) -> Self {
        let percent = if total == 0 {
            0
        } else {
            (completed as f64 / total as f64 * 100.0).round() as u32
        };
        Self {
            completed,
            total,
            percent,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.completed == self.total
    }
}

pub fn phase_progress(phase: &Phase, state: &ChecklistState) -> Progress {
    Progress::new(state.completed_in(phase), phase.checklist.len())
}

/// Pooled progress: item counts are summed across `phases` before dividing,
/// so a phase with more items weighs more.
pub fn week_progress<'a>(
    phases: impl IntoIterator<Item = &'a Phase>,
    state: &ChecklistState,
) -> Progress {
    let (completed, total) = phases.into_iter().fold((0, 0), |(done, total), phase| {
        (done + state.completed_in(phase), total + phase.checklist.len())
    });
    Progress::new(completed, total)
}

/// Progress for the phases carrying `week` in `catalog`.
pub fn progress_for_week(catalog: &Catalog, week: WeekLabel, state: &ChecklistState) -> Progress {
    week_progress(catalog.phases_for_week(week), state)
}

pub fn cycle_progress(catalog: &Catalog, state: &ChecklistState) -> Progress {
    week_progress(catalog.list_phases(), state)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::phase;

    #[test]
    fn zero_items_is_zero_percent() {
        let empty = phase("p1", WeekLabel::A, 1, &[]);
        let p = phase_progress(&empty, &ChecklistState::new());
        assert_eq!(p, Progress { completed: 0, total: 0, percent: 0 });
        assert_eq!(week_progress(std::iter::empty(), &ChecklistState::new()).percent, 0);
    }

    #[test]
    fn week_progress_pools_instead_of_averaging() {
        let full = phase("p1", WeekLabel::A, 1, &["c1"]);
        let none = phase("p2", WeekLabel::A, 2, &["c1", "c2", "c3"]);
        let mut state = ChecklistState::new();
        state.set("p1", "c1", true);

        assert_eq!(phase_progress(&full, &state).percent, 100);
        assert_eq!(phase_progress(&none, &state).percent, 0);
        let week = week_progress([&full, &none], &state);
        assert_eq!(week, Progress { completed: 1, total: 4, percent: 25 });
    }

    #[test]
    fn two_phase_week_scenario() {
        let catalog = Catalog::new(vec![
            phase("p1", WeekLabel::A, 1, &["c1", "c2"]),
            phase("p2", WeekLabel::A, 2, &["c1", "c2"]),
        ])
        .unwrap();
        let mut state = ChecklistState::new();
        state.set("p1", "c2", true);

        let week = progress_for_week(&catalog, WeekLabel::A, &state);
        assert_eq!(week, Progress { completed: 1, total: 4, percent: 25 });
        assert_eq!(progress_for_week(&catalog, WeekLabel::B, &state).total, 0);
    }

    #[test]
    fn percent_rounds_to_nearest() {
        assert_eq!(Progress::new(1, 3).percent, 33);
        assert_eq!(Progress::new(2, 3).percent, 67);
        assert_eq!(Progress::new(1, 8).percent, 13);
    }

    #[test]
    fn stray_items_do_not_count() {
        let p = phase("p1", WeekLabel::A, 1, &["c1", "c2"]);
        let mut state = ChecklistState::new();
        state.set("p1", "c1", true);
        state.set("p1", "zz", true);
        assert_eq!(phase_progress(&p, &state), Progress { completed: 1, total: 2, percent: 50 });
    }

    #[test]
    fn cycle_progress_over_builtin() {
        let catalog = Catalog::builtin();
        let mut state = ChecklistState::new();
        for item in ["c1", "c2", "c3", "c4"] {
            state.set("p1", item, true);
        }
        let cycle = cycle_progress(&catalog, &state);
        assert_eq!(cycle, Progress { completed: 4, total: 28, percent: 14 });
        assert!(phase_progress(catalog.first(), &state).is_complete());
    }
}

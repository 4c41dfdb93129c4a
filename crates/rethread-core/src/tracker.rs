//! The tracker wires the catalog, the three stores, the navigator and the
//! optional remote mirror behind one handle.
//!
//! Every failure is translated here. Unknown phase/item/week references are
//! returned to the caller and also sent as a notice. Persistence failures
//! never surface as errors; the affected store degrades to memory and its
//! backing sends one warning. Mirror failures are returned from the sync
//! calls and sent as a passive warning.

use crate::catalog::{Catalog, Phase};
use crate::checklist::{ChecklistState, ChecklistStore};
use crate::config::{Config, StorageBackend};
use crate::error::{CycleError, Result};
use crate::home::{HomeContent, HomeStore};
use crate::mirror::{GithubMirror, RemoteMirror};
use crate::navigator::Navigator;
use crate::notice::{NoticeKind, Notifier};
use crate::progress::{self, Progress};
use crate::rotation::{Assignment, RoleRotation, RotationStore};
use crate::storage::{Backing, FileStorage, MemoryStorage, Storage};
use crate::types::WeekLabel;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// Everything the tracker persists, in one document. This is also the shape
/// written to and read from the remote mirror.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerSnapshot {
    pub checklist: ChecklistState,
    pub rotation: RoleRotation,
    /// Id of the phase being viewed.
    pub current: String,
    pub home: HomeContent,
}

/// Decoding shape for a pulled document. The core fields are required so a
/// document written by something else is rejected instead of read as an
/// empty tracker.
#[derive(Deserialize)]
struct RemoteSnapshot {
    checklist: ChecklistState,
    rotation: RoleRotation,
    current: String,
    #[serde(default)]
    home: HomeContent,
}

impl From<RemoteSnapshot> for TrackerSnapshot {
    fn from(remote: RemoteSnapshot) -> Self {
        Self {
            checklist: remote.checklist,
            rotation: remote.rotation,
            current: remote.current,
            home: remote.home,
        }
    }
}

pub struct Tracker {
    catalog: Arc<Catalog>,
    checklist: ChecklistStore,
    rotation: RotationStore,
    navigator: Navigator,
    home: HomeStore,
    notifier: Notifier,
    mirror: Option<Box<dyn RemoteMirror>>,
    /// Why the configured mirror could not be built, reported on first sync.
    mirror_unavailable: Option<String>,
}

impl Tracker {
    /// Open the tracker for a project root using its config: storage backend,
    /// initial rotation and, if configured, the GitHub mirror.
    pub fn open(root: &Path, config: &Config, notifier: Notifier) -> Self {
        let storage: Arc<dyn Storage> = match config.storage.backend {
            StorageBackend::File => Arc::new(FileStorage::for_root(root)),
            StorageBackend::Memory => Arc::new(MemoryStorage::new()),
        };
        let mut tracker = Self::with_storage(
            Arc::new(Catalog::builtin()),
            storage,
            config.rotation.clone(),
            notifier,
        );
        if let Some(mirror_config) = &config.mirror {
            match GithubMirror::from_config(mirror_config) {
                Ok(mirror) => tracker.mirror = Some(Box::new(mirror)),
                Err(e) => {
                    tracing::debug!(error = %e, "remote mirror disabled");
                    tracker.mirror_unavailable = Some(e.to_string());
                }
            }
        }
        tracker
    }

    /// Assemble a tracker over an explicit catalog and storage. Each store
    /// gets its own backing so one failing key does not silence the others.
    pub fn with_storage(
        catalog: Arc<Catalog>,
        storage: Arc<dyn Storage>,
        initial_rotation: RoleRotation,
        notifier: Notifier,
    ) -> Self {
        let backing = || Backing::new(Arc::clone(&storage), notifier.clone());
        Self {
            checklist: ChecklistStore::open(Arc::clone(&catalog), backing()),
            rotation: RotationStore::open(backing(), initial_rotation),
            navigator: Navigator::open(Arc::clone(&catalog), backing()),
            home: HomeStore::open(backing()),
            catalog,
            notifier,
            mirror: None,
            mirror_unavailable: None,
        }
    }

    pub fn with_mirror(mut self, mirror: Box<dyn RemoteMirror>) -> Self {
        self.mirror = Some(mirror);
        self.mirror_unavailable = None;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// True once any store has fallen back to memory for this session.
    pub fn is_degraded(&self) -> bool {
        self.checklist.is_degraded()
            || self.rotation.is_degraded()
            || self.navigator.is_degraded()
            || self.home.is_degraded()
    }

    // -----------------------------------------------------------------------
    // Catalog
    // -----------------------------------------------------------------------

    pub fn phase(&self, phase_id: &str) -> Result<&Phase> {
        self.catalog
            .get_phase(phase_id)
            .map_err(|e| self.notifier.report(e))
    }

    // -----------------------------------------------------------------------
    // Checklist
    // -----------------------------------------------------------------------

    pub fn checklist(&self) -> &ChecklistState {
        self.checklist.state()
    }

    pub fn toggle_item(&mut self, phase_id: &str, item_id: &str) -> Result<bool> {
        self.checklist
            .toggle_item(phase_id, item_id)
            .map_err(|e| self.notifier.report(e))
    }

    pub fn set_item(&mut self, phase_id: &str, item_id: &str, done: bool) -> Result<()> {
        self.checklist
            .set_item(phase_id, item_id, done)
            .map_err(|e| self.notifier.report(e))
    }

    pub fn item_states(&self, phase_id: &str) -> Result<BTreeMap<String, bool>> {
        self.checklist
            .get_state(phase_id)
            .map_err(|e| self.notifier.report(e))
    }

    pub fn reset_phase(&mut self, phase_id: &str) -> Result<()> {
        self.checklist
            .reset(phase_id)
            .map_err(|e| self.notifier.report(e))
    }

    pub fn reset_all(&mut self) {
        self.checklist.reset_all();
    }

    // -----------------------------------------------------------------------
    // Progress
    // -----------------------------------------------------------------------

    pub fn phase_progress(&self, phase_id: &str) -> Result<Progress> {
        let phase = self.phase(phase_id)?;
        Ok(progress::phase_progress(phase, self.checklist.state()))
    }

    pub fn week_progress(&self, week: WeekLabel) -> Progress {
        progress::progress_for_week(&self.catalog, week, self.checklist.state())
    }

    pub fn cycle_progress(&self) -> Progress {
        progress::cycle_progress(&self.catalog, self.checklist.state())
    }

    // -----------------------------------------------------------------------
    // Roles
    // -----------------------------------------------------------------------

    pub fn rotation(&self) -> &RoleRotation {
        self.rotation.rotation()
    }

    pub fn assignment(&self, week: WeekLabel) -> &Assignment {
        self.rotation.get_assignment(week)
    }

    pub fn set_assignment(&mut self, week: WeekLabel, assignment: Assignment) {
        self.rotation.set_assignment(week, assignment);
    }

    pub fn swap_roles(&mut self) -> &RoleRotation {
        self.rotation.swap()
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    pub fn current(&self) -> &Phase {
        self.navigator.current()
    }

    pub fn position(&self) -> u32 {
        self.navigator.position()
    }

    pub fn next(&mut self) -> &Phase {
        self.navigator.next()
    }

    pub fn prev(&mut self) -> &Phase {
        self.navigator.prev()
    }

    pub fn jump_to(&mut self, phase_id: &str) -> Result<&Phase> {
        let notifier = &self.notifier;
        self.navigator
            .jump_to(phase_id)
            .map_err(|e| notifier.report(e))
    }

    pub fn jump_to_decision_gate(&mut self) -> Result<&Phase> {
        let notifier = &self.notifier;
        self.navigator
            .jump_to_decision_gate()
            .map_err(|e| notifier.report(e))
    }

    // -----------------------------------------------------------------------
    // Homepage
    // -----------------------------------------------------------------------

    pub fn home(&self) -> &HomeContent {
        self.home.content()
    }

    /// Apply homepage edits, stamp and save them, then push to the mirror if
    /// one is configured. A failed push is reported as a notice only.
    pub fn edit_home<'a>(
        &mut self,
        edits: impl IntoIterator<Item = (&'a str, &'a str)>,
        today: NaiveDate,
    ) -> Result<&HomeContent> {
        self.home.edit(edits, today)?;
        if self.mirror.is_some() {
            if let Err(e) = self.push_remote() {
                tracing::warn!(error = %e, "homepage saved locally only");
            }
        }
        Ok(self.home.content())
    }

    // -----------------------------------------------------------------------
    // Snapshot & remote sync
    // -----------------------------------------------------------------------

    pub fn snapshot(&self) -> TrackerSnapshot {
        TrackerSnapshot {
            checklist: self.checklist.state().clone(),
            rotation: self.rotation.rotation().clone(),
            current: self.navigator.current().id.clone(),
            home: self.home.content().clone(),
        }
    }

    fn require_mirror(&self) -> Result<&dyn RemoteMirror> {
        self.mirror.as_deref().ok_or_else(|| {
            CycleError::RemoteSyncFailed(
                self.mirror_unavailable
                    .clone()
                    .unwrap_or_else(|| "no remote mirror configured".to_string()),
            )
        })
    }

    /// Write the current snapshot to the remote mirror.
    pub fn push_remote(&self) -> Result<()> {
        let result = self.require_mirror().and_then(|mirror| {
            let value = serde_json::to_value(self.snapshot())?;
            let message = format!("Update tracker - {}", Utc::now().to_rfc3339());
            mirror.write_remote(&value, &message)
        });
        match result {
            Ok(()) => {
                self.notifier
                    .info(NoticeKind::RemoteSynced, "pushed tracker state to remote");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "remote push failed");
                Err(self.notifier.report(e))
            }
        }
    }

    /// Replace local state with the remote snapshot. Returns `false` when the
    /// remote has never been written. Local state is untouched unless the
    /// whole snapshot decodes; an unknown `current` restarts at the first
    /// phase.
    pub fn pull_remote(&mut self) -> Result<bool> {
        let snapshot = match self.fetch_remote() {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => return Ok(false),
            Err(e) => {
                tracing::warn!(error = %e, "remote pull failed");
                return Err(self.notifier.report(e));
            }
        };
        self.checklist.replace(snapshot.checklist);
        self.rotation.replace(snapshot.rotation);
        self.home.replace(snapshot.home);
        self.navigator.adopt(&snapshot.current);
        self.notifier
            .info(NoticeKind::RemoteSynced, "pulled tracker state from remote");
        Ok(true)
    }

    fn fetch_remote(&self) -> Result<Option<TrackerSnapshot>> {
        let Some(value) = self.require_mirror()?.read_remote()? else {
            return Ok(None);
        };
        serde_json::from_value::<RemoteSnapshot>(value)
            .map(|remote| Some(remote.into()))
            .map_err(|e| {
                CycleError::RemoteSyncFailed(format!(
                    "remote document is not a tracker snapshot: {e}"
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

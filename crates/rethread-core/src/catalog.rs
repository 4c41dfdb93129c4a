use crate::error::{CycleError, Result};
use crate::types::WeekLabel;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Phase that closes week A with the kill-or-commit decision.
pub const DECISION_GATE_PHASE: &str = "p3";

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    pub id: String,
    pub week: WeekLabel,
    pub sequence: u32,
    pub title: String,
    pub purpose: String,
    pub timebox: String,
    pub owner_hint: String,
    pub tags: Vec<String>,
    pub required_outputs: Vec<String>,
    pub exit_criteria: Vec<String>,
    pub checklist: Vec<ChecklistItem>,
}

impl Phase {
    pub fn has_item(&self, item_id: &str) -> bool {
        self.checklist.iter().any(|i| i.id == item_id)
    }

    fn matches(&self, needle: &str) -> bool {
        let blob = format!("{} {} {}", self.title, self.purpose, self.tags.join(" "));
        blob.to_lowercase().contains(needle)
    }
}

// ---------------------------------------------------------------------------
// Week metadata, principles, guardrails
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize)]
pub struct WeekMeta {
    pub label: WeekLabel,
    pub name: &'static str,
    pub subtitle: &'static str,
    pub summary: &'static str,
}

pub static WEEKS: [WeekMeta; 2] = [
    WeekMeta {
        label: WeekLabel::A,
        name: "Week A",
        subtitle: "Discovery & Public Research",
        summary: "Research → public share → real-world validation → decision gate.",
    },
    WeekMeta {
        label: WeekLabel::B,
        name: "Week B",
        subtitle: "Solution, Product, Release",
        summary: "Design freeze → build → release → engaged follow-ups.",
    },
];

pub fn week_meta(week: WeekLabel) -> &'static WeekMeta {
    match week {
        WeekLabel::A => &WEEKS[0],
        WeekLabel::B => &WEEKS[1],
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Principle {
    pub title: &'static str,
    pub description: &'static str,
}

pub static PRINCIPLES: [Principle; 4] = [
    Principle {
        title: "One problem",
        description: "No parallel tracks per cycle.",
    },
    Principle {
        title: "Public-by-default",
        description: "Share research early to attract correction.",
    },
    Principle {
        title: "Opinionated",
        description: "Strong constraints beat generic automation.",
    },
    Principle {
        title: "Timeboxed",
        description: "2-week default; kill fast.",
    },
];

/// Rules the challenger can stop the week on.
pub static GUARDRAILS: [&str; 4] = [
    "No parallel problems in a cycle.",
    "Phase 4 freezes scope (no new features).",
    "Release must state limitations explicitly.",
    "Commercial phase uses one offer only.",
];

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Ordered, validated set of phases. Read-only once constructed.
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    phases: Vec<Phase>,
}

impl Catalog {
    /// Build a catalog, sorting by sequence and checking that sequence numbers
    /// run 1..=n without gaps and that phase and item ids are unique.
    pub fn new(mut phases: Vec<Phase>) -> Result<Self> {
        if phases.is_empty() {
            return Err(CycleError::InvalidCatalog("catalog has no phases".into()));
        }
        phases.sort_by_key(|p| p.sequence);

        let mut ids = HashSet::new();
        for (i, phase) in phases.iter().enumerate() {
            let expected = i as u32 + 1;
            if phase.sequence != expected {
                return Err(CycleError::InvalidCatalog(format!(
                    "phase '{}' has sequence {}, expected {expected}",
                    phase.id, phase.sequence
                )));
            }
            if !ids.insert(phase.id.as_str()) {
                return Err(CycleError::InvalidCatalog(format!(
                    "duplicate phase id '{}'",
                    phase.id
                )));
            }
            let mut items = HashSet::new();
            for item in &phase.checklist {
                if !items.insert(item.id.as_str()) {
                    return Err(CycleError::InvalidCatalog(format!(
                        "duplicate checklist item '{}' in phase '{}'",
                        item.id, phase.id
                    )));
                }
            }
        }
        Ok(Self { phases })
    }

    /// The canonical seven-phase operating cycle.
    pub fn builtin() -> Self {
        Self {
            phases: builtin_phases(),
        }
    }

    pub fn list_phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn get_phase(&self, id: &str) -> Result<&Phase> {
        self.phases
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| CycleError::UnknownPhase(id.to_string()))
    }

    pub fn phase_at(&self, sequence: u32) -> Option<&Phase> {
        let idx = usize::try_from(sequence).ok()?.checked_sub(1)?;
        self.phases.get(idx)
    }

    pub fn first(&self) -> &Phase {
        &self.phases[0]
    }

    pub fn max_sequence(&self) -> u32 {
        self.phases.len() as u32
    }

    pub fn phases_for_week(&self, week: WeekLabel) -> Vec<&Phase> {
        self.phases.iter().filter(|p| p.week == week).collect()
    }

    /// Case-insensitive filter over title, purpose and tags. A blank query
    /// returns the whole selection.
    pub fn search(&self, week: Option<WeekLabel>, query: &str) -> Vec<&Phase> {
        let needle = query.trim().to_lowercase();
        self.phases
            .iter()
            .filter(|p| week.map_or(true, |w| p.week == w))
            .filter(|p| needle.is_empty() || p.matches(&needle))
            .collect()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

// ---------------------------------------------------------------------------
// Builtin data
// ---------------------------------------------------------------------------

struct PhaseDef {
    id: &'static str,
    week: WeekLabel,
    title: &'static str,
    timebox: &'static str,
    purpose: &'static str,
    owner_hint: &'static str,
    tags: [&'static str; 3],
    outputs: &'static [&'static str],
    exit: &'static [&'static str],
    checklist: [&'static str; 4],
}

const PHASE_DEFS: [PhaseDef; 7] = [
    PhaseDef {
        id: "p1",
        week: WeekLabel::A,
        title: "LLM Research & Problem Narrowing",
        timebox: "Days 1–2",
        purpose: "Identify credible, specific SMB problems using LLM research tools before talking to humans.",
        owner_hint: "Week Lead (Support: Challenger)",
        tags: ["research", "segmentation", "hypotheses"],
        outputs: &[
            "Defined SMB segment (industry + size + operational context)",
            "2–3 candidate problems (observable + operational)",
            "Initial root-cause hypotheses",
        ],
        exit: &[
            "Problems are specific and testable (not abstract)",
            "Challenger agrees they’re plausible",
        ],
        checklist: [
            "Segment defined (industry/size/context)",
            "3 candidate problems written as symptoms",
            "Hypotheses noted (why it happens)",
            "Scope guardrails stated (what we won’t solve)",
        ],
    },
    PhaseDef {
        id: "p2",
        week: WeekLabel::A,
        title: "Public Research Share (Hypothesis Stage)",
        timebox: "Day 3",
        purpose: "Publish a short hypothesis to invite correction, discussion, and early leads (no selling).",
        owner_hint: "Week Lead (Support: Challenger as editor)",
        tags: ["publish", "signal", "feedback"],
        outputs: &[
            "One public artifact (post, bullets, diagram, or short note)",
            "Explicit questions for practitioners",
            "Clear ‘we might be wrong’ framing",
        ],
        exit: &[
            "Artifact is understandable by practitioners",
            "No product claims, no CTA to hire",
        ],
        checklist: [
            "1-page public post drafted",
            "3 questions included for feedback",
            "No selling language",
            "Distribution plan (3 places)",
        ],
    },
    PhaseDef {
        id: "p3",
        week: WeekLabel::A,
        title: "Ground Truth Validation",
        timebox: "Days 4–5",
        purpose: "Confirm the problem exists with real operators; decide to kill or commit.",
        owner_hint: "Week Lead (Support: Challenger)",
        tags: ["interviews", "validation", "decision"],
        outputs: &[
            "1–3 operator conversations (notes captured)",
            "Validated problem statement OR kill decision",
            "Top blockers + language used by operators",
        ],
        exit: &[
            "At least one credible operator confirms the pain",
            "Decision Gate: pick ONE problem or kill",
        ],
        checklist: [
            "2 conversations scheduled",
            "Interview notes captured",
            "Problem statement rewritten in operator language",
            "Decision Gate completed (kill or pick one)",
        ],
    },
    PhaseDef {
        id: "p4",
        week: WeekLabel::B,
        title: "Problem Lock & Solution Design",
        timebox: "Days 6–7",
        purpose: "Define exactly what will be built and what will not be built; freeze scope.",
        owner_hint: "Week Lead (Challenger enforces scope)",
        tags: ["spec", "design", "freeze"],
        outputs: &[
            "Final Problem Spec (1 page)",
            "Solution Spec (1 page) with workflow + data model",
            "‘V1 is done when…’ checklist",
        ],
        exit: &[
            "Specs approved by both",
            "Scope frozen (no new features in Week B)",
        ],
        checklist: [
            "Problem Spec complete",
            "Solution Spec complete",
            "Non-goals explicit",
            "Scope freeze declared",
        ],
    },
    PhaseDef {
        id: "p5",
        week: WeekLabel::B,
        title: "Build the Opinionated Product",
        timebox: "Days 8–11",
        purpose: "Ship a real reference product for one workflow. Must demo end-to-end.",
        owner_hint: "Week Lead (Support: Challenger)",
        tags: ["build", "open-source", "reference"],
        outputs: &[
            "Working end-to-end system (happy path)",
            "Seed/demo data",
            "Setup instructions + README (who it’s for / not for)",
        ],
        exit: &[
            "Demoable in <30 minutes",
            "README clearly states boundaries",
        ],
        checklist: [
            "Happy path implemented",
            "Seed data + demo script",
            "Setup steps documented",
            "README includes limits + non-goals",
        ],
    },
    PhaseDef {
        id: "p6",
        week: WeekLabel::B,
        title: "Public Release & Solution Validation",
        timebox: "Days 12–13",
        purpose: "Validate whether operators would switch; collect blockers for next cycle.",
        owner_hint: "Week Lead (Support: Challenger)",
        tags: ["release", "feedback", "iterate"],
        outputs: &[
            "3–6 minute demo video",
            "Release post explaining problem, solution, limitations",
            "Structured feedback captured (blockers)",
        ],
        exit: &[
            "At least 5 practitioner reactions (comments/DMs) or 2 deep threads",
            "Blockers list produced",
        ],
        checklist: [
            "Demo video recorded",
            "Repo published with tags/releases",
            "Release post published",
            "Feedback captured in a log",
        ],
    },
    PhaseDef {
        id: "p7",
        week: WeekLabel::B,
        title: "Commercial Engagements",
        timebox: "Day 14",
        purpose: "Convert engaged interest into paid setup/customization/ops without cold pitching.",
        owner_hint: "Week Lead (Support: Challenger)",
        tags: ["offer", "setup", "pilots"],
        outputs: &[
            "Pick ONE offer type: Setup OR Customization OR Ops",
            "Follow-ups only to engaged leads",
            "Pilot criteria + next steps",
        ],
        exit: &[
            "Offer selected and messaged consistently",
            "At least 3 qualified conversations scheduled or 1 pilot agreed",
        ],
        checklist: [
            "Offer type selected",
            "Message template finalized",
            "Engaged leads list created",
            "Calls scheduled / pilot defined",
        ],
    },
];

fn builtin_phases() -> Vec<Phase> {
    PHASE_DEFS
        .iter()
        .enumerate()
        .map(|(i, def)| Phase {
            id: def.id.to_string(),
            week: def.week,
            sequence: i as u32 + 1,
            title: def.title.to_string(),
            purpose: def.purpose.to_string(),
            timebox: def.timebox.to_string(),
            owner_hint: def.owner_hint.to_string(),
            tags: def.tags.iter().map(|t| t.to_string()).collect(),
            required_outputs: def.outputs.iter().map(|o| o.to_string()).collect(),
            exit_criteria: def.exit.iter().map(|e| e.to_string()).collect(),
            checklist: def
                .checklist
                .iter()
                .enumerate()
                .map(|(n, label)| ChecklistItem {
                    id: format!("c{}", n + 1),
                    label: label.to_string(),
                })
                .collect(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

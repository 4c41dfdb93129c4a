use serde::Serialize;

/// A one-page document outline used by one or more phases.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PhaseTemplate {
    pub slug: &'static str,
    pub title: &'static str,
    pub usage: &'static str,
    /// Phases the template is used in.
    pub phases: &'static [&'static str],
    pub fields: &'static [&'static str],
}

pub static TEMPLATES: [PhaseTemplate; 3] = [
    PhaseTemplate {
        slug: "problem-spec",
        title: "Problem Spec (1 page)",
        usage: "Used in Phase 1 (draft) and Phase 4 (final).",
        phases: &["p1", "p4"],
        fields: &[
            "Segment (industry + size + context)",
            "Persona (role + responsibilities)",
            "Observable symptoms (what’s happening)",
            "Current workaround/tools",
            "Why it hurts (money/time/risk)",
            "Success criteria (measurable)",
            "Non-goals (explicitly out of scope)",
        ],
    },
    PhaseTemplate {
        slug: "solution-spec",
        title: "Solution Spec (1 page)",
        usage: "Used in Phase 4 to freeze scope.",
        phases: &["p4"],
        fields: &[
            "Opinionated workflow (happy path steps)",
            "Minimal data model (entities)",
            "UX surfaces (screens/pages)",
            "Automations/integrations (if any)",
            "Constraints (what we refuse to build in V1)",
            "V1 done-when checklist",
        ],
    },
    PhaseTemplate {
        slug: "release-post",
        title: "Release Post Outline",
        usage: "Used in Phase 6.",
        phases: &["p6"],
        fields: &[
            "The problem in operator language",
            "What fails with current tools",
            "What the product does (one workflow)",
            "What it does NOT do",
            "Demo link + repo link",
            "The validation question: ‘What would stop you from using this?’",
        ],
    },
];

pub fn for_phase(phase_id: &str) -> Vec<&'static PhaseTemplate> {
    TEMPLATES
        .iter()
        .filter(|t| t.phases.iter().any(|p| *p == phase_id))
        .collect()
}

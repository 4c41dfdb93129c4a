use crate::output::{print_json, print_table};
use crate::session::Session;
use rethread_core::catalog::{week_meta, GUARDRAILS, PRINCIPLES};
use rethread_core::templates::{self, PhaseTemplate, TEMPLATES};
use rethread_core::types::WeekLabel;
use std::path::Path;

// ---------------------------------------------------------------------------
// guide
// ---------------------------------------------------------------------------

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let session = Session::open(root)?;
    let tracker = &session.tracker;

    if json {
        let weeks: Vec<_> = WeekLabel::all()
            .iter()
            .map(|&week| {
                serde_json::json!({
                    "meta": week_meta(week),
                    "phases": tracker
                        .catalog()
                        .phases_for_week(week)
                        .iter()
                        .map(|p| p.id.as_str())
                        .collect::<Vec<_>>(),
                    "roles": tracker.assignment(week),
                })
            })
            .collect();
        let value = serde_json::json!({
            "weeks": weeks,
            "principles": PRINCIPLES,
            "guardrails": GUARDRAILS,
        });
        return print_json(&value);
    }

    for &week in WeekLabel::all() {
        let meta = week_meta(week);
        let roles = tracker.assignment(week);
        println!("{}: {}", meta.name, meta.subtitle);
        println!("  {}", meta.summary);
        println!("  Lead: {}   Challenger: {}", roles.lead, roles.challenger);
        for phase in tracker.catalog().phases_for_week(week) {
            println!("  {}. {} ({})", phase.sequence, phase.title, phase.timebox);
        }
        println!();
    }

    println!("Principles:");
    for p in &PRINCIPLES {
        println!("  {}: {}", p.title, p.description);
    }
    println!("\nGuardrails (the challenger enforces these):");
    for g in &GUARDRAILS {
        println!("  - {g}");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// templates
// ---------------------------------------------------------------------------

pub fn list_templates(phase: Option<&str>, json: bool) -> anyhow::Result<()> {
    let selected: Vec<&PhaseTemplate> = match phase {
        Some(id) => templates::for_phase(id),
        None => TEMPLATES.iter().collect(),
    };

    if json {
        return print_json(&selected);
    }
    if selected.is_empty() {
        println!("No templates for that phase.");
        return Ok(());
    }
    print_table(
        &["SLUG", "TITLE", "PHASES"],
        selected
            .iter()
            .map(|t| vec![t.slug.to_string(), t.title.to_string(), t.phases.join(", ")])
            .collect(),
    );
    for t in &selected {
        println!("\n{} ({})", t.title, t.usage);
        for field in t.fields {
            println!("  - {field}");
        }
    }
    Ok(())
}

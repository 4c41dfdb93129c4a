use crate::output::{checkbox, print_json, print_table, ratio};
use crate::session::Session;
use rethread_core::catalog::{week_meta, Phase};
use rethread_core::progress::{phase_progress, Progress};
use rethread_core::templates;
use rethread_core::types::WeekLabel;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct PhaseRow<'a> {
    #[serde(flatten)]
    phase: &'a Phase,
    current: bool,
    progress: Progress,
}

// ---------------------------------------------------------------------------
// phases
// ---------------------------------------------------------------------------

pub fn list(
    root: &Path,
    week: Option<&str>,
    search: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let week = week.map(str::parse::<WeekLabel>).transpose()?;
    let session = Session::open(root)?;
    let tracker = &session.tracker;
    let current = tracker.current().id.as_str();

    let rows: Vec<PhaseRow> = tracker
        .catalog()
        .search(week, search.unwrap_or(""))
        .into_iter()
        .map(|phase| PhaseRow {
            current: phase.id == current,
            progress: phase_progress(phase, tracker.checklist()),
            phase,
        })
        .collect();

    if json {
        return print_json(&rows);
    }
    if rows.is_empty() {
        println!("No phases match.");
        return Ok(());
    }
    print_table(
        &["", "ID", "WEEK", "TITLE", "TIMEBOX", "DONE"],
        rows.iter()
            .map(|r| {
                vec![
                    if r.current { "*" } else { "" }.to_string(),
                    r.phase.id.clone(),
                    r.phase.week.to_string(),
                    r.phase.title.clone(),
                    r.phase.timebox.clone(),
                    ratio(&r.progress),
                ]
            })
            .collect(),
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

pub fn show(root: &Path, phase_id: Option<&str>, json: bool) -> anyhow::Result<()> {
    let session = Session::open(root)?;
    let tracker = &session.tracker;
    let phase = match phase_id {
        Some(id) => tracker.phase(id)?,
        None => tracker.current(),
    };
    let items = tracker.item_states(&phase.id)?;
    let progress = phase_progress(phase, tracker.checklist());
    let roles = tracker.assignment(phase.week);
    let phase_templates = templates::for_phase(&phase.id);

    if json {
        let value = serde_json::json!({
            "phase": phase,
            "items": items,
            "progress": progress,
            "roles": roles,
            "templates": phase_templates,
        });
        return print_json(&value);
    }

    let meta = week_meta(phase.week);
    println!(
        "{} · Phase {} of {} · {}",
        meta.name,
        phase.sequence,
        tracker.catalog().max_sequence(),
        phase.timebox
    );
    println!("{}", phase.title);
    println!("{}\n", phase.purpose);
    println!("Owner: {}", phase.owner_hint);
    println!("Lead: {}   Challenger: {}", roles.lead, roles.challenger);
    println!("Tags: {}", phase.tags.join(", "));

    println!("\nRequired outputs:");
    for output in &phase.required_outputs {
        println!("  - {output}");
    }
    println!("\nExit criteria:");
    for criterion in &phase.exit_criteria {
        println!("  - {criterion}");
    }

    println!("\nChecklist {}:", ratio(&progress));
    for item in &phase.checklist {
        let done = items.get(&item.id).copied().unwrap_or(false);
        println!("  {} {}  {}", checkbox(done), item.id, item.label);
    }

    if !phase_templates.is_empty() {
        println!("\nTemplates:");
        for t in phase_templates {
            println!("  {}  {}", t.slug, t.title);
        }
    }
    Ok(())
}

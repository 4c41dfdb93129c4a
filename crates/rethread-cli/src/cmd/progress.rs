use crate::output::{bar, print_json, print_table, ratio};
use crate::session::Session;
use rethread_core::progress::phase_progress;
use rethread_core::types::WeekLabel;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let session = Session::open(root)?;
    let tracker = &session.tracker;
    let state = tracker.checklist();
    let phases = tracker.catalog().list_phases();

    if json {
        let per_phase: serde_json::Map<String, serde_json::Value> = phases
            .iter()
            .map(|p| (p.id.clone(), serde_json::json!(phase_progress(p, state))))
            .collect();
        let value = serde_json::json!({
            "phases": per_phase,
            "weeks": {
                "A": tracker.week_progress(WeekLabel::A),
                "B": tracker.week_progress(WeekLabel::B),
            },
            "cycle": tracker.cycle_progress(),
        });
        return print_json(&value);
    }

    print_table(
        &["ID", "WEEK", "TITLE", "DONE", ""],
        phases
            .iter()
            .map(|p| {
                let progress = phase_progress(p, state);
                vec![
                    p.id.clone(),
                    p.week.to_string(),
                    p.title.clone(),
                    ratio(&progress),
                    bar(&progress),
                ]
            })
            .collect(),
    );
    println!();
    for &week in WeekLabel::all() {
        let progress = tracker.week_progress(week);
        println!("Week {week}  {}  {}", bar(&progress), ratio(&progress));
    }
    let cycle = tracker.cycle_progress();
    println!("Cycle   {}  {}", bar(&cycle), ratio(&cycle));
    Ok(())
}

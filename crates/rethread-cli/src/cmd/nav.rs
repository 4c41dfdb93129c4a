use crate::output::{print_json, ratio};
use crate::session::Session;
use rethread_core::progress::phase_progress;
use std::path::Path;

pub enum Move {
    Next,
    Prev,
    Jump(String),
    Gate,
}

pub fn run(root: &Path, step: Move, json: bool) -> anyhow::Result<()> {
    let mut session = Session::open(root)?;
    let before = session.tracker.position();
    let tracker = &mut session.tracker;
    match &step {
        Move::Next => {
            tracker.next();
        }
        Move::Prev => {
            tracker.prev();
        }
        Move::Jump(id) => {
            tracker.jump_to(id)?;
        }
        Move::Gate => {
            tracker.jump_to_decision_gate()?;
        }
    }

    let phase = tracker.current();
    let progress = phase_progress(phase, tracker.checklist());
    let max = tracker.catalog().max_sequence();

    if json {
        let value = serde_json::json!({
            "phase": phase.id,
            "title": phase.title,
            "week": phase.week,
            "sequence": phase.sequence,
            "moved": phase.sequence != before,
            "progress": progress,
        });
        return print_json(&value);
    }

    if phase.sequence == before && matches!(step, Move::Next | Move::Prev) {
        let edge = if phase.sequence == 1 { "first" } else { "last" };
        println!("Already at the {edge} phase.");
    }
    println!(
        "→ {} {} (phase {}/{}, week {}) {}",
        phase.id,
        phase.title,
        phase.sequence,
        max,
        phase.week,
        ratio(&progress)
    );
    Ok(())
}

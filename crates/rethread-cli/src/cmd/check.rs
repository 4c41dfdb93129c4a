use crate::output::{checkbox, print_json, ratio};
use crate::session::Session;
use clap::Subcommand;
use rethread_core::tracker::Tracker;
use std::path::Path;

#[derive(Subcommand)]
pub enum CheckSubcommand {
    /// Flip one checklist item
    Toggle {
        /// Item id (c1, c2, ...)
        item: String,
        /// Phase id (default: the current phase)
        #[arg(long)]
        phase: Option<String>,
    },
    /// Mark one item done, or not done with --off
    Set {
        item: String,
        #[arg(long)]
        phase: Option<String>,
        #[arg(long)]
        off: bool,
    },
    /// Clear a phase's checklist
    Reset {
        #[arg(long)]
        phase: Option<String>,
        /// Clear every phase
        #[arg(long, conflicts_with = "phase")]
        all: bool,
    },
    /// Show a phase's checklist
    List {
        #[arg(long)]
        phase: Option<String>,
    },
}

pub fn run(root: &Path, subcmd: CheckSubcommand, json: bool) -> anyhow::Result<()> {
    let mut session = Session::open(root)?;
    let tracker = &mut session.tracker;
    match subcmd {
        CheckSubcommand::Toggle { item, phase } => {
            let phase = phase_or_current(tracker, phase);
            let done = tracker.toggle_item(&phase, &item)?;
            report(tracker, &phase, &item, done, json)
        }
        CheckSubcommand::Set { item, phase, off } => {
            let phase = phase_or_current(tracker, phase);
            tracker.set_item(&phase, &item, !off)?;
            report(tracker, &phase, &item, !off, json)
        }
        CheckSubcommand::Reset { phase, all } => {
            if all {
                tracker.reset_all();
                if !json {
                    println!("Cleared every checklist.");
                }
            } else {
                let phase = phase_or_current(tracker, phase);
                tracker.reset_phase(&phase)?;
                if !json {
                    println!("Cleared checklist for {phase}.");
                }
            }
            if json {
                print_json(&serde_json::json!({ "progress": tracker.cycle_progress() }))?;
            }
            Ok(())
        }
        CheckSubcommand::List { phase } => {
            let phase = phase_or_current(tracker, phase);
            list(tracker, &phase, json)
        }
    }
}

fn phase_or_current(tracker: &Tracker, phase: Option<String>) -> String {
    phase.unwrap_or_else(|| tracker.current().id.clone())
}

fn report(tracker: &Tracker, phase: &str, item: &str, done: bool, json: bool) -> anyhow::Result<()> {
    let progress = tracker.phase_progress(phase)?;
    if json {
        let value = serde_json::json!({
            "phase": phase,
            "item": item,
            "done": done,
            "progress": progress,
        });
        return print_json(&value);
    }
    println!("{} {phase}/{item}  {}", checkbox(done), ratio(&progress));
    Ok(())
}

fn list(tracker: &Tracker, phase_id: &str, json: bool) -> anyhow::Result<()> {
    let items = tracker.item_states(phase_id)?;
    if json {
        return print_json(&items);
    }
    let phase = tracker.phase(phase_id)?;
    println!("{} {}  {}", phase.id, phase.title, ratio(&tracker.phase_progress(phase_id)?));
    for item in &phase.checklist {
        let done = items.get(&item.id).copied().unwrap_or(false);
        println!("  {} {}  {}", checkbox(done), item.id, item.label);
    }
    Ok(())
}

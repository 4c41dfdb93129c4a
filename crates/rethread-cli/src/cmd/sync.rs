use crate::output::print_json;
use crate::session::Session;
use anyhow::Context;
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum SyncSubcommand {
    /// Write local state to the remote mirror
    Push,
    /// Replace local state with the remote copy
    Pull,
}

pub fn run(root: &Path, subcmd: SyncSubcommand, json: bool) -> anyhow::Result<()> {
    let mut session = Session::open(root)?;
    let (action, changed) = match subcmd {
        SyncSubcommand::Push => {
            session.tracker.push_remote().context("push failed")?;
            ("push", true)
        }
        SyncSubcommand::Pull => {
            let pulled = session.tracker.pull_remote().context("pull failed")?;
            ("pull", pulled)
        }
    };

    if json {
        return print_json(&serde_json::json!({ "action": action, "changed": changed }));
    }
    match (action, changed) {
        ("push", _) => println!("Pushed tracker state."),
        (_, true) => println!("Pulled tracker state from remote."),
        _ => println!("Remote is empty; local state kept."),
    }
    Ok(())
}

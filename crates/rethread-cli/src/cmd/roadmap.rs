use crate::output::print_json;
use anyhow::Context;
use rethread_core::paths;
use rethread_core::roadmap::Roadmap;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let roadmap = Roadmap::load(root)
        .with_context(|| format!("failed to read {}", paths::ROADMAP_FILE))?;

    if json {
        return print_json(&roadmap);
    }
    if roadmap.sprints.is_empty() {
        println!("No sprints planned. Add them to {}.", paths::ROADMAP_FILE);
        return Ok(());
    }
    let active = roadmap.active().map(|s| s.label.as_str());
    for sprint in &roadmap.sprints {
        let marker = if Some(sprint.label.as_str()) == active { "▶" } else { " " };
        let date = if sprint.date.is_empty() {
            String::new()
        } else {
            format!("  ({})", sprint.date)
        };
        println!("{marker} {}: {}{date}", sprint.label, sprint.title);
        if !sprint.description.is_empty() {
            println!("    {}", sprint.description);
        }
    }
    Ok(())
}

use anyhow::Context;
use rethread_core::{config::Config, io, paths};
use std::path::Path;

const ROADMAP_SEED: &str = "{\n  \"sprints\": []\n}\n";

pub fn run(root: &Path) -> anyhow::Result<()> {
    let project_name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "rethread".to_string());

    println!("Initializing rethread in: {}", root.display());

    for dir in [paths::RETHREAD_DIR, paths::STATE_DIR] {
        let p = root.join(dir);
        io::ensure_dir(&p).with_context(|| format!("failed to create {}", p.display()))?;
    }

    if paths::config_path(root).exists() {
        println!("  exists:  {}", paths::CONFIG_FILE);
    } else {
        Config::new(&project_name)
            .save(root)
            .context("failed to write config.yaml")?;
        println!("  created: {}", paths::CONFIG_FILE);
    }

    let roadmap = paths::roadmap_path(root);
    if io::write_if_missing(&roadmap, ROADMAP_SEED.as_bytes())
        .with_context(|| format!("failed to write {}", roadmap.display()))?
    {
        println!("  created: {}", paths::ROADMAP_FILE);
    } else {
        println!("  exists:  {}", paths::ROADMAP_FILE);
    }

    println!("\nrethread initialized.");
    println!("Next: rethread show");
    Ok(())
}

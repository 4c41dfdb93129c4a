use crate::output::print_json;
use crate::session::Session;
use clap::Subcommand;
use rethread_core::home::HomeContent;
use std::path::Path;

#[derive(Subcommand)]
pub enum HomeSubcommand {
    /// Print the homepage content
    Show,
    /// Edit one or more fields and save
    Set {
        /// FIELD=VALUE pairs, e.g. hero_title="Weaving Strategy" tenets.0.title=...
        #[arg(required = true, value_name = "FIELD=VALUE")]
        edits: Vec<String>,
    },
}

pub fn run(root: &Path, subcmd: HomeSubcommand, json: bool) -> anyhow::Result<()> {
    let mut session = Session::open(root)?;
    let content = match subcmd {
        HomeSubcommand::Show => session.tracker.home(),
        HomeSubcommand::Set { edits } => {
            let pairs = edits
                .iter()
                .map(|e| {
                    e.split_once('=')
                        .ok_or_else(|| anyhow::anyhow!("expected FIELD=VALUE, got '{e}'"))
                })
                .collect::<anyhow::Result<Vec<_>>>()?;
            let today = chrono::Local::now().date_naive();
            session.tracker.edit_home(pairs, today)?
        }
    };
    if json {
        return print_json(content);
    }
    print_home(content);
    Ok(())
}

fn print_home(home: &HomeContent) {
    println!("{}", home.document_title);
    println!("{} / {}\n", home.version, home.updated_date);
    println!("{} {}", home.hero_title, home.hero_subtitle);
    println!("{}\n", home.hero_description);
    for tenet in &home.tenets {
        println!("{}  {}", tenet.number, tenet.title);
        println!("    {}", tenet.description);
    }
    println!();
    for step in &home.sprint_cycle {
        println!("{}: {}", step.label, step.title);
        println!("    {}", step.description);
    }
}

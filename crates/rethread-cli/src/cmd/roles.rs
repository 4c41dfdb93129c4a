use crate::output::{print_json, print_table};
use crate::session::Session;
use clap::Subcommand;
use rethread_core::rotation::{Assignment, RoleRotation};
use rethread_core::types::WeekLabel;
use std::path::Path;

#[derive(Subcommand)]
pub enum RolesSubcommand {
    /// Show who leads and who challenges each week
    Show,
    /// Set the lead and/or challenger of one week
    Set {
        /// Week label (A or B)
        week: String,
        #[arg(long)]
        lead: Option<String>,
        #[arg(long)]
        challenger: Option<String>,
    },
    /// Exchange the week A and week B assignments
    Swap,
}

pub fn run(root: &Path, subcmd: RolesSubcommand, json: bool) -> anyhow::Result<()> {
    let mut session = Session::open(root)?;
    let tracker = &mut session.tracker;
    let rotation = match subcmd {
        RolesSubcommand::Show => tracker.rotation(),
        RolesSubcommand::Set {
            week,
            lead,
            challenger,
        } => {
            let week: WeekLabel = week.parse()?;
            if lead.is_none() && challenger.is_none() {
                anyhow::bail!("nothing to set: pass --lead and/or --challenger");
            }
            let current = tracker.assignment(week).clone();
            tracker.set_assignment(
                week,
                Assignment::new(
                    lead.unwrap_or(current.lead),
                    challenger.unwrap_or(current.challenger),
                ),
            );
            tracker.rotation()
        }
        RolesSubcommand::Swap => tracker.swap_roles(),
    };
    print_rotation(rotation, json)
}

fn print_rotation(rotation: &RoleRotation, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(rotation);
    }
    print_table(
        &["WEEK", "LEAD", "CHALLENGER"],
        WeekLabel::all()
            .iter()
            .map(|&week| {
                let a = rotation.assignment(week);
                vec![week.to_string(), a.lead.clone(), a.challenger.clone()]
            })
            .collect(),
    );
    if rotation.swapped {
        println!("\n(swapped from the configured rotation)");
    }
    Ok(())
}

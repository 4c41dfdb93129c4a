use crate::error::{CycleError, Result};
use crate::paths::HOME_KEY;
use crate::storage::Backing;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenet {
    pub number: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleStep {
    pub label: String,
    pub title: String,
    pub description: String,
}

/// Editable front-page copy. Stored documents are merged over the defaults
/// field by field, so older documents missing a field still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HomeContent {
    pub document_title: String,
    pub hero_title: String,
    pub hero_subtitle: String,
    pub hero_description: String,
    pub tenets: Vec<Tenet>,
    pub sprint_cycle: Vec<CycleStep>,
    pub version: String,
    pub updated_date: String,
}

impl Default for HomeContent {
    fn default() -> Self {
        let tenet = |number: &str, title: &str, description: &str| Tenet {
            number: number.into(),
            title: title.into(),
            description: description.into(),
        };
        let step = |label: &str, title: &str, description: &str| CycleStep {
            label: label.into(),
            title: title.into(),
            description: description.into(),
        };
        Self {
            document_title: "Draft Internal Strategy, Planning & Operations Document".into(),
            hero_title: "Weaving Strategy".into(),
            hero_subtitle: "Into Software.".into(),
            hero_description: "We identify fragmented workflows in mid-market and enterprise \
                organizations and re-thread them into seamless, data-driven systems. We replace \
                legacy debt with custom, owned solutions, but only after rigorous validation."
                .into(),
            tenets: vec![
                tenet(
                    "01",
                    "Consulting Before Coding",
                    "We are strategic partners to $1M+ revenue organizations. Code is a tool, \
                     not the product. We value impact over hours.",
                ),
                tenet(
                    "02",
                    "Validate, Then Build",
                    "We never build \"speculative\" products. Mockups sell the vision; \
                     engineering starts only after the contract is signed.",
                ),
                tenet(
                    "03",
                    "Data Over Intuition",
                    "We quantify the pain (e.g., \"$10k/mo lost\") before pitching. Research \
                     is our spearhead for acquisition.",
                ),
            ],
            sprint_cycle: vec![
                step(
                    "Phase 1",
                    "Intake & Research",
                    "Anytime an idea strikes, it goes to the Backlog. Before a Sprint starts, \
                     we conduct market research to assess viability.",
                ),
                step(
                    "Week 1",
                    "Build & Prep",
                    "Monday Sprint Start: Select top backlog item. Create \"Demo First\" assets. \
                     Rebuild prospect's site/app as a high-fidelity mockup.",
                ),
                step(
                    "Week 2",
                    "Outreach & Execution",
                    "\"I built this for you.\" Cold outreach with assets. Goal: Book demo \
                     meetings to validate interest.",
                ),
                step(
                    "Review",
                    "Retro & Pivot",
                    "Friday Wk 2: Analyze response data. If valid → Contract. If invalid → \
                     Kill. Decide topic for Sprint 2.",
                ),
            ],
            version: "Internal OS v1.0".into(),
            updated_date: "Updated Jan 2026".into(),
        }
    }
}

impl HomeContent {
    /// Set one field by dotted path: `hero_title`, `tenets.1.title`,
    /// `sprint_cycle.0.description`, ... List entries can only be edited, not
    /// added; tenet numbers and step labels are fixed.
    pub fn set_field(&mut self, path: &str, value: impl Into<String>) -> Result<()> {
        let unknown = || CycleError::UnknownField(path.to_string());
        let slot = match path.split('.').collect::<Vec<_>>().as_slice() {
            ["document_title"] => &mut self.document_title,
            ["hero_title"] => &mut self.hero_title,
            ["hero_subtitle"] => &mut self.hero_subtitle,
            ["hero_description"] => &mut self.hero_description,
            ["version"] => &mut self.version,
            ["tenets", idx, field] => {
                let tenet = idx
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| self.tenets.get_mut(i))
                    .ok_or_else(unknown)?;
                match *field {
                    "title" => &mut tenet.title,
                    "description" => &mut tenet.description,
                    _ => return Err(unknown()),
                }
            }
            ["sprint_cycle", idx, field] => {
                let step = idx
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| self.sprint_cycle.get_mut(i))
                    .ok_or_else(unknown)?;
                match *field {
                    "title" => &mut step.title,
                    "description" => &mut step.description,
                    _ => return Err(unknown()),
                }
            }
            _ => return Err(unknown()),
        };
        *slot = value.into();
        Ok(())
    }

    /// Stamp `updated_date` as "Updated Mon YYYY".
    pub fn stamp(&mut self, today: NaiveDate) {
        self.updated_date = format!("Updated {}", today.format("%b %Y"));
    }
}

// ---------------------------------------------------------------------------
// HomeStore
// ---------------------------------------------------------------------------

pub struct HomeStore {
    content: HomeContent,
    backing: Backing,
}

impl HomeStore {
    pub fn open(mut backing: Backing) -> Self {
        let content = backing.hydrate(HOME_KEY).unwrap_or_default();
        Self { content, backing }
    }

    pub fn content(&self) -> &HomeContent {
        &self.content
    }

    pub fn is_degraded(&self) -> bool {
        self.backing.is_degraded()
    }

    /// Apply edits and save once, stamped with `today`. Nothing is saved if
    /// any edit names an unknown field.
    pub fn edit<'a>(
        &mut self,
        edits: impl IntoIterator<Item = (&'a str, &'a str)>,
        today: NaiveDate,
    ) -> Result<&HomeContent> {
        let mut next = self.content.clone();
        for (path, value) in edits {
            next.set_field(path, value)?;
        }
        next.stamp(today);
        self.replace(next);
        Ok(&self.content)
    }

    pub fn replace(&mut self, content: HomeContent) {
        self.content = content;
        self.backing.persist(HOME_KEY, &self.content);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

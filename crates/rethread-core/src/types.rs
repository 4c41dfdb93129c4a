use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// WeekLabel
// ---------------------------------------------------------------------------

/// The half of the two-week cycle a phase belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WeekLabel {
    A,
    B,
}

impl WeekLabel {
    pub fn all() -> &'static [WeekLabel] {
        &[WeekLabel::A, WeekLabel::B]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WeekLabel::A => "A",
            WeekLabel::B => "B",
        }
    }
}

impl fmt::Display for WeekLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WeekLabel {
    type Err = crate::error::CycleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" | "week_a" | "week-a" => Ok(WeekLabel::A),
            "b" | "week_b" | "week-b" => Ok(WeekLabel::B),
            _ => Err(crate::error::CycleError::UnknownWeek(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

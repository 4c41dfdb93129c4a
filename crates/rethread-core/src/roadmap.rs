use crate::error::Result;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprint {
    pub label: String,
    pub title: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub description: String,
}

/// Strategic roadmap read from `.rethread/roadmap.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roadmap {
    #[serde(default)]
    pub sprints: Vec<Sprint>,
}

impl Roadmap {
    /// Load the roadmap file; a missing file is an empty roadmap. A malformed
    /// file is an error since it is hand-edited and the author should know.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::roadmap_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// The sprint in progress. The roadmap is worked top-down, so it is the
    /// first entry.
    pub fn active(&self) -> Option<&Sprint> {
        self.sprints.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CycleError;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let roadmap = Roadmap::load(dir.path()).unwrap();
        assert!(roadmap.sprints.is_empty());
        assert!(roadmap.active().is_none());
    }

    #[test]
    fn loads_sprints_in_order() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".rethread")).unwrap();
        std::fs::write(
            dir.path().join(".rethread/roadmap.json"),
            r#"{"sprints":[
                {"label":"Sprint 1","title":"Transportation","date":"Jan 2026","description":"Airport transfers"},
                {"label":"Sprint 2","title":"Field services"}
            ]}"#,
        )
        .unwrap();
        let roadmap = Roadmap::load(dir.path()).unwrap();
        assert_eq!(roadmap.sprints.len(), 2);
        assert_eq!(roadmap.active().unwrap().title, "Transportation");
        assert_eq!(roadmap.sprints[1].date, "");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".rethread")).unwrap();
        std::fs::write(dir.path().join(".rethread/roadmap.json"), "[oops").unwrap();
        assert!(matches!(
            Roadmap::load(dir.path()),
            Err(CycleError::Json(_))
        ));
    }
}

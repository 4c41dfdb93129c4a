use thiserror::Error;

#[derive(Debug, Error)]
pub enum CycleError {
    #[error("not initialized: run 'rethread init'")]
    NotInitialized,

    #[error("unknown phase: {0}")]
    UnknownPhase(String),

    #[error("unknown checklist item '{item}' in phase '{phase}'")]
    UnknownItem { phase: String, item: String },

    #[error("unknown week label '{0}': expected A or B")]
    UnknownWeek(String),

    #[error("unknown homepage field '{0}'")]
    UnknownField(String),

    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("invalid storage key '{0}': must be lowercase alphanumeric with hyphens")]
    InvalidKey(String),

    #[error("persistence unavailable: {0}")]
    PersistenceUnavailable(String),

    #[error("remote sync failed: {0}")]
    RemoteSyncFailed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl CycleError {
    /// True for the phase/item/week lookup failures against the static catalog.
    pub fn is_unknown_reference(&self) -> bool {
        matches!(
            self,
            CycleError::UnknownPhase(_) | CycleError::UnknownItem { .. } | CycleError::UnknownWeek(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, CycleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_reference_family() {
        assert!(CycleError::UnknownPhase("p9".into()).is_unknown_reference());
        assert!(CycleError::UnknownItem {
            phase: "p1".into(),
            item: "c9".into()
        }
        .is_unknown_reference());
        assert!(CycleError::UnknownWeek("C".into()).is_unknown_reference());
        assert!(!CycleError::RemoteSyncFailed("boom".into()).is_unknown_reference());
        assert!(!CycleError::PersistenceUnavailable("full".into()).is_unknown_reference());
    }

    #[test]
    fn item_message_names_both_ids() {
        let err = CycleError::UnknownItem {
            phase: "p2".into(),
            item: "c7".into(),
        };
        assert_eq!(err.to_string(), "unknown checklist item 'c7' in phase 'p2'");
    }
}

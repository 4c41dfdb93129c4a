use crate::error::{CycleError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const RETHREAD_DIR: &str = ".rethread";
pub const STATE_DIR: &str = ".rethread/state";

pub const CONFIG_FILE: &str = ".rethread/config.yaml";
pub const ROADMAP_FILE: &str = ".rethread/roadmap.json";

// ---------------------------------------------------------------------------
// Storage keys
// ---------------------------------------------------------------------------

pub const CHECKLIST_KEY: &str = "checklist";
pub const ROTATION_KEY: &str = "rotation";
pub const NAVIGATOR_KEY: &str = "navigator";
pub const HOME_KEY: &str = "home";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn rethread_dir(root: &Path) -> PathBuf {
    root.join(RETHREAD_DIR)
}

pub fn state_dir(root: &Path) -> PathBuf {
    root.join(STATE_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn roadmap_path(root: &Path) -> PathBuf {
    root.join(ROADMAP_FILE)
}

/// File backing a storage key inside `dir`.
pub fn key_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{key}.json"))
}

// ---------------------------------------------------------------------------
// Key validation
// ---------------------------------------------------------------------------

static KEY_RE: OnceLock<Regex> = OnceLock::new();

fn key_re() -> &'static Regex {
    KEY_RE.get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9\-]*[a-z0-9]$|^[a-z0-9]$").unwrap())
}

/// Keys become file names, so they are restricted to a path-safe slug.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() || key.len() > 64 || !key_re().is_match(key) {
        return Err(CycleError::InvalidKey(key.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_keys() {
        for key in [CHECKLIST_KEY, ROTATION_KEY, NAVIGATOR_KEY, HOME_KEY, "a", "week-a-1"] {
            validate_key(key).unwrap_or_else(|_| panic!("expected valid: {key}"));
        }
    }

    #[test]
    fn invalid_keys() {
        for key in ["", "-lead", "trail-", "../escape", "Upper", "a_b", "a/b"] {
            assert!(validate_key(key).is_err(), "expected invalid: {key}");
        }
    }

    #[test]
    fn path_helpers() {
        let root = Path::new("/tmp/proj");
        assert_eq!(
            config_path(root),
            PathBuf::from("/tmp/proj/.rethread/config.yaml")
        );
        assert_eq!(
            key_path(&state_dir(root), CHECKLIST_KEY),
            PathBuf::from("/tmp/proj/.rethread/state/checklist.json")
        );
        assert_eq!(
            roadmap_path(root),
            PathBuf::from("/tmp/proj/.rethread/roadmap.json")
        );
    }
}

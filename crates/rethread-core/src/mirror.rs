//! Optional remote copy of the tracker's JSON documents.
//!
//! Local storage stays the record of truth; a mirror is written after local
//! saves and read only on an explicit pull. Every failure comes back as
//! `CycleError::RemoteSyncFailed`.

use crate::config::MirrorConfig;
use crate::error::{CycleError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

pub trait RemoteMirror {
    /// Fetch the mirrored document, `None` if it has never been written.
    fn read_remote(&self) -> Result<Option<Value>>;

    fn write_remote(&self, value: &Value, message: &str) -> Result<()>;
}

fn sync_failed(err: impl std::fmt::Display) -> CycleError {
    CycleError::RemoteSyncFailed(err.to_string())
}

// ---------------------------------------------------------------------------
// GithubMirror
// ---------------------------------------------------------------------------

/// Stores one JSON file in a GitHub repository through the contents API.
pub struct GithubMirror {
    client: Client,
    url: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct ContentsFile {
    content: String,
    sha: String,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: Option<String>,
}

impl GithubMirror {
    pub fn new(config: &MirrorConfig, token: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("rethread/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(sync_failed)?;
        let url = format!(
            "{}/repos/{}/{}/contents/{}",
            config.api_base.trim_end_matches('/'),
            config.owner,
            config.repo,
            config.path.trim_start_matches('/'),
        );
        Ok(Self {
            client,
            url,
            token: token.into(),
        })
    }

    /// Build from config, reading the token from `config.token_env`.
    pub fn from_config(config: &MirrorConfig) -> Result<Self> {
        let token = std::env::var(&config.token_env).map_err(|_| {
            CycleError::RemoteSyncFailed(format!(
                "GitHub token not configured: set {}",
                config.token_env
            ))
        })?;
        Self::new(config, token)
    }

    fn fetch(&self) -> Result<Option<ContentsFile>> {
        let resp = self
            .client
            .get(&self.url)
            .header("Authorization", format!("token {}", self.token))
            .header("Accept", "application/vnd.github.v3+json")
            .send()
            .map_err(sync_failed)?;
        match resp.status() {
            StatusCode::NOT_FOUND => Ok(None),
            s if s.is_success() => resp.json().map(Some).map_err(sync_failed),
            s => Err(CycleError::RemoteSyncFailed(format!("GitHub API error: {s}"))),
        }
    }
}

impl RemoteMirror for GithubMirror {
    fn read_remote(&self) -> Result<Option<Value>> {
        let Some(file) = self.fetch()? else {
            return Ok(None);
        };
        // GitHub wraps base64 content at 60 columns.
        let packed: String = file.content.split_whitespace().collect();
        let bytes = STANDARD.decode(packed).map_err(sync_failed)?;
        let value = serde_json::from_slice(&bytes).map_err(sync_failed)?;
        Ok(Some(value))
    }

    fn write_remote(&self, value: &Value, message: &str) -> Result<()> {
        // Updating needs the current blob sha; a failed lookup means create.
        let sha = match self.fetch() {
            Ok(file) => file.map(|f| f.sha),
            Err(e) => {
                tracing::debug!(error = %e, "no current sha, creating file");
                None
            }
        };
        let pretty = serde_json::to_string_pretty(value)?;
        let mut body = serde_json::json!({
            "message": message,
            "content": STANDARD.encode(pretty.as_bytes()),
        });
        if let Some(sha) = sha {
            body["sha"] = Value::String(sha);
        }

        let resp = self
            .client
            .put(&self.url)
            .header("Authorization", format!("token {}", self.token))
            .header("Accept", "application/vnd.github.v3+json")
            .json(&body)
            .send()
            .map_err(sync_failed)?;
        let status = resp.status();
        if status.is_success() {
            tracing::debug!(url = %self.url, "mirrored document");
            return Ok(());
        }
        let detail = resp
            .json::<ApiError>()
            .ok()
            .and_then(|e| e.message)
            .unwrap_or_else(|| status.to_string());
        Err(CycleError::RemoteSyncFailed(format!("GitHub API error: {detail}")))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    const PATH: &str = "/repos/team/ops/contents/data/dashboard.json";

    fn mirror_for(server: &mockito::Server) -> GithubMirror {
        let config = MirrorConfig {
            owner: "team".into(),
            repo: "ops".into(),
            path: "data/dashboard.json".into(),
            token_env: "UNUSED_IN_TESTS".into(),
            api_base: server.url(),
        };
        GithubMirror::new(&config, "s3cret").unwrap()
    }

    fn contents_body(doc: &Value, sha: &str) -> String {
        let encoded = STANDARD.encode(doc.to_string());
        // Split like GitHub does to exercise whitespace stripping.
        let (head, tail) = encoded.split_at(encoded.len() / 2);
        json!({ "content": format!("{head}\n{tail}\n"), "sha": sha }).to_string()
    }

    #[test]
    fn read_decodes_content() {
        let mut server = mockito::Server::new();
        let doc = json!({ "checklist": { "p1": { "c1": true } } });
        let mock = server
            .mock("GET", PATH)
            .match_header("authorization", "token s3cret")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(contents_body(&doc, "abc123"))
            .create();

        let got = mirror_for(&server).read_remote().unwrap();
        assert_eq!(got, Some(doc));
        mock.assert();
    }

    #[test]
    fn read_missing_file_is_none() {
        let mut server = mockito::Server::new();
        let _get = server.mock("GET", PATH).with_status(404).create();
        assert_eq!(mirror_for(&server).read_remote().unwrap(), None);
    }

    #[test]
    fn read_server_error_is_sync_failure() {
        let mut server = mockito::Server::new();
        let _get = server.mock("GET", PATH).with_status(500).create();
        assert!(matches!(
            mirror_for(&server).read_remote(),
            Err(CycleError::RemoteSyncFailed(_))
        ));
    }

    #[test]
    fn write_updates_with_existing_sha() {
        let mut server = mockito::Server::new();
        let _get = server
            .mock("GET", PATH)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(contents_body(&json!({}), "oldsha"))
            .create();
        let put = server
            .mock("PUT", PATH)
            .match_body(Matcher::PartialJson(json!({
                "message": "Update tracker",
                "sha": "oldsha",
            })))
            .with_status(200)
            .with_body("{}")
            .create();

        mirror_for(&server)
            .write_remote(&json!({ "a": 1 }), "Update tracker")
            .unwrap();
        put.assert();
    }

    #[test]
    fn write_creates_without_sha() {
        let mut server = mockito::Server::new();
        let _get = server.mock("GET", PATH).with_status(404).create();
        let put = server
            .mock("PUT", PATH)
            .match_body(Matcher::PartialJson(json!({ "message": "first" })))
            .with_status(201)
            .with_body("{}")
            .create();

        mirror_for(&server).write_remote(&json!([]), "first").unwrap();
        put.assert();
    }

    #[test]
    fn write_failure_carries_api_message() {
        let mut server = mockito::Server::new();
        let _get = server.mock("GET", PATH).with_status(404).create();
        let _put = server
            .mock("PUT", PATH)
            .with_status(422)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message":"Invalid request"}"#)
            .create();

        let err = mirror_for(&server)
            .write_remote(&json!({}), "bad")
            .unwrap_err();
        assert!(err.to_string().contains("Invalid request"), "{err}");
    }

    #[test]
    fn missing_token_env_fails() {
        let config = MirrorConfig {
            token_env: "RETHREAD_TEST_TOKEN_THAT_IS_NEVER_SET".into(),
            ..MirrorConfig::default()
        };
        assert!(matches!(
            GithubMirror::from_config(&config),
            Err(CycleError::RemoteSyncFailed(_))
        ));
    }
}

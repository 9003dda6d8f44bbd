//! Best-effort remote content: a public repository listing appended to the
//! projects planet.
//!
//! Nothing here touches the network. Hosts implement [`ContentSource`] with
//! whatever transport they have and feed the result into
//! [`EnrichmentState`]. A failure only ever becomes inline status text.

use log::{info, warn};
use serde::Deserialize;
use thiserror::Error;

/// Repository listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoQuery {
    pub user: String,
    pub limit: u32,
}

impl RepoQuery {
    pub fn new(user: impl Into<String>, limit: u32) -> Self {
        Self {
            user: user.into(),
            limit,
        }
    }

    /// Public listing URL, most recently updated first.
    pub fn url(&self) -> String {
        format!(
            "https://api.github.com/users/{}/repos?sort=updated&per_page={}",
            self.user, self.limit
        )
    }
}

/// One entry of the listing. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RepoItem {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub html_url: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub stargazers_count: u32,
    #[serde(default)]
    pub fork: bool,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("HTTP status {0}")]
    Status(u16),
    #[error("unexpected response: {0}")]
    Parse(String),
}

/// Anything that can answer a [`RepoQuery`].
pub trait ContentSource {
    fn fetch(&self, query: &RepoQuery) -> Result<Vec<RepoItem>, FetchError>;
}

/// Decode a listing body. Forks are dropped.
pub fn parse_listing(json: &str) -> Result<Vec<RepoItem>, FetchError> {
    let items: Vec<RepoItem> =
        serde_json::from_str(json).map_err(|e| FetchError::Parse(e.to_string()))?;
    Ok(items.into_iter().filter(|item| !item.fork).collect())
}

/// Plain-text block appended to the projects content.
pub fn render_items(items: &[RepoItem]) -> String {
    let mut out = String::from("Latest repositories\n");
    for item in items {
        out.push_str("- ");
        out.push_str(&item.name);
        if let Some(language) = &item.language {
            out.push_str(&format!(" [{language}]"));
        }
        if item.stargazers_count > 0 {
            out.push_str(&format!(" ({} stars)", item.stargazers_count));
        }
        if let Some(description) = item.description.as_deref().filter(|d| !d.is_empty()) {
            out.push_str(": ");
            out.push_str(description);
        }
        out.push('\n');
    }
    out
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum EnrichmentState {
    #[default]
    NotLoaded,
    Loading,
    Loaded(Vec<RepoItem>),
    Failed(String),
}

impl EnrichmentState {
    /// Move to `Loading`. Returns `false` if a fetch already started.
    pub fn start(&mut self) -> bool {
        if matches!(self, Self::NotLoaded) {
            *self = Self::Loading;
            true
        } else {
            false
        }
    }

    pub fn finish(&mut self, result: Result<Vec<RepoItem>, FetchError>) {
        *self = match result {
            Ok(items) => {
                info!("enrichment loaded {} repositories", items.len());
                Self::Loaded(items)
            }
            Err(e) => {
                warn!("enrichment failed: {e}");
                Self::Failed(e.to_string())
            }
        };
    }

    /// Run a fetch synchronously through `source`.
    pub fn load_from(&mut self, source: &impl ContentSource, query: &RepoQuery) {
        if self.start() {
            self.finish(source.fetch(query));
        }
    }

    pub fn status_line(&self) -> String {
        match self {
            Self::NotLoaded => String::new(),
            Self::Loading => "Loading repositories...".to_string(),
            Self::Loaded(items) if items.is_empty() => "No public repositories".to_string(),
            Self::Loaded(items) => format!("{} repositories", items.len()),
            Self::Failed(message) => format!("Repositories unavailable ({message})"),
        }
    }

    pub fn items(&self) -> &[RepoItem] {
        match self {
            Self::Loaded(items) => items,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"[
        {"name": "orrery", "description": "3D portfolio", "html_url": "https://example.com/orrery",
         "language": "Rust", "stargazers_count": 4, "fork": false, "size": 120},
        {"name": "forked", "description": null, "html_url": "https://example.com/forked",
         "language": null, "stargazers_count": 0, "fork": true},
        {"name": "notes", "html_url": "https://example.com/notes"}
    ]"#;

    struct Canned(Result<Vec<RepoItem>, FetchError>);

    impl ContentSource for Canned {
        fn fetch(&self, _query: &RepoQuery) -> Result<Vec<RepoItem>, FetchError> {
            self.0.clone()
        }
    }

    #[test]
    fn url_carries_user_and_limit() {
        let url = RepoQuery::new("someone", 6).url();
        assert_eq!(
            url,
            "https://api.github.com/users/someone/repos?sort=updated&per_page=6"
        );
    }

    #[test]
    fn parse_skips_forks_and_tolerates_missing_fields() {
        let items = parse_listing(LISTING).unwrap();
        let names: Vec<_> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["orrery", "notes"]);
        assert_eq!(items[1].language, None);
    }

    #[test]
    fn garbage_is_a_parse_error() {
        assert!(matches!(
            parse_listing("{\"message\": \"rate limited\"}"),
            Err(FetchError::Parse(_))
        ));
    }

    #[test]
    fn render_lists_every_item() {
        let text = render_items(&parse_listing(LISTING).unwrap());
        assert!(text.contains("- orrery [Rust] (4 stars): 3D portfolio"));
        assert!(text.contains("- notes\n"));
    }

    #[test]
    fn failure_becomes_status_text() {
        let mut state = EnrichmentState::default();
        state.load_from(&Canned(Err(FetchError::Status(403))), &RepoQuery::new("x", 1));
        assert_eq!(state.status_line(), "Repositories unavailable (HTTP status 403)");
        assert!(state.items().is_empty());
    }

    #[test]
    fn fetch_happens_once() {
        let mut state = EnrichmentState::default();
        assert!(state.start());
        assert!(!state.start());
        assert_eq!(state.status_line(), "Loading repositories...");
        state.finish(Ok(vec![]));
        assert_eq!(state.status_line(), "No public repositories");
    }
}

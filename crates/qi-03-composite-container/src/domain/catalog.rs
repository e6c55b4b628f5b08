//! Library catalog: maps library interactive ids to URLs.

use crate::domain::authored::SubInteractive;
use std::collections::HashMap;

/// Known library interactives.
#[derive(Debug, Clone, Default)]
pub struct LibraryCatalog {
    urls: HashMap<String, String>,
}

impl LibraryCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a library entry.
    #[must_use]
    pub fn with_entry(mut self, library_interactive_id: impl Into<String>, url: impl Into<String>) -> Self {
        self.urls.insert(library_interactive_id.into(), url.into());
        self
    }

    /// URL of a library entry.
    #[must_use]
    pub fn url_of(&self, library_interactive_id: &str) -> Option<&str> {
        self.urls.get(library_interactive_id).map(String::as_str)
    }

    /// URL to load for `sub`: its library entry if it names a known one,
    /// its literal URL otherwise.
    #[must_use]
    pub fn resolve(&self, sub: &SubInteractive) -> Option<String> {
        sub.library_interactive_id
            .as_deref()
            .and_then(|lib| self.url_of(lib))
            .map(str::to_string)
            .or_else(|| sub.url.clone())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

use std::fmt;

use anyhow::Result;

mod client;
mod record;

pub use client::{PivotalClient, DEFAULT_API_URL};
pub use record::Record;

/// Remote story operations the workflows rely on.
pub trait Tracker {
    fn list_stories(&self, project_id: u64, filter: &Filter) -> Result<Vec<Record>>;

    /// Overwrite the named fields; the server answers with the full story.
    fn update_story(
        &self,
        project_id: u64,
        story_id: u64,
        fields: &[(&str, &str)],
    ) -> Result<Record>;

    fn add_note(&self, project_id: u64, story_id: u64, text: &str) -> Result<String>;
}

/// Story search terms, kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    terms: Vec<(String, String)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.insert(key, value);
        self
    }

    /// Set `key`, replacing an earlier value in place.
    pub fn insert(&mut self, key: &str, value: &str) {
        match self.terms.iter_mut().find(|(existing, _)| existing == key) {
            Some(term) => term.1 = value.to_string(),
            None => self.terms.push((key.to_string(), value.to_string())),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_filter(&self.terms))
    }
}

/// Render `key:value` terms joined by single spaces. Values with whitespace
/// or quotes are double-quoted, inner quotes and backslashes escaped.
pub fn format_filter(terms: &[(String, String)]) -> String {
    terms
        .iter()
        .map(|(key, value)| format!("{key}:{}", filter_value(value)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn filter_value(value: &str) -> String {
    if !value
        .chars()
        .any(|c| c.is_whitespace() || c == '"' || c == '\\')
    {
        return value.to_string();
    }
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

use anyhow::Result;
use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::ParseError;
use crate::tracker::{Record, Tracker};

pub const STATE_UNSTARTED: &str = "unstarted";
pub const STATE_STARTED: &str = "started";
pub const STATE_FINISHED: &str = "finished";

const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S UTC";

/// Local copy of a Pivotal Tracker story.
///
/// Every remote write replaces all fields with the server's answer, so the
/// struct never mixes stale and fresh values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Story {
    pub id: u64,
    pub project_id: u64,
    pub story_type: String,
    pub url: String,
    pub estimate: i64,
    pub current_state: String,
    pub description: String,
    pub name: String,
    pub requested_by: String,
    pub owned_by: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Story {
    pub fn parse(record: &Record) -> Result<Self, ParseError> {
        Ok(Self {
            id: record_int(record, "id")?,
            project_id: record_int(record, "project_id")?,
            story_type: record_text(record, "story_type"),
            url: record_text(record, "url"),
            estimate: record_int(record, "estimate")?,
            current_state: record_text(record, "current_state"),
            description: record_text(record, "description"),
            name: record_text(record, "name"),
            requested_by: record_text(record, "requested_by"),
            owned_by: record_text(record, "owned_by"),
            created_at: record_datetime(record, "created_at")?,
            updated_at: record_datetime(record, "updated_at")?,
        })
    }

    pub fn update_status(&mut self, tracker: &dyn Tracker, status: &str) -> Result<()> {
        self.update(tracker, &[("current_state", status)])
    }

    pub fn update_owner(&mut self, tracker: &dyn Tracker, name: &str) -> Result<()> {
        self.update(tracker, &[("owned_by", name)])
    }

    pub fn comment(&self, tracker: &dyn Tracker, text: &str) -> Result<String> {
        tracker.add_note(self.project_id, self.id, text)
    }

    /// Mark started, claim ownership, then leave a note. Stops at the first
    /// failed call; earlier writes stay applied on the server.
    pub fn start(&mut self, tracker: &dyn Tracker, full_name: &str) -> Result<()> {
        self.update_status(tracker, STATE_STARTED)?;
        self.update_owner(tracker, full_name)?;
        self.comment(tracker, &format!("Story started by {full_name}"))?;
        Ok(())
    }

    fn update(&mut self, tracker: &dyn Tracker, fields: &[(&str, &str)]) -> Result<()> {
        let record = tracker.update_story(self.project_id, self.id, fields)?;
        *self = Self::parse(&record)?;
        Ok(())
    }
}

fn present<'a>(record: &'a Record, field: &str) -> Option<&'a str> {
    record
        .text(field)
        .map(str::trim)
        .filter(|text| !text.is_empty())
}

fn record_text(record: &Record, field: &str) -> String {
    record.text(field).unwrap_or_default().to_string()
}

fn record_int<T: std::str::FromStr + Default>(record: &Record, field: &str) -> Result<T, ParseError> {
    match present(record, field) {
        Some(text) => text.parse().map_err(|_| ParseError::Integer {
            field: field.to_string(),
            value: text.to_string(),
        }),
        None => Ok(T::default()),
    }
}

fn record_datetime(record: &Record, field: &str) -> Result<Option<DateTime<Utc>>, ParseError> {
    match present(record, field) {
        Some(text) => NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT)
            .map(|naive| Some(naive.and_utc()))
            .map_err(|_| ParseError::Timestamp {
                field: field.to_string(),
                value: text.to_string(),
            }),
        None => Ok(None),
    }
}

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::CONTENT_TYPE;

use super::record::{render_element, Record};
use super::{Filter, Tracker};

pub const DEFAULT_API_URL: &str = "https://www.pivotaltracker.com/services/v3";
const TOKEN_HEADER: &str = "X-TrackerToken";
const XML_CONTENT_TYPE: &str = "application/xml";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Pivotal Tracker v3 (XML) client.
pub struct PivotalClient {
    http: Client,
    token: String,
    base_url: String,
}

impl PivotalClient {
    pub fn new(token: &str, base_url: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            token: token.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn stories_url(&self, project_id: u64) -> String {
        format!("{}/projects/{project_id}/stories", self.base_url)
    }

    fn story_url(&self, project_id: u64, story_id: u64) -> String {
        format!("{}/{story_id}", self.stories_url(project_id))
    }

    fn send(&self, request: RequestBuilder) -> Result<String> {
        let response = request
            .header(TOKEN_HEADER, &self.token)
            .send()
            .context("Pivotal Tracker request failed")?;
        let status = response.status();
        let body = response
            .text()
            .context("failed to read Pivotal Tracker response")?;
        if !status.is_success() {
            return Err(anyhow!(
                "Pivotal Tracker returned {status}: {}",
                body.trim()
            ));
        }
        Ok(body)
    }
}

impl Tracker for PivotalClient {
    fn list_stories(&self, project_id: u64, filter: &Filter) -> Result<Vec<Record>> {
        let request = self
            .http
            .get(self.stories_url(project_id))
            .query(&[("filter", filter.to_string())]);
        let body = self.send(request)?;
        Record::parse_list(&body).context("failed to parse story list")
    }

    fn update_story(
        &self,
        project_id: u64,
        story_id: u64,
        fields: &[(&str, &str)],
    ) -> Result<Record> {
        let request = self
            .http
            .put(self.story_url(project_id, story_id))
            .header(CONTENT_TYPE, XML_CONTENT_TYPE)
            .body(render_element("story", fields));
        let body = self.send(request)?;
        Record::parse(&body).with_context(|| format!("failed to parse story {story_id}"))
    }

    fn add_note(&self, project_id: u64, story_id: u64, text: &str) -> Result<String> {
        let request = self
            .http
            .post(format!("{}/notes", self.story_url(project_id, story_id)))
            .header(CONTENT_TYPE, XML_CONTENT_TYPE)
            .body(render_element("note", &[("text", text)]));
        self.send(request)
    }
}

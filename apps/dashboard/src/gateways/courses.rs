//! Third-party course lookup for the skill-gap panel.
//!
//! Failures are kept distinct from "nothing found" via [`CourseLookup`] and
//! only collapsed to an empty list at render time.

use async_trait::async_trait;
use reqwest::Url;
use serde::Serialize;
use tracing::warn;

pub const COURSE_LINK_BASE: &str = "https://www.coursera.org/learn/";
/// Only the first few skills are sent; longer queries return nothing useful.
pub const MAX_QUERY_SKILLS: usize = 3;
pub const MAX_COURSES: usize = 10;
const DEFAULT_COURSE_NAME: &str = "Course";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Course {
    pub name: String,
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CourseLookup {
    Found(Vec<Course>),
    Failed(String),
}

impl CourseLookup {
    /// Presentation collapse: a failed lookup shows as no courses.
    pub fn into_courses(self) -> Vec<Course> {
        match self {
            CourseLookup::Found(courses) => courses,
            CourseLookup::Failed(reason) => {
                warn!("Course lookup failed: {reason}");
                Vec::new()
            }
        }
    }
}

/// The skills actually used for the query: the first `MAX_QUERY_SKILLS`, in order.
pub fn query_skills(skills: &[String]) -> &[String] {
    &skills[..skills.len().min(MAX_QUERY_SKILLS)]
}

/// `+`-joined search terms as they appear on the wire.
pub fn course_query(skills: &[String]) -> String {
    query_skills(skills).join("+")
}

/// Extracts up to `MAX_COURSES` courses from an `{"elements": [{name, slug}]}` body.
/// A missing `elements` key means no results; any other shape is malformed.
pub fn parse_courses(body: &serde_json::Value) -> Result<Vec<Course>, String> {
    let object = body
        .as_object()
        .ok_or_else(|| "course search response is not a JSON object".to_string())?;

    let Some(elements) = object.get("elements") else {
        return Ok(Vec::new());
    };
    let elements = elements
        .as_array()
        .ok_or_else(|| "`elements` is not a list".to_string())?;

    elements
        .iter()
        .take(MAX_COURSES)
        .map(|element| {
            let element = element
                .as_object()
                .ok_or_else(|| "course element is not an object".to_string())?;
            let name = element
                .get("name")
                .and_then(|v| v.as_str())
                .unwrap_or(DEFAULT_COURSE_NAME)
                .to_string();
            let link = element
                .get("slug")
                .and_then(|v| v.as_str())
                .filter(|slug| !slug.is_empty())
                .map(|slug| format!("{COURSE_LINK_BASE}{slug}"))
                .unwrap_or_default();
            Ok(Course { name, link })
        })
        .collect()
}

#[async_trait]
pub trait CourseSearch: Send + Sync {
    async fn search(&self, skills: &[String]) -> CourseLookup;
}

pub struct CourseraSearch {
    client: reqwest::Client,
    base_url: String,
}

impl CourseraSearch {
    pub fn new(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    /// `<base>?q=search&query=a+b+c`. Form encoding turns the space-joined
    /// terms into the `+`-joined query.
    fn search_url(&self, skills: &[String]) -> Result<Url, String> {
        let mut url = Url::parse(&self.base_url).map_err(|e| format!("invalid base URL: {e}"))?;
        url.query_pairs_mut()
            .append_pair("q", "search")
            .append_pair("query", &query_skills(skills).join(" "));
        Ok(url)
    }
}

#[async_trait]
impl CourseSearch for CourseraSearch {
    async fn search(&self, skills: &[String]) -> CourseLookup {
        if skills.is_empty() {
            return CourseLookup::Found(Vec::new());
        }

        let url = match self.search_url(skills) {
            Ok(url) => url,
            Err(reason) => return CourseLookup::Failed(reason),
        };

        let response = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(e) => return CourseLookup::Failed(e.to_string()),
        };
        let body: serde_json::Value = match response.json().await {
            Ok(body) => body,
            Err(e) => return CourseLookup::Failed(format!("malformed response: {e}")),
        };

        match parse_courses(&body) {
            Ok(courses) => CourseLookup::Found(courses),
            Err(reason) => CourseLookup::Failed(reason),
        }
    }
}

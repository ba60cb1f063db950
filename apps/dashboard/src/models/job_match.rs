use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One candidate job produced by the external matching pipeline.
///
/// Every field is optional: records are returned verbatim from the match
/// store and placeholders are only applied when a card is rendered. Decoding
/// never rejects a record; fields of an unexpected shape read as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JobMatch {
    pub title: Option<String>,
    pub company: Option<String>,
    pub job_link: Option<String>,
    pub description: Option<String>,
    pub match_reason: Option<String>,
    pub missing_skills: Option<Vec<String>>,
}

impl JobMatch {
    pub fn missing_skills(&self) -> &[String] {
        self.missing_skills.as_deref().unwrap_or_default()
    }

    /// Lenient decode of one stored record. Numbers and booleans are kept as
    /// their text form; nested values, nulls and empty skills are dropped.
    pub fn from_value(value: &Value) -> Self {
        let Some(record) = value.as_object() else {
            return Self::default();
        };
        let text = |key: &str| record.get(key).and_then(scalar_text);

        Self {
            title: text("title"),
            company: text("company"),
            job_link: text("job_link"),
            description: text("description"),
            match_reason: text("match_reason"),
            missing_skills: record
                .get("missing_skills")
                .and_then(Value::as_array)
                .map(|skills| {
                    skills
                        .iter()
                        .filter_map(scalar_text)
                        .filter(|s| !s.is_empty())
                        .collect()
                }),
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl<'de> Deserialize<'de> for JobMatch {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

/// The per-user document written by the matching pipeline.
/// Read-only from this service.
#[derive(Debug, Clone, Deserialize)]
pub struct MatchDocument {
    #[serde(default, deserialize_with = "lenient_results")]
    pub results: Vec<JobMatch>,
}

/// A missing, null or non-list `results` means no matches yet.
fn lenient_results<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<JobMatch>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_array()
        .map(|records| records.iter().map(JobMatch::from_value).collect())
        .unwrap_or_default())
}

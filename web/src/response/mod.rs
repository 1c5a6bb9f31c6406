//! JSON bodies returned by the controllers.

use domain::version::VersionMap;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct MessageResponse {
    pub message: &'static str,
}

/// A completed processing run.
#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ProcessingResponse {
    pub message: &'static str,
    /// Names of the topics the run produced modules for.
    pub topics: Vec<String>,
}

#[derive(Debug, PartialEq, Serialize, ToSchema)]
pub(crate) struct TopicSummary {
    pub topic: String,
    pub version: f64,
    pub last_updated: String,
    pub source_meetings: Vec<String>,
}

impl TopicSummary {
    pub fn from_versions(versions: &VersionMap) -> Vec<TopicSummary> {
        versions
            .iter()
            .map(|(topic, record)| TopicSummary {
                topic: topic.clone(),
                version: record.version,
                last_updated: record.last_updated.clone(),
                source_meetings: record.source_meetings.clone(),
            })
            .collect()
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ModuleResponse {
    pub topic: String,
    /// Markdown text of the module.
    pub content: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::version::VersionRecord;

    #[test]
    fn topic_summaries_follow_version_map_order_and_omit_the_hash() {
        let mut versions = VersionMap::new();
        for topic in ["Topic_2", "Topic_1"] {
            versions.insert(
                topic.to_string(),
                VersionRecord {
                    version: 1.1,
                    last_updated: "2025-01-05 09:00:00".to_string(),
                    source_meetings: vec!["Retro".to_string()],
                    hash: "abc".to_string(),
                },
            );
        }

        let summaries = TopicSummary::from_versions(&versions);

        assert_eq!(summaries[0].topic, "Topic_2");
        assert_eq!(
            serde_json::to_value(&summaries[1]).unwrap(),
            serde_json::json!({
                "topic": "Topic_1",
                "version": 1.1,
                "last_updated": "2025-01-05 09:00:00",
                "source_meetings": ["Retro"]
            })
        );
    }
}

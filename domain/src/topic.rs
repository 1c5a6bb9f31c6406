//! Keyword-rule topic detection and the ordered topic map shared by every
//! topic producer.

use crate::error::Error;
use crate::transcripts::Model as Transcript;
use entity_api::transcript;
use log::*;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Built-in topic table: a transcript belongs to a topic when its text contains
/// any one of the topic's keywords.
const DEFAULT_TOPIC_KEYWORDS: &[(&str, &[&str])] = &[
    ("Authentication", &["auth", "jwt", "token", "login"]),
    ("Deployment", &["deploy", "deployment", "production", "staging"]),
    ("Environment Setup", &["environment", "env", "variables", "config"]),
    ("Onboarding", &["new developer", "onboarding", "setup"]),
    ("Common Issues", &["issue", "error", "problem", "troubleshoot"]),
];

/// One row of the keyword table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicKeywords {
    pub topic: String,
    pub keywords: Vec<String>,
}

/// Ordered topic → keywords table. Keywords are stored lower-cased so matching
/// is case-insensitive on both sides.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordTable {
    entries: Vec<TopicKeywords>,
}

impl KeywordTable {
    pub fn new(entries: Vec<TopicKeywords>) -> Self {
        let entries = entries
            .into_iter()
            .map(|entry| TopicKeywords {
                topic: entry.topic,
                keywords: entry
                    .keywords
                    .into_iter()
                    .map(|keyword| keyword.to_lowercase())
                    .collect(),
            })
            .collect();
        Self { entries }
    }

    /// Loads a table from a JSON array of `{"topic": ..., "keywords": [...]}` objects.
    pub async fn load(path: &Path) -> Result<Self, Error> {
        debug!("Loading topic keywords from {}", path.display());
        let raw = tokio::fs::read_to_string(path).await?;
        let entries: Vec<TopicKeywords> = serde_json::from_str(&raw)?;
        Ok(Self::new(entries))
    }

    pub fn iter(&self) -> impl Iterator<Item = &TopicKeywords> {
        self.entries.iter()
    }

    fn matching_topics<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |entry| entry.keywords.iter().any(|keyword| text.contains(keyword.as_str())))
            .map(|entry| entry.topic.as_str())
    }
}

impl Default for KeywordTable {
    fn default() -> Self {
        Self::new(
            DEFAULT_TOPIC_KEYWORDS
                .iter()
                .map(|(topic, keywords)| TopicKeywords {
                    topic: topic.to_string(),
                    keywords: keywords.iter().map(|k| k.to_string()).collect(),
                })
                .collect(),
        )
    }
}

/// A named group of meetings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Topic {
    pub name: String,
    pub meetings: Vec<String>,
}

/// Topic name → meeting titles, in the order topics were first seen.
/// Recomputed on every detection or clustering run and never persisted as-is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopicMap {
    topics: Vec<Topic>,
}

impl TopicMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `title` to `topic`, opening the topic if this is its first meeting.
    pub fn push_meeting(&mut self, topic: &str, title: String) {
        match self.topics.iter_mut().find(|t| t.name == topic) {
            Some(existing) => existing.meetings.push(title),
            None => self.topics.push(Topic {
                name: topic.to_string(),
                meetings: vec![title],
            }),
        }
    }

    /// Adds a whole topic at the end of the map.
    pub fn push(&mut self, topic: Topic) {
        self.topics.push(topic);
    }

    pub fn get(&self, topic: &str) -> Option<&[String]> {
        self.topics
            .iter()
            .find(|t| t.name == topic)
            .map(|t| t.meetings.as_slice())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Topic> {
        self.topics.iter()
    }

    pub fn names(&self) -> Vec<String> {
        self.topics.iter().map(|t| t.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}

impl<'a> IntoIterator for &'a TopicMap {
    type Item = &'a Topic;
    type IntoIter = std::slice::Iter<'a, Topic>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Groups transcripts under every keyword topic their content mentions.
///
/// A transcript may land in several topics. Topics nobody mentions are left out,
/// so no transcripts (or no matches) yields an empty map.
pub fn detect(transcripts: &[Transcript], table: &KeywordTable) -> TopicMap {
    let mut topics = TopicMap::new();

    for transcript in transcripts {
        let text = transcript.content.to_lowercase();
        for topic in table.matching_topics(&text) {
            topics.push_meeting(topic, transcript.title.clone());
        }
    }

    topics
}

/// Runs [`detect`] over every stored transcript.
pub async fn detect_topics(db: &DatabaseConnection, table: &KeywordTable) -> Result<TopicMap, Error> {
    let transcripts = transcript::find_all(db).await?;
    let topics = detect(&transcripts, table);
    debug!(
        "Detected {} keyword topic(s) across {} transcript(s)",
        topics.len(),
        transcripts.len()
    );
    Ok(topics)
}

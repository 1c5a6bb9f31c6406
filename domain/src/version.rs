//! Per-topic change tracking for generated training modules.
//!
//! Each processing run hashes every topic's name together with its meeting titles.
//! A new topic starts at version 1.0, a topic whose hash changed moves up by 0.1,
//! an unchanged topic keeps its version, and topics missing from the run are
//! dropped. The whole map lives in `<output_dir>/versions.json` and is replaced
//! atomically on every run.

use crate::error::Error;
use crate::storage;
use crate::topic::TopicMap;
use log::*;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::{Path, PathBuf};

pub const VERSIONS_FILE: &str = "versions.json";

pub const INITIAL_VERSION: f64 = 1.0;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionRecord {
    pub version: f64,
    pub last_updated: String,
    pub source_meetings: Vec<String>,
    pub hash: String,
}

/// Topic name → version record, kept in topic-map order and serialized as a
/// JSON object in that order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VersionMap {
    entries: Vec<(String, VersionRecord)>,
}

impl VersionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, topic: &str) -> Option<&VersionRecord> {
        self.entries
            .iter()
            .find(|(name, _)| name == topic)
            .map(|(_, record)| record)
    }

    /// Inserts or replaces `topic`'s record. A replaced record keeps its position.
    pub fn insert(&mut self, topic: String, record: VersionRecord) {
        match self.entries.iter_mut().find(|(name, _)| *name == topic) {
            Some(entry) => entry.1 = record,
            None => self.entries.push((topic, record)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &VersionRecord)> {
        self.entries.iter().map(|(name, record)| (name, record))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for VersionMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (topic, record) in &self.entries {
            map.serialize_entry(topic, record)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for VersionMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct VersionMapVisitor;

        impl<'de> Visitor<'de> for VersionMapVisitor {
            type Value = VersionMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of topic names to version records")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<VersionMap, A::Error> {
                let mut versions = VersionMap::new();
                while let Some((topic, record)) = access.next_entry::<String, VersionRecord>()? {
                    versions.insert(topic, record);
                }
                Ok(versions)
            }
        }

        deserializer.deserialize_map(VersionMapVisitor)
    }
}

/// Hex SHA-256 of the topic name followed by its meeting titles.
pub fn content_hash(topic: &str, meetings: &[String]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(topic.as_bytes());
    for meeting in meetings {
        hasher.update(meeting.as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// `version + 0.1`, rounded to one decimal place so repeated bumps never
/// accumulate floating-point drift.
pub fn next_version(version: f64) -> f64 {
    ((version + 0.1) * 10.0).round() / 10.0
}

/// Computes the snapshot that replaces `previous` after a run produced `topics`.
pub fn next_snapshot(previous: &VersionMap, topics: &TopicMap, timestamp: &str) -> VersionMap {
    let mut snapshot = VersionMap::new();

    for topic in topics {
        let hash = content_hash(&topic.name, &topic.meetings);
        let version = match previous.get(&topic.name) {
            Some(prior) if prior.hash == hash => prior.version,
            Some(prior) => next_version(prior.version),
            None => INITIAL_VERSION,
        };

        snapshot.insert(
            topic.name.clone(),
            VersionRecord {
                version,
                last_updated: timestamp.to_string(),
                source_meetings: topic.meetings.clone(),
                hash,
            },
        );
    }

    snapshot
}

/// The persisted version map.
#[derive(Debug, Clone)]
pub struct VersionStore {
    path: PathBuf,
}

impl VersionStore {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            path: output_dir.join(VERSIONS_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The stored map, or `None` before the first processing run.
    pub async fn load(&self) -> Result<Option<VersionMap>, Error> {
        match storage::read_optional(&self.path).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub async fn save(&self, versions: &VersionMap) -> Result<(), Error> {
        let json = serde_json::to_string_pretty(versions)?;
        storage::write_atomic(&self.path, json.as_bytes()).await
    }

    /// Load, recompute, replace. Returns the snapshot that was written.
    pub async fn update(&self, topics: &TopicMap) -> Result<VersionMap, Error> {
        let previous = self.load().await?.unwrap_or_default();
        let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();

        let snapshot = next_snapshot(&previous, topics, &timestamp);
        self.save(&snapshot).await?;

        info!(
            "Version map updated: {} topic(s), {} dropped",
            snapshot.len(),
            previous
                .iter()
                .filter(|(topic, _)| snapshot.get(topic).is_none())
                .count()
        );
        Ok(snapshot)
    }
}

//! End-to-end processing runs.
//!
//! Two pipelines turn the stored transcripts into training modules:
//!
//! * the AI pipeline clusters transcripts over embeddings, asks the generation
//!   provider for one module per cluster, saves the modules and records versions;
//! * the keyword pipeline groups transcripts by keyword rules, writes templated
//!   modules and records versions.
//!
//! Both run start to finish within the caller's request. A failure stops the run
//! where it happened and is reported with the [`Stage`] that failed; nothing is
//! rolled back and nothing is retried.

use crate::cluster;
use crate::embedding;
use crate::error::Error;
use crate::generation;
use crate::topic::{self, KeywordTable, TopicMap};
use crate::training_module::{self, ModuleStore};
use crate::transcripts::Model as Transcript;
use crate::version::{VersionMap, VersionStore};
use entity_api::transcript;
use log::*;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use service::config::Config;
use std::fmt;
use std::path::PathBuf;

/// Everything a processing run needs besides the database and providers.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub output_dir: PathBuf,
    pub similarity_threshold: f32,
    pub topic_keywords: KeywordTable,
}

impl PipelineConfig {
    /// Defaults for everything but the output directory.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            similarity_threshold: service::config::DEFAULT_SIMILARITY_THRESHOLD,
            topic_keywords: KeywordTable::default(),
        }
    }

    /// Builds the pipeline settings from the service configuration, loading the
    /// keyword table from disk when one is configured.
    pub async fn from_config(config: &Config) -> Result<Self, Error> {
        let topic_keywords = match config.topic_keywords_file() {
            Some(path) => KeywordTable::load(path).await?,
            None => KeywordTable::default(),
        };

        Ok(Self {
            output_dir: config.output_dir().clone(),
            similarity_threshold: config.similarity_threshold,
            topic_keywords,
        })
    }

    pub fn module_store(&self) -> ModuleStore {
        ModuleStore::new(&self.output_dir)
    }

    pub fn version_store(&self) -> VersionStore {
        VersionStore::new(&self.output_dir)
    }
}

/// Step of a processing run, used to report where a run failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    LoadTranscripts,
    Embedding,
    Generation,
    ModuleWrite,
    VersionWrite,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Stage::LoadTranscripts => "load_transcripts",
            Stage::Embedding => "embedding",
            Stage::Generation => "generation",
            Stage::ModuleWrite => "module_write",
            Stage::VersionWrite => "version_write",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub struct PipelineError {
    pub stage: Stage,
    pub source: Error,
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} failed: {}", self.stage, self.source)
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

trait AtStage<T> {
    fn at(self, stage: Stage) -> Result<T, PipelineError>;
}

impl<T, E: Into<Error>> AtStage<T> for Result<T, E> {
    fn at(self, stage: Stage) -> Result<T, PipelineError> {
        self.map_err(|err| {
            let err = PipelineError {
                stage,
                source: err.into(),
            };
            error!("Processing run aborted: {err}");
            err
        })
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct ProcessingReport {
    pub topics: TopicMap,
    pub modules_written: Vec<PathBuf>,
    pub versions: VersionMap,
}

impl ProcessingReport {
    pub fn topic_names(&self) -> Vec<String> {
        self.topics.names()
    }
}

/// Clusters every stored transcript, generates one module per cluster and
/// versions the clusters.
pub async fn process_ai(
    db: &DatabaseConnection,
    config: &PipelineConfig,
    embedder: &dyn embedding::Provider,
    generator: &dyn generation::Provider,
) -> Result<ProcessingReport, PipelineError> {
    let transcripts = transcript::find_all(db).await.at(Stage::LoadTranscripts)?;
    process_ai_for(&transcripts, config, embedder, generator).await
}

pub async fn process_ai_for(
    transcripts: &[Transcript],
    config: &PipelineConfig,
    embedder: &dyn embedding::Provider,
    generator: &dyn generation::Provider,
) -> Result<ProcessingReport, PipelineError> {
    info!("Starting AI processing over {} transcript(s)", transcripts.len());

    let topics = cluster::cluster_transcripts(embedder, transcripts, config.similarity_threshold)
        .await
        .at(Stage::Embedding)?;

    // Every module is generated before any is written, so a failed call leaves
    // the previous run's files untouched.
    let modules = training_module::generate_modules(generator, &topics)
        .await
        .at(Stage::Generation)?;
    let modules_written = training_module::save_modules(&config.module_store(), &modules)
        .await
        .at(Stage::ModuleWrite)?;

    let versions = config
        .version_store()
        .update(&topics)
        .await
        .at(Stage::VersionWrite)?;

    Ok(ProcessingReport {
        topics,
        modules_written,
        versions,
    })
}

/// Groups every stored transcript by keyword rules, writes templated modules and
/// versions the detected topics.
pub async fn process_keywords(
    db: &DatabaseConnection,
    config: &PipelineConfig,
) -> Result<ProcessingReport, PipelineError> {
    let topics = topic::detect_topics(db, &config.topic_keywords)
        .await
        .at(Stage::LoadTranscripts)?;
    write_keyword_modules(topics, config).await
}

pub async fn process_keywords_for(
    transcripts: &[Transcript],
    config: &PipelineConfig,
) -> Result<ProcessingReport, PipelineError> {
    info!("Starting keyword processing over {} transcript(s)", transcripts.len());
    write_keyword_modules(topic::detect(transcripts, &config.topic_keywords), config).await
}

async fn write_keyword_modules(
    topics: TopicMap,
    config: &PipelineConfig,
) -> Result<ProcessingReport, PipelineError> {
    let modules_written = training_module::write_template_modules(&config.module_store(), &topics)
        .await
        .at(Stage::ModuleWrite)?;

    let versions = config
        .version_store()
        .update(&topics)
        .await
        .at(Stage::VersionWrite)?;

    Ok(ProcessingReport {
        topics,
        modules_written,
        versions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::MockProvider as MockEmbedder;
    use crate::error::{DomainErrorKind, ExternalErrorKind};
    use crate::generation::MockProvider as MockGenerator;
    use crate::Id;
    use tempfile::TempDir;

    fn transcript(title: &str, content: &str) -> Transcript {
        let now = chrono::Utc::now();
        Transcript {
            id: Id::new_v4(),
            title: title.to_string(),
            content: content.to_string(),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn embedder_with(vectors: Vec<Vec<f32>>) -> MockEmbedder {
        let mut embedder = MockEmbedder::new();
        embedder.expect_provider_id().return_const("fake".to_string());
        embedder
            .expect_embed_all()
            .returning(move |_| Ok(vectors.clone()));
        embedder
    }

    fn echoing_generator() -> MockGenerator {
        let mut generator = MockGenerator::new();
        generator.expect_provider_id().return_const("fake".to_string());
        generator
            .expect_generate()
            .returning(|prompt| Ok(format!("# Generated\n{prompt}")));
        generator
    }

    #[test]
    fn stage_names_are_snake_case() {
        assert_eq!(Stage::LoadTranscripts.to_string(), "load_transcripts");
        assert_eq!(Stage::VersionWrite.to_string(), "version_write");
        assert_eq!(
            serde_json::to_value(Stage::ModuleWrite).unwrap(),
            serde_json::json!("module_write")
        );
    }

    #[tokio::test]
    async fn ai_run_writes_one_module_per_cluster_and_versions_them() {
        let dir = TempDir::new().unwrap();
        let config = PipelineConfig::new(dir.path());
        let transcripts = vec![
            transcript("Auth Sync", "jwt expiry"),
            transcript("Login Bugs", "token refresh"),
            transcript("Release Retro", "staging deploy"),
        ];
        let embedder = embedder_with(vec![vec![1.0, 0.0], vec![0.9, 0.1], vec![0.0, 1.0]]);

        let report = process_ai_for(&transcripts, &config, &embedder, &echoing_generator())
            .await
            .unwrap();

        assert_eq!(report.topic_names(), vec!["Topic_1", "Topic_2"]);
        assert_eq!(report.modules_written.len(), 2);

        let module = config.module_store().read("Topic_1").await.unwrap().unwrap();
        assert!(module.contains("Auth Sync, Login Bugs"));

        let versions = config.version_store().load().await.unwrap().unwrap();
        assert_eq!(versions.get("Topic_2").unwrap().source_meetings, vec!["Release Retro"]);
        assert_eq!(versions.get("Topic_2").unwrap().version, 1.0);
    }

    #[tokio::test]
    async fn ai_run_with_no_transcripts_calls_no_provider() {
        let dir = TempDir::new().unwrap();
        let config = PipelineConfig::new(dir.path());
        let mut embedder = MockEmbedder::new();
        embedder.expect_embed_all().never();
        let mut generator = MockGenerator::new();
        generator.expect_generate().never();

        let report = process_ai_for(&[], &config, &embedder, &generator)
            .await
            .unwrap();

        assert!(report.topics.is_empty());
        assert!(config.version_store().load().await.unwrap().unwrap().is_empty());
    }

    #[tokio::test]
    async fn generation_failure_reports_its_stage_and_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let config = PipelineConfig::new(dir.path());
        let embedder = embedder_with(vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
        let mut generator = MockGenerator::new();
        generator.expect_provider_id().return_const("fake".to_string());
        let mut calls = 0;
        generator.expect_generate().returning(move |_| {
            calls += 1;
            if calls == 1 {
                Ok("first".to_string())
            } else {
                Err(meeting_ai::Error::Provider("prompt blocked".to_string()))
            }
        });

        let err = process_ai_for(
            &[transcript("A", "a"), transcript("B", "b")],
            &config,
            &embedder,
            &generator,
        )
        .await
        .unwrap_err();

        assert_eq!(err.stage, Stage::Generation);
        assert_eq!(
            err.source.error_kind,
            DomainErrorKind::External(ExternalErrorKind::Provider)
        );
        assert!(err.to_string().starts_with("generation failed: "));
        assert_eq!(config.module_store().read("Topic_1").await.unwrap(), None);
        assert_eq!(config.version_store().load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn embedding_failure_reports_the_embedding_stage() {
        let dir = TempDir::new().unwrap();
        let config = PipelineConfig::new(dir.path());
        let mut embedder = MockEmbedder::new();
        embedder.expect_provider_id().return_const("fake".to_string());
        embedder
            .expect_embed_all()
            .returning(|_| Err(meeting_ai::Error::Network("connection refused".to_string())));

        let err = process_ai_for(&[transcript("A", "a")], &config, &embedder, &echoing_generator())
            .await
            .unwrap_err();

        assert_eq!(err.stage, Stage::Embedding);
    }

    #[tokio::test]
    async fn keyword_run_lists_the_uploaded_title_under_overview() {
        let dir = TempDir::new().unwrap();
        let config = PipelineConfig::new(dir.path());

        let report = process_keywords_for(&[transcript("Auth Standup", "jwt token error")], &config)
            .await
            .unwrap();

        let path = dir.path().join("training_modules").join("authentication.md");
        assert!(report.modules_written.contains(&path));
        let module = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(module.contains("## Overview\n"));
        assert!(module.contains("- Auth Standup\n"));
    }

    #[tokio::test]
    async fn rerunning_unchanged_keywords_keeps_versions() {
        let dir = TempDir::new().unwrap();
        let config = PipelineConfig::new(dir.path());
        let transcripts = vec![transcript("Deploy Retro", "production deploy")];

        process_keywords_for(&transcripts, &config).await.unwrap();
        let second = process_keywords_for(&transcripts, &config).await.unwrap();
        assert_eq!(second.versions.get("Deployment").unwrap().version, 1.0);

        let mut grown = transcripts.clone();
        grown.push(transcript("Hotfix", "staging rollback"));
        let third = process_keywords_for(&grown, &config).await.unwrap();
        assert_eq!(third.versions.get("Deployment").unwrap().version, 1.1);
    }

    #[tokio::test]
    async fn from_config_loads_a_custom_keyword_table() {
        let dir = TempDir::new().unwrap();
        let table_path = dir.path().join("topics.json");
        tokio::fs::write(&table_path, r#"[{"topic": "Billing", "keywords": ["invoice"]}]"#)
            .await
            .unwrap();

        let mut config = Config::from_env()
            .set_output_dir(dir.path().to_path_buf())
            .set_topic_keywords_file(Some(table_path));
        config.similarity_threshold = 0.75;
        let pipeline = PipelineConfig::from_config(&config).await.unwrap();

        assert_eq!(pipeline.output_dir, dir.path());
        assert_eq!(pipeline.similarity_threshold, 0.75);
        assert_eq!(
            pipeline.topic_keywords.iter().map(|t| t.topic.as_str()).collect::<Vec<_>>(),
            vec!["Billing"]
        );
    }
}

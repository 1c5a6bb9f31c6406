//! Markdown training modules: rendering, prompting, and the on-disk store.
//!
//! Every module lives at `<output_dir>/training_modules/<slug>.md` where the slug
//! is the lower-cased topic name with spaces replaced by underscores. Both the
//! template writer and the model-backed writer overwrite modules wholesale.

use crate::error::Error;
use crate::generation;
use crate::storage;
use crate::topic::TopicMap;
use log::*;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Sub-directory of the output directory holding the Markdown files.
pub const MODULES_DIR: &str = "training_modules";

/// Static per-role guidance appended to every templated module.
const ROLE_GUIDANCE: &[(&str, &str)] = &[
    (
        "Backend Engineer",
        "Focus on API implementation, authentication flow, and security best practices.",
    ),
    (
        "Frontend Engineer",
        "Understand integration points, token handling, and common API errors.",
    ),
    (
        "QA Engineer",
        "Test edge cases, token expiry scenarios, and deployment validation.",
    ),
];

const GUIDE_STEPS: &[&str] = &[
    "Understand the concept and purpose.",
    "Follow documented best practices discussed in meetings.",
    "Apply the steps consistently across projects.",
    "Validate using common scenarios.",
];

const FAQS: &[&str] = &[
    "What are the common mistakes?",
    "How can these issues be avoided?",
    "What should be checked during implementation?",
];

/// A module produced by the generation provider, not yet written to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedModule {
    pub topic: String,
    pub content: String,
}

/// File name stem for `topic`.
pub fn slug(topic: &str) -> String {
    topic.to_lowercase().replace(' ', "_")
}

/// Deterministic module skeleton listing the source meetings.
pub fn render_template(topic: &str, meetings: &[String]) -> String {
    let mut md = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(md, "# {topic}\n");

    md.push_str("## Overview\n");
    md.push_str(
        "This training module is generated from recurring discussions in the following meetings:\n",
    );
    for meeting in meetings {
        let _ = writeln!(md, "- {meeting}");
    }
    md.push('\n');

    md.push_str("## Step-by-Step Guide\n");
    for (i, step) in GUIDE_STEPS.iter().enumerate() {
        let _ = writeln!(md, "{}. {step}", i + 1);
    }
    md.push('\n');

    md.push_str("## FAQs\n");
    for faq in FAQS {
        let _ = writeln!(md, "- {faq}");
    }
    md.push('\n');

    md.push_str("## Role-Based Learning\n");
    for (role, guidance) in ROLE_GUIDANCE {
        let _ = writeln!(md, "### {role}\n{guidance}\n");
    }

    md
}

/// Prompt asking the model for a Markdown module covering `meetings`.
pub fn build_prompt(meetings: &[String]) -> String {
    format!(
        r#"
You are an AI assistant converting meeting discussions into training material.

Meetings:
{}

Instructions:
- Create a clear Overview
- Provide Step-by-step guidance
- List common FAQs
- Add Role-based learning for Backend, Frontend, and QA engineers

Output in clean Markdown format.
"#,
        meetings.join(", ")
    )
}

/// Markdown files keyed by topic name.
#[derive(Debug, Clone)]
pub struct ModuleStore {
    dir: PathBuf,
}

impl ModuleStore {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            dir: output_dir.join(MODULES_DIR),
        }
    }

    /// Path of `topic`'s module, or `None` when the topic's slug would resolve
    /// outside the modules directory.
    pub fn path_for(&self, topic: &str) -> Option<PathBuf> {
        let slug = slug(topic);
        if slug.is_empty() || slug.contains(['/', '\\', '\0']) || slug.contains("..") {
            return None;
        }
        Some(self.dir.join(format!("{slug}.md")))
    }

    pub async fn write(&self, topic: &str, content: &str) -> Result<PathBuf, Error> {
        let path = self.path_for(topic).ok_or_else(|| {
            warn!("Refusing to write module for unsafe topic name {topic:?}");
            Error::validation(format!("Invalid topic name: {topic}"))
        })?;
        storage::write_atomic(&path, content.as_bytes()).await?;
        Ok(path)
    }

    /// The module's Markdown, or `None` if it has not been generated.
    pub async fn read(&self, topic: &str) -> Result<Option<String>, Error> {
        match self.path_for(topic) {
            Some(path) => storage::read_optional(&path).await,
            None => Ok(None),
        }
    }
}

/// Writes the templated module for every topic and returns the written paths.
pub async fn write_template_modules(
    store: &ModuleStore,
    topics: &TopicMap,
) -> Result<Vec<PathBuf>, Error> {
    let mut written = Vec::with_capacity(topics.len());
    for topic in topics {
        let content = render_template(&topic.name, &topic.meetings);
        written.push(store.write(&topic.name, &content).await?);
    }
    info!("Wrote {} templated training module(s)", written.len());
    Ok(written)
}

/// Asks the provider for one module per topic, serially. The first failure
/// aborts the whole batch.
pub async fn generate_modules(
    generator: &dyn generation::Provider,
    topics: &TopicMap,
) -> Result<Vec<GeneratedModule>, Error> {
    let mut modules = Vec::with_capacity(topics.len());
    for topic in topics {
        debug!(
            "Generating module for {} from {} meeting(s) with {}",
            topic.name,
            topic.meetings.len(),
            generator.provider_id()
        );
        let content = generator
            .generate(&build_prompt(&topic.meetings))
            .await
            .map_err(|err| {
                warn!("Module generation failed for {}: {err}", topic.name);
                err
            })?;
        modules.push(GeneratedModule {
            topic: topic.name.clone(),
            content,
        });
    }
    Ok(modules)
}

/// Persists provider output verbatim.
pub async fn save_modules(
    store: &ModuleStore,
    modules: &[GeneratedModule],
) -> Result<Vec<PathBuf>, Error> {
    let mut written = Vec::with_capacity(modules.len());
    for module in modules {
        written.push(store.write(&module.topic, &module.content).await?);
    }
    info!("Saved {} generated training module(s)", written.len());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::MockProvider;
    use crate::topic::Topic;
    use tempfile::TempDir;

    fn topics(entries: &[(&str, &[&str])]) -> TopicMap {
        let mut map = TopicMap::new();
        for (name, meetings) in entries {
            map.push(Topic {
                name: name.to_string(),
                meetings: meetings.iter().map(|m| m.to_string()).collect(),
            });
        }
        map
    }

    #[test]
    fn slug_lowercases_and_underscores() {
        assert_eq!(slug("Environment Setup"), "environment_setup");
        assert_eq!(slug("Topic_3"), "topic_3");
    }

    #[test]
    fn template_lists_meetings_under_overview() {
        let md = render_template("Authentication", &["Sprint Review".to_string()]);

        assert!(md.starts_with("# Authentication\n\n## Overview\n"));
        assert!(md.contains("following meetings:\n- Sprint Review\n\n## Step-by-Step Guide\n"));
        assert!(md.contains("4. Validate using common scenarios.\n"));
        assert!(md.contains("## FAQs\n- What are the common mistakes?\n"));
        assert!(md.contains(
            "### QA Engineer\nTest edge cases, token expiry scenarios, and deployment validation.\n"
        ));
    }

    #[test]
    fn prompt_embeds_meeting_titles() {
        let prompt = build_prompt(&["Auth Sync".to_string(), "Login Bugs".to_string()]);

        assert!(prompt.contains("Meetings:\nAuth Sync, Login Bugs\n"));
        assert!(prompt.contains("Output in clean Markdown format."));
    }

    #[test]
    fn path_for_rejects_names_escaping_the_directory() {
        let store = ModuleStore::new(Path::new("/srv/output"));

        assert_eq!(
            store.path_for("Common Issues"),
            Some(PathBuf::from("/srv/output/training_modules/common_issues.md"))
        );
        assert_eq!(store.path_for("../secrets"), None);
        assert_eq!(store.path_for("a/b"), None);
        assert_eq!(store.path_for(""), None);
        assert_eq!(store.path_for("a\0b"), None);
    }

    #[tokio::test]
    async fn template_modules_round_trip_through_the_store() {
        let dir = TempDir::new().unwrap();
        let store = ModuleStore::new(dir.path());

        let written = write_template_modules(&store, &topics(&[("Authentication", &["Auth Sync"])]))
            .await
            .unwrap();

        assert_eq!(written, vec![dir.path().join("training_modules/authentication.md")]);
        let content = store.read("authentication").await.unwrap().unwrap();
        assert!(content.contains("# Authentication"));
        assert!(content.contains("- Auth Sync"));
    }

    #[tokio::test]
    async fn read_returns_none_for_unknown_or_unsafe_topics() {
        let dir = TempDir::new().unwrap();
        let store = ModuleStore::new(dir.path());

        assert_eq!(store.read("Deployment").await.unwrap(), None);
        assert_eq!(store.read("../../etc/passwd").await.unwrap(), None);
        assert_eq!(store.read("a\0b").await.unwrap(), None);
    }

    #[tokio::test]
    async fn generated_modules_are_saved_verbatim() {
        let dir = TempDir::new().unwrap();
        let store = ModuleStore::new(dir.path());

        let mut generator = MockProvider::new();
        generator.expect_provider_id().return_const("fake".to_string());
        generator
            .expect_generate()
            .withf(|prompt: &str| prompt.contains("Standup, Retro"))
            .times(1)
            .returning(|_| Ok("## Raw model output\n".to_string()));

        let modules = generate_modules(&generator, &topics(&[("Topic_1", &["Standup", "Retro"])]))
            .await
            .unwrap();
        save_modules(&store, &modules).await.unwrap();

        assert_eq!(
            store.read("Topic_1").await.unwrap(),
            Some("## Raw model output\n".to_string())
        );
    }

    #[tokio::test]
    async fn generation_stops_at_the_first_failed_topic() {
        let mut generator = MockProvider::new();
        generator.expect_provider_id().return_const("fake".to_string());
        generator
            .expect_generate()
            .times(1)
            .returning(|_| Err(meeting_ai::Error::Provider("blocked".to_string())));

        let result = generate_modules(
            &generator,
            &topics(&[("Topic_1", &["A"]), ("Topic_2", &["B"])]),
        )
        .await;

        assert!(result.is_err());
    }
}

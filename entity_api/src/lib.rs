use log::*;
use sea_orm::DatabaseConnection;

pub use entity::{transcripts, Id};

pub mod error;
pub mod transcript;

/// Sample meetings covering each built-in keyword topic, for local development.
const SEED_TRANSCRIPTS: &[(&str, &str)] = &[
    (
        "Auth Sync",
        "We walked through the login flow and why the jwt token expires too early.",
    ),
    (
        "Release Retro",
        "The staging deploy went fine but production hit a config error after the rollout.",
    ),
    (
        "New Hire Kickoff",
        "Onboarding for the new developer: environment setup and required env variables.",
    ),
    (
        "Bug Bash",
        "Triaged every open issue and wrote down how to troubleshoot the recurring problem.",
    ),
];

pub async fn seed_database(db: &DatabaseConnection) -> Result<(), error::Error> {
    for (title, content) in SEED_TRANSCRIPTS {
        let created = transcript::create(db, title.to_string(), content.to_string()).await?;
        info!("Seeded transcript {} ({})", created.title, created.id);
    }

    Ok(())
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn seed_database_inserts_every_sample_transcript() -> Result<(), error::Error> {
        let now = chrono::Utc::now();
        let rows: Vec<Vec<transcripts::Model>> = SEED_TRANSCRIPTS
            .iter()
            .map(|(title, content)| {
                vec![transcripts::Model {
                    id: Id::new_v4(),
                    title: title.to_string(),
                    content: content.to_string(),
                    created_at: now.into(),
                    updated_at: now.into(),
                }]
            })
            .collect();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(rows)
            .into_connection();

        seed_database(&db).await?;

        assert_eq!(db.into_transaction_log().len(), SEED_TRANSCRIPTS.len());

        Ok(())
    }
}

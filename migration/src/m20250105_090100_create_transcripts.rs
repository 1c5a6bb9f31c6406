use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let create_transcripts_sql = r#"
            CREATE TABLE IF NOT EXISTS meeting_trainer.transcripts (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                title VARCHAR(255) NOT NULL,
                content TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#;

        manager
            .get_connection()
            .execute_unprepared(create_transcripts_sql)
            .await?;

        manager
            .get_connection()
            .execute_unprepared("ALTER TABLE meeting_trainer.transcripts OWNER TO trainer")
            .await?;

        // Clustering reads transcripts in creation order
        manager
            .create_index(
                Index::create()
                    .name("transcripts_created_at_id_idx")
                    .table((Alias::new("meeting_trainer"), Alias::new("transcripts")))
                    .col(Alias::new("created_at"))
                    .col(Alias::new("id"))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS meeting_trainer.transcripts")
            .await?;

        Ok(())
    }
}

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create the service's schema
        manager
            .get_connection()
            .execute_unprepared("CREATE SCHEMA IF NOT EXISTS meeting_trainer;")
            .await?;

        manager
            .get_connection()
            .execute_unprepared("SET search_path TO meeting_trainer, public;")
            .await?;

        // Grant the base DB user that executes all service queries
        manager
            .get_connection()
            .execute_unprepared(r#"
                DO $$ BEGIN
                    GRANT ALL PRIVILEGES ON DATABASE trainer TO trainer;
                    GRANT ALL ON SCHEMA meeting_trainer TO trainer;

                    ALTER DEFAULT PRIVILEGES IN SCHEMA meeting_trainer GRANT ALL ON TABLES TO trainer;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA meeting_trainer GRANT ALL ON SEQUENCES TO trainer;
                END $$;
            "#)
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(r#"
                DO $$ BEGIN
                    ALTER DEFAULT PRIVILEGES IN SCHEMA meeting_trainer REVOKE ALL ON SEQUENCES FROM trainer;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA meeting_trainer REVOKE ALL ON TABLES FROM trainer;
                    REVOKE ALL ON SCHEMA meeting_trainer FROM trainer;
                    REVOKE ALL PRIVILEGES ON DATABASE trainer FROM trainer;
                END $$;
            "#)
            .await?;

        // CASCADE removes every object in the schema
        manager
            .get_connection()
            .execute_unprepared("DROP SCHEMA IF EXISTS meeting_trainer CASCADE;")
            .await?;

        Ok(())
    }
}

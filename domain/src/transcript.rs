use crate::error::Error;
use crate::transcripts::Model;
use crate::Id;
use entity_api::transcript;
use log::*;
use sea_orm::DatabaseConnection;

/// A transcript submission as received from a client, before validation.
#[derive(Debug, Clone, Default)]
pub struct TranscriptUpload {
    pub title: Option<String>,
    pub content: Option<String>,
    /// Raw bytes of an uploaded text file. Takes precedence over `content`.
    pub file: Option<Vec<u8>>,
}

/// Where an accepted transcript's text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadSource {
    File,
    Text,
}

impl UploadSource {
    pub fn message(self) -> &'static str {
        match self {
            UploadSource::File => "File uploaded and processed successfully",
            UploadSource::Text => "Text transcript uploaded successfully",
        }
    }
}

impl TranscriptUpload {
    /// Resolves the submission to `(title, content, source)` or the client-facing
    /// reason it was rejected.
    pub fn validate(self) -> Result<(String, String, UploadSource), Error> {
        let title = self
            .title
            .map(|title| title.trim().to_string())
            .filter(|title| !title.is_empty())
            .ok_or_else(|| Error::validation("Title is required"))?;

        if let Some(bytes) = self.file {
            let content = String::from_utf8(bytes).map_err(|err| {
                warn!("Rejecting non UTF-8 upload for {title}: {err}");
                Error::validation("Unable to read uploaded file")
            })?;
            return Ok((title, content, UploadSource::File));
        }

        match self.content {
            Some(content) if !content.is_empty() => Ok((title, content, UploadSource::Text)),
            _ => Err(Error::validation("Provide either text content or a file")),
        }
    }
}

/// Validates and stores one transcript.
pub async fn upload(
    db: &DatabaseConnection,
    upload: TranscriptUpload,
) -> Result<(Model, UploadSource), Error> {
    let (title, content, source) = upload.validate()?;
    let transcript = transcript::create(db, title, content).await?;
    info!("Stored transcript {} ({:?})", transcript.id, source);
    Ok((transcript, source))
}

pub async fn find_all(db: &DatabaseConnection) -> Result<Vec<Model>, Error> {
    Ok(transcript::find_all(db).await?)
}

pub async fn find_by_id(db: &DatabaseConnection, id: Id) -> Result<Model, Error> {
    Ok(transcript::find_by_id(db, id).await?)
}

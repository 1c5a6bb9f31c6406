use crate::Error;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use axum::{Form, Json};
use domain::transcript::TranscriptUpload;
use log::*;
use serde::Deserialize;
use utoipa::ToSchema;

/// Text upload body, accepted as JSON or as an urlencoded form.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub(crate) struct UploadParams {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Multipart upload body. `file` must be UTF-8 text.
#[allow(dead_code)]
#[derive(ToSchema)]
pub(crate) struct UploadForm {
    pub title: String,
    pub content: Option<String>,
    #[schema(value_type = Option<String>, format = Binary)]
    pub file: Option<Vec<u8>>,
}

/// Extracts a transcript upload from a multipart, JSON or urlencoded body.
#[derive(Debug)]
pub(crate) struct Upload(pub TranscriptUpload);

impl<S> FromRequest<S> for Upload
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|rejection| Error::BadRequest(rejection.body_text()))?;
            return read_multipart(multipart).await.map(Upload);
        }

        let params = if content_type.starts_with("application/json") {
            let Json(params) = Json::<UploadParams>::from_request(req, state)
                .await
                .map_err(|rejection| Error::BadRequest(rejection.body_text()))?;
            params
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(params) = Form::<UploadParams>::from_request(req, state)
                .await
                .map_err(|rejection| Error::BadRequest(rejection.body_text()))?;
            params
        } else if content_type.is_empty() {
            UploadParams::default()
        } else {
            return Err(Error::UnsupportedMediaType(format!(
                "Unsupported media type \"{content_type}\""
            )));
        };

        Ok(Upload(TranscriptUpload {
            title: params.title,
            content: params.content,
            file: None,
        }))
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<TranscriptUpload, Error> {
    let mut upload = TranscriptUpload::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| Error::BadRequest(err.body_text()))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("title") => {
                upload.title = Some(
                    field
                        .text()
                        .await
                        .map_err(|err| Error::BadRequest(err.body_text()))?,
                )
            }
            Some("content") => {
                upload.content = Some(
                    field
                        .text()
                        .await
                        .map_err(|err| Error::BadRequest(err.body_text()))?,
                )
            }
            Some("file") => {
                let bytes = field.bytes().await.map_err(|err| {
                    warn!("Failed to read uploaded file: {err}");
                    Error::BadRequest("Unable to read uploaded file".to_string())
                })?;
                upload.file = Some(bytes.to_vec());
            }
            other => debug!("Ignoring multipart field {other:?}"),
        }
    }

    Ok(upload)
}

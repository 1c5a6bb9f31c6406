//! Google Gemini REST client.
//!
//! Implements both model-provider traits on top of the `generateContent` and
//! `embedContent` endpoints. The API key travels in the `x-goog-api-key` header.
//! A client without a key can be constructed (so keyword-only deployments start
//! fine) but every call then fails with a configuration error.

use crate::{embedding, generation};
use async_trait::async_trait;
use log::*;
use meeting_ai::Error;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use service::config::Config;
use std::time::Duration;

const PROVIDER_ID: &str = "gemini";

const API_KEY_HEADER: &str = "x-goog-api-key";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct EmbedContentRequest<'a> {
    model: &'a str,
    content: Content<'a>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EmbedContentResponse {
    embedding: ContentEmbedding,
}

#[derive(Debug, Deserialize)]
struct ContentEmbedding {
    values: Vec<f32>,
}

/// Gemini API client
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    embedding_model: String,
    api_key: Option<SecretString>,
}

impl GeminiClient {
    pub fn new(
        base_url: &str,
        model: &str,
        embedding_model: &str,
        api_key: Option<String>,
    ) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            embedding_model: embedding_model.to_string(),
            api_key: api_key.filter(|key| !key.is_empty()).map(SecretString::new),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, Error> {
        if config.gemini_api_key().is_none() {
            warn!("GEMINI_API_KEY is not set, AI processing will be unavailable");
        }
        Self::new(
            config.gemini_base_url(),
            config.gemini_model(),
            config.gemini_embedding_model(),
            config.gemini_api_key(),
        )
    }

    fn endpoint(&self, model: &str, method: &str) -> String {
        format!("{}/{}:{}", self.base_url, model, method)
    }

    async fn post<B, T>(&self, url: &str, body: &B) -> Result<T, Error>
    where
        B: Serialize + ?Sized,
        T: for<'de> Deserialize<'de>,
    {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| Error::Configuration("GEMINI_API_KEY is not set".to_string()))?;

        let mut key_header = reqwest::header::HeaderValue::from_str(api_key.expose_secret())
            .map_err(|_| Error::Configuration("GEMINI_API_KEY is not a valid header value".to_string()))?;
        key_header.set_sensitive(true);

        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, key_header)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                warn!("Gemini request to {url} failed: {e:?}");
                if e.is_timeout() {
                    Error::Timeout(e.to_string())
                } else {
                    Error::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status, response).await);
        }

        response.json::<T>().await.map_err(|e| {
            warn!("Failed to parse Gemini response: {e:?}");
            Error::Deserialization(e.to_string())
        })
    }
}

async fn status_error(status: StatusCode, response: reqwest::Response) -> Error {
    let retry_after_seconds = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or(0);
    let body = response.text().await.unwrap_or_default();
    error!("Gemini API returned {status}: {body}");

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Authentication(body),
        StatusCode::TOO_MANY_REQUESTS => Error::RateLimited {
            retry_after_seconds,
        },
        StatusCode::NOT_FOUND => Error::NotFound(body),
        _ => Error::Provider(format!("{status}: {body}")),
    }
}

#[async_trait]
impl generation::Provider for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, Error> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response: GenerateContentResponse = self
            .post(&self.endpoint(&self.model, "generateContent"), &request)
            .await?;

        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| Error::Provider("response contained no candidates".to_string()))?;

        let text: String = candidate
            .content
            .map(|content| content.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|part| part.text)
            .collect();

        debug!("Gemini generated {} characters", text.len());
        Ok(text)
    }

    fn provider_id(&self) -> &str {
        PROVIDER_ID
    }
}

#[async_trait]
impl embedding::Provider for GeminiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, Error> {
        let request = EmbedContentRequest {
            model: &self.embedding_model,
            content: Content {
                parts: vec![Part { text }],
            },
        };

        let response: EmbedContentResponse = self
            .post(&self.endpoint(&self.embedding_model, "embedContent"), &request)
            .await?;

        Ok(response.embedding.values)
    }

    fn provider_id(&self) -> &str {
        PROVIDER_ID
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::Provider as _;
    use crate::generation::Provider as _;
    use mockito::{Matcher, Server, ServerGuard};
    use serde_json::json;

    const MODEL: &str = "models/gemini-flash-latest";
    const EMBEDDING_MODEL: &str = "models/text-embedding-004";

    fn client_for(server: &ServerGuard, key: Option<&str>) -> GeminiClient {
        GeminiClient::new(&server.url(), MODEL, EMBEDDING_MODEL, key.map(str::to_string)).unwrap()
    }

    #[tokio::test]
    async fn generate_sends_prompt_and_joins_candidate_parts() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-flash-latest:generateContent")
            .match_header("x-goog-api-key", "test-key")
            .match_body(Matcher::Json(json!({
                "contents": [{ "parts": [{ "text": "Summarize" }] }]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "candidates": [{
                        "content": { "parts": [{ "text": "# Module\n" }, { "text": "Body" }] }
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let text = client_for(&server, Some("test-key"))
            .generate("Summarize")
            .await
            .unwrap();

        assert_eq!(text, "# Module\nBody");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn from_config_targets_the_configured_server_and_key() {
        let mut server = Server::new_async().await;
        let config = Config::from_env()
            .set_gemini_api_key(Some("configured-key".to_string()))
            .set_gemini_base_url(server.url());
        let mock = server
            .mock(
                "POST",
                format!("/{}:embedContent", config.gemini_embedding_model()).as_str(),
            )
            .match_header("x-goog-api-key", "configured-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "embedding": { "values": [0.5, 0.5] } }).to_string())
            .create_async()
            .await;

        let values = GeminiClient::from_config(&config)
            .unwrap()
            .embed("standup")
            .await
            .unwrap();

        assert_eq!(values, vec![0.5, 0.5]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn embed_reads_embedding_values() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/models/text-embedding-004:embedContent")
            .match_header("x-goog-api-key", "test-key")
            .match_body(Matcher::Json(json!({
                "model": "models/text-embedding-004",
                "content": { "parts": [{ "text": "jwt expiry" }] }
            })))
            .with_status(200)
            .with_body(r#"{"embedding": {"values": [0.25, -0.5, 1.0]}}"#)
            .create_async()
            .await;

        let values = client_for(&server, Some("test-key"))
            .embed("jwt expiry")
            .await
            .unwrap();

        assert_eq!(values, vec![0.25, -0.5, 1.0]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn missing_key_fails_without_a_request() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let err = client_for(&server, None).embed("text").await.unwrap_err();

        assert!(matches!(err, Error::Configuration(_)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn unauthorized_maps_to_authentication() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/models/gemini-flash-latest:generateContent")
            .with_status(403)
            .with_body("API key not valid")
            .create_async()
            .await;

        let err = client_for(&server, Some("bad")).generate("hi").await.unwrap_err();

        assert!(matches!(err, Error::Authentication(body) if body == "API key not valid"));
    }

    #[tokio::test]
    async fn too_many_requests_maps_to_rate_limited() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/models/text-embedding-004:embedContent")
            .with_status(429)
            .with_header("retry-after", "17")
            .create_async()
            .await;

        let err = client_for(&server, Some("k")).embed("hi").await.unwrap_err();

        assert!(matches!(
            err,
            Error::RateLimited {
                retry_after_seconds: 17
            }
        ));
    }

    #[tokio::test]
    async fn unknown_model_maps_to_not_found() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/models/gemini-flash-latest:generateContent")
            .with_status(404)
            .create_async()
            .await;

        let err = client_for(&server, Some("k")).generate("hi").await.unwrap_err();

        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn server_errors_map_to_provider() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/models/gemini-flash-latest:generateContent")
            .with_status(500)
            .with_body("internal")
            .create_async()
            .await;

        let err = client_for(&server, Some("k")).generate("hi").await.unwrap_err();

        assert!(matches!(err, Error::Provider(msg) if msg.contains("internal")));
    }

    #[tokio::test]
    async fn empty_candidates_are_a_provider_error() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/models/gemini-flash-latest:generateContent")
            .with_status(200)
            .with_body(r#"{"candidates": []}"#)
            .create_async()
            .await;

        let err = client_for(&server, Some("k")).generate("hi").await.unwrap_err();

        assert!(matches!(err, Error::Provider(_)));
    }

    #[tokio::test]
    async fn malformed_body_is_a_deserialization_error() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/models/text-embedding-004:embedContent")
            .with_status(200)
            .with_body(r#"{"embedding": "nope"}"#)
            .create_async()
            .await;

        let err = client_for(&server, Some("k")).embed("hi").await.unwrap_err();

        assert!(matches!(err, Error::Deserialization(_)));
    }
}

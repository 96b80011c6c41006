//! GitHub REST implementation of [`ReleaseApi`].
//!
//! # Responsibility
//! - Authenticate with a token and address one `owner/repo`.
//! - Map HTTP status and payload failures to [`ApiError`].
//!
//! # Invariants
//! - A `null` release body is read as an empty string.
//! - Error messages taken from response bodies are sanitized and capped.

use crate::api::{ApiError, ApiResult, ReleaseApi};
use crate::config::SmugglerConfig;
use crate::logging::sanitize_message;
use crate::model::release::{Release, ReleaseId};
use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const GITHUB_API_VERSION_HEADER: &str = "x-github-api-version";
const GITHUB_API_VERSION: &str = "2022-11-28";
const MAX_ERROR_MESSAGE_CHARS: usize = 200;

#[derive(Debug, Deserialize)]
struct ReleaseResponse {
    id: ReleaseId,
    tag_name: String,
    body: Option<String>,
}

impl From<ReleaseResponse> for Release {
    fn from(value: ReleaseResponse) -> Self {
        Release::new(value.id, value.tag_name, value.body.unwrap_or_default())
    }
}

#[derive(Debug, Serialize)]
struct EditReleaseRequest<'a> {
    tag_name: &'a str,
    body: &'a str,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    login: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: String,
}

/// Token-authenticated release client bound to one repository.
pub struct GithubReleaseApi {
    client: Client,
    base_url: Url,
    owner: String,
    repo: String,
}

impl GithubReleaseApi {
    /// Builds a client from validated configuration.
    ///
    /// # Errors
    /// - Returns `ApiError::Other` when the base URL or token cannot be used.
    /// - Returns `ApiError::Http` when the HTTP client cannot be built.
    pub fn new(config: &SmugglerConfig) -> ApiResult<Self> {
        let base_url = Url::parse(&config.api_base_url).map_err(|err| {
            ApiError::Other(format!(
                "invalid api base url `{}`: {err}",
                config.api_base_url
            ))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Other(format!(
                "api base url `{}` cannot carry a path",
                config.api_base_url
            )));
        }

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.token))
            .map_err(|_| ApiError::Other("token contains invalid header characters".to_string()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));
        headers.insert(
            GITHUB_API_VERSION_HEADER,
            HeaderValue::from_static(GITHUB_API_VERSION),
        );

        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url,
            owner: config.owner.clone(),
            repo: config.repo.clone(),
        })
    }

    /// Returns the login of the authenticated user.
    pub async fn current_user(&self) -> ApiResult<String> {
        let url = self.endpoint(&["user"]);
        let response = self.client.get(url).send().await?;
        let user: UserResponse = read_json(response).await?;
        Ok(user.login)
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn repo_endpoint(&self, tail: &[&str]) -> Url {
        let mut segments = vec!["repos", self.owner.as_str(), self.repo.as_str()];
        segments.extend_from_slice(tail);
        self.endpoint(&segments)
    }
}

#[async_trait]
impl ReleaseApi for GithubReleaseApi {
    async fn get_release_by_tag(&self, tag: &str) -> ApiResult<Release> {
        debug!(
            "event=release_fetch module=api status=start repo={}/{} tag={tag}",
            self.owner, self.repo
        );
        let url = self.repo_endpoint(&["releases", "tags", tag]);
        let response = self.client.get(url).send().await?;
        let release: ReleaseResponse = read_json(response).await?;
        Ok(release.into())
    }

    async fn edit_release(&self, id: ReleaseId, tag: &str, body: &str) -> ApiResult<()> {
        debug!(
            "event=release_edit module=api status=start repo={}/{} release_id={id} body_len={}",
            self.owner,
            self.repo,
            body.len()
        );
        let id_segment = id.to_string();
        let url = self.repo_endpoint(&["releases", id_segment.as_str()]);
        let request = EditReleaseRequest {
            tag_name: tag,
            body,
        };
        let response = self.client.patch(url).json(&request).send().await?;
        ensure_success(response).await?;
        Ok(())
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let response = ensure_success(response).await?;
    response
        .json::<T>()
        .await
        .map_err(|err| ApiError::InvalidResponse(err.to_string()))
}

async fn ensure_success(response: Response) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    Err(ApiError::Status {
        status: status.as_u16(),
        message: error_message_from_body(&text),
    })
}

fn error_message_from_body(text: &str) -> String {
    let message = serde_json::from_str::<ErrorResponse>(text)
        .map(|parsed| parsed.message)
        .unwrap_or_else(|_| text.to_string());
    if message.trim().is_empty() {
        return "empty response body".to_string();
    }
    sanitize_message(&message, MAX_ERROR_MESSAGE_CHARS)
}

//! Gyazo image API access.
//!
//! [`ImageSource`] is the port the sync engine and deletion workflow talk to;
//! [`GyazoClient`] implements it over HTTP.

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::models::{ImageRecord, Settings};
use crate::util::{compact_text, is_http_url};
use crate::{Error, Result};

/// Number of images requested per list page.
pub const PAGE_SIZE: u32 = 20;

/// Remote image listing, lookup and deletion.
pub trait ImageSource: Send + Sync {
    /// One page of images, newest first. Pages start at 1.
    fn list_images(
        &self,
        access_token: &str,
        page: u32,
        per_page: u32,
    ) -> impl Future<Output = Result<Vec<ImageRecord>>> + Send;

    /// Full record for one image; [`Error::NotFound`] when it no longer exists.
    fn get_image(
        &self,
        access_token: &str,
        image_id: &str,
    ) -> impl Future<Output = Result<ImageRecord>> + Send;

    /// Delete one image. `Ok` only when the service confirmed this exact id.
    fn delete_image(
        &self,
        access_token: &str,
        image_id: &str,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// HTTP client for the Gyazo REST API.
#[derive(Debug, Clone)]
pub struct GyazoClient {
    base_url: String,
    client: Client,
}

impl GyazoClient {
    /// Builds a client for an explicit API base URL.
    ///
    /// Every request is bounded by `timeout`; an expired request surfaces as
    /// [`Error::Http`].
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = normalize_base_url(&base_url.into())?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { base_url, client })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(
            settings.api_base_url.clone(),
            Duration::from_secs(settings.request_timeout_secs),
        )
    }

    /// Returns the base URL this client was configured with.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn image_url(&self, image_id: &str) -> String {
        format!(
            "{}/api/images/{}",
            self.base_url,
            urlencoding::encode(image_id)
        )
    }
}

impl ImageSource for GyazoClient {
    async fn list_images(
        &self,
        access_token: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<ImageRecord>> {
        tracing::debug!(page, per_page, "Fetching Gyazo image list page");
        let response = self
            .client
            .get(format!("{}/api/images", self.base_url))
            .query(&[
                ("access_token", access_token.to_string()),
                ("page", page.to_string()),
                ("per_page", per_page.to_string()),
            ])
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Transport(format!(
                "image list page {page} failed: {}",
                api_error_message(status, &body)
            )));
        }

        let page_values = response.json::<Vec<serde_json::Value>>().await?;
        Ok(decode_image_page(page, page_values))
    }

    async fn get_image(&self, access_token: &str, image_id: &str) -> Result<ImageRecord> {
        let response = self
            .client
            .get(self.image_url(image_id))
            .query(&[("access_token", access_token)])
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(image_id.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Transport(format!(
                "image {image_id} lookup failed: {}",
                api_error_message(status, &body)
            )));
        }

        Ok(response.json::<ImageRecord>().await?)
    }

    async fn delete_image(&self, access_token: &str, image_id: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.image_url(image_id))
            .query(&[("access_token", access_token)])
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        check_delete_response(status, &body, image_id)
    }
}

#[derive(Debug, Deserialize)]
struct DeleteResponse {
    image_id: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// Interpret a delete response: HTTP 200 echoing the requested id, nothing else.
pub fn check_delete_response(status: StatusCode, body: &str, requested_id: &str) -> Result<()> {
    if status == StatusCode::NOT_FOUND {
        return Err(Error::NotFound(requested_id.to_string()));
    }
    if status != StatusCode::OK {
        return Err(Error::Transport(format!(
            "delete of image {requested_id} failed: {}",
            api_error_message(status, body)
        )));
    }

    let payload = serde_json::from_str::<DeleteResponse>(body).map_err(|error| {
        Error::Transport(format!(
            "delete of image {requested_id} returned an unexpected body: {error}"
        ))
    })?;

    if payload.image_id == requested_id {
        Ok(())
    } else {
        Err(Error::Transport(format!(
            "delete of image {requested_id} was acknowledged for {}",
            payload.image_id
        )))
    }
}

fn api_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}

fn normalize_base_url(raw: &str) -> Result<String> {
    let base = raw.trim().trim_end_matches('/').to_string();
    if base.is_empty() {
        return Err(Error::Configuration(
            "API base URL must not be empty".to_string(),
        ));
    }
    if !is_http_url(&base) {
        return Err(Error::Configuration(
            "API base URL must include http:// or https://".to_string(),
        ));
    }
    Ok(base)
}

/// Convert one list page record by record, dropping entries that do not
/// parse so a single malformed image cannot sink the page.
pub(crate) fn decode_image_page(page: u32, values: Vec<serde_json::Value>) -> Vec<ImageRecord> {
    values
        .into_iter()
        .filter_map(|value| {
            let image_id = value
                .get("image_id")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("<unknown>")
                .to_string();
            match serde_json::from_value::<ImageRecord>(value) {
                Ok(record) => Some(record),
                Err(error) => {
                    tracing::warn!(
                        page,
                        image_id = %image_id,
                        "Dropping malformed image record: {error}"
                    );
                    None
                }
            }
        })
        .collect()
}

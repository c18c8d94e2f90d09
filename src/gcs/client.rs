use super::{GcsUri, ObjectStore};
use crate::error::{BatchError, classify_upstream_error};
use crate::google_oauth::TokenSource;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::sync::Arc;
use tracing::debug;
use url::Url;
use vertexbatch_schema::GcsObjectList;

/// Cloud Storage JSON API client.
pub struct GcsClient {
    client: reqwest::Client,
    tokens: Arc<dyn TokenSource>,
    endpoint: Url,
}

impl GcsClient {
    pub fn new(client: reqwest::Client, tokens: Arc<dyn TokenSource>, endpoint: Url) -> Self {
        Self {
            client,
            tokens,
            endpoint,
        }
    }

    /// Endpoint joined with path segments; each segment is percent-encoded, so
    /// `/` inside an object name becomes `%2F`.
    fn api_url(&self, segments: &[&str]) -> Result<Url, BatchError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|()| {
                BatchError::Config(format!("storage endpoint cannot be a base: {}", self.endpoint))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl ObjectStore for GcsClient {
    async fn upload(&self, dest: &GcsUri, bytes: Vec<u8>) -> Result<(), BatchError> {
        let mut url = self.api_url(&["upload", "storage", "v1", "b", &dest.bucket, "o"])?;
        url.query_pairs_mut()
            .append_pair("uploadType", "media")
            .append_pair("name", &dest.object);

        let size = bytes.len();
        let resp = self
            .client
            .post(url)
            .bearer_auth(self.tokens.access_token().await?)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(bytes)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(classify_upstream_error(resp).await);
        }
        debug!(uri = %dest, size, "Object uploaded");
        Ok(())
    }

    async fn list(&self, prefix: &GcsUri) -> Result<Vec<GcsUri>, BatchError> {
        let mut found = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = self.api_url(&["storage", "v1", "b", &prefix.bucket, "o"])?;
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("prefix", &prefix.object);
                query.append_pair("fields", "items(name,bucket,size),nextPageToken");
                if let Some(token) = page_token.as_deref() {
                    query.append_pair("pageToken", token);
                }
            }

            let resp = self
                .client
                .get(url)
                .bearer_auth(self.tokens.access_token().await?)
                .send()
                .await?;
            if !resp.status().is_success() {
                return Err(classify_upstream_error(resp).await);
            }
            let page: GcsObjectList = resp.json().await?;
            found.extend(
                page.items
                    .into_iter()
                    .map(|object| GcsUri::new(prefix.bucket.clone(), object.name)),
            );

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!(prefix = %prefix, count = found.len(), "Objects listed");
        Ok(found)
    }

    async fn download(&self, src: &GcsUri) -> Result<Vec<u8>, BatchError> {
        let mut url = self.api_url(&["storage", "v1", "b", &src.bucket, "o", &src.object])?;
        url.query_pairs_mut().append_pair("alt", "media");

        let resp = self
            .client
            .get(url)
            .bearer_auth(self.tokens.access_token().await?)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(classify_upstream_error(resp).await);
        }
        let bytes = resp.bytes().await?;
        debug!(uri = %src, size = bytes.len(), "Object downloaded");
        Ok(bytes.to_vec())
    }
}

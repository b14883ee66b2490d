use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info};
use trove_config::ApiConfig;
use trove_config::util::normalize_base_url;
use trove_contracts::gateway::{GatewayError, GatewayResult};
use trove_contracts::listings::{ListingReader, ListingWriter};
use trove_contracts::media::{FetchedPhoto, MediaSource, MediaUploader};
use trove_model::{Listing, ListingFields, ListingId, OwnerEmail, PhotoUpload, Price};
use url::Url;

const FALLBACK_MIME: &str = "application/octet-stream";

#[derive(Debug, Error)]
pub enum GatewayBuildError {
    #[error("invalid API base URL {url}: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("API base URL {0} cannot carry a path")]
    OpaqueBaseUrl(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Body of the listing create and update endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ListingPayload<'a> {
    title: &'a str,
    price: Price,
    description: &'a str,
    owner_email: &'a str,
}

impl<'a> ListingPayload<'a> {
    fn new(owner: &'a OwnerEmail, fields: &'a ListingFields) -> Self {
        Self {
            title: fields.title(),
            price: fields.price(),
            description: fields.description(),
            owner_email: owner.as_str(),
        }
    }
}

/// reqwest client for the marketplace API.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base: Url,
}

impl HttpGateway {
    pub fn new(config: &ApiConfig) -> Result<Self, GatewayBuildError> {
        let normalized = normalize_base_url(&config.base_url);
        let base = Url::parse(&normalized).map_err(|source| GatewayBuildError::InvalidBaseUrl {
            url: normalized.clone(),
            source,
        })?;
        if base.cannot_be_a_base() {
            return Err(GatewayBuildError::OpaqueBaseUrl(normalized));
        }

        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        info!(base_url = %base, "marketplace gateway ready");
        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Base URL with `segments` appended, each percent-encoded.
    fn endpoint<I>(&self, segments: I) -> GatewayResult<Url>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| GatewayError::Transport(format!("{} cannot carry a path", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> GatewayResult<Response> {
        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), "request rejected: {message}");
        Err(GatewayError::Status {
            status: status.as_u16(),
            message: message.trim().to_string(),
        })
    }

    async fn json<T: DeserializeOwned>(&self, request: RequestBuilder) -> GatewayResult<T> {
        let response = self.send(request).await?;
        let body = response.bytes().await.map_err(transport)?;
        serde_json::from_slice(&body).map_err(|err| GatewayError::Decode(err.to_string()))
    }
}

fn transport(err: reqwest::Error) -> GatewayError {
    GatewayError::Transport(err.to_string())
}

#[async_trait]
impl ListingReader for HttpGateway {
    async fn list_listings(&self) -> GatewayResult<Vec<Listing>> {
        let url = self.endpoint(["listings"])?;
        self.json(self.client.get(url)).await
    }

    async fn list_listings_for_owner(&self, owner: &OwnerEmail) -> GatewayResult<Vec<Listing>> {
        let url = self.endpoint(["listings", "user", owner.as_str()])?;
        self.json(self.client.get(url)).await
    }
}

#[async_trait]
impl ListingWriter for HttpGateway {
    async fn create_listing(
        &self,
        owner: &OwnerEmail,
        fields: &ListingFields,
    ) -> GatewayResult<Listing> {
        let url = self.endpoint(["addListing"])?;
        let payload = ListingPayload::new(owner, fields);
        self.json(self.client.post(url).json(&payload)).await
    }

    async fn update_listing(
        &self,
        id: ListingId,
        owner: &OwnerEmail,
        fields: &ListingFields,
    ) -> GatewayResult<Listing> {
        let url = self.endpoint(["listings".to_string(), id.to_string()])?;
        let payload = ListingPayload::new(owner, fields);
        self.json(self.client.put(url).json(&payload)).await
    }

    async fn delete_listing(&self, id: ListingId, owner: &OwnerEmail) -> GatewayResult<()> {
        let url = self.endpoint(["listings".to_string(), id.to_string()])?;
        let request = self
            .client
            .delete(url)
            .query(&[("ownerEmail", owner.as_str())]);
        self.send(request).await.map(drop)
    }
}

#[async_trait]
impl MediaSource for HttpGateway {
    async fn fetch_photo(&self, id: ListingId) -> GatewayResult<FetchedPhoto> {
        let url = self.endpoint(["media".to_string(), "listing".to_string(), id.to_string()])?;
        let response = self.send(self.client.get(url)).await?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let bytes = response.bytes().await.map_err(transport)?;

        let photo = FetchedPhoto::new(bytes);
        Ok(match content_type {
            Some(content_type) => photo.with_content_type(content_type),
            None => photo,
        })
    }
}

#[async_trait]
impl MediaUploader for HttpGateway {
    async fn upload_photo(&self, id: ListingId, photo: &PhotoUpload) -> GatewayResult<()> {
        let url = self.endpoint(["media"])?;
        let mime = photo.mime_type().unwrap_or_else(|| FALLBACK_MIME.to_string());
        let part = Part::bytes(photo.bytes.to_vec())
            .file_name(photo.file_name.clone())
            .mime_str(&mime)
            .map_err(transport)?;
        let form = Form::new().text("id", id.to_string()).part("media", part);

        debug!(listing_id = %id, bytes = photo.len(), mime = %mime, "uploading photo");
        self.send(self.client.post(url).multipart(form))
            .await
            .map(drop)
    }
}

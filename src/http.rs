//! HTTPS client for the bridge resource API.

use log::debug;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::client::ResourceClient;
use crate::config::BridgeConfig;
use crate::errors::Error;
use crate::patch::Patch;
use crate::resource::{ResourceLink, ResourceType};

type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Deserialize)]
struct ApiError {
    description: String,
}

/// Every resource endpoint answers with this envelope.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    errors: Vec<ApiError>,
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

/// A [`ResourceClient`] that talks to a real bridge over HTTPS.
///
/// One `HttpClient` keeps a pooled connection and can be shared by several
/// controllers through a reference or an [`Arc`](std::sync::Arc).
///
/// # Example
///
/// ```ignore
/// use hue_lights_rs::{BridgeConfig, GroupController, HttpClient, Resolver};
///
/// let client = HttpClient::new(&BridgeConfig::new("192.168.1.2", "app-key"))?;
/// let group_id = Resolver::new(&client).resolve("living room").await?;
/// let mut group = GroupController::new(&client, &group_id);
/// group.set_brightness(60.0, Some(400)).await?;
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: String,
    http: reqwest::Client,
}

impl HttpClient {
    const APP_KEY_HEADER: &'static str = "hue-application-key";

    pub fn new(config: &BridgeConfig) -> Result<Self> {
        config.validate()?;

        let key = HeaderValue::from_str(config.app_key.trim()).map_err(|e| {
            Error::InvalidConfig(format!("application key is not a valid header value: {e}"))
        })?;
        let mut headers = HeaderMap::new();
        headers.insert(Self::APP_KEY_HEADER, key);

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .default_headers(headers)
            .build()
            .map_err(|e| Error::InvalidConfig(format!("cannot build http client: {e}")))?;

        Ok(Self {
            base_url: config.base_url(),
            http,
        })
    }

    fn collection_url(&self, rtype: ResourceType) -> String {
        format!("{}/{}", self.base_url, rtype)
    }

    fn resource_url(&self, rtype: ResourceType, id: &str) -> String {
        format!("{}/{}/{}", self.base_url, rtype, id)
    }
}

impl ResourceClient for HttpClient {
    async fn fetch(&self, rtype: ResourceType) -> Result<Vec<Value>> {
        let url = self.collection_url(rtype);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::fetch(rtype, e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| Error::fetch(rtype, e))?;
        debug!("GET {url} -> {status}");

        decode_envelope(status.as_u16(), &body).map_err(|reason| Error::fetch(rtype, reason))
    }

    async fn write(&self, rtype: ResourceType, id: &str, patch: &Patch) -> Result<Vec<ResourceLink>> {
        if !patch.is_valid() {
            return Err(Error::EmptyPatch);
        }

        let url = self.resource_url(rtype, id);
        let response = self
            .http
            .put(&url)
            .json(patch)
            .send()
            .await
            .map_err(|e| Error::write(rtype, id, e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| Error::write(rtype, id, e))?;
        debug!("PUT {url} -> {status}");

        decode_envelope(status.as_u16(), &body).map_err(|reason| Error::write(rtype, id, reason))
    }
}

/// Unwrap the `data` array, turning bridge errors and bad statuses into a reason.
fn decode_envelope<T: DeserializeOwned>(status: u16, body: &str) -> std::result::Result<Vec<T>, String> {
    let success = (200..300).contains(&status);

    let envelope: Envelope<T> = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(_) if !success => return Err(format!("status {status}: {}", body.trim())),
        Err(err) => return Err(format!("malformed response: {err}")),
    };

    if !envelope.errors.is_empty() {
        let descriptions: Vec<&str> = envelope
            .errors
            .iter()
            .map(|e| e.description.as_str())
            .collect();
        return Err(format!("status {status}: {}", descriptions.join("; ")));
    }

    if !success {
        return Err(format!("status {status}"));
    }

    Ok(envelope.data)
}

use artdid_types::ContentAddress;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::{ContentNode, ContentSource};

const USER_AGENT: &str = concat!("artdid/", env!("CARGO_PKG_VERSION"));

fn build_client() -> StoreResult<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| StoreError::Unavailable {
            reason: format!("building HTTP client: {e}"),
        })
}

fn trim_base(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

async fn read_body(name: &str, address: &ContentAddress, response: Response) -> StoreResult<Vec<u8>> {
    match response.status() {
        status if status.is_success() => {
            let body = response
                .bytes()
                .await
                .map_err(|e| StoreError::request(name, e))?;
            Ok(body.to_vec())
        }
        StatusCode::NOT_FOUND => Err(StoreError::NotFound {
            name: name.to_string(),
            address: address.clone(),
        }),
        status => Err(StoreError::request(name, format!("HTTP {status}"))),
    }
}

/// Read-only public gateway serving `GET {base}/ipfs/<address>`.
#[derive(Clone, Debug)]
pub struct HttpGateway {
    name: String,
    base_url: String,
    client: Client,
}

impl HttpGateway {
    pub fn new(base_url: &str) -> StoreResult<Self> {
        let base_url = trim_base(base_url);
        let name = base_url
            .split("://")
            .nth(1)
            .unwrap_or(&base_url)
            .to_string();
        Ok(Self {
            name,
            base_url,
            client: build_client()?,
        })
    }

    pub fn content_url(&self, address: &ContentAddress) -> String {
        format!("{}/ipfs/{address}", self.base_url)
    }
}

#[async_trait]
impl ContentSource for HttpGateway {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, address: &ContentAddress) -> StoreResult<Vec<u8>> {
        let url = self.content_url(address);
        debug!(gateway = %self.name, url = %url, "fetching content from gateway");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| StoreError::request(&self.name, e))?;
        read_body(&self.name, address, response).await
    }
}

#[derive(Deserialize)]
struct AddResponse {
    #[serde(rename = "Hash")]
    hash: String,
}

/// Operated content node reached through its HTTP API.
///
/// Uploads use `POST {api}/api/v0/add` (multipart, one file part) and reads
/// use `POST {api}/api/v0/cat?arg=<address>`.
#[derive(Clone, Debug)]
pub struct HttpContentNode {
    name: String,
    api_url: String,
    client: Client,
}

impl HttpContentNode {
    pub fn new(api_url: &str) -> StoreResult<Self> {
        Ok(Self {
            name: "node".into(),
            api_url: trim_base(api_url),
            client: build_client()?,
        })
    }
}

#[async_trait]
impl ContentSource for HttpContentNode {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, address: &ContentAddress) -> StoreResult<Vec<u8>> {
        let url = format!("{}/api/v0/cat", self.api_url);
        let response = self
            .client
            .post(&url)
            .query(&[("arg", address.as_str())])
            .send()
            .await
            .map_err(|e| StoreError::request(&self.name, e))?;
        read_body(&self.name, address, response).await
    }
}

#[async_trait]
impl ContentNode for HttpContentNode {
    async fn add(&self, data: &[u8]) -> StoreResult<ContentAddress> {
        let url = format!("{}/api/v0/add", self.api_url);
        let part = Part::bytes(data.to_vec()).file_name("metadata.json");
        let response = self
            .client
            .post(&url)
            .query(&[("pin", "true")])
            .multipart(Form::new().part("file", part))
            .send()
            .await
            .map_err(|e| StoreError::request(&self.name, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::request(&self.name, format!("HTTP {status}")));
        }

        let added: AddResponse = response.json().await.map_err(|e| StoreError::InvalidResponse {
            name: self.name.clone(),
            reason: e.to_string(),
        })?;
        if added.hash.is_empty() {
            return Err(StoreError::InvalidResponse {
                name: self.name.clone(),
                reason: "empty hash in add response".into(),
            });
        }
        Ok(ContentAddress::new(added.hash))
    }
}

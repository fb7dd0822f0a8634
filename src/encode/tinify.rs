use std::time::Duration;

use reqwest::blocking::{Client, Response};
use tracing::{debug, info};

use crate::card::options::CloudStore;
use crate::encode::raster::EncodedCard;
use crate::encode::sink::{CardSink, write_atomic};
use crate::foundation::error::{CardError, CardResult};

/// Upload endpoint of the Tinify shrink API.
pub const TINIFY_SHRINK_URL: &str = "https://api.tinify.com/shrink";

/// Sends cards through the Tinify compression service.
///
/// The encoded bytes are POSTed with basic auth `api:<key>` and the compressed image lives at
/// the `Location` of the response. With a [`CloudStore`] the service saves it to the bucket and
/// nothing is written locally. Without one it is downloaded and written atomically to
/// `card.path`.
pub struct TinifySink {
    client: Client,
    api_key: String,
    endpoint: String,
    store: Option<CloudStore>,
}

impl std::fmt::Debug for TinifySink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TinifySink")
            .field("endpoint", &self.endpoint)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl TinifySink {
    /// Create a sink for `api_key` against the public endpoint.
    pub fn new(api_key: impl Into<String>) -> CardResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(CardError::compression("api key must be non-empty"));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| CardError::compression(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key,
            endpoint: TINIFY_SHRINK_URL.to_owned(),
            store: None,
        })
    }

    /// Point the sink at a different shrink endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Have the service store results in `store` instead of downloading them.
    pub fn with_store(mut self, store: Option<CloudStore>) -> Self {
        self.store = store;
        self
    }

    /// Upload the card and return the URL of the compressed result.
    fn shrink(&self, card: &EncodedCard) -> CardResult<String> {
        let res = self
            .client
            .post(&self.endpoint)
            .basic_auth("api", Some(&self.api_key))
            .header(reqwest::header::CONTENT_TYPE, card.format.mime())
            .body(card.bytes.clone())
            .send()
            .map_err(|e| CardError::compression(format!("upload failed: {e}")))?;
        let location = location_of(res, "upload")?;
        debug!(%location, "compressed image ready");
        Ok(location)
    }

    /// Ask the service to save the result at `location` into the cloud store.
    fn store_remote(&self, location: &str, store: &CloudStore) -> CardResult<String> {
        #[derive(serde::Serialize)]
        struct StoreRequest<'a> {
            store: &'a CloudStore,
        }

        let body = serde_json::to_vec(&StoreRequest { store })
            .map_err(|e| CardError::compression(format!("failed to encode store request: {e}")))?;
        let res = self
            .client
            .post(location)
            .basic_auth("api", Some(&self.api_key))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .map_err(|e| CardError::compression(format!("store request failed: {e}")))?;
        location_of(res, "store")
    }

    fn download(&self, location: &str) -> CardResult<Vec<u8>> {
        let res = self
            .client
            .get(location)
            .basic_auth("api", Some(&self.api_key))
            .send()
            .map_err(|e| CardError::compression(format!("download failed: {e}")))?;
        let status = res.status();
        if !status.is_success() {
            return Err(CardError::compression(format!(
                "download rejected with status {status}"
            )));
        }
        let bytes = res
            .bytes()
            .map_err(|e| CardError::compression(format!("failed to read compressed image: {e}")))?;
        Ok(bytes.to_vec())
    }
}

/// Check the status of a service response and read its `Location` header.
fn location_of(res: Response, step: &str) -> CardResult<String> {
    let status = res.status();
    if !status.is_success() {
        let body = res.text().unwrap_or_default();
        return Err(CardError::compression(format!(
            "{step} rejected with status {status}: {}",
            body.trim()
        )));
    }
    res.headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .ok_or_else(|| CardError::compression(format!("{step} response has no Location header")))
}

impl CardSink for TinifySink {
    fn write(&mut self, card: &EncodedCard) -> CardResult<()> {
        let location = self.shrink(card)?;
        if let Some(store) = &self.store {
            let stored = self.store_remote(&location, store)?;
            info!(service = %store.service, "{stored} image was stored");
            return Ok(());
        }

        let compressed = self.download(&location)?;
        debug!(
            before = card.bytes.len(),
            after = compressed.len(),
            "compressed card"
        );
        write_atomic(&card.path, &compressed)?;
        info!("{} image was created", card.path.display());
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/tinify.rs"]
mod tests;

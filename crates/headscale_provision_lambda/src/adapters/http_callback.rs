use headscale_provision_core::error::ReconcileError;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};

use crate::adapters::callback::CallbackTransport;

/// Delivers response documents to pre-signed callback URLs.
///
/// The callback is a signed storage URL that was signed without a content
/// type, so the request must send an empty one.
#[derive(Clone, Default)]
pub struct HttpCallbackTransport {
    client: reqwest::Client,
}

impl HttpCallbackTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl CallbackTransport for HttpCallbackTransport {
    fn put(&self, url: &str, body: &[u8]) -> Result<(), ReconcileError> {
        let request = self
            .client
            .put(url)
            .header(CONTENT_TYPE, "")
            .header(CONTENT_LENGTH, body.len().to_string())
            .body(body.to_vec());

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let response = request
                    .send()
                    .await
                    .map_err(|error| ReconcileError::transport(error.to_string()))?;
                let status = response.status();
                if !status.is_success() {
                    let body = response.text().await.unwrap_or_default();
                    return Err(ReconcileError::transport(format!(
                        "callback returned {status}: {body}"
                    )));
                }
                Ok(())
            })
        })
    }
}

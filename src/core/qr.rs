use crate::domain::ports::QrSource;
use crate::utils::error::{CertError, FetchError, Result};
use async_trait::async_trait;
use image::DynamicImage;
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_QR_ENDPOINT: &str = "https://api.qrserver.com/v1/create-qr-code/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const QR_SIZE: &str = "150x150";

/// 產生器端點讀取的內容格式：`;<id>?`
pub fn qr_payload(id_certificate: &str) -> String {
    format!(";{}?", id_certificate)
}

/// Fetches QR images from a remote generator, one bounded request per call, no retries.
pub struct HttpQrFetcher {
    client: Client,
    endpoint: String,
    timeout_secs: u64,
}

impl HttpQrFetcher {
    pub fn new(endpoint: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            timeout_secs,
        })
    }

    fn fail(&self, id_certificate: &str, source: FetchError) -> CertError {
        CertError::Fetch {
            id: id_certificate.to_string(),
            source,
        }
    }

    fn classify(&self, id_certificate: &str, e: reqwest::Error) -> CertError {
        let source = if e.is_timeout() {
            FetchError::Timeout {
                seconds: self.timeout_secs,
            }
        } else {
            FetchError::Network(e.to_string())
        };
        self.fail(id_certificate, source)
    }
}

#[async_trait]
impl QrSource for HttpQrFetcher {
    async fn fetch(&self, id_certificate: &str) -> Result<DynamicImage> {
        let payload = qr_payload(id_certificate);
        tracing::debug!("Requesting QR code for {} from {}", id_certificate, self.endpoint);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("size", QR_SIZE), ("data", payload.as_str())])
            .send()
            .await
            .map_err(|e| self.classify(id_certificate, e))?;

        let status = response.status();
        tracing::debug!("QR endpoint response status: {}", status);
        if !status.is_success() {
            return Err(self.fail(
                id_certificate,
                FetchError::Status {
                    status: status.as_u16(),
                },
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.classify(id_certificate, e))?;

        image::load_from_memory(&body)
            .map_err(|e| self.fail(id_certificate, FetchError::Decode(e.to_string())))
    }
}

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use thiserror::Error;

use crate::shared::constants::IMAGE_REQUEST_TIMEOUT;
use crate::stream::domain::image_detector::ImageDetector;
use crate::stream::domain::protocol::DetectRequest;

#[derive(Error, Debug)]
pub enum HttpDetectorError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
}

/// Posts one encoded image to the detector's `/detect` endpoint and waits
/// for the reply.
pub struct HttpDetector {
    url: String,
    client: Client,
}

impl HttpDetector {
    pub fn new(url: impl Into<String>) -> Result<Self, HttpDetectorError> {
        let client = Client::builder()
            .timeout(IMAGE_REQUEST_TIMEOUT)
            .build()
            .map_err(HttpDetectorError::Client)?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn post(&self, body: String) -> Result<String, HttpDetectorError> {
        let request_error = |source| HttpDetectorError::Request {
            url: self.url.clone(),
            source,
        };
        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            // Tunnelled deployments otherwise answer with an HTML interstitial.
            .header("ngrok-skip-browser-warning", "true")
            .body(body)
            .send()
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(HttpDetectorError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }
        response.text().map_err(request_error)
    }
}

impl ImageDetector for HttpDetector {
    fn detect(&self, request: &DetectRequest) -> Result<String, Box<dyn std::error::Error>> {
        let body = request.to_json()?;
        log::debug!("POST {} ({} bytes)", self.url, body.len());
        Ok(self.post(body)?)
    }
}

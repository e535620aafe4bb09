//! Client for the external tire classification service.
//!
//! Failures are returned as typed errors rather than absorbed here; the
//! upload service is the single place that decides what a classification
//! failure means for an upload.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::debug;

use crate::config::ClassifierConfig;
use crate::model::analysis::{ImageAnalysis, Prediction};

#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("Failed to build classifier client: {0}")]
    ClientBuild(String),
    #[error("Classification request failed: {0}")]
    Transport(String),
    #[error("Classification service returned status {0}")]
    BadStatus(u16),
    #[error("Malformed classifier response: {0}")]
    MalformedResponse(String),
}

#[async_trait]
pub trait TireClassifier: Send + Sync {
    /// Classifies the given images, one result per input image in order.
    async fn classify(&self, images: &[Vec<u8>]) -> Result<Vec<ImageAnalysis>, ClassifierError>;
}

/// Per-image entry as returned by the remote /classify endpoint.
#[derive(Debug, Deserialize)]
struct RemoteClassification {
    class: Option<String>,
    confidence: Option<f64>,
}

pub struct HttpTireClassifier {
    client: reqwest::Client,
    config: ClassifierConfig,
}

impl HttpTireClassifier {
    pub fn new(config: ClassifierConfig) -> Result<Self, ClassifierError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClassifierError::ClientBuild(e.to_string()))?;
        Ok(HttpTireClassifier { client, config })
    }
}

#[async_trait]
impl TireClassifier for HttpTireClassifier {
    #[tracing::instrument(skip(self, images), fields(image_count = images.len()))]
    async fn classify(&self, images: &[Vec<u8>]) -> Result<Vec<ImageAnalysis>, ClassifierError> {
        let mut form = Form::new();
        for (i, image) in images.iter().enumerate() {
            let part = Part::bytes(image.clone())
                .file_name(format!("tire_image_{}.jpg", i))
                .mime_str("image/jpeg")
                .map_err(|e| ClassifierError::ClientBuild(e.to_string()))?;
            form = form.part("image", part);
        }

        let url = format!("{}/classify", self.config.base_url.trim_end_matches('/'));
        debug!("Posting {} images to {}", images.len(), url);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ClassifierError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClassifierError::BadStatus(status.as_u16()));
        }

        let results: Vec<RemoteClassification> = response
            .json()
            .await
            .map_err(|e| ClassifierError::MalformedResponse(e.to_string()))?;

        if results.len() != images.len() {
            return Err(ClassifierError::MalformedResponse(format!(
                "expected {} results, got {}",
                images.len(),
                results.len()
            )));
        }

        Ok(results
            .into_iter()
            .map(|r| ImageAnalysis {
                prediction: r
                    .class
                    .as_deref()
                    .map(Prediction::from_label)
                    .unwrap_or(Prediction::Normal),
                confidence: r.confidence.unwrap_or(0.5),
            })
            .collect())
    }
}

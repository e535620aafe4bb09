//! Upload processing for both the operator and the guest endpoints.
//!
//! Classification failures never fail an upload. The classifier returns a
//! typed error and this service substitutes the fallback analysis for every
//! image, so the record is stored with a safe verdict and the failure only
//! shows up in the logs.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use tracing::{info, warn};

use crate::dto::upload_dto::{
    is_valid_mobile_number, is_valid_vehicle_number, UploadRequest, UploadResult,
};
use crate::dto::{format_datetime, format_datetime_opt};
use crate::model::analysis::{ImageAnalysis, OverallStatus};
use crate::model::guest_data::GuestData;
use crate::model::toll_data::{TireImage, TollData};
use crate::model::user::User;
use crate::repository::guest_data_repo::GuestDataRepository;
use crate::repository::toll_data_repo::TollDataRepository;
use crate::util::classifier::TireClassifier;
use crate::util::error::ServiceError;

pub struct UploadService {
    toll_repo: Arc<dyn TollDataRepository>,
    guest_repo: Arc<dyn GuestDataRepository>,
    classifier: Arc<dyn TireClassifier>,
}

impl UploadService {
    pub fn new(
        toll_repo: Arc<dyn TollDataRepository>,
        guest_repo: Arc<dyn GuestDataRepository>,
        classifier: Arc<dyn TireClassifier>,
    ) -> Self {
        UploadService {
            toll_repo,
            guest_repo,
            classifier,
        }
    }

    fn validate(request: &UploadRequest) -> Result<(), ServiceError> {
        if request.vehicle_number.trim().is_empty()
            || request.user_mobile_number.trim().is_empty()
            || request.images.is_empty()
        {
            return Err(ServiceError::InvalidInput(
                "All fields are required and at least one image must be provided".to_string(),
            ));
        }
        if !is_valid_vehicle_number(&request.vehicle_number) {
            return Err(ServiceError::InvalidInput(
                "Invalid vehicle number format".to_string(),
            ));
        }
        if !is_valid_mobile_number(&request.user_mobile_number) {
            return Err(ServiceError::InvalidInput(
                "Invalid mobile number format".to_string(),
            ));
        }
        Ok(())
    }

    fn decode_images(images: &[String]) -> Result<Vec<Vec<u8>>, ServiceError> {
        images
            .iter()
            .map(|encoded| {
                // tolerate data URL prefixes from browser uploads
                let raw = match encoded.find(";base64,") {
                    Some(idx) => &encoded[idx + ";base64,".len()..],
                    None => encoded.as_str(),
                };
                BASE64
                    .decode(raw)
                    .map_err(|_| ServiceError::InvalidInput("Invalid image data".to_string()))
            })
            .collect()
    }

    /// Runs the classifier over the decoded images. On any failure every
    /// image gets the fallback analysis instead.
    async fn analyze(&self, images: &[Vec<u8>]) -> Vec<ImageAnalysis> {
        match self.classifier.classify(images).await {
            Ok(results) => results,
            Err(err) => {
                warn!("Classification failed, storing fallback analysis: {}", err);
                images.iter().map(|_| ImageAnalysis::fallback()).collect()
            }
        }
    }

    fn parse_date(date: Option<&str>) -> bson::DateTime {
        date.and_then(|d| chrono::DateTime::parse_from_rfc3339(d).ok())
            .map(|d| bson::DateTime::from_chrono(d.with_timezone(&chrono::Utc)))
            .unwrap_or_else(bson::DateTime::now)
    }

    #[tracing::instrument(skip(self, request, operator), fields(vehicle = %request.vehicle_number, operator = %operator.username))]
    pub async fn upload_toll(
        &self,
        request: UploadRequest,
        operator: &User,
    ) -> Result<UploadResult, ServiceError> {
        Self::validate(&request)?;
        let decoded = Self::decode_images(&request.images)?;
        let results = self.analyze(&decoded).await;
        let overall_status = OverallStatus::derive(&results);

        let images = request
            .images
            .iter()
            .zip(results.iter())
            .map(|(base64, analysis)| TireImage {
                base64: Some(base64.clone()),
                analysis: analysis.clone(),
            })
            .collect();

        let record = TollData {
            id: None,
            vehicle_number: request.vehicle_number.to_uppercase(),
            user_mobile_number: request.user_mobile_number.clone(),
            date: Self::parse_date(request.date.as_deref()),
            toll_operator: request
                .toll_operator
                .clone()
                .unwrap_or_else(|| operator.username.clone()),
            toll_plaza: operator
                .toll_plaza
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            images,
            overall_status,
            analysis_timestamp: bson::DateTime::now(),
            created_at: None,
            updated_at: None,
        };

        let stored = self.toll_repo.insert(record).await?;
        info!(
            "Toll upload stored with status {}",
            stored.overall_status.as_str()
        );

        Ok(UploadResult {
            id: stored.id.map(|id| id.to_hex()).unwrap_or_default(),
            vehicle_number: stored.vehicle_number,
            overall_status: stored.overall_status,
            analysis_results: results,
            uploaded_at: format_datetime_opt(stored.created_at)
                .unwrap_or_else(|| format_datetime(stored.analysis_timestamp)),
        })
    }

    #[tracing::instrument(skip(self, request, ip_address, user_agent), fields(vehicle = %request.vehicle_number))]
    pub async fn upload_guest(
        &self,
        request: UploadRequest,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> Result<UploadResult, ServiceError> {
        Self::validate(&request)?;
        let decoded = Self::decode_images(&request.images)?;
        let results = self.analyze(&decoded).await;
        let overall_status = OverallStatus::derive(&results);

        let images = request
            .images
            .iter()
            .zip(results.iter())
            .map(|(base64, analysis)| TireImage {
                base64: Some(base64.clone()),
                analysis: analysis.clone(),
            })
            .collect();

        let record = GuestData {
            id: None,
            vehicle_number: request.vehicle_number.to_uppercase(),
            user_mobile_number: request.user_mobile_number.clone(),
            images,
            overall_status,
            analysis_timestamp: bson::DateTime::now(),
            ip_address,
            user_agent,
            created_at: None,
            updated_at: None,
        };

        let stored = self.guest_repo.insert(record).await?;
        info!(
            "Guest upload stored with status {}",
            stored.overall_status.as_str()
        );

        Ok(UploadResult {
            id: stored.id.map(|id| id.to_hex()).unwrap_or_default(),
            vehicle_number: stored.vehicle_number,
            overall_status: stored.overall_status,
            analysis_results: results,
            uploaded_at: format_datetime_opt(stored.created_at)
                .unwrap_or_else(|| format_datetime(stored.analysis_timestamp)),
        })
    }
}

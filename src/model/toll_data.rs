use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::model::analysis::{ImageAnalysis, OverallStatus};

/// One uploaded tire image paired with its classification result.
/// The raw payload is optional so list queries can project it out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TireImage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base64: Option<String>,
    pub analysis: ImageAnalysis,
}

/// A vehicle inspection record captured by a toll operator.
/// Immutable after creation; only admin data management deletes these.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TollData {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub vehicle_number: String,
    pub user_mobile_number: String,
    pub date: bson::DateTime,
    pub toll_operator: String,
    pub toll_plaza: String,
    pub images: Vec<TireImage>,
    pub overall_status: OverallStatus,
    pub analysis_timestamp: bson::DateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<bson::DateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<bson::DateTime>,
}

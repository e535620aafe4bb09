use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::model::analysis::OverallStatus;
use crate::model::toll_data::TireImage;

/// A vehicle inspection record submitted anonymously through the public
/// upload endpoint. Carries the caller's network metadata instead of an
/// operator identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestData {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub vehicle_number: String,
    pub user_mobile_number: String,
    pub images: Vec<TireImage>,
    pub overall_status: OverallStatus,
    pub analysis_timestamp: bson::DateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<bson::DateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<bson::DateTime>,
}

use serde::Serialize;

use crate::dto::{format_datetime, format_datetime_opt};
use crate::model::analysis::{ImageAnalysis, OverallStatus};
use crate::model::guest_data::GuestData;
use crate::model::toll_data::{TireImage, TollData};

#[derive(Debug, Clone, Serialize)]
pub struct TireImageDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base64: Option<String>,
    pub analysis: ImageAnalysis,
}

impl From<&TireImage> for TireImageDto {
    fn from(image: &TireImage) -> Self {
        TireImageDto {
            base64: image.base64.clone(),
            analysis: image.analysis.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TollRecordDto {
    pub id: String,
    pub vehicle_number: String,
    pub user_mobile_number: String,
    pub date: String,
    pub toll_operator: String,
    pub toll_plaza: String,
    pub images: Vec<TireImageDto>,
    pub overall_status: OverallStatus,
    pub analysis_timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl From<&TollData> for TollRecordDto {
    fn from(record: &TollData) -> Self {
        TollRecordDto {
            id: record.id.map(|id| id.to_hex()).unwrap_or_default(),
            vehicle_number: record.vehicle_number.clone(),
            user_mobile_number: record.user_mobile_number.clone(),
            date: format_datetime(record.date),
            toll_operator: record.toll_operator.clone(),
            toll_plaza: record.toll_plaza.clone(),
            images: record.images.iter().map(TireImageDto::from).collect(),
            overall_status: record.overall_status,
            analysis_timestamp: format_datetime(record.analysis_timestamp),
            created_at: format_datetime_opt(record.created_at),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestRecordDto {
    pub id: String,
    pub vehicle_number: String,
    pub user_mobile_number: String,
    pub images: Vec<TireImageDto>,
    pub overall_status: OverallStatus,
    pub analysis_timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl From<&GuestData> for GuestRecordDto {
    fn from(record: &GuestData) -> Self {
        GuestRecordDto {
            id: record.id.map(|id| id.to_hex()).unwrap_or_default(),
            vehicle_number: record.vehicle_number.clone(),
            user_mobile_number: record.user_mobile_number.clone(),
            images: record.images.iter().map(TireImageDto::from).collect(),
            overall_status: record.overall_status,
            analysis_timestamp: format_datetime(record.analysis_timestamp),
            created_at: format_datetime_opt(record.created_at),
        }
    }
}

/// Either kind of record, for the shared single-record lookup.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum RecordDto {
    Toll(TollRecordDto),
    Guest(GuestRecordDto),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current: u32,
    pub total: u64,
    pub count: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total_count: u64) -> Self {
        let total_pages = if limit == 0 {
            0
        } else {
            (total_count + limit as u64 - 1) / limit as u64
        };
        Pagination {
            current: page,
            total: total_pages,
            count: total_count,
            has_next: (page as u64) < total_pages,
            has_prev: page > 1,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TollRecordsData {
    pub records: Vec<TollRecordDto>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub struct TollRecordsResponse {
    pub success: bool,
    pub data: TollRecordsData,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestRecordsData {
    pub records: Vec<GuestRecordDto>,
    pub count: u64,
    pub total_pages: u64,
    pub current_page: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

#[derive(Debug, Serialize)]
pub struct GuestRecordsResponse {
    pub success: bool,
    pub data: GuestRecordsData,
}

#[derive(Debug, Serialize)]
pub struct RecordImagesData {
    pub images: Vec<TireImageDto>,
}

#[derive(Debug, Serialize)]
pub struct RecordImagesResponse {
    pub success: bool,
    pub data: RecordImagesData,
}

#[derive(Debug, Serialize)]
pub struct RecordResponse {
    pub success: bool,
    pub data: RecordDto,
}

use std::sync::Arc;

use axum::{
    extract::{Json, Path, Query, State},
    http::HeaderMap,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::dto::record_dto::{
    GuestRecordDto, GuestRecordsData, GuestRecordsResponse, Pagination, RecordDto,
    RecordImagesData, RecordImagesResponse, RecordResponse, TireImageDto, TollRecordDto,
    TollRecordsData, TollRecordsResponse,
};
use crate::dto::statistics_dto::{PublicStatisticsResponse, StatisticsResponse};
use crate::repository::guest_data_repo::GuestRecordFilter;
use crate::repository::toll_data_repo::TollRecordFilter;
use crate::service::data_service::{parse_query_date, DataService, Record, RecordKind};
use crate::util::error::HandlerError;

pub async fn statistics_handler(
    State(service): State<Arc<DataService>>,
) -> Result<impl IntoResponse, HandlerError> {
    let data = service.statistics().await?;
    Ok(Json(StatisticsResponse {
        success: true,
        data,
    }))
}

pub async fn public_statistics_handler(
    State(service): State<Arc<DataService>>,
) -> Result<impl IntoResponse, HandlerError> {
    let data = service.public_statistics().await?;
    Ok(Json(PublicStatisticsResponse {
        success: true,
        data,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TollRecordsQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub include_images: Option<String>,
}

pub async fn toll_records_handler(
    State(service): State<Arc<DataService>>,
    Query(query): Query<TollRecordsQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(10).clamp(1, 100);
    let filter = TollRecordFilter {
        search: query.search,
        status: query.status,
        toll_plaza: None,
        from: query.start_date.as_deref().and_then(|d| parse_query_date(d, false)),
        to: query.end_date.as_deref().and_then(|d| parse_query_date(d, false)),
        include_images: query.include_images.as_deref() == Some("true"),
        page,
        limit,
    };
    let (records, total) = service.toll_records(&filter).await?;
    Ok(Json(TollRecordsResponse {
        success: true,
        data: TollRecordsData {
            records: records.iter().map(TollRecordDto::from).collect(),
            pagination: Pagination::new(page, limit, total),
        },
    }))
}

pub async fn toll_record_images_handler(
    State(service): State<Arc<DataService>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let images = service.toll_record_images(&id).await?;
    Ok(Json(RecordImagesResponse {
        success: true,
        data: RecordImagesData {
            images: images.iter().map(TireImageDto::from).collect(),
        },
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestRecordsQuery {
    pub vehicle_number: Option<String>,
    pub mobile_number: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub include_images: Option<String>,
}

pub async fn guest_records_handler(
    State(service): State<Arc<DataService>>,
    Query(query): Query<GuestRecordsQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let (vehicle_number, mobile_number) = match (query.vehicle_number, query.mobile_number) {
        (Some(v), Some(m)) if !v.is_empty() && !m.is_empty() => (v, m),
        _ => {
            return Err(HandlerError::bad_request(
                "Vehicle number and mobile number are required",
            ));
        }
    };
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(5).clamp(1, 100);
    let filter = GuestRecordFilter {
        vehicle_number,
        mobile_number,
        from: query.start_date.as_deref().and_then(|d| parse_query_date(d, false)),
        // a bare end date covers the whole day
        to: query.end_date.as_deref().and_then(|d| parse_query_date(d, true)),
        include_images: query.include_images.as_deref() == Some("true"),
        page,
        limit,
    };
    let (records, total) = service.guest_records(filter).await?;

    let total_pages = (total + limit as u64 - 1) / limit as u64;
    Ok(Json(GuestRecordsResponse {
        success: true,
        data: GuestRecordsData {
            records: records.iter().map(GuestRecordDto::from).collect(),
            count: total,
            total_pages,
            current_page: page,
            has_next: (page as u64) < total_pages,
            has_prev: page > 1,
        },
    }))
}

#[derive(Debug, Deserialize)]
pub struct RecordQuery {
    #[serde(rename = "type")]
    pub record_type: Option<String>,
}

pub async fn record_handler(
    State(service): State<Arc<DataService>>,
    Path(id): Path<String>,
    Query(query): Query<RecordQuery>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, HandlerError> {
    let authenticated = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("Bearer "))
        .unwrap_or(false);

    let kind = RecordKind::from_param(query.record_type.as_deref());
    let record = service.record(&id, kind, authenticated).await?;
    let data = match record {
        Record::Toll(toll) => RecordDto::Toll(TollRecordDto::from(&toll)),
        Record::Guest(guest) => RecordDto::Guest(GuestRecordDto::from(&guest)),
    };
    Ok(Json(RecordResponse {
        success: true,
        data,
    }))
}

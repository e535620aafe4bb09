use serde::{Deserialize, Serialize};

use crate::model::analysis::{ImageAnalysis, OverallStatus};

/// Body of both upload endpoints. `date` and `toll_operator` only apply to
/// the toll variant and are ignored for guests.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    pub vehicle_number: String,
    pub user_mobile_number: String,
    /// Base64-encoded image payloads, at least one
    pub images: Vec<String>,
    pub date: Option<String>,
    pub toll_operator: Option<String>,
}

/// Registration plates follow the fixed pattern: two uppercase letters, two
/// digits, two uppercase letters, four digits. Input must already be
/// uppercase; normalization happens after this check passes.
pub fn is_valid_vehicle_number(value: &str) -> bool {
    let b = value.as_bytes();
    b.len() == 10
        && b[..2].iter().all(u8::is_ascii_uppercase)
        && b[2..4].iter().all(u8::is_ascii_digit)
        && b[4..6].iter().all(u8::is_ascii_uppercase)
        && b[6..].iter().all(u8::is_ascii_digit)
}

pub fn is_valid_mobile_number(value: &str) -> bool {
    value.len() == 10 && value.bytes().all(|c| c.is_ascii_digit())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub id: String,
    pub vehicle_number: String,
    pub overall_status: OverallStatus,
    pub analysis_results: Vec<ImageAnalysis>,
    pub uploaded_at: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub data: UploadResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_vehicle_numbers() {
        assert!(is_valid_vehicle_number("MH12AB1234"));
        assert!(is_valid_vehicle_number("KA01ZZ0001"));
    }

    #[test]
    fn test_invalid_vehicle_numbers() {
        // lowercase input is rejected, not normalized
        assert!(!is_valid_vehicle_number("mh12ab1234"));
        assert!(!is_valid_vehicle_number("MH12AB123"));
        assert!(!is_valid_vehicle_number("MH12AB12345"));
        assert!(!is_valid_vehicle_number("M112AB1234"));
        assert!(!is_valid_vehicle_number("MH1BAB1234"));
        assert!(!is_valid_vehicle_number(""));
        assert!(!is_valid_vehicle_number("MH12AB12A4"));
    }

    #[test]
    fn test_mobile_numbers() {
        assert!(is_valid_mobile_number("9876543210"));
        assert!(!is_valid_mobile_number("987654321"));
        assert!(!is_valid_mobile_number("98765432101"));
        assert!(!is_valid_mobile_number("98765a3210"));
        assert!(!is_valid_mobile_number(""));
    }
}

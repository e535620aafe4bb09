use serde::{Deserialize, Serialize};

/// A cracked prediction above this confidence escalates the verdict to danger.
/// The comparison is strict: exactly 0.8 still counts as warning.
pub const HIGH_CONFIDENCE_THRESHOLD: f64 = 0.8;

/// Per-image class label returned by the classification service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Prediction {
    Normal,
    Cracked,
}

impl Prediction {
    /// Maps a remote class label onto a prediction. Labels are matched
    /// case-insensitively; anything unrecognized falls back to normal,
    /// mirroring what the classification service contract defaults to.
    pub fn from_label(label: &str) -> Self {
        match label.to_lowercase().as_str() {
            "cracked" => Prediction::Cracked,
            _ => Prediction::Normal,
        }
    }
}

/// Classification result for a single tire image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAnalysis {
    pub prediction: Prediction,
    /// Model confidence in [0, 1]
    pub confidence: f64,
}

impl ImageAnalysis {
    /// The value substituted for every image when the classification service
    /// is unreachable or returns garbage.
    pub fn fallback() -> Self {
        ImageAnalysis {
            prediction: Prediction::Normal,
            confidence: 0.5,
        }
    }
}

/// Aggregate safety verdict over all images of one upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Safe,
    Warning,
    Danger,
}

impl OverallStatus {
    /// Derives the verdict from per-image results:
    /// any cracked prediction above the high-confidence threshold is danger,
    /// any cracked prediction at all is warning, otherwise safe.
    /// An empty result list is safe.
    pub fn derive(results: &[ImageAnalysis]) -> Self {
        let cracked = results
            .iter()
            .filter(|r| r.prediction == Prediction::Cracked);
        let mut any_cracked = false;
        for r in cracked {
            if r.confidence > HIGH_CONFIDENCE_THRESHOLD {
                return OverallStatus::Danger;
            }
            any_cracked = true;
        }
        if any_cracked {
            OverallStatus::Warning
        } else {
            OverallStatus::Safe
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OverallStatus::Safe => "safe",
            OverallStatus::Warning => "warning",
            OverallStatus::Danger => "danger",
        }
    }
}

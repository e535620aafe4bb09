pub mod feedback_repo;
pub mod guest_data_repo;
pub mod repository_error;
pub mod toll_data_repo;
pub mod user_repo;

use std::collections::HashMap;

use serde::Serialize;

/// Per-status record counts as returned by the status distribution
/// aggregations. `pending` exists for records that predate analysis; uploads
/// made through this backend never produce it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub safe: u64,
    pub warning: u64,
    pub danger: u64,
    pub pending: u64,
}

impl StatusCounts {
    pub fn from_grouped(groups: &HashMap<String, u64>) -> Self {
        StatusCounts {
            safe: groups.get("safe").copied().unwrap_or(0),
            warning: groups.get("warning").copied().unwrap_or(0),
            danger: groups.get("danger").copied().unwrap_or(0),
            pending: groups.get("pending").copied().unwrap_or(0),
        }
    }

    pub fn combined(&self, other: &StatusCounts) -> StatusCounts {
        StatusCounts {
            safe: self.safe + other.safe,
            warning: self.warning + other.warning,
            danger: self.danger + other.danger,
            pending: self.pending + other.pending,
        }
    }

    pub fn total(&self) -> u64 {
        self.safe + self.warning + self.danger + self.pending
    }
}

/// One day's worth of toll uploads, bucketed by calendar date.
#[derive(Debug, Clone, Serialize)]
pub struct DailyTrendEntry {
    /// Day in %Y-%m-%d format
    pub date: String,
    pub count: u64,
    pub safe: u64,
    pub warning: u64,
    pub danger: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_counts_partition_total() {
        let mut groups = HashMap::new();
        groups.insert("safe".to_string(), 4u64);
        groups.insert("warning".to_string(), 2u64);
        groups.insert("danger".to_string(), 1u64);
        let counts = StatusCounts::from_grouped(&groups);
        assert_eq!(counts.total(), 7);
        assert_eq!(counts.pending, 0);
    }

    #[test]
    fn test_status_counts_ignore_unknown_groups() {
        let mut groups = HashMap::new();
        groups.insert("safe".to_string(), 1u64);
        groups.insert("bogus".to_string(), 9u64);
        let counts = StatusCounts::from_grouped(&groups);
        assert_eq!(counts.total(), 1);
    }

    #[test]
    fn test_status_counts_combined() {
        let a = StatusCounts {
            safe: 1,
            warning: 2,
            danger: 3,
            pending: 0,
        };
        let b = StatusCounts {
            safe: 10,
            warning: 0,
            danger: 1,
            pending: 2,
        };
        let c = a.combined(&b);
        assert_eq!(c.safe, 11);
        assert_eq!(c.total(), a.total() + b.total());
    }
}

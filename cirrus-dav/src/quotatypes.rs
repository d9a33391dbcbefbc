use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

//RFC covered: RFC4331 (Quota and Size Properties for DAV Collections)

/// Quota of a collection, as reported by `quota-available-bytes` and
/// `quota-used-bytes`. Some servers also send a total, and various
/// vendor specific properties kept in `extension_properties`.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Default, Serialize, Deserialize)]
pub struct DavQuota {
    pub quota_available_bytes: Option<u64>,
    pub quota_used_bytes: Option<u64>,
    pub quota_total_bytes: Option<u64>,
    pub resource_url: Option<String>,
    pub extension_properties: BTreeMap<String, String>,
}

impl DavQuota {
    pub fn total_quota(&self) -> Option<u64> {
        match (self.quota_total_bytes, self.quota_used_bytes, self.quota_available_bytes) {
            (Some(total), _, _) => Some(total),
            (None, Some(used), Some(available)) => used.checked_add(available),
            _ => None,
        }
    }

    /// Ratio of used bytes, between 0.0 and 1.0 unless the server overcommits
    pub fn usage_percentage(&self) -> Option<f64> {
        let used = self.quota_used_bytes?;
        match self.total_quota()? {
            0 => None,
            total => Some(used as f64 / total as f64),
        }
    }

    pub fn is_full(&self) -> bool {
        self.quota_available_bytes == Some(0)
            || self.usage_percentage().map(|u| u >= 1.0).unwrap_or(false)
    }

    pub fn extension_property(&self, name: &str) -> Option<&str> {
        self.extension_properties.get(name).map(String::as_str)
    }
}

//! Backend health snapshot.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Point-in-time summary of backend status and route counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthSnapshot {
    pub status: String,
    /// Database connectivity, e.g. `connected` or `error: ...`.
    pub database: String,
    #[serde(default)]
    pub total_routes: u64,
    #[serde(default)]
    pub active_routes: u64,
    /// Not every backend version reports this; see [`HealthSnapshot::inactive`].
    #[serde(default)]
    pub inactive_routes: Option<u64>,
    /// Unix seconds, fractional.
    pub timestamp: f64,
}

impl HealthSnapshot {
    /// Inactive route count, derived from the totals when not reported.
    pub fn inactive(&self) -> u64 {
        self.inactive_routes
            .unwrap_or_else(|| self.total_routes.saturating_sub(self.active_routes))
    }

    /// Check time in the local timezone.
    pub fn checked_at(&self) -> Option<DateTime<Local>> {
        if !self.timestamp.is_finite() {
            return None;
        }
        let secs = self.timestamp.floor();
        let nanos = ((self.timestamp - secs) * 1e9) as u32;
        DateTime::from_timestamp(secs as i64, nanos).map(|utc| utc.with_timezone(&Local))
    }

    /// Check time formatted for display.
    pub fn checked_at_label(&self) -> String {
        self.checked_at()
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn snapshot(inactive_routes: Option<u64>) -> HealthSnapshot {
        HealthSnapshot {
            status: "healthy".to_string(),
            database: "connected".to_string(),
            total_routes: 10,
            active_routes: 7,
            inactive_routes,
            timestamp: 1_700_000_000.25,
        }
    }

    #[test]
    fn inactive_is_derived_when_missing() {
        assert_eq!(snapshot(None).inactive(), 3);
        assert_eq!(snapshot(Some(5)).inactive(), 5);
    }

    #[test]
    fn timestamp_converts_to_local_time() {
        let checked = snapshot(None).checked_at().unwrap();
        let expected = Utc.timestamp_opt(1_700_000_000, 250_000_000).unwrap();
        assert_eq!(checked.with_timezone(&Utc), expected);
    }

    #[test]
    fn non_finite_timestamp_has_placeholder_label() {
        let mut health = snapshot(None);
        health.timestamp = f64::NAN;
        assert_eq!(health.checked_at_label(), "-");
    }

    #[test]
    fn decodes_backend_payload_without_inactive_count() {
        let health: HealthSnapshot = serde_json::from_str(
            r#"{"status":"healthy","database":"connected","timestamp":1700000000.5,
                "total_routes":4,"active_routes":1}"#,
        )
        .unwrap();
        assert_eq!(health.inactive_routes, None);
        assert_eq!(health.inactive(), 3);
    }
}

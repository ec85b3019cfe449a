//! Scenario parameters describing an IoT fleet and its retention policy

use serde::{Deserialize, Serialize};

use crate::error::CostError;

/// Input parameters for one cost calculation
///
/// Durations are cumulative horizons measured from ingestion: data is Hot
/// until `hot_duration_months`, Cool until `cool_duration_months`, and kept
/// in Archive until `archive_duration_months`. The invariant
/// `hot <= cool <= archive` keeps the per-tier residency non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioParams {
    /// Number of devices sending telemetry
    pub device_count: u64,
    /// Minutes between two messages from one device (must be > 0)
    pub sending_interval_minutes: f64,
    /// Average message payload size in KB
    pub avg_message_size_kb: f64,
    /// Months data stays in the Hot tier
    pub hot_duration_months: u32,
    /// Months until data leaves the Cool tier (cumulative)
    pub cool_duration_months: u32,
    /// Months until data is deleted from Archive (cumulative)
    pub archive_duration_months: u32,
    /// Whether the twin layer renders a 3D scene
    pub needs_3d_model: bool,
    /// Number of twin entities in the twin graph
    pub entity_count: u64,
    /// Dashboard users with edit rights
    pub active_editors: u32,
    /// Dashboard users with view-only rights
    pub active_viewers: u32,
    /// Dashboard refreshes per hour while active
    pub dashboard_refreshes_per_hour: f64,
    /// Hours per day the dashboard is actively watched
    pub dashboard_active_hours_per_day: f64,
}

impl Default for ScenarioParams {
    fn default() -> Self {
        // Mid-size fleet: 1 000 devices, one 1 KB reading per minute,
        // 1 month hot / 1 year cool / 5 year archive retention.
        Self {
            device_count: 1_000,
            sending_interval_minutes: 1.0,
            avg_message_size_kb: 1.0,
            hot_duration_months: 1,
            cool_duration_months: 12,
            archive_duration_months: 60,
            needs_3d_model: false,
            entity_count: 1_000,
            active_editors: 2,
            active_viewers: 10,
            dashboard_refreshes_per_hour: 12.0,
            dashboard_active_hours_per_day: 8.0,
        }
    }
}

impl ScenarioParams {
    /// Create a scenario with default retention and dashboard settings
    pub fn new(device_count: u64, sending_interval_minutes: f64, avg_message_size_kb: f64) -> Self {
        Self {
            device_count,
            sending_interval_minutes,
            avg_message_size_kb,
            ..Self::default()
        }
    }

    /// Set retention horizons (cumulative months)
    pub fn with_retention(mut self, hot: u32, cool: u32, archive: u32) -> Self {
        self.hot_duration_months = hot;
        self.cool_duration_months = cool;
        self.archive_duration_months = archive;
        self
    }

    /// Set dashboard population
    pub fn with_dashboard_users(mut self, editors: u32, viewers: u32) -> Self {
        self.active_editors = editors;
        self.active_viewers = viewers;
        self
    }

    /// Enable 3D scene rendering in the twin layer
    pub fn with_3d_model(mut self, needs_3d_model: bool) -> Self {
        self.needs_3d_model = needs_3d_model;
        self
    }

    /// Validate the scenario
    ///
    /// Upstream callers validate too; the engine re-validates defensively
    /// because it is also called directly from test harnesses.
    pub fn validate(&self) -> Result<(), CostError> {
        if !(self.sending_interval_minutes > 0.0) {
            return Err(CostError::InvalidScenario(
                "sendingIntervalMinutes must be > 0".into(),
            ));
        }
        if self.avg_message_size_kb < 0.0 || !self.avg_message_size_kb.is_finite() {
            return Err(CostError::InvalidScenario(
                "avgMessageSizeKB must be finite and >= 0".into(),
            ));
        }
        if self.hot_duration_months > self.cool_duration_months
            || self.cool_duration_months > self.archive_duration_months
        {
            return Err(CostError::InvalidScenario(format!(
                "retention horizons must satisfy hot <= cool <= archive, got {} / {} / {}",
                self.hot_duration_months, self.cool_duration_months, self.archive_duration_months
            )));
        }
        if self.dashboard_refreshes_per_hour < 0.0 {
            return Err(CostError::InvalidScenario(
                "dashboardRefreshesPerHour must be >= 0".into(),
            ));
        }
        if !(0.0..=24.0).contains(&self.dashboard_active_hours_per_day) {
            return Err(CostError::InvalidScenario(
                "dashboardActiveHoursPerDay must be within 0..=24".into(),
            ));
        }
        Ok(())
    }

    /// Months data resides in a tier before moving on (hot, cool, archive)
    pub fn residency_months(&self) -> (u32, u32, u32) {
        (
            self.hot_duration_months,
            self.cool_duration_months - self.hot_duration_months,
            self.archive_duration_months - self.cool_duration_months,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(ScenarioParams::default().validate().is_ok());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let params = ScenarioParams::new(100, 0.0, 1.0);
        assert!(matches!(
            params.validate(),
            Err(CostError::InvalidScenario(_))
        ));
    }

    #[test]
    fn test_inverted_retention_rejected() {
        let params = ScenarioParams::default().with_retention(12, 6, 60);
        assert!(matches!(
            params.validate(),
            Err(CostError::InvalidScenario(_))
        ));
    }

    #[test]
    fn test_zero_devices_is_valid() {
        let params = ScenarioParams::new(0, 5.0, 1.0);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_residency_from_cumulative_horizons() {
        let params = ScenarioParams::default().with_retention(1, 12, 60);
        assert_eq!(params.residency_months(), (1, 11, 48));
    }
}

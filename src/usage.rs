//! Usage model: scenario parameters to per-layer usage metrics

use serde::{Deserialize, Serialize};

use crate::error::CostError;
use crate::scenario::ScenarioParams;

/// Minutes in a 30-day billing month.
const MINUTES_PER_MONTH: f64 = 43_200.0;
/// KB per GB (binary).
const KB_PER_GB: f64 = 1_048_576.0;

/// Usage metrics derived once per calculation and read by all calculators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageMetrics {
    /// Device messages per month across the fleet
    pub total_messages_per_month: f64,
    /// Telemetry volume generated per month, in GB
    pub data_size_gb: f64,
    /// Dashboard read API calls per month
    pub api_call_count: f64,
    /// Twin state transitions per month (one per device message)
    pub twin_update_count: f64,
    /// Dashboard seats (editors + viewers)
    pub dashboard_user_count: f64,
    /// Whether a 3D scene is hosted
    pub needs_3d_scene: bool,
}

impl UsageMetrics {
    /// Derive usage from a validated scenario
    pub fn from_scenario(params: &ScenarioParams) -> Result<Self, CostError> {
        params.validate()?;

        let total_messages_per_month =
            params.device_count as f64 * (MINUTES_PER_MONTH / params.sending_interval_minutes);
        let data_size_gb = total_messages_per_month * params.avg_message_size_kb / KB_PER_GB;
        let api_call_count = params.dashboard_refreshes_per_hour
            * params.dashboard_active_hours_per_day
            * 30.0
            * params.active_viewers as f64;
        let twin_update_count = total_messages_per_month;

        Ok(Self {
            total_messages_per_month,
            data_size_gb,
            api_call_count,
            twin_update_count,
            dashboard_user_count: (params.active_editors + params.active_viewers) as f64,
            needs_3d_scene: params.needs_3d_model,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_volume() {
        // 1,000 devices at one message per minute
        let params = ScenarioParams::new(1_000, 1.0, 1.0);
        let usage = UsageMetrics::from_scenario(&params).unwrap();
        assert!((usage.total_messages_per_month - 43_200_000.0).abs() < 1e-6);
        // 43.2M messages of 1 KB each
        assert!((usage.data_size_gb - 43_200_000.0 / 1_048_576.0).abs() < 1e-9);
    }

    #[test]
    fn test_dashboard_calls() {
        let params = ScenarioParams::new(10, 5.0, 1.0).with_dashboard_users(1, 4);
        let usage = UsageMetrics::from_scenario(&params).unwrap();
        // 12 refreshes/h * 8 h/day * 30 days * 4 viewers
        assert!((usage.api_call_count - 12.0 * 8.0 * 30.0 * 4.0).abs() < 1e-9);
        assert!((usage.dashboard_user_count - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_devices_degenerate() {
        let params = ScenarioParams::new(0, 1.0, 1.0).with_dashboard_users(0, 0);
        let usage = UsageMetrics::from_scenario(&params).unwrap();
        assert_eq!(usage.total_messages_per_month, 0.0);
        assert_eq!(usage.data_size_gb, 0.0);
        assert_eq!(usage.twin_update_count, 0.0);
    }

    #[test]
    fn test_invalid_scenario_propagates() {
        let params = ScenarioParams::new(10, 0.0, 1.0);
        assert!(UsageMetrics::from_scenario(&params).is_err());
    }
}

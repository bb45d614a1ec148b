//! Countdown display state
//! Projected from the latest scheduler snapshot on every poll tick. Nothing
//! here counts down locally, so the display cannot drift from the server.

use chrono::{DateTime, NaiveDateTime};
use serde::Serialize;

use crate::models::SchedulerSnapshot;

pub const PLACEHOLDER: &str = "--:--";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerPhase {
    #[default]
    Idle,
    Running,
    Disconnected,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerDisplay {
    pub phase: TimerPhase,
    pub remaining_label: String,
    pub meta_label: String,
    /// 0..=100
    pub fill_percent: f64,
}

impl TimerDisplay {
    pub fn idle() -> Self {
        Self::blank(TimerPhase::Idle)
    }

    /// Shown when the scheduler could not be read.
    pub fn disconnected() -> Self {
        Self::blank(TimerPhase::Disconnected)
    }

    fn blank(phase: TimerPhase) -> Self {
        Self {
            phase,
            remaining_label: PLACEHOLDER.to_string(),
            meta_label: String::new(),
            fill_percent: 0.0,
        }
    }
}

impl Default for TimerDisplay {
    fn default() -> Self {
        Self::idle()
    }
}

/// Project a scheduler snapshot into display state.
pub fn project(snapshot: &SchedulerSnapshot) -> TimerDisplay {
    if !snapshot.active {
        return TimerDisplay::idle();
    }

    TimerDisplay {
        phase: TimerPhase::Running,
        remaining_label: format_remaining(snapshot.remaining_seconds),
        meta_label: snapshot
            .deadline
            .as_deref()
            .filter(|deadline| !deadline.is_empty())
            .map(|deadline| format!("Due {}", humanize_deadline(deadline)))
            .unwrap_or_default(),
        fill_percent: fill_percent(snapshot.remaining_seconds, snapshot.interval_minutes),
    }
}

/// `MM:SS`, floored to the second and clamped at zero.
pub fn format_remaining(seconds: Option<f64>) -> String {
    let Some(seconds) = seconds.filter(|s| !s.is_nan()) else {
        return PLACEHOLDER.to_string();
    };
    let total = seconds.floor().max(0.0) as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

fn fill_percent(remaining_seconds: Option<f64>, interval_minutes: Option<f64>) -> f64 {
    let total = match interval_minutes {
        Some(minutes) if minutes.is_finite() && minutes != 0.0 => minutes * 60.0,
        _ => return 0.0,
    };
    let remaining = remaining_seconds.filter(|s| s.is_finite()).unwrap_or(0.0).max(0.0);
    ((total - remaining) * 100.0 / total).clamp(0.0, 100.0)
}

/// Render an ISO-8601 deadline as `YYYY-MM-DD HH:MM:SS`.
fn humanize_deadline(raw: &str) -> String {
    const DISPLAY: &str = "%Y-%m-%d %H:%M:%S";

    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return parsed.format(DISPLAY).to_string();
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.format(DISPLAY).to_string();
    }

    let spaced = raw.replacen('T', " ", 1);
    spaced.split('.').next().unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(remaining: Option<f64>, interval: Option<f64>) -> SchedulerSnapshot {
        SchedulerSnapshot {
            active: true,
            remaining_seconds: remaining,
            interval_minutes: interval,
            deadline: None,
        }
    }

    #[test]
    fn ninety_seconds_into_five_minutes_is_seventy_percent() {
        let display = project(&running(Some(90.0), Some(5.0)));
        assert_eq!(display.phase, TimerPhase::Running);
        assert_eq!(display.remaining_label, "01:30");
        assert!((display.fill_percent - 70.0).abs() < 1e-9);
        assert_eq!(display.meta_label, "");
    }

    #[test]
    fn inactive_snapshot_ignores_other_fields() {
        let snapshot = SchedulerSnapshot {
            active: false,
            remaining_seconds: Some(12.0),
            interval_minutes: Some(1.0),
            deadline: Some("2026-10-18T09:30:00".to_string()),
        };
        let display = project(&snapshot);
        assert_eq!(display, TimerDisplay::idle());
        assert_eq!(display.remaining_label, "--:--");
        assert_eq!(display.meta_label, "");
        assert_eq!(display.fill_percent, 0.0);
    }

    #[test]
    fn projection_is_idempotent() {
        let snapshot = SchedulerSnapshot {
            deadline: Some("2026-10-18T09:30:00.5".to_string()),
            ..running(Some(42.7), Some(2.0))
        };
        assert_eq!(project(&snapshot), project(&snapshot));
    }

    #[test]
    fn remaining_is_floored_and_clamped() {
        assert_eq!(format_remaining(Some(59.99)), "00:59");
        assert_eq!(format_remaining(Some(-3.0)), "00:00");
        assert_eq!(format_remaining(Some(3600.0)), "60:00");
        assert_eq!(format_remaining(None), PLACEHOLDER);
        assert_eq!(format_remaining(Some(f64::NAN)), PLACEHOLDER);
    }

    #[test]
    fn fill_is_zero_without_interval() {
        assert_eq!(project(&running(Some(30.0), None)).fill_percent, 0.0);
        assert_eq!(project(&running(Some(30.0), Some(0.0))).fill_percent, 0.0);
    }

    #[test]
    fn fill_is_clamped() {
        // Remaining longer than the interval would go negative.
        assert_eq!(project(&running(Some(900.0), Some(5.0))).fill_percent, 0.0);
        // Missing or negative remaining counts as elapsed.
        assert_eq!(project(&running(None, Some(5.0))).fill_percent, 100.0);
        assert_eq!(project(&running(Some(-10.0), Some(5.0))).fill_percent, 100.0);
    }

    #[test]
    fn deadline_is_humanized() {
        let snapshot = SchedulerSnapshot {
            deadline: Some("2026-10-18T09:30:15.123456".to_string()),
            ..running(Some(10.0), Some(1.0))
        };
        assert_eq!(project(&snapshot).meta_label, "Due 2026-10-18 09:30:15");

        let snapshot = SchedulerSnapshot {
            deadline: Some("2026-10-18T09:30:15+08:00".to_string()),
            ..running(Some(10.0), Some(1.0))
        };
        assert_eq!(project(&snapshot).meta_label, "Due 2026-10-18 09:30:15");

        let snapshot = SchedulerSnapshot {
            deadline: Some("tomorrowTnoon.ish".to_string()),
            ..running(Some(10.0), Some(1.0))
        };
        assert_eq!(project(&snapshot).meta_label, "Due tomorrow noon");
    }
}

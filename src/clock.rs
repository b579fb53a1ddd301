use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Utc};

use crate::config::DisplayConfig;

/// Renders message timestamps in a fixed display zone.
#[derive(Debug, Clone)]
pub struct DisplayClock {
    offset: FixedOffset,
    label: String,
}

impl DisplayClock {
    pub fn new(utc_offset_hours: i32, label: impl Into<String>) -> Result<Self> {
        let offset = FixedOffset::east_opt(utc_offset_hours * 3600)
            .with_context(|| format!("Invalid UTC offset: {} hours", utc_offset_hours))?;
        Ok(Self {
            offset,
            label: label.into(),
        })
    }

    pub fn from_config(config: &DisplayConfig) -> Result<Self> {
        Self::new(config.utc_offset_hours, config.zone_label.clone())
    }

    /// Format as `YYYY-MM-DD, HH:MM (LABEL)`.
    pub fn format(&self, timestamp: DateTime<Utc>) -> String {
        let local = timestamp.with_timezone(&self.offset);
        format!("{} ({})", local.format("%Y-%m-%d, %H:%M"), self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn kst() -> DisplayClock {
        DisplayClock::new(9, "KST").unwrap()
    }

    #[test]
    fn test_utc_midnight_is_nine_am_kst() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(kst().format(ts), "2024-01-01, 09:00 (KST)");
    }

    #[test]
    fn test_crosses_date_boundary() {
        let ts = Utc.with_ymd_and_hms(2024, 12, 31, 20, 45, 59).unwrap();
        assert_eq!(kst().format(ts), "2025-01-01, 05:45 (KST)");
    }

    #[test]
    fn test_is_deterministic() {
        let ts = Utc.with_ymd_and_hms(2024, 6, 15, 12, 30, 0).unwrap();
        let clock = kst();
        assert_eq!(clock.format(ts), clock.format(ts));
    }

    #[test]
    fn test_negative_offset() {
        let clock = DisplayClock::new(-5, "EST").unwrap();
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 3, 0, 0).unwrap();
        assert_eq!(clock.format(ts), "2023-12-31, 22:00 (EST)");
    }

    #[test]
    fn test_rejects_out_of_range_offset() {
        assert!(DisplayClock::new(30, "BAD").is_err());
    }
}

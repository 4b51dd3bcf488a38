//! Warranty entity and coverage date math

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stored warranty status. Read paths report the *effective* status, which
/// also treats an active warranty past its end date as expired before the
/// sweep has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarrantyStatus {
    Pending,
    Active,
    Expired,
    Voided,
}

impl WarrantyStatus {
    /// Database representation
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Active => "ACTIVE",
            Self::Expired => "EXPIRED",
            Self::Voided => "VOIDED",
        }
    }

    /// Parse from the database representation
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(Self::Pending),
            "ACTIVE" => Some(Self::Active),
            "EXPIRED" => Some(Self::Expired),
            "VOIDED" => Some(Self::Voided),
            _ => None,
        }
    }
}

impl std::fmt::Display for WarrantyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compute a warranty end date from its start date and the model's
/// warranty duration. Day-of-month overflow clamps to the last day of the
/// target month (Jan 31 + 1 month = Feb 29 in a leap year).
#[must_use]
pub fn warranty_end_date(start: DateTime<Utc>, warranty_months: u32) -> DateTime<Utc> {
    start
        .checked_add_months(Months::new(warranty_months))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Warranty record, one per product registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warranty {
    pub id: Uuid,
    pub registration_id: Uuid,
    pub status: WarrantyStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub activated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Warranty {
    /// Effective status at `now`: an active warranty whose end date has
    /// passed reads as expired even before the sweep flips it in storage.
    #[must_use]
    pub fn effective_status(&self, now: DateTime<Utc>) -> WarrantyStatus {
        if self.status == WarrantyStatus::Active && self.end_date < now {
            WarrantyStatus::Expired
        } else {
            self.status
        }
    }

    /// Whole days of coverage left at `now`, rounded up, never negative.
    /// Zero for anything that is not effectively active.
    #[must_use]
    pub fn days_remaining(&self, now: DateTime<Utc>) -> i64 {
        if self.status != WarrantyStatus::Active {
            return 0;
        }
        let seconds = (self.end_date - now).num_seconds();
        if seconds <= 0 {
            0
        } else {
            (seconds + 86_399) / 86_400
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn warranty(status: WarrantyStatus, start: DateTime<Utc>, end: DateTime<Utc>) -> Warranty {
        Warranty {
            id: Uuid::new_v4(),
            registration_id: Uuid::new_v4(),
            status,
            start_date: start,
            end_date: end,
            activated_at: None,
            created_at: start,
        }
    }

    #[test]
    fn test_end_date_adds_model_months() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = warranty_end_date(start, 120);
        assert_eq!(end, Utc.with_ymd_and_hms(2034, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_end_date_clamps_day_overflow() {
        let start = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();
        let end = warranty_end_date(start, 1);
        assert_eq!(end, Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_active_past_end_reads_expired() {
        let now = Utc::now();
        let w = warranty(
            WarrantyStatus::Active,
            now - Duration::days(400),
            now - Duration::days(1),
        );
        assert_eq!(w.effective_status(now), WarrantyStatus::Expired);
        assert_eq!(w.days_remaining(now), 0);
    }

    #[test]
    fn test_active_within_coverage() {
        let now = Utc::now();
        let w = warranty(
            WarrantyStatus::Active,
            now - Duration::days(30),
            now + Duration::days(10),
        );
        assert_eq!(w.effective_status(now), WarrantyStatus::Active);
        assert_eq!(w.days_remaining(now), 10);
    }

    #[test]
    fn test_days_remaining_rounds_up_partial_days() {
        let now = Utc::now();
        let w = warranty(
            WarrantyStatus::Active,
            now - Duration::days(1),
            now + Duration::hours(1),
        );
        assert_eq!(w.days_remaining(now), 1);
    }

    #[test]
    fn test_non_active_statuses_report_zero_days() {
        let now = Utc::now();
        for status in [
            WarrantyStatus::Pending,
            WarrantyStatus::Expired,
            WarrantyStatus::Voided,
        ] {
            let w = warranty(status, now, now + Duration::days(100));
            assert_eq!(w.days_remaining(now), 0);
            assert_eq!(w.effective_status(now), status);
        }
    }
}

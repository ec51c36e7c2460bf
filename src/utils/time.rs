use crate::error::{AppError, AppResult};
use chrono::{
    DateTime, Datelike, Duration, FixedOffset, Local, NaiveDate, NaiveTime, SubsecRound, TimeZone,
    Utc,
};

/// Current time at microsecond precision, the resolution the SQL backends
/// store. Keeps `updated_at` comparisons stable across a round trip.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Offset of the caller's wall clock; minutes east of UTC.
pub fn caller_offset(tz_offset_minutes: Option<i32>) -> AppResult<FixedOffset> {
    match tz_offset_minutes {
        Some(minutes) => minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| AppError::invalid("tzOffset", "must be within +/- 24 hours")),
        None => Ok(*Local::now().offset()),
    }
}

/// Starts of the reporting windows containing `at`, in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindows {
    pub today: DateTime<Utc>,
    /// Monday 00:00 of the current week.
    pub week: DateTime<Utc>,
    pub month: DateTime<Utc>,
}

impl ReportWindows {
    pub fn at(at: DateTime<Utc>, offset: FixedOffset) -> Self {
        let local = at.with_timezone(&offset).date_naive();
        let week_start = local - Duration::days(local.weekday().num_days_from_monday() as i64);
        let month_start = local.with_day(1).unwrap_or(local);
        Self {
            today: local_midnight(local, offset),
            week: local_midnight(week_start, offset),
            month: local_midnight(month_start, offset),
        }
    }
}

fn local_midnight(date: NaiveDate, offset: FixedOffset) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN);
    match offset.from_local_datetime(&naive).single() {
        Some(dt) => dt.with_timezone(&Utc),
        // fixed offsets never produce ambiguous local times
        None => Utc.from_utc_datetime(&naive),
    }
}

/// Parses a query-string date bound. Accepts RFC 3339 or `YYYY-MM-DD`; a
/// bare date covers the whole UTC day when used as an upper bound.
pub fn parse_date_bound(field: &str, raw: &str, upper: bool) -> AppResult<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::invalid(field, "expected YYYY-MM-DD or an RFC 3339 timestamp"))?;
    let start = Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN));
    if upper {
        Ok(start + Duration::days(1) - Duration::microseconds(1))
    } else {
        Ok(start)
    }
}

//! Period tokens and the date-window resolution policy.

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, Utc};

/// Date range used to filter transactions. `None` bounds are unbounded; the
/// aggregation queries treat a present `end` as inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Window {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl Window {
    pub fn bounded(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn unbounded() -> Self {
        Self::default()
    }
}

pub const PERIOD_WEEK: &str = "week";
pub const PERIOD_MONTH: &str = "month";
pub const PERIOD_YEAR: &str = "year";
pub const PERIOD_ALL: &str = "all";
pub const PERIOD_CUSTOM: &str = "custom";

/// A resolved window plus the period name echoed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPeriod {
    pub name: &'static str,
    pub window: Window,
}

/// Summary-style resolution. An explicit start/end pair overrides any period
/// token; otherwise unrecognized or missing tokens fall back to the current
/// month, and the reported name normalizes to `"month"`.
pub fn resolve(
    period: Option<&str>,
    explicit: Option<(DateTime<Utc>, DateTime<Utc>)>,
    now: DateTime<Utc>,
) -> ResolvedPeriod {
    if let Some((start, end)) = explicit {
        return ResolvedPeriod {
            name: PERIOD_CUSTOM,
            window: Window::bounded(start, end),
        };
    }

    match period {
        Some(PERIOD_WEEK) => ResolvedPeriod {
            name: PERIOD_WEEK,
            window: Window::bounded(week_start(now), now),
        },
        Some(PERIOD_YEAR) => ResolvedPeriod {
            name: PERIOD_YEAR,
            window: Window::bounded(year_start(now.year()), now),
        },
        Some(PERIOD_ALL) => ResolvedPeriod {
            name: PERIOD_ALL,
            window: Window::unbounded(),
        },
        _ => ResolvedPeriod {
            name: PERIOD_MONTH,
            window: Window::bounded(month_start(now.year(), now.month()), now),
        },
    }
}

/// Category-analysis resolution: only month/year/all are recognized; `week`
/// and anything else fall back to the current month.
pub fn resolve_analysis(period: Option<&str>, now: DateTime<Utc>) -> ResolvedPeriod {
    match period {
        Some(PERIOD_YEAR) | Some(PERIOD_ALL) => resolve(period, None, now),
        _ => resolve(Some(PERIOD_MONTH), None, now),
    }
}

/// Half-open `[first of month, first of next month)` range for budget
/// reconciliation. `month` must already be validated to 1..=12.
pub fn month_range(year: i32, month: u32) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = month_start(year, month);
    let end = if month == 12 {
        month_start(year + 1, 1)
    } else {
        month_start(year, month + 1)
    };

    (start, end)
}

/// Half-open `[Jan 1, Jan 1 next year)` range for the monthly overview.
pub fn year_range(year: i32) -> (DateTime<Utc>, DateTime<Utc>) {
    (year_start(year), year_start(year + 1))
}

/// Most recent Sunday at midnight; today when today is Sunday.
fn week_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let days_from_sunday = now.weekday().num_days_from_sunday() as u64;
    let date = now
        .date_naive()
        .checked_sub_days(Days::new(days_from_sunday))
        .expect("date within chrono range");

    midnight(date)
}

fn month_start(year: i32, month: u32) -> DateTime<Utc> {
    midnight(NaiveDate::from_ymd_opt(year, month, 1).expect("validated month"))
}

fn year_start(year: i32) -> DateTime<Utc> {
    month_start(year, 1)
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    // 2025-06-18 is a Wednesday.
    fn wednesday() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 18, 15, 30, 45).unwrap()
    }

    #[test]
    fn week_starts_on_most_recent_sunday() {
        let resolved = resolve(Some("week"), None, wednesday());

        assert_eq!(resolved.name, "week");
        assert_eq!(
            resolved.window.start,
            Some(Utc.with_ymd_and_hms(2025, 6, 15, 0, 0, 0).unwrap())
        );
        assert_eq!(resolved.window.end, Some(wednesday()));
    }

    #[test]
    fn sunday_is_its_own_week_start() {
        let sunday = Utc.with_ymd_and_hms(2025, 6, 15, 10, 0, 0).unwrap();
        let resolved = resolve(Some("week"), None, sunday);

        assert_eq!(
            resolved.window.start,
            Some(Utc.with_ymd_and_hms(2025, 6, 15, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn month_starts_on_the_first() {
        let resolved = resolve(Some("month"), None, wednesday());

        assert_eq!(resolved.name, "month");
        assert_eq!(
            resolved.window.start,
            Some(Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(resolved.window.end, Some(wednesday()));
    }

    #[test]
    fn year_starts_on_january_first() {
        let resolved = resolve(Some("year"), None, wednesday());

        assert_eq!(
            resolved.window.start,
            Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn all_is_unbounded() {
        let resolved = resolve(Some("all"), None, wednesday());

        assert_eq!(resolved.name, "all");
        assert_eq!(resolved.window, Window::unbounded());
    }

    #[test]
    fn unknown_tokens_normalize_to_month() {
        let resolved = resolve(Some("fortnight"), None, wednesday());

        assert_eq!(resolved.name, "month");
        assert_eq!(
            resolved.window.start,
            Some(Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn missing_token_defaults_to_month() {
        assert_eq!(resolve(None, None, wednesday()).name, "month");
    }

    #[test]
    fn explicit_range_overrides_period_token() {
        let start = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 3, 15, 0, 0, 0).unwrap();
        let resolved = resolve(Some("year"), Some((start, end)), wednesday());

        assert_eq!(resolved.name, "custom");
        assert_eq!(resolved.window, Window::bounded(start, end));
    }

    #[test]
    fn analysis_does_not_recognize_week() {
        let resolved = resolve_analysis(Some("week"), wednesday());

        assert_eq!(resolved.name, "month");
        assert_eq!(
            resolved.window.start,
            Some(Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn analysis_recognizes_year_and_all() {
        assert_eq!(resolve_analysis(Some("year"), wednesday()).name, "year");
        assert_eq!(resolve_analysis(Some("all"), wednesday()).name, "all");
    }

    #[test]
    fn month_range_is_half_open() {
        let (start, end) = month_range(2025, 6);

        assert_eq!(start, Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn december_rolls_into_next_year() {
        let (start, end) = month_range(2025, 12);

        assert_eq!(start, Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn year_range_covers_the_full_year() {
        let (start, end) = year_range(2025);

        assert_eq!(start, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
    }
}

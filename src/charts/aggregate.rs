use serde::Serialize;
use time::{Date, Duration, Month, OffsetDateTime};

use crate::activities::repo::Activity;

/// A bucketed duration series plus its formatted grand total, ready to be
/// embedded in a chart page. Labels and values are parallel vectors.
#[derive(Debug, Serialize)]
pub struct BucketSeries {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub total: String,
}

pub const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// `"H hours and M minutes"` with hours floored and minutes rounded. Every
/// view reports its grand total through this, whatever its bucket unit.
pub fn format_hours_minutes(total_minutes: f64) -> String {
    let hours = (total_minutes / 60.0).floor() as i64;
    let minutes = (total_minutes % 60.0).round() as i64;
    format!("{hours} hours and {minutes} minutes")
}

// --- window computation (all UTC) ---

pub fn day_window_start(now: OffsetDateTime) -> OffsetDateTime {
    now.date().midnight().assume_utc()
}

/// Monday 00:00 through Monday+6d 00:00. The upper bound lands on Sunday
/// midnight, and the selection filter compares `end_time` against it, so
/// activities that spill past it are dropped from the week view entirely.
pub fn week_window(now: OffsetDateTime) -> (OffsetDateTime, OffsetDateTime) {
    let today = now.date();
    let monday = today - Duration::days(today.weekday().number_days_from_monday() as i64);
    (
        monday.midnight().assume_utc(),
        (monday + Duration::days(6)).midnight().assume_utc(),
    )
}

fn january_first(year: i32) -> OffsetDateTime {
    Date::from_calendar_date(year, Month::January, 1)
        .expect("January 1st always exists")
        .midnight()
        .assume_utc()
}

/// The current calendar year, as a half-open range.
pub fn month_window(now: OffsetDateTime) -> (OffsetDateTime, OffsetDateTime) {
    (january_first(now.year()), january_first(now.year() + 1))
}

/// Lower bound of the year view: everything from January 1st of the current
/// year onwards.
pub fn year_window_start(now: OffsetDateTime) -> OffsetDateTime {
    january_first(now.year())
}

// --- bucketing ---
//
// Durations are attributed entirely to the bucket the activity STARTS in;
// spans crossing a bucket boundary are not split.

/// 24 hour-of-day buckets accumulating minutes.
pub fn day_series(activities: &[Activity]) -> BucketSeries {
    let mut values = vec![0.0; 24];
    for a in activities {
        values[a.start_time.hour() as usize] += a.duration_minutes();
    }
    let total_minutes: f64 = activities.iter().map(Activity::duration_minutes).sum();
    BucketSeries {
        labels: (0..24).map(|h| format!("{h:02}")).collect(),
        values,
        total: format_hours_minutes(total_minutes),
    }
}

/// 7 weekday buckets accumulating hours.
pub fn week_series(activities: &[Activity]) -> BucketSeries {
    let mut values = vec![0.0; 7];
    for a in activities {
        values[a.start_time.weekday().number_days_from_monday() as usize] += a.duration_hours();
    }
    let total_hours: f64 = activities.iter().map(Activity::duration_hours).sum();
    BucketSeries {
        labels: WEEKDAYS.iter().map(|d| d.to_string()).collect(),
        values,
        total: format_hours_minutes(total_hours * 60.0),
    }
}

/// 12 month buckets accumulating hours, labeled 1-based.
pub fn month_series(activities: &[Activity]) -> BucketSeries {
    let mut values = vec![0.0; 12];
    for a in activities {
        values[u8::from(a.start_time.month()) as usize - 1] += a.duration_hours();
    }
    let total_minutes: f64 = activities.iter().map(Activity::duration_minutes).sum();
    BucketSeries {
        labels: (1..=12).map(|m| m.to_string()).collect(),
        values,
        total: format_hours_minutes(total_minutes),
    }
}

/// One bucket per distinct start year, in first-encounter order. The keys
/// are deliberately left unsorted.
pub fn year_series(activities: &[Activity]) -> BucketSeries {
    let mut years: Vec<i32> = Vec::new();
    let mut values: Vec<f64> = Vec::new();
    for a in activities {
        let year = a.start_time.year();
        match years.iter().position(|y| *y == year) {
            Some(i) => values[i] += a.duration_hours(),
            None => {
                years.push(year);
                values.push(a.duration_hours());
            }
        }
    }
    let total_minutes: f64 = activities.iter().map(Activity::duration_minutes).sum();
    BucketSeries {
        labels: years.iter().map(|y| y.to_string()).collect(),
        values,
        total: format_hours_minutes(total_minutes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;
    use uuid::Uuid;

    fn activity(start: OffsetDateTime, end: OffsetDateTime) -> Activity {
        Activity {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            start_time: start,
            end_time: end,
        }
    }

    #[test]
    fn total_formatter_floors_hours_and_rounds_minutes() {
        assert_eq!(format_hours_minutes(0.0), "0 hours and 0 minutes");
        assert_eq!(format_hours_minutes(90.0), "1 hours and 30 minutes");
        assert_eq!(format_hours_minutes(125.4), "2 hours and 5 minutes");
        assert_eq!(format_hours_minutes(125.6), "2 hours and 6 minutes");
    }

    #[test]
    fn total_formatter_keeps_the_sixty_minute_quirk() {
        // 59.6 rounds up within the hour; the source formatter reports it
        // as 60 minutes rather than rolling over.
        assert_eq!(format_hours_minutes(59.6), "0 hours and 60 minutes");
    }

    #[test]
    fn day_buckets_accumulate_minutes_by_start_hour() {
        let acts = vec![
            activity(
                datetime!(2025-03-10 09:15:00 UTC),
                datetime!(2025-03-10 09:45:00 UTC),
            ),
            activity(
                datetime!(2025-03-10 09:50:00 UTC),
                datetime!(2025-03-10 10:10:00 UTC),
            ),
            activity(
                datetime!(2025-03-10 23:00:00 UTC),
                datetime!(2025-03-10 23:30:00 UTC),
            ),
        ];
        let series = day_series(&acts);
        assert_eq!(series.labels.len(), 24);
        assert_eq!(series.labels[0], "00");
        assert_eq!(series.labels[23], "23");
        // the 09:50-10:10 span is not split across the hour boundary
        assert_eq!(series.values[9], 50.0);
        assert_eq!(series.values[10], 0.0);
        assert_eq!(series.values[23], 30.0);
    }

    #[test]
    fn day_bucket_sum_equals_grand_total() {
        let acts = vec![
            activity(
                datetime!(2025-03-10 08:00:00 UTC),
                datetime!(2025-03-10 09:00:00 UTC),
            ),
            activity(
                datetime!(2025-03-10 12:00:00 UTC),
                datetime!(2025-03-10 13:30:00 UTC),
            ),
        ];
        let series = day_series(&acts);
        let bucket_sum: f64 = series.values.iter().sum();
        assert_eq!(bucket_sum, 150.0);
        assert_eq!(series.total, "2 hours and 30 minutes");
    }

    #[test]
    fn week_buckets_run_monday_through_sunday_in_hours() {
        // 2025-03-10 is a Monday, 2025-03-12 a Wednesday
        let acts = vec![
            activity(
                datetime!(2025-03-10 09:00:00 UTC),
                datetime!(2025-03-10 12:00:00 UTC),
            ),
            activity(
                datetime!(2025-03-12 10:00:00 UTC),
                datetime!(2025-03-12 10:30:00 UTC),
            ),
        ];
        let series = week_series(&acts);
        assert_eq!(series.labels[0], "Monday");
        assert_eq!(series.labels[6], "Sunday");
        assert_eq!(series.values[0], 3.0);
        assert_eq!(series.values[2], 0.5);
        assert_eq!(series.total, "3 hours and 30 minutes");
    }

    #[test]
    fn week_window_spans_monday_to_sunday_midnight() {
        // Wednesday mid-week
        let (start, end) = week_window(datetime!(2025-03-12 15:30:00 UTC));
        assert_eq!(start, datetime!(2025-03-10 00:00:00 UTC));
        assert_eq!(end, datetime!(2025-03-16 00:00:00 UTC));

        // A Monday is its own week start
        let (start, _) = week_window(datetime!(2025-03-10 00:00:00 UTC));
        assert_eq!(start, datetime!(2025-03-10 00:00:00 UTC));
    }

    #[test]
    fn week_filter_drops_activities_spilling_past_the_window_end() {
        let (start, end) = week_window(datetime!(2025-03-12 15:30:00 UTC));
        // Starts Sunday 23:50 inside the week, ends Monday 00:10 of the
        // next week: the end_time bound excludes it entirely.
        let spilling = activity(
            datetime!(2025-03-16 23:50:00 UTC),
            datetime!(2025-03-17 00:10:00 UTC),
        );
        assert!(spilling.start_time >= start);
        assert!(spilling.end_time > end);

        // Saturday afternoon stays inside the window.
        let contained = activity(
            datetime!(2025-03-15 14:00:00 UTC),
            datetime!(2025-03-15 15:00:00 UTC),
        );
        assert!(contained.start_time >= start && contained.end_time <= end);
    }

    #[test]
    fn month_buckets_accumulate_hours_by_start_month() {
        let acts = vec![
            activity(
                datetime!(2025-01-05 08:00:00 UTC),
                datetime!(2025-01-05 10:00:00 UTC),
            ),
            activity(
                datetime!(2025-03-20 08:00:00 UTC),
                datetime!(2025-03-20 09:30:00 UTC),
            ),
        ];
        let series = month_series(&acts);
        assert_eq!(series.labels[0], "1");
        assert_eq!(series.labels[11], "12");
        assert_eq!(series.values[0], 2.0);
        assert_eq!(series.values[2], 1.5);
        assert_eq!(series.total, "3 hours and 30 minutes");
    }

    #[test]
    fn month_window_is_the_current_calendar_year() {
        let (start, end) = month_window(datetime!(2025-07-04 12:00:00 UTC));
        assert_eq!(start, datetime!(2025-01-01 00:00:00 UTC));
        assert_eq!(end, datetime!(2026-01-01 00:00:00 UTC));
    }

    #[test]
    fn year_buckets_keep_first_encounter_order() {
        let acts = vec![
            activity(
                datetime!(2023-05-01 08:00:00 UTC),
                datetime!(2023-05-01 09:00:00 UTC),
            ),
            activity(
                datetime!(2024-02-01 08:00:00 UTC),
                datetime!(2024-02-01 09:00:00 UTC),
            ),
            activity(
                datetime!(2023-11-01 08:00:00 UTC),
                datetime!(2023-11-01 10:00:00 UTC),
            ),
        ];
        let series = year_series(&acts);
        assert_eq!(series.labels, vec!["2023", "2024"]);
        assert_eq!(series.values, vec![3.0, 1.0]);
    }

    #[test]
    fn year_window_starts_on_january_first() {
        assert_eq!(
            year_window_start(datetime!(2025-08-06 09:00:00 UTC)),
            datetime!(2025-01-01 00:00:00 UTC)
        );
    }

    #[test]
    fn empty_input_produces_zeroed_series() {
        let series = day_series(&[]);
        assert!(series.values.iter().all(|v| *v == 0.0));
        assert_eq!(series.total, "0 hours and 0 minutes");

        let series = year_series(&[]);
        assert!(series.labels.is_empty());
        assert!(series.values.is_empty());
    }
}

//! Weekly Aggregator — folds raw outcome records into sparse ISO-week buckets.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, Utc};

use crate::models::forecast::WeeklyBucket;
use crate::models::outcome::OutcomeRecord;

#[derive(Default)]
struct WeekTally {
    total: u32,
    responses: u32,
    interviews: u32,
}

/// Groups records by ISO week, keeping the `lookback_weeks` whole weeks that
/// end with the week containing `now`. Records after `now` are ignored.
///
/// Weeks without applications produce no bucket, so the series is sparse and
/// downstream fitting works on bucket position rather than calendar distance.
/// Buckets come back in ascending week order.
pub fn aggregate_weekly(
    records: &[OutcomeRecord],
    now: DateTime<Utc>,
    lookback_weeks: u32,
) -> Vec<WeeklyBucket> {
    let cutoff = window_start(now.date_naive(), lookback_weeks);
    let mut weeks: BTreeMap<NaiveDate, WeekTally> = BTreeMap::new();

    for record in records {
        if record.applied_at.date_naive() < cutoff || record.applied_at > now {
            continue;
        }

        let tally = weeks
            .entry(week_start(record.applied_at.date_naive()))
            .or_default();
        tally.total += 1;
        if record.response_received {
            tally.responses += 1;
        }
        if record.interview_granted {
            tally.interviews += 1;
        }
    }

    weeks
        .into_iter()
        .map(|(start, tally)| WeeklyBucket {
            week_key: week_key(start),
            week_start: start,
            total: tally.total,
            responses: tally.responses,
            interviews: tally.interviews,
            response_rate: percentage(tally.responses, tally.total),
            interview_rate: percentage(tally.interviews, tally.total),
        })
        .collect()
}

/// Monday of the oldest week in the window. Saturates at the earliest
/// representable date instead of overflowing.
pub fn window_start(today: NaiveDate, lookback_weeks: u32) -> NaiveDate {
    let days = u64::from(lookback_weeks.saturating_sub(1)) * 7;
    week_start(today)
        .checked_sub_days(Days::new(days))
        .unwrap_or(NaiveDate::MIN)
}

/// Monday of the ISO week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// ISO year-week label, zero padded so labels sort chronologically.
pub fn week_key(date: NaiveDate) -> String {
    let iso = date.iso_week();
    format!("{:04}-W{:02}", iso.year(), iso.week())
}

/// Labels for the `count` calendar weeks following the week starting at `last_week_start`.
pub fn following_week_keys(last_week_start: NaiveDate, count: usize) -> Vec<String> {
    (1..=count as i64)
        .map(|offset| week_key(last_week_start + Duration::weeks(offset)))
        .collect()
}

fn percentage(count: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        f64::from(count) * 100.0 / f64::from(total)
    }
}

//! Trigger instants for event reminders.
//!
//! Every event time produces two reminders: a warning five minutes before
//! the start and one at the start itself. Only reminders strictly after
//! `now` are returned. By default only the current local day is looked at;
//! callers re-run the calculation to pick up later days.

use chrono::{DateTime, Datelike, Days, NaiveDate, TimeDelta, TimeZone, Utc};
use knightrehber_models::{
    event::{Event, EventTime},
    occurrence::{Occurrence, OccurrenceKind},
};

pub const WARNING_LEAD_MINUTES: i64 = 5;

/// Occurrences of `event` later today, in the time zone of `now`.
pub fn compute_occurrences<Tz: TimeZone>(event: &Event, now: &DateTime<Tz>) -> Vec<Occurrence> {
    compute_occurrences_within(event, now, 1)
}

/// Occurrences of `event` over `horizon_days` local days starting today.
///
/// A horizon of zero is treated as one day.
pub fn compute_occurrences_within<Tz: TimeZone>(
    event: &Event,
    now: &DateTime<Tz>,
    horizon_days: u32,
) -> Vec<Occurrence> {
    let tz = now.timezone();
    let now_utc = now.with_timezone(&Utc);
    let today = now.date_naive();
    let warning_lead = TimeDelta::minutes(WARNING_LEAD_MINUTES);

    let mut occurrences = Vec::new();

    let days = (0..horizon_days.max(1))
        .filter_map(|offset| today.checked_add_days(Days::new(u64::from(offset))));

    for day in days {
        if !event.occurs_on(day.weekday()) {
            continue;
        }

        for time in &event.times {
            let Some(exact) = resolve_local(&tz, day, *time) else {
                log::warn!(
                    "Skipping nonexistent local time. [event_id = {}, date = {}, time = {}]",
                    event.id,
                    day,
                    time
                );
                continue;
            };

            let warning = exact.checked_sub_signed(warning_lead);
            if let Some(warning) = warning.filter(|warning| *warning > now_utc) {
                occurrences.push(Occurrence::new(warning, OccurrenceKind::FiveMinuteWarning));
            }

            if exact > now_utc {
                occurrences.push(Occurrence::new(exact, OccurrenceKind::ExactStart));
            }
        }
    }

    occurrences.sort();
    occurrences
}

fn resolve_local<Tz: TimeZone>(tz: &Tz, date: NaiveDate, time: EventTime) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&date.and_time(time.time()))
        .earliest()
        .map(|local| local.with_timezone(&Utc))
}

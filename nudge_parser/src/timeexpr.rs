//! Date and time expression recognizers plus the resolver that turns them
//! into an absolute due time in the reference timezone.
//!
//! The grammar is deliberately enumerable: every accepted form is listed in
//! the token tables below, so new expressions are added by extending a table
//! rather than by restructuring control flow.

use chrono::{
    DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Weekday,
};
use chrono_tz::Tz;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateExpr {
    Today,
    Tomorrow,
    /// Next occurrence of the named weekday, on or after today.
    OnWeekday(Weekday),
    /// "in N days" / "in N weeks".
    InDays(i64),
    /// Explicit `YYYY-MM-DD` date.
    Calendar(NaiveDate),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeExpr {
    /// Wall-clock time of day, 12- or 24-hour form.
    Clock(NaiveTime),
    /// "in N minutes" / "in N hours", anchored to the current instant.
    Relative(Duration),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Minutes,
    Hours,
    Days,
    Weeks,
}

impl Unit {
    pub fn step(&self, count: i64) -> Duration {
        match self {
            Unit::Minutes => Duration::minutes(count),
            Unit::Hours => Duration::hours(count),
            Unit::Days => Duration::days(count),
            Unit::Weeks => Duration::days(7 * count),
        }
    }
}

const WEEKDAYS: [(&str, Weekday); 7] = [
    ("monday", Weekday::Mon),
    ("tuesday", Weekday::Tue),
    ("wednesday", Weekday::Wed),
    ("thursday", Weekday::Thu),
    ("friday", Weekday::Fri),
    ("saturday", Weekday::Sat),
    ("sunday", Weekday::Sun),
];

const UNITS: [(&str, Unit); 12] = [
    ("minute", Unit::Minutes),
    ("minutes", Unit::Minutes),
    ("min", Unit::Minutes),
    ("mins", Unit::Minutes),
    ("hour", Unit::Hours),
    ("hours", Unit::Hours),
    ("hr", Unit::Hours),
    ("hrs", Unit::Hours),
    ("day", Unit::Days),
    ("days", Unit::Days),
    ("week", Unit::Weeks),
    ("weeks", Unit::Weeks),
];

pub fn weekday_token(word: &str) -> Option<Weekday> {
    WEEKDAYS
        .iter()
        .find(|(name, _)| *name == word)
        .map(|(_, day)| *day)
}

pub fn unit_token(word: &str) -> Option<Unit> {
    UNITS
        .iter()
        .find(|(name, _)| *name == word)
        .map(|(_, unit)| *unit)
}

/// Single-word date tokens: `today`, `tomorrow`, weekday names and
/// `YYYY-MM-DD` calendar dates.
pub fn date_token(word: &str) -> Option<DateExpr> {
    match word {
        "today" => Some(DateExpr::Today),
        "tomorrow" => Some(DateExpr::Tomorrow),
        _ => weekday_token(word).map(DateExpr::OnWeekday).or_else(|| {
            NaiveDate::parse_from_str(word, "%Y-%m-%d")
                .ok()
                .map(DateExpr::Calendar)
        }),
    }
}

/// Clock tokens: `17:00`, `9:30`, `5pm`, `5:30pm`, `12am`. A bare number
/// without a colon or meridiem marker is ambiguous and rejected.
pub fn clock_token(word: &str) -> Option<NaiveTime> {
    let (body, meridiem) = if let Some(rest) = word.strip_suffix("am") {
        (rest, Some("am"))
    } else if let Some(rest) = word.strip_suffix("pm") {
        (rest, Some("pm"))
    } else {
        (word, None)
    };

    let (hour_part, minute_part) = match body.split_once(':') {
        Some((hour, minute)) => (hour, Some(minute)),
        None => (body, None),
    };

    if hour_part.is_empty() || hour_part.len() > 2 {
        return None;
    }
    let hour: u32 = hour_part.parse().ok()?;
    let minute: u32 = match minute_part {
        Some(minute) if minute.len() == 2 => minute.parse().ok()?,
        Some(_) => return None,
        None => 0,
    };

    let hour = match meridiem {
        Some("am") if hour == 12 => 0,
        Some("pm") if hour == 12 => 12,
        Some("am") if (1..12).contains(&hour) => hour,
        Some("pm") if (1..12).contains(&hour) => hour + 12,
        Some(_) => return None,
        None if minute_part.is_some() => hour,
        None => return None,
    };

    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Resolves a parsed date and time fragment into an absolute due time.
///
/// An absent date means today; an absent time means `default_time`. A
/// non-relative result at or before `now` rolls forward: one day in
/// general, seven when the date came from a weekday name. Relative
/// expressions anchor to `now` and never roll.
pub fn resolve(
    date: Option<DateExpr>,
    time: Option<TimeExpr>,
    now: DateTime<Tz>,
    default_time: NaiveTime,
) -> DateTime<Tz> {
    if let Some(TimeExpr::Relative(offset)) = time {
        let base = match date {
            Some(DateExpr::InDays(days)) => now + Duration::days(days),
            _ => now,
        };
        return base + offset;
    }

    let today = now.date_naive();
    let target_date = match date {
        None | Some(DateExpr::Today) => today,
        Some(DateExpr::Tomorrow) => today + Duration::days(1),
        Some(DateExpr::InDays(days)) => today + Duration::days(days),
        Some(DateExpr::OnWeekday(day)) => next_weekday(today, day),
        Some(DateExpr::Calendar(date)) => date,
    };

    let time_of_day = match time {
        Some(TimeExpr::Clock(clock)) => clock,
        _ => default_time,
    };

    let tz = now.timezone();
    let candidate = local_datetime(tz, target_date.and_time(time_of_day));
    if candidate > now {
        return candidate;
    }

    match date {
        None | Some(DateExpr::Today) => {
            local_datetime(tz, (target_date + Duration::days(1)).and_time(time_of_day))
        }
        // A weekday resolving to today whose time already passed means the
        // next occurrence of that weekday.
        Some(DateExpr::OnWeekday(_)) => {
            local_datetime(tz, (target_date + Duration::days(7)).and_time(time_of_day))
        }
        // Explicit past dates are accepted; they fire on the next cycle.
        _ => candidate,
    }
}

fn next_weekday(today: NaiveDate, target: Weekday) -> NaiveDate {
    let ahead = (target.num_days_from_monday() as i64
        - today.weekday().num_days_from_monday() as i64)
        .rem_euclid(7);
    today + Duration::days(ahead)
}

fn local_datetime(tz: Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    tz.from_local_datetime(&naive).earliest().unwrap_or_else(|| {
        // A time skipped by a DST jump lands on the next representable hour.
        tz.from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .expect("an hour past a DST gap always exists")
    })
}

#[cfg(test)]
mod tests {
    use chrono::Timelike;
    use chrono_tz::Asia::Kolkata;
    use proptest::prelude::*;
    use proptest_arbitrary_interop::arb;

    use super::*;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Tz> {
        Kolkata.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn default_time() -> NaiveTime {
        NaiveTime::from_hms_opt(9, 0, 0).unwrap()
    }

    #[test]
    fn clock_tokens() {
        let cases = [
            ("17:00", Some((17, 0))),
            ("9:30", Some((9, 30))),
            ("5pm", Some((17, 0))),
            ("5:30pm", Some((17, 30))),
            ("9am", Some((9, 0))),
            ("12am", Some((0, 0))),
            ("12pm", Some((12, 0))),
            ("12:30am", Some((0, 30))),
            ("5", None),
            ("13pm", None),
            ("0am", None),
            ("25:00", None),
            ("9:99", None),
            ("9:5", None),
            ("noonish", None),
            ("am", None),
        ];
        for (word, expected) in cases {
            let expected = expected.map(|(h, m)| NaiveTime::from_hms_opt(h, m, 0).unwrap());
            assert_eq!(clock_token(word), expected, "token {word:?}");
        }
    }

    #[test]
    fn date_tokens() {
        assert_eq!(date_token("today"), Some(DateExpr::Today));
        assert_eq!(date_token("tomorrow"), Some(DateExpr::Tomorrow));
        assert_eq!(
            date_token("friday"),
            Some(DateExpr::OnWeekday(Weekday::Fri))
        );
        assert_eq!(
            date_token("2026-09-01"),
            Some(DateExpr::Calendar(
                NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()
            ))
        );
        assert_eq!(date_token("frobnicate"), None);
        assert_eq!(date_token("2026-13-01"), None);
    }

    #[test]
    fn time_before_now_rolls_to_tomorrow() {
        // 2026-08-07 is a Friday.
        let now = at(2026, 8, 7, 15, 0);
        let nine = TimeExpr::Clock(NaiveTime::from_hms_opt(9, 0, 0).unwrap());

        let due = resolve(None, Some(nine), now, default_time());
        assert_eq!(due, at(2026, 8, 8, 9, 0));

        let due = resolve(Some(DateExpr::Today), Some(nine), now, default_time());
        assert_eq!(due, at(2026, 8, 8, 9, 0));
    }

    #[test]
    fn time_after_now_stays_today() {
        let now = at(2026, 8, 7, 15, 0);
        let evening = TimeExpr::Clock(NaiveTime::from_hms_opt(17, 0, 0).unwrap());

        let due = resolve(None, Some(evening), now, default_time());
        assert_eq!(due, at(2026, 8, 7, 17, 0));
    }

    #[test]
    fn weekday_resolves_to_next_occurrence() {
        let now = at(2026, 8, 7, 15, 0); // Friday
        let monday = DateExpr::OnWeekday(Weekday::Mon);

        let due = resolve(Some(monday), None, now, default_time());
        assert_eq!(due, at(2026, 8, 10, 9, 0));
    }

    #[test]
    fn same_weekday_with_passed_time_rolls_a_full_week() {
        let now = at(2026, 8, 7, 15, 0); // Friday, 3pm
        let friday = DateExpr::OnWeekday(Weekday::Fri);
        let nine = TimeExpr::Clock(NaiveTime::from_hms_opt(9, 0, 0).unwrap());

        let due = resolve(Some(friday), Some(nine), now, default_time());
        assert_eq!(due, at(2026, 8, 14, 9, 0));
    }

    #[test]
    fn relative_time_never_rolls() {
        let now = at(2026, 8, 7, 23, 55);
        let soon = TimeExpr::Relative(Duration::minutes(10));

        let due = resolve(None, Some(soon), now, default_time());
        assert_eq!(due, now + Duration::minutes(10));
    }

    #[test]
    fn relative_days_use_default_time() {
        let now = at(2026, 8, 7, 15, 0);

        let due = resolve(Some(DateExpr::InDays(3)), None, now, default_time());
        assert_eq!(due, at(2026, 8, 10, 9, 0));
    }

    #[test]
    fn past_calendar_date_is_left_alone() {
        let now = at(2026, 8, 7, 15, 0);
        let past = DateExpr::Calendar(NaiveDate::from_ymd_opt(2026, 8, 1).unwrap());

        let due = resolve(Some(past), None, now, default_time());
        assert_eq!(due, at(2026, 8, 1, 9, 0));
    }

    #[test]
    fn tomorrow_with_default_time() {
        let now = at(2026, 8, 7, 15, 0);

        let due = resolve(Some(DateExpr::Tomorrow), None, now, default_time());
        assert_eq!(due, at(2026, 8, 8, 9, 0));
    }

    fn clock_strategy() -> impl Strategy<Value = NaiveTime> {
        arb::<NaiveTime>().prop_map(|clock| clock.with_nanosecond(0).unwrap())
    }

    fn now_strategy() -> impl Strategy<Value = DateTime<Tz>> {
        // Bounded instants (1970..~2096) keep the date arithmetic far from
        // chrono's representable range.
        (0i64..4_000_000_000).prop_map(|secs| {
            DateTime::from_timestamp(secs, 0)
                .unwrap()
                .with_timezone(&Kolkata)
        })
    }

    proptest! {
        #[test]
        fn resolved_clock_time_is_always_in_the_future(
            now in now_strategy(),
            clock in clock_strategy(),
        ) {
            let due = resolve(None, Some(TimeExpr::Clock(clock)), now, default_time());

            prop_assert!(due > now, "due = {due}, now = {now}");
            prop_assert_eq!(due.time(), clock);
            prop_assert!(due - now <= Duration::days(1));
        }

        #[test]
        fn resolved_relative_time_is_exact(
            now in now_strategy(),
            minutes in 1i64..7 * 24 * 60,
        ) {
            let due = resolve(
                None,
                Some(TimeExpr::Relative(Duration::minutes(minutes))),
                now,
                default_time(),
            );

            prop_assert_eq!(due, now + Duration::minutes(minutes));
        }
    }
}

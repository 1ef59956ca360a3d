//! Splits raw reminder text into a message, a date/time clause and a
//! recurrence descriptor.
//!
//! The scan walks the words once, consuming recognized tokens together with
//! their `at` / `on` / `in` / `every` trigger words; whatever is left over
//! is the reminder message. Recurrence clauses are interpreted before the
//! date and time fragments are resolved.

use chrono::{DateTime, NaiveTime};
use chrono_tz::Tz;

use nudge_models::reminder::Recurrence;

use crate::ParseError;
use crate::timeexpr::{self, DateExpr, TimeExpr, Unit};

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReminder {
    pub message: String,
    pub due_at: DateTime<Tz>,
    pub recurrence: Recurrence,
}

struct Scan<'a> {
    words: Vec<&'a str>,
    lowered: Vec<String>,
    consumed: Vec<bool>,
    date: Option<DateExpr>,
    time: Option<TimeExpr>,
    /// Set when `time` is only the implicit first firing of an interval
    /// clause; an explicit clock token later in the text overrides it.
    time_is_implicit: bool,
    recurrence: Recurrence,
    recurrence_clause: Option<String>,
}

pub fn parse_reminder_input(
    text: &str,
    now: DateTime<Tz>,
    default_time: NaiveTime,
) -> Result<ParsedReminder, ParseError> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return Err(ParseError::EmptyMessage);
    }

    let lowered: Vec<String> = words.iter().map(|word| word.to_lowercase()).collect();
    let mut scan = Scan {
        consumed: vec![false; words.len()],
        words,
        lowered,
        date: None,
        time: None,
        time_is_implicit: false,
        recurrence: Recurrence::None,
        recurrence_clause: None,
    };

    scan.strip_leading_trigger();
    scan.run()?;
    scan.check_dangling_triggers()?;

    let message = scan.message();
    if message.is_empty() {
        return Err(ParseError::EmptyMessage);
    }

    let due_at = timeexpr::resolve(scan.date, scan.time, now, default_time);

    Ok(ParsedReminder {
        message,
        due_at,
        recurrence: scan.recurrence,
    })
}

impl Scan<'_> {
    /// Consumes a leading "remind me to" / "remind me".
    fn strip_leading_trigger(&mut self) {
        if self.lowered.len() >= 2 && self.lowered[0] == "remind" && self.lowered[1] == "me" {
            self.consumed[0] = true;
            self.consumed[1] = true;
            if self.lowered.get(2).map(String::as_str) == Some("to") {
                self.consumed[2] = true;
            }
        }
    }

    fn run(&mut self) -> Result<(), ParseError> {
        for index in 0..self.words.len() {
            if self.consumed[index] {
                continue;
            }
            let word = self.lowered[index].clone();
            match word.as_str() {
                "every" => self.every_clause(index)?,
                "daily" => self.set_recurrence(Recurrence::Daily, "daily", index, 1)?,
                "weekly" => self.set_recurrence(Recurrence::Weekly, "weekly", index, 1)?,
                "in" => self.relative_clause(index),
                word => {
                    if let Some(clock) = timeexpr::clock_token(word) {
                        if self.time.is_none() || self.time_is_implicit {
                            self.time = Some(TimeExpr::Clock(clock));
                            self.time_is_implicit = false;
                            self.consume(index, 1);
                            self.consume_trigger_before(index, "at");
                        }
                    } else if let Some(date) = timeexpr::date_token(word) {
                        if self.date.is_none() {
                            self.date = Some(date);
                            self.consume(index, 1);
                            self.consume_trigger_before(index, "on");
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// `every day`, `every week`, `every <weekday>`, `every N <unit>`.
    fn every_clause(&mut self, index: usize) -> Result<(), ParseError> {
        let Some(operand) = self.lowered.get(index + 1).cloned() else {
            return Err(ParseError::unparsable(self.words[index]));
        };

        if operand == "day" {
            return self.set_recurrence(Recurrence::Daily, "every day", index, 2);
        }
        if operand == "week" {
            return self.set_recurrence(Recurrence::Weekly, "every week", index, 2);
        }
        if let Some(day) = timeexpr::weekday_token(&operand) {
            let clause = format!("every {operand}");
            self.set_recurrence(Recurrence::Weekly, &clause, index, 2)?;
            // The weekday also anchors the first occurrence.
            if self.date.is_none() {
                self.date = Some(DateExpr::OnWeekday(day));
            }
            return Ok(());
        }
        if let Ok(count) = operand.parse::<u32>() {
            return self.interval_clause(index, count);
        }

        Err(ParseError::unparsable(self.fragment(index, 2)))
    }

    /// `every N minutes|hours|days|weeks`. An interval is a purely relative
    /// request, so without an explicit clock the first firing is one step
    /// from now.
    fn interval_clause(&mut self, index: usize, count: u32) -> Result<(), ParseError> {
        if count == 0 {
            return Err(ParseError::unparsable(self.fragment(index, 3)));
        }
        let unit = self
            .lowered
            .get(index + 2)
            .and_then(|word| timeexpr::unit_token(word))
            .ok_or_else(|| ParseError::unparsable(self.fragment(index, 3)))?;

        let clause = self.fragment(index, 3);
        let step = unit.step(i64::from(count));
        self.set_recurrence(Recurrence::Interval(step), &clause, index, 3)?;
        if self.time.is_none() {
            self.time = Some(TimeExpr::Relative(step));
            self.time_is_implicit = true;
        }
        Ok(())
    }

    /// `in N minutes|hours` is a relative time; `in N days|weeks` a relative
    /// date. An `in` whose operand is not a number stays in the message.
    fn relative_clause(&mut self, index: usize) {
        let Some(count) = self
            .lowered
            .get(index + 1)
            .and_then(|word| word.parse::<u32>().ok())
        else {
            return;
        };
        let Some(unit) = self
            .lowered
            .get(index + 2)
            .and_then(|word| timeexpr::unit_token(word))
        else {
            return;
        };

        match unit {
            Unit::Minutes | Unit::Hours => {
                if self.time.is_none() {
                    self.time = Some(TimeExpr::Relative(unit.step(i64::from(count))));
                    self.consume(index, 3);
                }
            }
            Unit::Days | Unit::Weeks => {
                if self.date.is_none() {
                    let days = unit.step(i64::from(count)).num_days();
                    self.date = Some(DateExpr::InDays(days));
                    self.consume(index, 3);
                }
            }
        }
    }

    fn set_recurrence(
        &mut self,
        recurrence: Recurrence,
        clause: &str,
        index: usize,
        span: usize,
    ) -> Result<(), ParseError> {
        if let Some(first) = &self.recurrence_clause {
            return Err(ParseError::AmbiguousRecurrence {
                first: first.clone(),
                second: clause.to_string(),
            });
        }
        self.recurrence = recurrence;
        self.recurrence_clause = Some(clause.to_string());
        self.consume(index, span);
        Ok(())
    }

    fn consume(&mut self, index: usize, span: usize) {
        for offset in 0..span {
            if let Some(slot) = self.consumed.get_mut(index + offset) {
                *slot = true;
            }
        }
    }

    fn consume_trigger_before(&mut self, index: usize, trigger: &str) {
        if index > 0 && !self.consumed[index - 1] && self.lowered[index - 1] == trigger {
            self.consumed[index - 1] = true;
        }
    }

    /// With no date or time recognized anywhere, a trigger keyword followed
    /// by an unrecognized operand is a malformed date/time clause.
    fn check_dangling_triggers(&self) -> Result<(), ParseError> {
        if self.date.is_some() || self.time.is_some() {
            return Ok(());
        }
        for index in 0..self.words.len().saturating_sub(1) {
            if self.consumed[index] || self.consumed[index + 1] {
                continue;
            }
            if matches!(self.lowered[index].as_str(), "at" | "on" | "in") {
                return Err(ParseError::unparsable(self.fragment(index, 2)));
            }
        }
        Ok(())
    }

    /// Remaining words, original casing, minus a leading dangling "to"
    /// (left behind by forms like "remind me in 10 minutes to ...").
    fn message(&self) -> String {
        let mut remaining: Vec<&str> = self
            .words
            .iter()
            .zip(&self.consumed)
            .filter(|(_, consumed)| !**consumed)
            .map(|(word, _)| *word)
            .collect();

        if remaining.first().is_some_and(|word| {
            word.eq_ignore_ascii_case("to") && remaining.len() > 1
        }) {
            remaining.remove(0);
        }

        remaining.join(" ")
    }

    fn fragment(&self, index: usize, span: usize) -> String {
        let end = (index + span).min(self.words.len());
        self.words[index..end].join(" ")
    }
}

//! Yearly date and time-of-day rules.
//!
//! A [`DateTimeRule`] names one day in every year ("the second Sunday in
//! March", "the last Sunday on or before the 25th of October") together with
//! a time of day and the clock that time of day is read on.

use std::fmt;

use crate::grego::{self, Month, Weekday};

/// Which clock the time of day in a rule is measured on.
#[derive(PartialEq, Eq, Hash, Debug, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TimeType {
    /// Local wall time: standard time plus any daylight saving in effect.
    Wall,
    /// Local standard time, ignoring daylight saving.
    Standard,
    /// Universal time.
    Utc,
}

impl TimeType {
    /// Converts a time read on this clock into UTC, given the raw offset and
    /// daylight saving amount in effect on that clock.
    pub fn to_utc(self, time: i64, raw_offset: i32, dst_savings: i32) -> i64 {
        match self {
            TimeType::Utc => time,
            TimeType::Standard => time.saturating_sub(i64::from(raw_offset)),
            TimeType::Wall => time
                .saturating_sub(i64::from(raw_offset))
                .saturating_sub(i64::from(dst_savings)),
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            TimeType::Wall => "",
            TimeType::Standard => "s",
            TimeType::Utc => "u",
        }
    }
}

/// The day-of-year part of a [`DateTimeRule`].
#[derive(PartialEq, Eq, Hash, Debug, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DateRule {
    /// A fixed day of the month, such as the 15th of April.
    DayOfMonth { month: Month, day: u8 },
    /// The `week`th occurrence of a weekday within the month. Negative values
    /// count from the end of the month, so `-1` is the last occurrence. Zero
    /// is not meaningful.
    DayOfWeekInMonth { month: Month, week: i8, weekday: Weekday },
    /// The first `weekday` falling on or after `day`, possibly in the
    /// following month.
    WeekdayOnOrAfter { month: Month, day: u8, weekday: Weekday },
    /// The last `weekday` falling on or before `day`, possibly in the
    /// preceding month. The 29th of February reads as the 28th in common
    /// years.
    WeekdayOnOrBefore { month: Month, day: u8, weekday: Weekday },
}

impl DateRule {
    /// The month this rule is anchored to.
    pub fn month(&self) -> Month {
        match *self {
            DateRule::DayOfMonth { month, .. }
            | DateRule::DayOfWeekInMonth { month, .. }
            | DateRule::WeekdayOnOrAfter { month, .. }
            | DateRule::WeekdayOnOrBefore { month, .. } => month,
        }
    }

    /// The day number this rule selects in the given year, with 1970-01-01
    /// as day 0.
    pub fn day_in_year(&self, year: i64) -> i64 {
        match *self {
            DateRule::DayOfMonth { month, day } => {
                grego::fields_to_day(year, month, i64::from(day))
            }
            DateRule::DayOfWeekInMonth { month, week, weekday } => {
                let week = i64::from(week);
                if week > 0 {
                    let first = grego::fields_to_day(year, month, 1);
                    nearest_weekday(first + 7 * (week - 1), weekday, true)
                } else {
                    let length = i64::from(grego::month_length(year, month));
                    let last = grego::fields_to_day(year, month, length);
                    nearest_weekday(last + 7 * (week + 1), weekday, false)
                }
            }
            DateRule::WeekdayOnOrAfter { month, day, weekday } => {
                let day = grego::fields_to_day(year, month, i64::from(day));
                nearest_weekday(day, weekday, true)
            }
            DateRule::WeekdayOnOrBefore { month, day, weekday } => {
                let day = if month == Month::February && day == 29 && !grego::is_leap(year) {
                    28
                } else {
                    day
                };
                let day = grego::fields_to_day(year, month, i64::from(day));
                nearest_weekday(day, weekday, false)
            }
        }
    }
}

/// Moves `day` to the nearest `weekday`, searching forwards when `after` is
/// set and backwards otherwise. A day already on `weekday` stays put.
fn nearest_weekday(day: i64, weekday: Weekday, after: bool) -> i64 {
    let mut delta = weekday.index() - grego::day_of_week(day).index();
    if after && delta < 0 {
        delta += 7;
    } else if !after && delta > 0 {
        delta -= 7;
    }
    day + delta
}

impl fmt::Display for DateRule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            DateRule::DayOfMonth { month, day } => write!(f, "{} {}", month, day),
            DateRule::DayOfWeekInMonth { month, week: -1, weekday } => {
                write!(f, "{} last{}", month, weekday)
            }
            DateRule::DayOfWeekInMonth { month, week, weekday } => {
                write!(f, "{} {}#{}", month, weekday, week)
            }
            DateRule::WeekdayOnOrAfter { month, day, weekday } => {
                write!(f, "{} {}>={}", month, weekday, day)
            }
            DateRule::WeekdayOnOrBefore { month, day, weekday } => {
                write!(f, "{} {}<={}", month, weekday, day)
            }
        }
    }
}

/// A day in every year plus a time of day on a given clock.
#[derive(PartialEq, Eq, Hash, Debug, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DateTimeRule {
    pub date: DateRule,
    /// Milliseconds after midnight, on the clock given by `time_type`.
    pub millis_in_day: i32,
    pub time_type: TimeType,
}

impl DateTimeRule {
    pub fn new(date: DateRule, millis_in_day: i32, time_type: TimeType) -> DateTimeRule {
        DateTimeRule {
            date,
            millis_in_day,
            time_type,
        }
    }

    /// The day number this rule selects in the given year.
    pub fn rule_day(&self, year: i64) -> i64 {
        self.date.day_in_year(year)
    }

    /// The moment in `year` this rule names, still read on the rule's own
    /// clock. Use [`TimeType::to_utc`] to turn it into an instant.
    pub fn local_millis(&self, year: i64) -> i64 {
        grego::day_to_millis(self.rule_day(year), i64::from(self.millis_in_day))
    }
}

impl fmt::Display for DateTimeRule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ", self.date)?;
        write_clock_time(f, self.millis_in_day)?;
        f.write_str(self.time_type.suffix())
    }
}

/// Writes a millisecond count as `h:mm`, growing to `h:mm:ss` and
/// `h:mm:ss.SSS` only when needed.
pub(crate) fn write_clock_time(f: &mut fmt::Formatter, millis: i32) -> fmt::Result {
    if millis < 0 {
        f.write_str("-")?;
    }
    let millis = millis.unsigned_abs();
    let (hours, rest) = (millis / 3_600_000, millis % 3_600_000);
    let (minutes, rest) = (rest / 60_000, rest % 60_000);
    let (seconds, fraction) = (rest / 1000, rest % 1000);
    write!(f, "{}:{:02}", hours, minutes)?;
    if seconds != 0 || fraction != 0 {
        write!(f, ":{:02}", seconds)?;
    }
    if fraction != 0 {
        write!(f, ".{:03}", fraction)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grego::{day_to_fields, Month::*, Weekday::*};

    macro_rules! test {
        ($name:ident: $rule:expr, $year:expr => $month:expr, $day:expr) => {
            #[test]
            fn $name() {
                let rule: DateRule = $rule;
                let (year, month, day) = day_to_fields(rule.day_in_year($year));
                assert_eq!((year, month, day), ($year, $month, $day));
            }
        };
    }

    test!(fixed_day: DateRule::DayOfMonth { month: April, day: 15 }, 2021 => April, 15);
    test!(second_sunday: DateRule::DayOfWeekInMonth { month: March, week: 2, weekday: Sunday }, 2007 => March, 11);
    test!(first_sunday_on_the_first: DateRule::DayOfWeekInMonth { month: April, week: 1, weekday: Sunday }, 2001 => April, 1);
    test!(last_sunday: DateRule::DayOfWeekInMonth { month: October, week: -1, weekday: Sunday }, 2006 => October, 29);
    test!(last_sunday_on_the_last: DateRule::DayOfWeekInMonth { month: October, week: -1, weekday: Sunday }, 2015 => October, 25);
    test!(second_to_last_friday: DateRule::DayOfWeekInMonth { month: January, week: -2, weekday: Friday }, 2021 => January, 22);
    test!(sunday_on_or_after: DateRule::WeekdayOnOrAfter { month: March, day: 8, weekday: Sunday }, 2007 => March, 11);
    test!(on_or_after_same_day: DateRule::WeekdayOnOrAfter { month: March, day: 11, weekday: Sunday }, 2007 => March, 11);
    test!(on_or_after_spills: DateRule::WeekdayOnOrAfter { month: April, day: 29, weekday: Friday }, 2021 => April, 30);
    test!(on_or_after_next_month: DateRule::WeekdayOnOrAfter { month: April, day: 30, weekday: Saturday }, 2021 => May, 1);
    test!(on_or_before: DateRule::WeekdayOnOrBefore { month: October, day: 25, weekday: Sunday }, 2021 => October, 24);
    test!(on_or_before_previous_month: DateRule::WeekdayOnOrBefore { month: May, day: 1, weekday: Friday }, 2021 => April, 30);
    test!(leap_day_in_leap_year: DateRule::WeekdayOnOrBefore { month: February, day: 29, weekday: Monday }, 2016 => February, 29);
    test!(leap_day_in_common_year: DateRule::WeekdayOnOrBefore { month: February, day: 29, weekday: Sunday }, 2021 => February, 28);

    #[test]
    fn time_types() {
        let hour = 3_600_000;
        assert_eq!(TimeType::Utc.to_utc(10 * hour, -5 * hour as i32, hour as i32), 10 * hour);
        assert_eq!(TimeType::Standard.to_utc(10 * hour, -5 * hour as i32, hour as i32), 15 * hour);
        assert_eq!(TimeType::Wall.to_utc(10 * hour, -5 * hour as i32, hour as i32), 14 * hour);
    }

    #[test]
    fn display() {
        let rule = DateTimeRule::new(
            DateRule::WeekdayOnOrAfter { month: March, day: 8, weekday: Sunday },
            2 * 3_600_000,
            TimeType::Wall,
        );
        assert_eq!(rule.to_string(), "Mar Sun>=8 2:00");

        let rule = DateTimeRule::new(
            DateRule::DayOfWeekInMonth { month: October, week: -1, weekday: Sunday },
            3_600_000,
            TimeType::Utc,
        );
        assert_eq!(rule.to_string(), "Oct lastSun 1:00u");

        let rule = DateTimeRule::new(
            DateRule::DayOfMonth { month: January, day: 1 },
            5_430_500,
            TimeType::Standard,
        );
        assert_eq!(rule.to_string(), "Jan 1 1:30:30.500s");

        let rule = DateTimeRule::new(
            DateRule::DayOfWeekInMonth { month: April, week: 2, weekday: Monday },
            0,
            TimeType::Wall,
        );
        assert_eq!(rule.to_string(), "Apr Mon#2 0:00");
    }
}

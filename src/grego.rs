//! Proleptic Gregorian calendar arithmetic.
//!
//! Days are counted from 1970-01-01 (day 0) and instants are milliseconds
//! since the epoch. Every conversion uses floored division so that instants
//! before the epoch land on the preceding day rather than the following one.

use std::fmt;

/// Milliseconds in one day.
pub const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Milliseconds in a 365-day year.
pub const MILLIS_PER_YEAR: i64 = 365 * MILLIS_PER_DAY;

/// The earliest instant a rule-based zone resolves.
pub const MIN_MILLIS: i64 = -184_303_902_528_000_000;

/// The latest instant a rule-based zone resolves.
pub const MAX_MILLIS: i64 = 183_882_168_921_600_000;

/// Days between 0000-03-01 and 1970-01-01.
const EPOCH_SHIFT: i64 = 719_468;

/// Days in a 400-year cycle.
const DAYS_PER_ERA: i64 = 146_097;

/// A month of the Gregorian year.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Copy, Clone)]
pub enum Month {
    January = 1,
    February = 2,
    March = 3,
    April = 4,
    May = 5,
    June = 6,
    July = 7,
    August = 8,
    September = 9,
    October = 10,
    November = 11,
    December = 12,
}

impl Month {
    const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    /// Returns the month with the given 1-based number, if there is one.
    pub fn from_number(number: u8) -> Option<Month> {
        Month::ALL.get(usize::from(number).checked_sub(1)?).copied()
    }

    /// The 1-based number of this month: January is 1.
    pub fn number(self) -> u8 {
        self as u8
    }

    /// The number of days in this month, in a leap or a common year.
    pub fn length(self, is_leap: bool) -> u8 {
        match self {
            Month::January => 31,
            Month::February if is_leap => 29,
            Month::February => 28,
            Month::March => 31,
            Month::April => 30,
            Month::May => 31,
            Month::June => 30,
            Month::July => 31,
            Month::August => 31,
            Month::September => 30,
            Month::October => 31,
            Month::November => 30,
            Month::December => 31,
        }
    }

    pub(crate) fn abbreviation(self) -> &'static str {
        match self {
            Month::January => "Jan",
            Month::February => "Feb",
            Month::March => "Mar",
            Month::April => "Apr",
            Month::May => "May",
            Month::June => "Jun",
            Month::July => "Jul",
            Month::August => "Aug",
            Month::September => "Sep",
            Month::October => "Oct",
            Month::November => "Nov",
            Month::December => "Dec",
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

/// A day of the week, starting from Sunday.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Copy, Clone)]
pub enum Weekday {
    Sunday = 0,
    Monday = 1,
    Tuesday = 2,
    Wednesday = 3,
    Thursday = 4,
    Friday = 5,
    Saturday = 6,
}

impl Weekday {
    const ALL: [Weekday; 7] = [
        Weekday::Sunday,
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
    ];

    /// The weekday `index` days after a Sunday. Negative values count
    /// backwards.
    pub fn from_index(index: i64) -> Weekday {
        Weekday::ALL[index.rem_euclid(7) as usize]
    }

    /// Days since the preceding Sunday: Sunday is 0, Saturday is 6.
    pub fn index(self) -> i64 {
        self as i64
    }

    pub(crate) fn abbreviation(self) -> &'static str {
        match self {
            Weekday::Sunday => "Sun",
            Weekday::Monday => "Mon",
            Weekday::Tuesday => "Tue",
            Weekday::Wednesday => "Wed",
            Weekday::Thursday => "Thu",
            Weekday::Friday => "Fri",
            Weekday::Saturday => "Sat",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

/// Whether `year` has a 29th of February.
pub fn is_leap(year: i64) -> bool {
    // Divisible by 4, except centuries, unless divisible by 400. Having ruled
    // out non-multiples of 4, "divisible by 100" reduces to "divisible by 25"
    // and "divisible by 400" to "divisible by 16".
    year & 3 == 0 && (year % 25 != 0 || year & 15 == 0)
}

/// The number of days in the given month of the given year.
pub fn month_length(year: i64, month: Month) -> u8 {
    month.length(is_leap(year))
}

/// Converts a calendar date to a day number, with 1970-01-01 as day 0.
///
/// `day_of_month` is added linearly, so zero or out-of-range values roll
/// over into the neighbouring months.
pub fn fields_to_day(year: i64, month: Month, day_of_month: i64) -> i64 {
    let m = i64::from(month.number());
    let y = if m <= 2 { year - 1 } else { year };
    let era = y.div_euclid(400);
    let year_of_era = y - era * 400;
    // Months counted from March, so that the leap day ends the year.
    let shifted_month = (m + 9) % 12;
    let day_of_year = (153 * shifted_month + 2) / 5 + day_of_month - 1;
    let day_of_era = year_of_era * 365 + year_of_era / 4 - year_of_era / 100 + day_of_year;
    era * DAYS_PER_ERA + day_of_era - EPOCH_SHIFT
}

/// Converts a day number back to its `(year, month, day_of_month)`.
pub fn day_to_fields(day: i64) -> (i64, Month, u8) {
    let z = day + EPOCH_SHIFT;
    let era = z.div_euclid(DAYS_PER_ERA);
    let day_of_era = z - era * DAYS_PER_ERA;
    let year_of_era =
        (day_of_era - day_of_era / 1460 + day_of_era / 36524 - day_of_era / 146_096) / 365;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    let shifted_month = (5 * day_of_year + 2) / 153;
    let day_of_month = day_of_year - (153 * shifted_month + 2) / 5 + 1;
    let m = if shifted_month < 10 { shifted_month + 3 } else { shifted_month - 9 };
    let year = year_of_era + era * 400 + i64::from(m <= 2);
    (year, Month::ALL[(m - 1) as usize], day_of_month as u8)
}

/// The weekday of a day number.
pub fn day_of_week(day: i64) -> Weekday {
    // 1970-01-01 was a Thursday.
    Weekday::from_index(day + 4)
}

/// Which occurrence of its weekday a date is within its month.
///
/// Returns 1 to 3 for the first three occurrences, 4 for a fourth occurrence
/// that is not also the last, and -1 for the last occurrence when it is the
/// fourth or fifth.
pub fn day_of_week_in_month(year: i64, month: Month, day_of_month: u8) -> i8 {
    let ordinal = (day_of_month as i8 + 6) / 7;
    match ordinal {
        4 if day_of_month + 7 > month_length(year, month) => -1,
        5 => -1,
        n => n,
    }
}

/// The broken-down UTC fields of an instant.
#[derive(PartialEq, Eq, Debug, Copy, Clone)]
pub struct DateFields {
    pub year: i64,
    pub month: Month,
    pub day: u8,
    pub weekday: Weekday,
    pub millis_in_day: i32,
}

impl DateFields {
    /// Which occurrence of its weekday this date is within its month.
    pub fn day_of_week_in_month(&self) -> i8 {
        day_of_week_in_month(self.year, self.month, self.day)
    }
}

/// Breaks an instant down into calendar fields.
pub fn time_to_fields(millis: i64) -> DateFields {
    let day = millis.div_euclid(MILLIS_PER_DAY);
    let millis_in_day = millis.rem_euclid(MILLIS_PER_DAY) as i32;
    let (year, month, day_of_month) = day_to_fields(day);
    DateFields {
        year,
        month,
        day: day_of_month,
        weekday: day_of_week(day),
        millis_in_day,
    }
}

/// The UTC year an instant falls in.
pub fn year_of(millis: i64) -> i64 {
    day_to_fields(millis.div_euclid(MILLIS_PER_DAY)).0
}

/// Narrows a year to the range rule years are stored in.
pub(crate) fn clamp_year(year: i64) -> i32 {
    year.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// The instant at which the given day starts, plus `millis_in_day`.
pub(crate) fn day_to_millis(day: i64, millis_in_day: i64) -> i64 {
    day.saturating_mul(MILLIS_PER_DAY)
        .saturating_add(millis_in_day)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weekday_of(year: i64, month: Month, day: i64) -> Weekday {
        day_of_week(fields_to_day(year, month, day))
    }

    #[test]
    fn weekdays() {
        assert_eq!(weekday_of(1970, Month::January, 1), Weekday::Thursday);
        assert_eq!(weekday_of(2017, Month::February, 11), Weekday::Saturday);
        assert_eq!(weekday_of(1890, Month::March, 2), Weekday::Sunday);
        assert_eq!(weekday_of(2100, Month::April, 20), Weekday::Tuesday);
        assert_eq!(weekday_of(2009, Month::May, 31), Weekday::Sunday);
        assert_eq!(weekday_of(2001, Month::June, 9), Weekday::Saturday);
        assert_eq!(weekday_of(1995, Month::July, 21), Weekday::Friday);
        assert_eq!(weekday_of(1982, Month::August, 8), Weekday::Sunday);
        assert_eq!(weekday_of(1962, Month::September, 6), Weekday::Thursday);
        assert_eq!(weekday_of(1899, Month::October, 14), Weekday::Saturday);
        assert_eq!(weekday_of(2016, Month::November, 18), Weekday::Friday);
        assert_eq!(weekday_of(2010, Month::December, 19), Weekday::Sunday);
        assert_eq!(weekday_of(2016, Month::February, 29), Weekday::Monday);
    }

    #[test]
    fn leap_years() {
        assert!(!is_leap(1900));
        assert!(is_leap(1904));
        assert!(is_leap(1964));
        assert!(is_leap(1996));
        assert!(!is_leap(1997));
        assert!(!is_leap(1999));
        assert!(is_leap(2000));
        assert!(is_leap(2016));
        assert!(!is_leap(2100));
        assert!(is_leap(-4));
        assert!(is_leap(-400));
        assert!(!is_leap(-100));
    }

    #[test]
    fn epoch_is_day_zero() {
        assert_eq!(fields_to_day(1970, Month::January, 1), 0);
        assert_eq!(fields_to_day(1969, Month::December, 31), -1);
        assert_eq!(fields_to_day(2000, Month::March, 1), 11017);
        assert_eq!(day_to_fields(0), (1970, Month::January, 1));
        assert_eq!(day_to_fields(-1), (1969, Month::December, 31));
        assert_eq!(day_to_fields(11016), (2000, Month::February, 29));
    }

    #[test]
    fn day_of_month_rolls_over() {
        assert_eq!(
            fields_to_day(2021, Month::January, 32),
            fields_to_day(2021, Month::February, 1)
        );
        assert_eq!(
            fields_to_day(2021, Month::March, 0),
            fields_to_day(2021, Month::February, 28)
        );
    }

    #[test]
    fn fields_round_trip_across_eras() {
        for &day in &[-800_000, -719_469, -1, 0, 1, 59, 365, 10_957, 2_932_896] {
            let (year, month, dom) = day_to_fields(day);
            assert_eq!(fields_to_day(year, month, i64::from(dom)), day);
        }
    }

    #[test]
    fn negative_instants_floor() {
        let fields = time_to_fields(-1);
        assert_eq!(fields.year, 1969);
        assert_eq!(fields.month, Month::December);
        assert_eq!(fields.day, 31);
        assert_eq!(fields.weekday, Weekday::Wednesday);
        assert_eq!(fields.millis_in_day, 86_399_999);
    }

    #[test]
    fn supported_range_limits() {
        assert_eq!(year_of(MIN_MILLIS), -5_838_389);
        assert_eq!(year_of(MAX_MILLIS), 5_828_963);
        assert_eq!(time_to_fields(MAX_MILLIS).millis_in_day, 0);
    }

    #[test]
    fn weekday_ordinals() {
        // March 2007: Sundays fall on the 4th, 11th, 18th and 25th.
        assert_eq!(day_of_week_in_month(2007, Month::March, 4), 1);
        assert_eq!(day_of_week_in_month(2007, Month::March, 11), 2);
        assert_eq!(day_of_week_in_month(2007, Month::March, 18), 3);
        assert_eq!(day_of_week_in_month(2007, Month::March, 25), -1);
        // February 2021 has exactly four of every weekday.
        assert_eq!(day_of_week_in_month(2021, Month::February, 22), -1);
        // The 24th of a 31-day month is a fourth but not the last occurrence.
        assert_eq!(day_of_week_in_month(2021, Month::January, 24), 4);
        assert_eq!(day_of_week_in_month(2021, Month::January, 31), -1);
    }

    #[test]
    fn month_numbers() {
        assert_eq!(Month::from_number(3), Some(Month::March));
        assert_eq!(Month::from_number(0), None);
        assert_eq!(Month::from_number(13), None);
        assert_eq!(Weekday::from_index(-1), Weekday::Saturday);
    }
}

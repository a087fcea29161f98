//! Parsing zic(8) `Rule` lines into annual rules.
//!
//! A rule line has this form, along with an example:
//!
//! ```text
//!     Rule  NAME  FROM  TO    TYPE  IN   ON       AT    SAVE  LETTER/S
//!     Rule  US    2007  max   -     Mar  Sun>=8   2:00  1:00  D
//! ```
//!
//! Each line turns into one [`AnnualTimeZoneRule`]; a set of lines for one
//! rule name, plus an initial rule, makes a zone.
//!
//! ```
//! use tz_rules::line::{Format, RuleParser};
//! use tz_rules::{BasicTimeZone, InitialTimeZoneRule};
//!
//! let parser = RuleParser::default();
//! let zone = parser
//!     .build_zone(
//!         "US/Eastern",
//!         "Rule US 2007 max - Mar Sun>=8 2:00 1:00 D\n\
//!          Rule US 2007 max - Nov Sun>=1 2:00 0    S\n",
//!         &Format::new("E%sT"),
//!         InitialTimeZoneRule::new("EST", -5 * 3_600_000, 0),
//!     )
//!     .unwrap();
//! let transition = zone.next_transition(0, false).unwrap();
//! assert_eq!(transition.time(), 1_173_596_400_000);
//! assert_eq!(transition.to().name(), "EDT");
//! ```

use std::fmt;
use std::str::FromStr;

use regex::Regex;

use crate::annual::AnnualTimeZoneRule;
use crate::date_rule::{DateRule, DateTimeRule, TimeType};
use crate::grego::{Month, Weekday};
use crate::rule::InitialTimeZoneRule;
use crate::rule_based::{RuleBasedTimeZone, RuleBasedTimeZoneBuilder};

#[derive(Debug)]
pub struct RuleParser {
    rule_line: Regex,
    day_field: Regex,
    hm_field: Regex,
    hms_field: Regex,
    empty_line: Regex,
}

#[derive(PartialEq, Debug, Clone)]
pub enum Error {
    FailedYearParse(String),
    FailedMonthParse(String),
    FailedWeekdayParse(String),
    TypeColumnContainedNonHyphen(String),
    InvalidDaySpec(String),
    InvalidTimeSpecAndType(String),
    NonWallClockInTimeSpec(String),
    UnboundedFromYear(String),
    NotParsedAsRuleLine(String),
    Zone(crate::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::FailedYearParse(s) => write!(f, "failed to parse as a year value: \"{}\"", s),
            Error::FailedMonthParse(s) => write!(f, "failed to parse as a month value: \"{}\"", s),
            Error::FailedWeekdayParse(s) => {
                write!(f, "failed to parse as a weekday value: \"{}\"", s)
            }
            Error::TypeColumnContainedNonHyphen(s) => {
                write!(
                    f,
                    "'type' column is not a hyphen but has the value: \"{}\"",
                    s
                )
            }
            Error::InvalidDaySpec(s) => write!(f, "invalid day specification ('ON'): \"{}\"", s),
            Error::InvalidTimeSpecAndType(s) => write!(f, "invalid time: \"{}\"", s),
            Error::NonWallClockInTimeSpec(s) => {
                write!(f, "time value not given as wall time: \"{}\"", s)
            }
            Error::UnboundedFromYear(s) => {
                write!(f, "'from' column must be a year number, not \"{}\"", s)
            }
            Error::NotParsedAsRuleLine(s) => write!(f, "failed to parse line as a rule: \"{}\"", s),
            Error::Zone(e) => write!(f, "invalid zone: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Zone(e) => Some(e),
            _ => None,
        }
    }
}

impl From<crate::Error> for Error {
    fn from(e: crate::Error) -> Self {
        Error::Zone(e)
    }
}

impl Default for RuleParser {
    fn default() -> Self {
        RuleParser {
            rule_line: Regex::new(
                r##"(?x) ^
                \s* Rule \s+
                ( ?P<name>    \S+)  \s+
                ( ?P<from>    \S+)  \s+
                ( ?P<to>      \S+)  \s+
                ( ?P<type>    \S+)  \s+
                ( ?P<in>      \S+)  \s+
                ( ?P<on>      \S+)  \s+
                ( ?P<at>      \S+)  \s+
                ( ?P<save>    \S+)  \s+
                ( ?P<letters> \S+)  \s*
                (\#.*)?
            $ "##,
            )
            .unwrap(),

            day_field: Regex::new(
                r##"(?x) ^
                ( ?P<weekday> \w+ )
                ( ?P<sign>    [<>] = )
                ( ?P<day>     \d+ )
            $ "##,
            )
            .unwrap(),

            hm_field: Regex::new(
                r##"(?x) ^
                ( ?P<sign> -? )
                ( ?P<hour> \d{1,2} ) : ( ?P<minute> \d{2} )
                ( ?P<flag> [wsugz] )?
            $ "##,
            )
            .unwrap(),

            hms_field: Regex::new(
                r##"(?x) ^
                ( ?P<sign> -? )
                ( ?P<hour> \d{1,2} ) : ( ?P<minute> \d{2} ) : ( ?P<second> \d{2} )
                ( ?P<flag> [wsugz] )?
            $ "##,
            )
            .unwrap(),

            empty_line: Regex::new(
                r##"(?x) ^
                \s*
                (\#.*)?
            $"##,
            )
            .unwrap(),
        }
    }
}

/// A **year** definition field.
///
/// - `min` or `minimum`, the minimum year possible;
/// - `max` or `maximum`, the maximum year possible, meaning the rule never
///   stops recurring;
/// - a year number.
#[derive(PartialEq, Debug, Copy, Clone)]
pub enum Year {
    Minimum,
    Maximum,
    Number(i32),
}

impl FromStr for Year {
    type Err = Error;

    fn from_str(input: &str) -> Result<Year, Self::Err> {
        Ok(match &*input.to_ascii_lowercase() {
            "min" | "minimum" => Year::Minimum,
            "max" | "maximum" => Year::Maximum,
            year => match year.parse() {
                Ok(year) => Year::Number(year),
                Err(_) => return Err(Error::FailedYearParse(input.to_string())),
            },
        })
    }
}

impl FromStr for Month {
    type Err = Error;

    fn from_str(input: &str) -> Result<Month, Self::Err> {
        Ok(match &*input.to_ascii_lowercase() {
            "jan" | "january" => Month::January,
            "feb" | "february" => Month::February,
            "mar" | "march" => Month::March,
            "apr" | "april" => Month::April,
            "may" => Month::May,
            "jun" | "june" => Month::June,
            "jul" | "july" => Month::July,
            "aug" | "august" => Month::August,
            "sep" | "september" => Month::September,
            "oct" | "october" => Month::October,
            "nov" | "november" => Month::November,
            "dec" | "december" => Month::December,
            other => return Err(Error::FailedMonthParse(other.to_string())),
        })
    }
}

impl FromStr for Weekday {
    type Err = Error;

    fn from_str(input: &str) -> Result<Weekday, Self::Err> {
        Ok(match &*input.to_ascii_lowercase() {
            "mon" | "monday" => Weekday::Monday,
            "tue" | "tuesday" => Weekday::Tuesday,
            "wed" | "wednesday" => Weekday::Wednesday,
            "thu" | "thursday" => Weekday::Thursday,
            "fri" | "friday" => Weekday::Friday,
            "sat" | "saturday" => Weekday::Saturday,
            "sun" | "sunday" => Weekday::Sunday,
            other => return Err(Error::FailedWeekdayParse(other.to_string())),
        })
    }
}

/// The format string to generate a time zone abbreviation from.
#[derive(PartialEq, Debug, Clone)]
pub enum Format {
    /// A constant format, which remains the same throughout both standard
    /// and DST timespans.
    Constant(String),

    /// An alternate format, such as “PST/PDT”, which changes between
    /// standard and DST timespans.
    Alternate { standard: String, dst: String },

    /// A format with a placeholder `%s`, filled in from a rule's letters.
    Placeholder(String),
}

impl Format {
    /// Convert the template into one of the `Format` variants. Anything that
    /// is neither an alternate nor a placeholder format is a constant.
    pub fn new(template: &str) -> Format {
        if let Some((standard, dst)) = template.split_once('/') {
            Format::Alternate {
                standard: standard.to_owned(),
                dst: dst.to_owned(),
            }
        } else if template.contains("%s") {
            Format::Placeholder(template.to_owned())
        } else {
            Format::Constant(template.to_owned())
        }
    }

    pub fn format(&self, dst_savings: i32, letters: Option<&str>) -> String {
        match self {
            Format::Constant(s) => s.clone(),
            Format::Placeholder(s) => s.replace("%s", letters.unwrap_or("")),
            Format::Alternate { standard, .. } if dst_savings == 0 => standard.clone(),
            Format::Alternate { dst, .. } => dst.clone(),
        }
    }
}

/// A parsed **rule** line.
#[derive(PartialEq, Debug, Copy, Clone)]
pub struct RuleLine<'a> {
    /// The name of the set of rules that this rule is part of.
    pub name: &'a str,

    /// The first year in which the rule applies.
    pub from_year: i32,

    /// The last year in which the rule applies;
    /// [`AnnualTimeZoneRule::MAX_YEAR`] when it never stops.
    pub to_year: i32,

    /// The day and time at which the rule takes effect each year.
    pub rule: DateTimeRule,

    /// The daylight saving amount while the rule is in effect, in
    /// milliseconds.
    pub save: i32,

    /// The variable part of time zone abbreviations to be used when this rule
    /// is in effect, if any.
    pub letters: Option<&'a str>,
}

impl<'a> RuleLine<'a> {
    /// The annual rule this line describes, named by filling `format` in.
    pub fn to_annual_rule(&self, format: &Format, raw_offset: i32) -> AnnualTimeZoneRule {
        AnnualTimeZoneRule::new(
            format.format(self.save, self.letters),
            raw_offset,
            self.save,
            self.rule,
            self.from_year,
            self.to_year,
        )
    }
}

fn parse_time_type(c: &str) -> Option<TimeType> {
    Some(match c {
        "w" => TimeType::Wall,
        "s" => TimeType::Standard,
        "u" | "g" | "z" => TimeType::Utc,
        _ => return None,
    })
}

fn parse_number<T: FromStr>(input: &str, whole: &str) -> Result<T, Error> {
    input
        .parse()
        .map_err(|_| Error::InvalidTimeSpecAndType(whole.to_string()))
}

impl RuleParser {
    /// Parses a time of day into milliseconds and the clock it is read on.
    fn parse_time_and_type(&self, input: &str) -> Result<(i32, TimeType), Error> {
        let (sign, h, m, s, flag) = if input == "-" {
            return Ok((0, TimeType::Wall));
        } else if input.chars().all(|c| c == '-' || c.is_ascii_digit()) {
            let hours: i32 = parse_number(input, input)?;
            return Ok((hours * 3_600_000, TimeType::Wall));
        } else if let Some(caps) = self.hm_field.captures(input) {
            (
                caps.name("sign").map_or("", |m| m.as_str()),
                caps.name("hour").map_or("", |m| m.as_str()),
                caps.name("minute").map_or("", |m| m.as_str()),
                "0",
                caps.name("flag").map(|m| m.as_str()),
            )
        } else if let Some(caps) = self.hms_field.captures(input) {
            (
                caps.name("sign").map_or("", |m| m.as_str()),
                caps.name("hour").map_or("", |m| m.as_str()),
                caps.name("minute").map_or("", |m| m.as_str()),
                caps.name("second").map_or("", |m| m.as_str()),
                caps.name("flag").map(|m| m.as_str()),
            )
        } else {
            return Err(Error::InvalidTimeSpecAndType(input.to_string()));
        };

        let hours: i32 = parse_number(h, input)?;
        let minutes: i32 = parse_number(m, input)?;
        let seconds: i32 = parse_number(s, input)?;
        let millis = ((hours * 60 + minutes) * 60 + seconds) * 1000;
        let millis = if sign == "-" { -millis } else { millis };
        let time_type = flag.and_then(parse_time_type).unwrap_or(TimeType::Wall);
        Ok((millis, time_type))
    }

    fn parse_save(&self, input: &str) -> Result<i32, Error> {
        match self.parse_time_and_type(input)? {
            (millis, TimeType::Wall) => Ok(millis),
            _ => Err(Error::NonWallClockInTimeSpec(input.to_string())),
        }
    }

    fn parse_dayspec(&self, input: &str, month: Month) -> Result<DateRule, Error> {
        // Parse the field as a number if it vaguely resembles one.
        if input.chars().all(|c| c.is_ascii_digit()) {
            let day = input
                .parse()
                .map_err(|_| Error::InvalidDaySpec(input.to_string()))?;
            Ok(DateRule::DayOfMonth { month, day })
        }
        // Check if it starts with ‘last’, and trim off the first four bytes if
        // it does.
        else if let Some(remainder) = input.strip_prefix("last") {
            let weekday = remainder.parse::<Weekday>()?;
            Ok(DateRule::DayOfWeekInMonth {
                month,
                week: -1,
                weekday,
            })
        }
        // Check if it’s a relative expression with the regex.
        else if let Some(caps) = self.day_field.captures(input) {
            let invalid = || Error::InvalidDaySpec(input.to_string());
            let weekday = caps
                .name("weekday")
                .ok_or_else(invalid)?
                .as_str()
                .parse::<Weekday>()?;
            let day = caps
                .name("day")
                .ok_or_else(invalid)?
                .as_str()
                .parse()
                .map_err(|_| invalid())?;
            match caps.name("sign").map(|m| m.as_str()) {
                Some("<=") => Ok(DateRule::WeekdayOnOrBefore { month, day, weekday }),
                Some(">=") => Ok(DateRule::WeekdayOnOrAfter { month, day, weekday }),
                _ => Err(invalid()),
            }
        }
        // Otherwise, give up.
        else {
            Err(Error::InvalidDaySpec(input.to_string()))
        }
    }

    /// Parses a single `Rule` line.
    pub fn parse_rule<'a>(&self, input: &'a str) -> Result<RuleLine<'a>, Error> {
        let caps = self
            .rule_line
            .captures(input)
            .ok_or_else(|| Error::NotParsedAsRuleLine(input.to_string()))?;
        let field = |name| caps.name(name).map_or("", |m| m.as_str());

        let name = caps.name("name").map_or("", |m| m.as_str());
        let from_year = match field("from").parse::<Year>()? {
            Year::Number(year) => year,
            _ => return Err(Error::UnboundedFromYear(field("from").to_string())),
        };

        // The end year can be ‘only’ to indicate that this rule only
        // takes place on that year.
        let to_year = match field("to") {
            "only" => from_year,
            to => match to.parse::<Year>()? {
                Year::Number(year) => year,
                Year::Maximum => AnnualTimeZoneRule::MAX_YEAR,
                Year::Minimum => return Err(Error::FailedYearParse(to.to_string())),
            },
        };

        // The only value allowed in the ‘type’ column is “-”, or sometimes
        // “‐”, a Unicode hyphen.
        let t = field("type");
        if t != "-" && t != "\u{2010}" {
            return Err(Error::TypeColumnContainedNonHyphen(t.to_string()));
        }

        let month = field("in").parse::<Month>()?;
        let date = self.parse_dayspec(field("on"), month)?;
        let (millis_in_day, time_type) = self.parse_time_and_type(field("at"))?;
        let save = self.parse_save(field("save"))?;
        let letters = match caps.name("letters").map_or("-", |m| m.as_str()) {
            "-" => None,
            l => Some(l),
        };

        Ok(RuleLine {
            name,
            from_year,
            to_year,
            rule: DateTimeRule::new(date, millis_in_day, time_type),
            save,
            letters,
        })
    }

    /// Parses every `Rule` line in `text`, skipping blank lines and comments.
    pub fn parse_rules<'a>(&self, text: &'a str) -> Result<Vec<RuleLine<'a>>, Error> {
        text.lines()
            .filter(|line| !self.empty_line.is_match(line))
            .map(|line| self.parse_rule(line))
            .collect()
    }

    /// Builds a zone from `initial` plus one annual rule per `Rule` line in
    /// `text`, all on the initial rule's raw offset.
    pub fn build_zone(
        &self,
        id: &str,
        text: &str,
        format: &Format,
        initial: InitialTimeZoneRule,
    ) -> Result<RuleBasedTimeZone, Error> {
        let raw_offset = initial.raw_offset();
        let mut builder = RuleBasedTimeZoneBuilder::new(id, initial);
        for line in self.parse_rules(text)? {
            builder.add_transition_rule(line.to_annual_rule(format, raw_offset))?;
        }
        Ok(builder.build()?)
    }
}

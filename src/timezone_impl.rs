use core::fmt::{Debug, Display, Error, Formatter};

use chrono::{
    Duration, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc,
};

use crate::basic::{BasicTimeZone, LocalOption, Offsets};
use crate::rule::TimeZoneRule;
use crate::rule_based::RuleBasedTimeZone;

/// The offset of a [`RuleBasedTimeZone`] at some instant, along with the
/// rule it comes from.
#[derive(Copy, Clone)]
pub struct ZoneOffset<'a> {
    zone: &'a RuleBasedTimeZone,
    rule: &'a TimeZoneRule,
}

/// Detailed offset components that expose any daylight saving in effect.
///
/// ```
/// use chrono::{Duration, Offset, TimeZone};
/// use tz_rules::line::{Format, RuleParser};
/// use tz_rules::{InitialTimeZoneRule, OffsetComponents};
///
/// let zone = RuleParser::default()
///     .build_zone(
///         "US/Eastern",
///         "Rule US 2007 max - Mar Sun>=8 2:00 1:00 D\n\
///          Rule US 2007 max - Nov Sun>=1 2:00 0    S",
///         &Format::new("E%sT"),
///         InitialTimeZoneRule::new("EST", -5 * 3_600_000, 0),
///     )
///     .unwrap();
///
/// let summer = (&zone).with_ymd_and_hms(2016, 7, 1, 12, 0, 0).unwrap();
/// assert_eq!(summer.offset().base_utc_offset(), Duration::hours(-5));
/// assert_eq!(summer.offset().dst_offset(), Duration::hours(1));
/// assert_eq!(summer.offset().fix().local_minus_utc(), -4 * 3600);
/// ```
pub trait OffsetComponents {
    /// The standard offset from UTC
    fn base_utc_offset(&self) -> Duration;
    /// The daylight saving amount in effect, if any
    fn dst_offset(&self) -> Duration;
}

/// Names describing an offset.
pub trait OffsetName {
    /// The identifier of the zone the offset belongs to
    fn tz_id(&self) -> &str;
    /// The name of the rule in effect, such as `EDT`
    fn abbreviation(&self) -> &str;
}

impl<'a> ZoneOffset<'a> {
    fn new(zone: &'a RuleBasedTimeZone, rule: &'a TimeZoneRule) -> Self {
        ZoneOffset { zone, rule }
    }

    pub fn offsets(&self) -> Offsets {
        self.rule.offsets()
    }

    /// The offset applies at `local` if reading `local` on it lands on an
    /// instant where the zone has the same total offset.
    fn holds_at(&self, local: i64) -> bool {
        let total = self.offsets().total();
        self.zone.offset(local.saturating_sub(total)).total() == total
    }
}

impl OffsetComponents for ZoneOffset<'_> {
    fn base_utc_offset(&self) -> Duration {
        Duration::milliseconds(i64::from(self.rule.raw_offset()))
    }

    fn dst_offset(&self) -> Duration {
        Duration::milliseconds(i64::from(self.rule.dst_savings()))
    }
}

impl OffsetName for ZoneOffset<'_> {
    fn tz_id(&self) -> &str {
        self.zone.id()
    }

    fn abbreviation(&self) -> &str {
        self.rule.name()
    }
}

impl Offset for ZoneOffset<'_> {
    fn fix(&self) -> FixedOffset {
        let seconds = self.offsets().total() / 1000;
        i32::try_from(seconds)
            .ok()
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix())
    }
}

impl Display for ZoneOffset<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "{}", self.rule.name())
    }
}

impl Debug for ZoneOffset<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "{}", self.rule.name())
    }
}

impl<'a> TimeZone for &'a RuleBasedTimeZone {
    type Offset = ZoneOffset<'a>;

    fn from_offset(offset: &Self::Offset) -> Self {
        offset.zone
    }

    #[allow(deprecated)]
    fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<Self::Offset> {
        let earliest = self.offset_from_local_datetime(&local.and_time(NaiveTime::MIN));
        let latest = local
            .and_hms_opt(23, 59, 59)
            .map_or(LocalResult::None, |end| self.offset_from_local_datetime(&end));
        // A date only needs an offset that occurs somewhere on that day, so
        // settle on a single one whenever possible.
        use chrono::LocalResult::*;
        match (earliest, latest) {
            (result @ Single(_), _) => result,
            (_, result @ Single(_)) => result,
            (Ambiguous(offset, _), _) => Single(offset),
            (_, Ambiguous(offset, _)) => Single(offset),
            (None, None) => None,
        }
    }

    // Read the local time once against the rule before any nearby
    // transition and once against the rule after it, then keep the readings
    // that map back to the same local time.
    fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<Self::Offset> {
        let zone: &'a RuleBasedTimeZone = *self;
        let millis = local.and_utc().timestamp_millis();
        let former = ZoneOffset::new(
            zone,
            zone.rule_at(millis, Some((LocalOption::FORMER, LocalOption::FORMER))),
        );
        let latter = ZoneOffset::new(
            zone,
            zone.rule_at(millis, Some((LocalOption::LATTER, LocalOption::LATTER))),
        );
        match (former.holds_at(millis), latter.holds_at(millis)) {
            (true, true) if former.offsets().total() == latter.offsets().total() => {
                LocalResult::Single(latter)
            }
            (true, true) => LocalResult::Ambiguous(former, latter),
            (true, false) => LocalResult::Single(former),
            (false, true) => LocalResult::Single(latter),
            (false, false) => LocalResult::None,
        }
    }

    #[allow(deprecated)]
    fn offset_from_utc_date(&self, utc: &NaiveDate) -> Self::Offset {
        // Any time in the day will do, see above.
        self.offset_from_utc_datetime(&utc.and_time(NaiveTime::MIN))
    }

    fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> Self::Offset {
        let zone: &'a RuleBasedTimeZone = *self;
        let millis = utc.and_utc().timestamp_millis();
        ZoneOffset::new(zone, zone.rule_at(millis, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annual::AnnualTimeZoneRule;
    use crate::date_rule::{DateRule, DateTimeRule, TimeType};
    use crate::grego::{Month, Weekday};
    use crate::rule::InitialTimeZoneRule;
    use crate::rule_based::RuleBasedTimeZoneBuilder;

    const HOUR: i32 = 3_600_000;

    fn eastern() -> RuleBasedTimeZone {
        let rule = |name: &str, save: i32, month: Month, day: u8| {
            AnnualTimeZoneRule::new(
                name,
                -5 * HOUR,
                save,
                DateTimeRule::new(
                    DateRule::WeekdayOnOrAfter { month, day, weekday: Weekday::Sunday },
                    2 * HOUR,
                    TimeType::Wall,
                ),
                2007,
                AnnualTimeZoneRule::MAX_YEAR,
            )
        };
        let mut builder =
            RuleBasedTimeZoneBuilder::new("US/Eastern", InitialTimeZoneRule::new("EST", -5 * HOUR, 0));
        builder.add_transition_rule(rule("EDT", HOUR, Month::March, 8)).unwrap();
        builder.add_transition_rule(rule("EST", 0, Month::November, 1)).unwrap();
        builder.build().unwrap()
    }

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, min, 0).unwrap()
    }

    #[test]
    fn single_offsets() {
        let zone = eastern();
        let summer = (&zone).offset_from_local_datetime(&local(2016, 7, 1, 12, 0)).unwrap();
        assert_eq!(summer.abbreviation(), "EDT");
        assert_eq!(summer.tz_id(), "US/Eastern");
        assert_eq!(summer.fix().local_minus_utc(), -4 * 3600);
    }

    #[test]
    fn skipped_local_time_has_no_offset() {
        let zone = eastern();
        let gap = (&zone).offset_from_local_datetime(&local(2016, 3, 13, 2, 30));
        assert!(matches!(gap, LocalResult::None));
        let after = (&zone).offset_from_local_datetime(&local(2016, 3, 13, 3, 0)).unwrap();
        assert_eq!(after.abbreviation(), "EDT");
        let before = (&zone).offset_from_local_datetime(&local(2016, 3, 13, 1, 59)).unwrap();
        assert_eq!(before.abbreviation(), "EST");
    }

    #[test]
    fn repeated_local_time_is_ambiguous() {
        let zone = eastern();
        match (&zone).offset_from_local_datetime(&local(2016, 11, 6, 1, 30)) {
            LocalResult::Ambiguous(earlier, later) => {
                assert_eq!(earlier.abbreviation(), "EDT");
                assert_eq!(later.abbreviation(), "EST");
            }
            other => panic!("expected an ambiguous result, got {:?}", other),
        }
    }

    #[test]
    fn dates_always_resolve() {
        let zone = eastern();
        let date = NaiveDate::from_ymd_opt(2016, 3, 13).unwrap();
        #[allow(deprecated)]
        let offset = (&zone).offset_from_local_date(&date).unwrap();
        assert_eq!(offset.abbreviation(), "EST");
    }
}

use std::fmt;

use crate::basic::Offsets;
use crate::date_rule::DateTimeRule;
use crate::grego;
use crate::rule::write_regime;

/// A rule that takes effect once a year, on the day and at the time given
/// by a [`DateTimeRule`], for every year in `start_year..=end_year`.
#[derive(PartialEq, Eq, Hash, Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnnualTimeZoneRule {
    name: String,
    raw_offset: i32,
    dst_savings: i32,
    rule: DateTimeRule,
    start_year: i32,
    end_year: i32,
}

impl AnnualTimeZoneRule {
    /// An `end_year` that means the rule recurs forever.
    pub const MAX_YEAR: i32 = i32::MAX;

    pub fn new(
        name: impl Into<String>,
        raw_offset: i32,
        dst_savings: i32,
        rule: DateTimeRule,
        start_year: i32,
        end_year: i32,
    ) -> Self {
        AnnualTimeZoneRule {
            name: name.into(),
            raw_offset,
            dst_savings,
            rule,
            start_year,
            end_year,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn raw_offset(&self) -> i32 {
        self.raw_offset
    }

    pub fn dst_savings(&self) -> i32 {
        self.dst_savings
    }

    pub fn offsets(&self) -> Offsets {
        Offsets::new(self.raw_offset, self.dst_savings)
    }

    pub fn rule(&self) -> &DateTimeRule {
        &self.rule
    }

    pub fn start_year(&self) -> i32 {
        self.start_year
    }

    pub fn end_year(&self) -> i32 {
        self.end_year
    }

    /// Whether this rule recurs forever.
    pub fn is_final(&self) -> bool {
        self.end_year == Self::MAX_YEAR
    }

    /// A copy of this rule that starts recurring in `start_year` instead.
    pub fn with_start_year(&self, start_year: i32) -> AnnualTimeZoneRule {
        AnnualTimeZoneRule {
            start_year,
            ..self.clone()
        }
    }

    /// The instant this rule takes effect in `year`, reading the rule's time
    /// of day against the offsets in effect just before it. `None` if the
    /// rule does not apply that year.
    pub fn start_in_year(&self, year: i64, prev_raw: i32, prev_dst: i32) -> Option<i64> {
        if year < i64::from(self.start_year) || year > i64::from(self.end_year) {
            return None;
        }
        let local = self.rule.local_millis(year);
        Some(self.rule.time_type.to_utc(local, prev_raw, prev_dst))
    }

    pub fn first_start(&self, prev_raw: i32, prev_dst: i32) -> Option<i64> {
        self.start_in_year(i64::from(self.start_year), prev_raw, prev_dst)
    }

    /// The start in the last year, or `None` for a rule that never ends.
    pub fn final_start(&self, prev_raw: i32, prev_dst: i32) -> Option<i64> {
        if self.is_final() {
            return None;
        }
        self.start_in_year(i64::from(self.end_year), prev_raw, prev_dst)
    }

    pub fn next_start(&self, base: i64, prev_raw: i32, prev_dst: i32, inclusive: bool) -> Option<i64> {
        let year = grego::year_of(base);
        if year < i64::from(self.start_year) {
            return self.first_start(prev_raw, prev_dst);
        }
        match self.start_in_year(year, prev_raw, prev_dst) {
            Some(start) if start < base || (!inclusive && start == base) => {
                self.start_in_year(year + 1, prev_raw, prev_dst)
            }
            start => start,
        }
    }

    pub fn previous_start(
        &self,
        base: i64,
        prev_raw: i32,
        prev_dst: i32,
        inclusive: bool,
    ) -> Option<i64> {
        let year = grego::year_of(base);
        if year > i64::from(self.end_year) {
            return self.final_start(prev_raw, prev_dst);
        }
        match self.start_in_year(year, prev_raw, prev_dst) {
            Some(start) if start > base || (!inclusive && start == base) => {
                self.start_in_year(year - 1, prev_raw, prev_dst)
            }
            start => start,
        }
    }

    /// Same offsets, same yearly date and time, same years. The name does
    /// not matter.
    pub fn is_equivalent_to(&self, other: &AnnualTimeZoneRule) -> bool {
        self.offsets() == other.offsets()
            && self.start_year == other.start_year
            && self.end_year == other.end_year
            && self.rule == other.rule
    }
}

impl fmt::Display for AnnualTimeZoneRule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_regime(f, &self.name, self.raw_offset, self.dst_savings)?;
        write!(f, " {} from {}", self.rule, self.start_year)?;
        if self.is_final() {
            f.write_str(" to max")
        } else {
            write!(f, " to {}", self.end_year)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date_rule::{DateRule, TimeType};
    use crate::grego::{Month, Weekday};

    const HOUR: i32 = 3_600_000;

    // 2007-03-11T07:00:00Z and 2008-03-09T07:00:00Z
    const SPRING_2007: i64 = 1_173_596_400_000;
    const SPRING_2008: i64 = 1_205_046_000_000;

    fn us_dst_start() -> AnnualTimeZoneRule {
        AnnualTimeZoneRule::new(
            "EDT",
            -5 * HOUR,
            HOUR,
            DateTimeRule::new(
                DateRule::DayOfWeekInMonth {
                    month: Month::March,
                    week: 2,
                    weekday: Weekday::Sunday,
                },
                2 * HOUR,
                TimeType::Wall,
            ),
            2007,
            AnnualTimeZoneRule::MAX_YEAR,
        )
    }

    #[test]
    fn second_sunday_in_march() {
        let rule = us_dst_start();
        assert_eq!(rule.start_in_year(2007, -5 * HOUR, 0), Some(SPRING_2007));
        assert_eq!(rule.start_in_year(2006, -5 * HOUR, 0), None);
        assert_eq!(rule.first_start(-5 * HOUR, 0), Some(SPRING_2007));
        assert_eq!(rule.final_start(-5 * HOUR, 0), None);
        assert!(rule.is_final());
    }

    #[test]
    fn next_start_walks_years() {
        let rule = us_dst_start();
        assert_eq!(rule.next_start(0, -5 * HOUR, 0, false), Some(SPRING_2007));
        assert_eq!(rule.next_start(SPRING_2007, -5 * HOUR, 0, true), Some(SPRING_2007));
        assert_eq!(rule.next_start(SPRING_2007, -5 * HOUR, 0, false), Some(SPRING_2008));
        assert_eq!(rule.next_start(SPRING_2007 - 1, -5 * HOUR, 0, false), Some(SPRING_2007));
    }

    #[test]
    fn previous_start_walks_years() {
        let rule = us_dst_start();
        assert_eq!(rule.previous_start(SPRING_2008, -5 * HOUR, 0, true), Some(SPRING_2008));
        assert_eq!(rule.previous_start(SPRING_2008, -5 * HOUR, 0, false), Some(SPRING_2007));
        assert_eq!(rule.previous_start(SPRING_2007, -5 * HOUR, 0, false), None);
        assert_eq!(rule.previous_start(0, -5 * HOUR, 0, true), None);
    }

    #[test]
    fn bounded_years() {
        let rule = us_dst_start().with_start_year(2007);
        let bounded = AnnualTimeZoneRule::new(
            "EDT",
            rule.raw_offset(),
            rule.dst_savings(),
            *rule.rule(),
            2007,
            2008,
        );
        assert_eq!(bounded.final_start(-5 * HOUR, 0), Some(SPRING_2008));
        assert_eq!(bounded.next_start(SPRING_2008, -5 * HOUR, 0, false), None);
        // Past the last year, the previous start is the final one.
        assert_eq!(bounded.previous_start(SPRING_2008 * 2, -5 * HOUR, 0, false), Some(SPRING_2008));
        assert!(!bounded.is_equivalent_to(&rule));
    }

    #[test]
    fn equivalence() {
        let a = us_dst_start();
        let b = AnnualTimeZoneRule::new(
            "Daylight",
            a.raw_offset(),
            a.dst_savings(),
            *a.rule(),
            a.start_year(),
            a.end_year(),
        );
        assert!(a.is_equivalent_to(&b));
        assert!(!a.is_equivalent_to(&a.with_start_year(2008)));
    }

    #[test]
    fn display() {
        assert_eq!(
            us_dst_start().to_string(),
            "EDT (raw -5:00, dst 1:00) Mar Sun#2 2:00 from 2007 to max"
        );
    }
}

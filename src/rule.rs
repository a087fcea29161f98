//! The rule values a zone is assembled from.
//!
//! Each rule names an offset regime (a raw offset from UTC plus a daylight
//! saving amount) and, except for the initial rule, the instants at which that
//! regime begins. Start instants are always resolved against the offsets in
//! effect *before* the rule takes over, since a rule's time of day is read on
//! the outgoing clock.

use std::fmt;

use crate::annual::AnnualTimeZoneRule;
use crate::basic::Offsets;
use crate::date_rule::write_clock_time;
use crate::time_array::TimeArrayTimeZoneRule;

/// The rule in effect before any transition: a name and an offset regime,
/// with no start times of its own.
#[derive(PartialEq, Eq, Hash, Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InitialTimeZoneRule {
    name: String,
    raw_offset: i32,
    dst_savings: i32,
}

impl InitialTimeZoneRule {
    pub fn new(name: impl Into<String>, raw_offset: i32, dst_savings: i32) -> Self {
        InitialTimeZoneRule {
            name: name.into(),
            raw_offset,
            dst_savings,
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

    /// Initial rules are equivalent when their offsets match; names are
    /// ignored.
    pub fn is_equivalent_to(&self, other: &InitialTimeZoneRule) -> bool {
        self.offsets() == other.offsets()
    }
}

/// Any of the three kinds of rule.
///
/// Rules are immutable once built. Zones share them behind `Arc`, and
/// transitions refer back to the exact rule values they connect.
#[derive(PartialEq, Eq, Hash, Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum TimeZoneRule {
    Initial(InitialTimeZoneRule),
    Annual(AnnualTimeZoneRule),
    TimeArray(TimeArrayTimeZoneRule),
}

impl TimeZoneRule {
    pub fn name(&self) -> &str {
        match self {
            TimeZoneRule::Initial(rule) => rule.name(),
            TimeZoneRule::Annual(rule) => rule.name(),
            TimeZoneRule::TimeArray(rule) => rule.name(),
        }
    }

    /// The standard offset from UTC, in milliseconds.
    pub fn raw_offset(&self) -> i32 {
        match self {
            TimeZoneRule::Initial(rule) => rule.raw_offset(),
            TimeZoneRule::Annual(rule) => rule.raw_offset(),
            TimeZoneRule::TimeArray(rule) => rule.raw_offset(),
        }
    }

    /// The daylight saving amount added on top of the raw offset, in
    /// milliseconds. Zero means standard time.
    pub fn dst_savings(&self) -> i32 {
        match self {
            TimeZoneRule::Initial(rule) => rule.dst_savings(),
            TimeZoneRule::Annual(rule) => rule.dst_savings(),
            TimeZoneRule::TimeArray(rule) => rule.dst_savings(),
        }
    }

    pub fn offsets(&self) -> Offsets {
        Offsets::new(self.raw_offset(), self.dst_savings())
    }

    /// Whether this rule has start times, and so can be added to a zone as a
    /// transition rule.
    pub fn is_transition_rule(&self) -> bool {
        !matches!(self, TimeZoneRule::Initial(_))
    }

    /// Whether two rules describe the same offsets starting at the same
    /// instants. Names are ignored, and rules of different kinds are never
    /// equivalent.
    pub fn is_equivalent_to(&self, other: &TimeZoneRule) -> bool {
        match (self, other) {
            (TimeZoneRule::Initial(a), TimeZoneRule::Initial(b)) => a.is_equivalent_to(b),
            (TimeZoneRule::Annual(a), TimeZoneRule::Annual(b)) => a.is_equivalent_to(b),
            (TimeZoneRule::TimeArray(a), TimeZoneRule::TimeArray(b)) => a.is_equivalent_to(b),
            _ => false,
        }
    }

    /// The first instant this rule takes effect, given the offsets in effect
    /// just before it.
    pub fn first_start(&self, prev_raw: i32, prev_dst: i32) -> Option<i64> {
        match self {
            TimeZoneRule::Initial(_) => None,
            TimeZoneRule::Annual(rule) => rule.first_start(prev_raw, prev_dst),
            TimeZoneRule::TimeArray(rule) => Some(rule.first_start(prev_raw, prev_dst)),
        }
    }

    /// The last instant this rule takes effect, or `None` if it never stops
    /// recurring.
    pub fn final_start(&self, prev_raw: i32, prev_dst: i32) -> Option<i64> {
        match self {
            TimeZoneRule::Initial(_) => None,
            TimeZoneRule::Annual(rule) => rule.final_start(prev_raw, prev_dst),
            TimeZoneRule::TimeArray(rule) => Some(rule.final_start(prev_raw, prev_dst)),
        }
    }

    /// The first start after `base`, or at `base` when `inclusive` is set.
    pub fn next_start(&self, base: i64, prev_raw: i32, prev_dst: i32, inclusive: bool) -> Option<i64> {
        match self {
            TimeZoneRule::Initial(_) => None,
            TimeZoneRule::Annual(rule) => rule.next_start(base, prev_raw, prev_dst, inclusive),
            TimeZoneRule::TimeArray(rule) => rule.next_start(base, prev_raw, prev_dst, inclusive),
        }
    }

    /// The last start before `base`, or at `base` when `inclusive` is set.
    pub fn previous_start(
        &self,
        base: i64,
        prev_raw: i32,
        prev_dst: i32,
        inclusive: bool,
    ) -> Option<i64> {
        match self {
            TimeZoneRule::Initial(_) => None,
            TimeZoneRule::Annual(rule) => rule.previous_start(base, prev_raw, prev_dst, inclusive),
            TimeZoneRule::TimeArray(rule) => {
                rule.previous_start(base, prev_raw, prev_dst, inclusive)
            }
        }
    }

    pub fn as_annual(&self) -> Option<&AnnualTimeZoneRule> {
        match self {
            TimeZoneRule::Annual(rule) => Some(rule),
            _ => None,
        }
    }
}

impl From<InitialTimeZoneRule> for TimeZoneRule {
    fn from(rule: InitialTimeZoneRule) -> Self {
        TimeZoneRule::Initial(rule)
    }
}

impl From<AnnualTimeZoneRule> for TimeZoneRule {
    fn from(rule: AnnualTimeZoneRule) -> Self {
        TimeZoneRule::Annual(rule)
    }
}

impl From<TimeArrayTimeZoneRule> for TimeZoneRule {
    fn from(rule: TimeArrayTimeZoneRule) -> Self {
        TimeZoneRule::TimeArray(rule)
    }
}

/// Writes the `name (raw X, dst Y)` prefix shared by every rule's display.
pub(crate) fn write_regime(
    f: &mut fmt::Formatter,
    name: &str,
    raw_offset: i32,
    dst_savings: i32,
) -> fmt::Result {
    write!(f, "{} (raw ", name)?;
    write_clock_time(f, raw_offset)?;
    f.write_str(", dst ")?;
    write_clock_time(f, dst_savings)?;
    f.write_str(")")
}

impl fmt::Display for InitialTimeZoneRule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_regime(f, &self.name, self.raw_offset, self.dst_savings)
    }
}

impl fmt::Display for TimeZoneRule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TimeZoneRule::Initial(rule) => fmt::Display::fmt(rule, f),
            TimeZoneRule::Annual(rule) => fmt::Display::fmt(rule, f),
            TimeZoneRule::TimeArray(rule) => fmt::Display::fmt(rule, f),
        }
    }
}

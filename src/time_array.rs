use std::fmt;

use crate::basic::Offsets;
use crate::date_rule::TimeType;
use crate::error::Error;
use crate::rule::write_regime;

/// A rule that takes effect at an explicit, finite list of instants.
///
/// Start times are stored in ascending order, read on the clock given by the
/// rule's [`TimeType`]. Each conversion to UTC uses the single pair of
/// previous offsets handed in by the caller, even when the offsets before
/// earlier entries were different.
#[derive(PartialEq, Eq, Hash, Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "crate::serde::TimeArrayRepr"))]
pub struct TimeArrayTimeZoneRule {
    name: String,
    raw_offset: i32,
    dst_savings: i32,
    start_times: Vec<i64>,
    time_type: TimeType,
}

impl TimeArrayTimeZoneRule {
    /// Builds a rule from the given start times, sorting them. Fails if there
    /// are none.
    pub fn new(
        name: impl Into<String>,
        raw_offset: i32,
        dst_savings: i32,
        mut start_times: Vec<i64>,
        time_type: TimeType,
    ) -> Result<Self, Error> {
        let name = name.into();
        if start_times.is_empty() {
            return Err(Error::EmptyStartTimes(name));
        }
        start_times.sort_unstable();
        Ok(TimeArrayTimeZoneRule {
            name,
            raw_offset,
            dst_savings,
            start_times,
            time_type,
        })
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

    /// The start times, sorted ascending.
    pub fn start_times(&self) -> &[i64] {
        &self.start_times
    }

    pub fn time_type(&self) -> TimeType {
        self.time_type
    }

    fn utc(&self, time: i64, prev_raw: i32, prev_dst: i32) -> i64 {
        self.time_type.to_utc(time, prev_raw, prev_dst)
    }

    pub fn first_start(&self, prev_raw: i32, prev_dst: i32) -> i64 {
        self.utc(self.start_times[0], prev_raw, prev_dst)
    }

    pub fn final_start(&self, prev_raw: i32, prev_dst: i32) -> i64 {
        self.utc(self.start_times[self.start_times.len() - 1], prev_raw, prev_dst)
    }

    pub fn next_start(&self, base: i64, prev_raw: i32, prev_dst: i32, inclusive: bool) -> Option<i64> {
        let passed = self.start_times.iter().rposition(|&time| {
            let time = self.utc(time, prev_raw, prev_dst);
            time < base || (!inclusive && time == base)
        });
        let next = passed.map_or(0, |i| i + 1);
        self.start_times
            .get(next)
            .map(|&time| self.utc(time, prev_raw, prev_dst))
    }

    pub fn previous_start(
        &self,
        base: i64,
        prev_raw: i32,
        prev_dst: i32,
        inclusive: bool,
    ) -> Option<i64> {
        self.start_times
            .iter()
            .rev()
            .map(|&time| self.utc(time, prev_raw, prev_dst))
            .find(|&time| time < base || (inclusive && time == base))
    }

    /// Same offsets, same clock, same start times. The name does not matter.
    pub fn is_equivalent_to(&self, other: &TimeArrayTimeZoneRule) -> bool {
        self.offsets() == other.offsets()
            && self.time_type == other.time_type
            && self.start_times == other.start_times
    }
}

impl fmt::Display for TimeArrayTimeZoneRule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_regime(f, &self.name, self.raw_offset, self.dst_savings)?;
        let clock = match self.time_type {
            TimeType::Wall => "wall",
            TimeType::Standard => "standard",
            TimeType::Utc => "utc",
        };
        write!(f, " at {:?} ({})", self.start_times, clock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_rejected() {
        let err = TimeArrayTimeZoneRule::new("X", 0, 0, vec![], TimeType::Utc).unwrap_err();
        assert_eq!(err, Error::EmptyStartTimes("X".to_owned()));
    }

    #[test]
    fn start_times_are_sorted() {
        let rule = TimeArrayTimeZoneRule::new("X", 0, 0, vec![100, 50, 200], TimeType::Utc).unwrap();
        assert_eq!(rule.start_times(), &[50, 100, 200]);
        assert_eq!(rule.first_start(0, 0), 50);
        assert_eq!(rule.final_start(0, 0), 200);
    }

    #[test]
    fn next_start() {
        let rule = TimeArrayTimeZoneRule::new("X", 0, 0, vec![50, 100, 200], TimeType::Utc).unwrap();
        assert_eq!(rule.next_start(0, 0, 0, false), Some(50));
        assert_eq!(rule.next_start(50, 0, 0, true), Some(50));
        assert_eq!(rule.next_start(50, 0, 0, false), Some(100));
        assert_eq!(rule.next_start(150, 0, 0, false), Some(200));
        assert_eq!(rule.next_start(200, 0, 0, true), Some(200));
        assert_eq!(rule.next_start(200, 0, 0, false), None);
    }

    #[test]
    fn previous_start() {
        let rule = TimeArrayTimeZoneRule::new("X", 0, 0, vec![50, 100, 200], TimeType::Utc).unwrap();
        assert_eq!(rule.previous_start(300, 0, 0, false), Some(200));
        assert_eq!(rule.previous_start(200, 0, 0, true), Some(200));
        assert_eq!(rule.previous_start(200, 0, 0, false), Some(100));
        assert_eq!(rule.previous_start(50, 0, 0, false), None);
        assert_eq!(rule.previous_start(50, 0, 0, true), Some(50));
    }

    #[test]
    fn local_times_use_previous_offsets() {
        let rule =
            TimeArrayTimeZoneRule::new("X", 0, 0, vec![10_000, 20_000], TimeType::Wall).unwrap();
        assert_eq!(rule.first_start(1000, 500), 8500);
        assert_eq!(rule.next_start(8500, 1000, 500, false), Some(18_500));

        let rule =
            TimeArrayTimeZoneRule::new("X", 0, 0, vec![10_000, 20_000], TimeType::Standard).unwrap();
        assert_eq!(rule.first_start(1000, 500), 9000);
    }

    #[test]
    fn equivalence() {
        let a = TimeArrayTimeZoneRule::new("A", 0, 0, vec![1, 2], TimeType::Utc).unwrap();
        let b = TimeArrayTimeZoneRule::new("B", 0, 0, vec![2, 1], TimeType::Utc).unwrap();
        let c = TimeArrayTimeZoneRule::new("A", 0, 0, vec![1, 2], TimeType::Wall).unwrap();
        assert!(a.is_equivalent_to(&b));
        assert!(!a.is_equivalent_to(&c));
    }
}

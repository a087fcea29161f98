//! Zones assembled from an initial rule plus transition rules.
//!
//! A [`RuleBasedTimeZoneBuilder`] collects rules and simulates them into a
//! list of historic transitions. Annual rules that recur forever (at most
//! two, which must alternate) are kept aside as the zone's *final rules*:
//! rather than being enumerated, transitions past the end of the historic
//! list are computed from them on demand. [`build`] freezes the result into
//! an immutable [`RuleBasedTimeZone`].
//!
//! [`build`]: RuleBasedTimeZoneBuilder::build

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, trace};

use crate::basic::{local_delta, BasicTimeZone, LocalOption, Offsets};
use crate::error::Error;
use crate::grego::{self, Month, MAX_MILLIS, MIN_MILLIS};
use crate::rule::{InitialTimeZoneRule, TimeZoneRule};
use crate::transition::TimeZoneTransition;

/// Collects the rules of a zone before freezing it.
#[derive(Debug, Clone)]
pub struct RuleBasedTimeZoneBuilder {
    id: String,
    initial: Arc<TimeZoneRule>,
    historic: Vec<Arc<TimeZoneRule>>,
    finals: Vec<Arc<TimeZoneRule>>,
    /// Cached transitions; `None` until built and after every added rule.
    timeline: Option<Vec<TimeZoneTransition>>,
}

impl RuleBasedTimeZoneBuilder {
    pub fn new(id: impl Into<String>, initial: InitialTimeZoneRule) -> Self {
        RuleBasedTimeZoneBuilder {
            id: id.into(),
            initial: Arc::new(TimeZoneRule::Initial(initial)),
            historic: Vec::new(),
            finals: Vec::new(),
            timeline: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Adds a transition rule.
    ///
    /// An annual rule running to [`AnnualTimeZoneRule::MAX_YEAR`] becomes one
    /// of the zone's two final rules, one standard and one daylight saving;
    /// adding a third, or a second of the same kind, fails. Initial rules are
    /// rejected.
    ///
    /// [`AnnualTimeZoneRule::MAX_YEAR`]: crate::AnnualTimeZoneRule::MAX_YEAR
    pub fn add_transition_rule(
        &mut self,
        rule: impl Into<TimeZoneRule>,
    ) -> Result<&mut Self, Error> {
        let rule = rule.into();
        if !rule.is_transition_rule() {
            return Err(Error::NotATransitionRule(rule.name().to_owned()));
        }
        if rule.as_annual().map_or(false, |annual| annual.is_final()) {
            if self.finals.len() >= 2 {
                return Err(Error::TooManyFinalRules(self.id.clone()));
            }
            let is_dst = rule.dst_savings() != 0;
            if self.finals.iter().any(|other| (other.dst_savings() != 0) == is_dst) {
                return Err(Error::MismatchedFinalRules(self.id.clone()));
            }
            self.finals.push(Arc::new(rule));
        } else {
            self.historic.push(Arc::new(rule));
        }
        self.timeline = None;
        Ok(self)
    }

    /// Works out the historic transitions, if the rules changed since the
    /// last call, and returns them.
    pub fn complete(&mut self) -> Result<&[TimeZoneTransition], Error> {
        let transitions = match self.timeline.take() {
            Some(transitions) => transitions,
            None => {
                let transitions =
                    build_transitions(&self.id, &self.initial, &self.historic, &self.finals)?;
                debug!(
                    zone = %self.id,
                    transitions = transitions.len(),
                    final_rules = !self.finals.is_empty(),
                    "built transition timeline"
                );
                transitions
            }
        };
        Ok(self.timeline.insert(transitions).as_slice())
    }

    /// Every rule added so far, initial rule first and final rules last.
    pub fn time_zone_rules(&self) -> Vec<Arc<TimeZoneRule>> {
        collect_rules(&self.initial, &self.historic, &self.finals)
    }

    /// Completes the timeline and freezes the zone.
    pub fn build(mut self) -> Result<RuleBasedTimeZone, Error> {
        let transitions = self.complete()?.to_vec();
        let finals = match self.finals.as_slice() {
            [] => None,
            [first, second] => Some([first.clone(), second.clone()]),
            _ => return Err(Error::IncompleteFinalRules(self.id)),
        };
        Ok(RuleBasedTimeZone {
            id: self.id,
            initial: self.initial,
            historic: self.historic,
            finals,
            transitions,
        })
    }
}

fn collect_rules(
    initial: &Arc<TimeZoneRule>,
    historic: &[Arc<TimeZoneRule>],
    finals: &[Arc<TimeZoneRule>],
) -> Vec<Arc<TimeZoneRule>> {
    let mut rules = Vec::with_capacity(1 + historic.len() + finals.len());
    rules.push(initial.clone());
    rules.extend(historic.iter().cloned());
    rules.extend(finals.iter().cloned());
    rules
}

fn same_regime(a: &TimeZoneRule, b: &TimeZoneRule) -> bool {
    a.name() == b.name() && a.offsets() == b.offsets()
}

/// Simulates the rules forward from the start of time, each step taking
/// whichever rule starts next given the offsets in effect at that point.
///
/// Once the historic rules run out, the first two transitions of the final
/// pair are appended so that every later transition can be computed from the
/// last two.
fn build_transitions(
    id: &str,
    initial: &Arc<TimeZoneRule>,
    historic: &[Arc<TimeZoneRule>],
    finals: &[Arc<TimeZoneRule>],
) -> Result<Vec<TimeZoneTransition>, Error> {
    if finals.len() == 1 {
        return Err(Error::IncompleteFinalRules(id.to_owned()));
    }

    let mut transitions = Vec::new();
    let mut push = |time: i64, from: &Arc<TimeZoneRule>, to: &Arc<TimeZoneRule>| {
        trace!(zone = id, time, from = from.name(), to = to.name(), "transition");
        transitions.push(TimeZoneTransition::new(time, from.clone(), to.clone()));
    };

    let mut current = initial.clone();
    let mut last = MIN_MILLIS;

    if !historic.is_empty() {
        let mut done = vec![false; historic.len()];
        loop {
            let Offsets { raw_offset, dst_savings } = current.offsets();
            let mut next_time = MAX_MILLIS;
            let mut next_rule = None;

            for (i, rule) in historic.iter().enumerate() {
                if done[i] {
                    continue;
                }
                let Some(start) = rule.next_start(last, raw_offset, dst_savings, false) else {
                    done[i] = true;
                    continue;
                };
                if Arc::ptr_eq(rule, &current) || same_regime(rule, &current) {
                    continue;
                }
                if start < next_time {
                    next_time = start;
                    next_rule = Some(rule);
                }
            }

            if next_rule.is_none() && done.iter().all(|&d| d) {
                break;
            }

            for rule in finals {
                if Arc::ptr_eq(rule, &current) {
                    continue;
                }
                if let Some(start) = rule.next_start(last, raw_offset, dst_savings, false) {
                    if start < next_time {
                        next_time = start;
                        next_rule = Some(rule);
                    }
                }
            }

            let Some(rule) = next_rule else {
                break;
            };
            push(next_time, &current, rule);
            last = next_time;
            current = rule.clone();
        }
    }

    if let [first, second] = finals {
        let basis = current.offsets();
        let d0 = first.next_start(last, basis.raw_offset, basis.dst_savings, false);
        let d1 = second.next_start(last, basis.raw_offset, basis.dst_savings, false);
        let earliest = match (d0, d1) {
            (Some(d0), Some(d1)) if d1 <= d0 => Some((d1, second, first)),
            (Some(d0), _) => Some((d0, first, second)),
            (None, Some(d1)) => Some((d1, second, first)),
            (None, None) => None,
        };
        if let Some((start, rule, following)) = earliest {
            push(start, &current, rule);
            let basis = rule.offsets();
            if let Some(after) =
                following.next_start(start, basis.raw_offset, basis.dst_savings, false)
            {
                push(after, rule, following);
            }
        }
    }

    Ok(transitions)
}

/// An immutable zone built from rules.
///
/// Offsets and transitions up to the end of the historic rules are looked
/// up in a precomputed list; beyond it, the two final rules alternate
/// forever.
#[derive(Debug, Clone)]
pub struct RuleBasedTimeZone {
    id: String,
    initial: Arc<TimeZoneRule>,
    historic: Vec<Arc<TimeZoneRule>>,
    finals: Option<[Arc<TimeZoneRule>; 2]>,
    transitions: Vec<TimeZoneTransition>,
}

impl RuleBasedTimeZone {
    /// The rule in effect before the first transition.
    pub fn initial_rule(&self) -> &Arc<TimeZoneRule> {
        &self.initial
    }

    /// The precomputed transitions, including the first two driven by the
    /// final rules. Name-only transitions are included.
    pub fn historic_transitions(&self) -> &[TimeZoneTransition] {
        &self.transitions
    }

    /// The pair of annual rules that recur forever, if any.
    pub fn final_rules(&self) -> Option<&[Arc<TimeZoneRule>; 2]> {
        self.finals.as_ref()
    }

    /// A builder holding the same rules, for deriving a modified zone.
    pub fn to_builder(&self) -> RuleBasedTimeZoneBuilder {
        RuleBasedTimeZoneBuilder {
            id: self.id.clone(),
            initial: self.initial.clone(),
            historic: self.historic.clone(),
            finals: self.finals.iter().flatten().cloned().collect(),
            timeline: Some(self.transitions.clone()),
        }
    }

    /// Whether the other zone is made of equivalent rules: an equivalent
    /// initial rule, equivalent final rules in the same order, and the same
    /// number of historic rules each with an equivalent counterpart.
    pub fn has_same_rules(&self, other: &RuleBasedTimeZone) -> bool {
        if !self.initial.is_equivalent_to(&other.initial) {
            return false;
        }
        let finals_match = match (&self.finals, &other.finals) {
            (Some(a), Some(b)) => a.iter().zip(b).all(|(a, b)| a.is_equivalent_to(b)),
            (None, None) => true,
            _ => false,
        };
        if !finals_match || self.historic.len() != other.historic.len() {
            return false;
        }
        self.historic
            .iter()
            .all(|rule| other.historic.iter().any(|o| rule.is_equivalent_to(o)))
    }

    /// The offsets in effect at a local date and time of day. Skipped local
    /// times are read as daylight time and repeated ones as standard time.
    pub fn offset_at_local_date(&self, year: i64, month: Month, day: u8, millis_in_day: i32) -> Offsets {
        let day = grego::fields_to_day(year, month, i64::from(day));
        let local = grego::day_to_millis(day, i64::from(millis_in_day));
        self.offset_from_local(local, LocalOption::DAYLIGHT_FORMER, LocalOption::STANDARD_LATTER)
    }

    /// The offsets at a local time, reading skipped times against the rule
    /// before the transition and repeated times against the rule after it.
    pub fn offset_at_local(&self, local: i64) -> Offsets {
        self.offset_from_local(local, LocalOption::FORMER, LocalOption::LATTER)
    }

    /// Whether daylight saving is in effect at `now`, or will be after the
    /// next transition.
    pub fn uses_daylight_time(&self, now: i64) -> bool {
        if self.in_daylight_time(now) {
            return true;
        }
        self.next_transition(now, false)
            .map_or(false, |tr| tr.to().dst_savings() != 0)
    }

    /// Whether daylight saving is in effect at `now` or at any later point.
    pub fn observes_daylight_time(&self, now: i64) -> bool {
        if self.in_daylight_time(now) {
            return true;
        }
        let mut seen_finals = [false; 2];
        let mut time = now;
        while let Some(tr) = self.next_transition(time, false) {
            if tr.to().dst_savings() != 0 {
                return true;
            }
            if let Some(finals) = &self.finals {
                for (seen, rule) in seen_finals.iter_mut().zip(finals) {
                    if Arc::ptr_eq(rule, tr.to()) {
                        *seen = true;
                    }
                }
                if seen_finals.iter().all(|&s| s) {
                    break;
                }
            }
            time = tr.time();
        }
        false
    }

    /// The standard offset in effect now, by the system clock.
    pub fn raw_offset(&self) -> i32 {
        self.raw_offset_at(current_time_millis())
    }

    /// The offsets in effect now, by the system clock.
    pub fn current_offset(&self) -> Offsets {
        self.offset(current_time_millis())
    }

    /// The local reading of a transition's instant under the given
    /// disambiguation options.
    fn local_transition_time(
        tr: &TimeZoneTransition,
        non_existing: LocalOption,
        duplicated: LocalOption,
    ) -> i64 {
        let delta = local_delta(tr.from().offsets(), tr.to().offsets(), non_existing, duplicated);
        tr.time().saturating_add(delta)
    }

    /// The rule in effect at a UTC instant, or at a local time when
    /// disambiguation options are given.
    pub(crate) fn rule_at(
        &self,
        time: i64,
        local: Option<(LocalOption, LocalOption)>,
    ) -> &Arc<TimeZoneRule> {
        let threshold = |tr: &TimeZoneTransition| match local {
            Some((non_existing, duplicated)) => {
                Self::local_transition_time(tr, non_existing, duplicated)
            }
            None => tr.time(),
        };

        let (Some(first), Some(last)) = (self.transitions.first(), self.transitions.last()) else {
            return &self.initial;
        };
        if time < threshold(first) {
            return &self.initial;
        }
        if time > threshold(last) {
            return self.find_rule_in_final(time, local).unwrap_or_else(|| last.to());
        }

        let index = match local {
            Some(_) => self.transitions.iter().rposition(|tr| time >= threshold(tr)),
            None => self
                .transitions
                .partition_point(|tr| tr.time() <= time)
                .checked_sub(1),
        };
        index.map_or(&self.initial, |i| self.transitions[i].to())
    }

    /// Which final rule is in effect at `time`: the one that started most
    /// recently.
    fn find_rule_in_final(
        &self,
        time: i64,
        local: Option<(LocalOption, LocalOption)>,
    ) -> Option<&Arc<TimeZoneRule>> {
        let [first, second] = self.finals.as_ref()?;
        let base = |from: &TimeZoneRule, to: &TimeZoneRule| match local {
            Some((non_existing, duplicated)) => {
                let delta = local_delta(from.offsets(), to.offsets(), non_existing, duplicated);
                time.saturating_sub(delta)
            }
            None => time,
        };

        let (b0, b1) = (second.offsets(), first.offsets());
        let start0 = first.previous_start(base(&**second, &**first), b0.raw_offset, b0.dst_savings, true);
        let start1 = second.previous_start(base(&**first, &**second), b1.raw_offset, b1.dst_savings, true);
        match (start0, start1) {
            (Some(s0), Some(s1)) if s0 > s1 => Some(first),
            (Some(_), Some(_)) => Some(second),
            (Some(_), None) => Some(first),
            (None, Some(_)) => Some(second),
            (None, None) => None,
        }
    }

    /// The next transition in the raw list or the final alternation,
    /// including name-only transitions. The flag is set for transitions
    /// computed from the final rules.
    fn next_raw_transition(&self, base: i64, inclusive: bool) -> Option<(TimeZoneTransition, bool)> {
        let first = self.transitions.first()?;
        if first.time() > base || (inclusive && first.time() == base) {
            return Some((first.clone(), false));
        }
        let last = self.transitions.last()?;
        if inclusive && last.time() == base {
            return Some((last.clone(), false));
        }
        if last.time() <= base {
            let [f0, f1] = self.finals.as_ref()?;
            let (o0, o1) = (f0.offsets(), f1.offsets());
            let start0 = f0.next_start(base, o1.raw_offset, o1.dst_savings, inclusive);
            let start1 = f1.next_start(base, o0.raw_offset, o0.dst_savings, inclusive);
            let tr = match (start0, start1) {
                (Some(s0), Some(s1)) if s1 <= s0 => TimeZoneTransition::new(s1, f0.clone(), f1.clone()),
                (Some(s0), _) => TimeZoneTransition::new(s0, f1.clone(), f0.clone()),
                (None, Some(s1)) => TimeZoneTransition::new(s1, f0.clone(), f1.clone()),
                (None, None) => return None,
            };
            return Some((tr, true));
        }
        let index = self
            .transitions
            .partition_point(|tr| tr.time() < base || (!inclusive && tr.time() == base));
        self.transitions.get(index).map(|tr| (tr.clone(), false))
    }

    /// The previous transition in the raw list or the final alternation,
    /// including name-only transitions.
    fn previous_raw_transition(&self, base: i64, inclusive: bool) -> Option<TimeZoneTransition> {
        let first = self.transitions.first()?;
        if inclusive && first.time() == base {
            return Some(first.clone());
        }
        if first.time() >= base {
            return None;
        }
        let last = self.transitions.last()?;
        if inclusive && last.time() == base {
            return Some(last.clone());
        }
        if last.time() < base {
            let Some([f0, f1]) = self.finals.as_ref() else {
                return Some(last.clone());
            };
            let (o0, o1) = (f0.offsets(), f1.offsets());
            let start0 = f0.previous_start(base, o1.raw_offset, o1.dst_savings, inclusive);
            let start1 = f1.previous_start(base, o0.raw_offset, o0.dst_savings, inclusive);
            return Some(match (start0, start1) {
                (Some(s0), Some(s1)) if s1 >= s0 => TimeZoneTransition::new(s1, f0.clone(), f1.clone()),
                (Some(s0), _) => TimeZoneTransition::new(s0, f1.clone(), f0.clone()),
                (None, Some(s1)) => TimeZoneTransition::new(s1, f0.clone(), f1.clone()),
                (None, None) => last.clone(),
            });
        }
        let index = self
            .transitions
            .partition_point(|tr| tr.time() < base || (inclusive && tr.time() == base));
        index
            .checked_sub(1)
            .and_then(|i| self.transitions.get(i))
            .cloned()
    }
}

impl BasicTimeZone for RuleBasedTimeZone {
    fn id(&self) -> &str {
        &self.id
    }

    fn offset(&self, time: i64) -> Offsets {
        self.rule_at(time, None).offsets()
    }

    fn offset_from_local(
        &self,
        local: i64,
        non_existing: LocalOption,
        duplicated: LocalOption,
    ) -> Offsets {
        self.rule_at(local, Some((non_existing, duplicated))).offsets()
    }

    /// Transitions that only rename the zone, keeping its offsets, are
    /// skipped.
    fn next_transition(&self, base: i64, inclusive: bool) -> Option<TimeZoneTransition> {
        let (mut base, mut inclusive) = (base, inclusive);
        loop {
            let (tr, from_finals) = self.next_raw_transition(base, inclusive)?;
            if !tr.is_name_only() {
                return Some(tr);
            }
            if from_finals {
                return None;
            }
            base = tr.time();
            inclusive = false;
        }
    }

    /// Transitions that only rename the zone, keeping its offsets, are
    /// skipped.
    fn previous_transition(&self, base: i64, inclusive: bool) -> Option<TimeZoneTransition> {
        let (mut base, mut inclusive) = (base, inclusive);
        loop {
            let tr = self.previous_raw_transition(base, inclusive)?;
            if !tr.is_name_only() {
                return Some(tr);
            }
            base = tr.time();
            inclusive = false;
        }
    }

    fn time_zone_rules(&self) -> Vec<Arc<TimeZoneRule>> {
        let finals = self.finals.as_ref().map_or(&[][..], |f| &f[..]);
        collect_rules(&self.initial, &self.historic, finals)
    }
}

/// Milliseconds since the epoch by the system clock. Clocks set before the
/// epoch give negative values.
fn current_time_millis() -> i64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(elapsed) => i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX),
        Err(before) => i64::try_from(before.duration().as_millis()).map_or(i64::MIN, |ms| -ms),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annual::AnnualTimeZoneRule;
    use crate::date_rule::{DateRule, DateTimeRule, TimeType};
    use crate::grego::Weekday;
    use crate::time_array::TimeArrayTimeZoneRule;

    const HOUR: i32 = 3_600_000;

    fn us_rules(start_year: i32) -> (AnnualTimeZoneRule, AnnualTimeZoneRule) {
        let dst = AnnualTimeZoneRule::new(
            "EDT",
            -5 * HOUR,
            HOUR,
            DateTimeRule::new(
                DateRule::WeekdayOnOrAfter { month: Month::March, day: 8, weekday: Weekday::Sunday },
                2 * HOUR,
                TimeType::Wall,
            ),
            start_year,
            AnnualTimeZoneRule::MAX_YEAR,
        );
        let std = AnnualTimeZoneRule::new(
            "EST",
            -5 * HOUR,
            0,
            DateTimeRule::new(
                DateRule::DayOfWeekInMonth { month: Month::November, week: 1, weekday: Weekday::Sunday },
                2 * HOUR,
                TimeType::Wall,
            ),
            start_year,
            AnnualTimeZoneRule::MAX_YEAR,
        );
        (dst, std)
    }

    #[test]
    fn zone_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RuleBasedTimeZone>();
        assert_send_sync::<RuleBasedTimeZoneBuilder>();
    }

    #[test]
    fn initial_rule_is_rejected() {
        let mut builder =
            RuleBasedTimeZoneBuilder::new("Test", InitialTimeZoneRule::new("EST", -5 * HOUR, 0));
        let err = builder
            .add_transition_rule(InitialTimeZoneRule::new("EDT", -5 * HOUR, HOUR))
            .unwrap_err();
        assert_eq!(err, Error::NotATransitionRule("EDT".to_owned()));
    }

    #[test]
    fn third_final_rule_is_rejected() {
        let (dst, std) = us_rules(2007);
        let mut builder =
            RuleBasedTimeZoneBuilder::new("Test", InitialTimeZoneRule::new("EST", -5 * HOUR, 0));
        builder
            .add_transition_rule(dst.clone())
            .unwrap()
            .add_transition_rule(std)
            .unwrap();
        let err = builder.add_transition_rule(dst).unwrap_err();
        assert_eq!(err, Error::TooManyFinalRules("Test".to_owned()));
    }

    #[test]
    fn final_rules_of_the_same_kind_are_rejected() {
        let (spring, _) = us_rules(2007);
        let autumn = AnnualTimeZoneRule::new(
            "EDDT",
            -5 * HOUR,
            2 * HOUR,
            DateTimeRule::new(
                DateRule::DayOfWeekInMonth { month: Month::October, week: 1, weekday: Weekday::Sunday },
                2 * HOUR,
                TimeType::Wall,
            ),
            2007,
            AnnualTimeZoneRule::MAX_YEAR,
        );
        let mut builder =
            RuleBasedTimeZoneBuilder::new("Test", InitialTimeZoneRule::new("EST", -5 * HOUR, 0));
        builder.add_transition_rule(spring).unwrap();
        let err = builder.add_transition_rule(autumn).unwrap_err();
        assert_eq!(err, Error::MismatchedFinalRules("Test".to_owned()));
        assert_eq!(err.kind(), crate::ErrorKind::InvalidState);
        assert_eq!(builder.time_zone_rules().len(), 2);

        let (_, standard) = us_rules(2007);
        builder.add_transition_rule(standard).unwrap();
        let zone = builder.build().unwrap();
        // 2011-03-13T07:06:40Z, just after the spring transition.
        let rules = zone.time_zone_rules_since(1_300_000_000_000).unwrap();
        let names: Vec<_> = rules.iter().map(|rule| rule.name()).collect();
        assert_eq!(names, ["EDT", "EST", "EDT"]);
    }

    #[test]
    fn single_final_rule_is_incomplete() {
        let (dst, _) = us_rules(2007);
        let mut builder =
            RuleBasedTimeZoneBuilder::new("Test", InitialTimeZoneRule::new("EST", -5 * HOUR, 0));
        builder.add_transition_rule(dst).unwrap();
        assert_eq!(
            builder.complete().unwrap_err(),
            Error::IncompleteFinalRules("Test".to_owned())
        );
        assert!(builder.build().is_err());
    }

    #[test]
    fn no_rules_means_fixed_offset() {
        let zone = RuleBasedTimeZoneBuilder::new("Fixed", InitialTimeZoneRule::new("FIX", HOUR, 0))
            .build()
            .unwrap();
        assert!(zone.historic_transitions().is_empty());
        assert_eq!(zone.offset(0), Offsets::new(HOUR, 0));
        assert_eq!(zone.offset(i64::MAX), Offsets::new(HOUR, 0));
        assert_eq!(zone.next_transition(0, true), None);
        assert_eq!(zone.previous_transition(0, true), None);
        assert!(!zone.observes_daylight_time(0));
    }

    #[test]
    fn complete_is_idempotent() {
        let (dst, std) = us_rules(2007);
        let mut builder =
            RuleBasedTimeZoneBuilder::new("Test", InitialTimeZoneRule::new("EST", -5 * HOUR, 0));
        builder.add_transition_rule(dst).unwrap();
        builder.add_transition_rule(std).unwrap();
        let first = builder.complete().unwrap().to_vec();
        let second = builder.complete().unwrap().to_vec();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn adding_a_rule_recomputes() {
        let (dst, std) = us_rules(2007);
        let mut builder =
            RuleBasedTimeZoneBuilder::new("Test", InitialTimeZoneRule::new("EST", -5 * HOUR, 0));
        let array = TimeArrayTimeZoneRule::new("EDT", -5 * HOUR, HOUR, vec![0], TimeType::Utc).unwrap();
        builder.add_transition_rule(array).unwrap();
        assert_eq!(builder.complete().unwrap().len(), 1);
        builder.add_transition_rule(dst).unwrap();
        builder.add_transition_rule(std).unwrap();
        assert_eq!(builder.complete().unwrap()[0].time(), 0);
        assert!(builder.complete().unwrap().len() > 1);
    }

    #[test]
    fn to_builder_round_trips() {
        let (dst, std) = us_rules(2007);
        let mut builder =
            RuleBasedTimeZoneBuilder::new("Test", InitialTimeZoneRule::new("EST", -5 * HOUR, 0));
        builder.add_transition_rule(dst).unwrap();
        builder.add_transition_rule(std).unwrap();
        let zone = builder.build().unwrap();
        let again = zone.to_builder().build().unwrap();
        assert!(zone.has_same_rules(&again));
        assert_eq!(zone.historic_transitions(), again.historic_transitions());
        assert_eq!(zone.time_zone_rules().len(), 3);
    }

    #[test]
    fn current_clock_is_after_epoch() {
        assert!(current_time_millis() > 0);
    }
}

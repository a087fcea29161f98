//! The transition-query contract shared by rule-based zones, and the
//! algorithms that work purely in terms of it.

use std::sync::Arc;

use tracing::{trace, warn};

use crate::annual::AnnualTimeZoneRule;
use crate::date_rule::{DateRule, DateTimeRule, TimeType};
use crate::error::Error;
use crate::grego::{self, MILLIS_PER_YEAR};
use crate::rule::{InitialTimeZoneRule, TimeZoneRule};
use crate::time_array::TimeArrayTimeZoneRule;
use crate::transition::TimeZoneTransition;

/// The two components of a zone's offset from UTC at some instant.
#[derive(PartialEq, Eq, Hash, Debug, Default, Copy, Clone)]
pub struct Offsets {
    /// The standard offset, in milliseconds.
    pub raw_offset: i32,
    /// The daylight saving amount on top of `raw_offset`, in milliseconds.
    pub dst_savings: i32,
}

impl Offsets {
    pub const fn new(raw_offset: i32, dst_savings: i32) -> Self {
        Offsets {
            raw_offset,
            dst_savings,
        }
    }

    /// Local time minus UTC, in milliseconds.
    pub fn total(self) -> i64 {
        i64::from(self.raw_offset) + i64::from(self.dst_savings)
    }

    pub fn is_dst(self) -> bool {
        self.dst_savings != 0
    }

    /// Equal totals, and daylight saving either on in both or off in both.
    fn matches_ignoring_dst_amount(self, other: Offsets) -> bool {
        self.total() == other.total() && self.is_dst() == other.is_dst()
    }

    fn matches(self, other: Offsets, ignore_dst_amount: bool) -> bool {
        if ignore_dst_amount {
            self.matches_ignoring_dst_amount(other)
        } else {
            self == other
        }
    }
}

/// Whether a transition between these offsets turns daylight saving on or
/// off.
fn flips_dst(from: Offsets, to: Offsets) -> bool {
    from.is_dst() != to.is_dst()
}

/// Which kind of offset to prefer for a local time next to a transition.
#[derive(PartialEq, Eq, Hash, Debug, Copy, Clone)]
pub enum DstPreference {
    /// No preference: the [`Side`] decides.
    Either,
    /// Prefer whichever side of the transition is standard time.
    Standard,
    /// Prefer whichever side of the transition observes daylight saving.
    Daylight,
}

/// Which side of a transition a local time should be read against.
#[derive(PartialEq, Eq, Hash, Debug, Copy, Clone)]
pub enum Side {
    /// The rule in effect before the transition.
    Former,
    /// The rule in effect after the transition.
    Latter,
}

/// How to interpret a local time that a transition makes non-existent or
/// ambiguous.
///
/// A preference for standard or daylight time wins when the transition
/// actually switches between the two; otherwise `side` decides.
#[derive(PartialEq, Eq, Hash, Debug, Copy, Clone)]
pub struct LocalOption {
    pub preference: DstPreference,
    pub side: Side,
}

impl LocalOption {
    pub const FORMER: LocalOption = LocalOption::new(DstPreference::Either, Side::Former);
    pub const LATTER: LocalOption = LocalOption::new(DstPreference::Either, Side::Latter);
    pub const STANDARD_FORMER: LocalOption = LocalOption::new(DstPreference::Standard, Side::Former);
    pub const STANDARD_LATTER: LocalOption = LocalOption::new(DstPreference::Standard, Side::Latter);
    pub const DAYLIGHT_FORMER: LocalOption = LocalOption::new(DstPreference::Daylight, Side::Former);
    pub const DAYLIGHT_LATTER: LocalOption = LocalOption::new(DstPreference::Daylight, Side::Latter);

    pub const fn new(preference: DstPreference, side: Side) -> Self {
        LocalOption { preference, side }
    }

    /// Picks the side of a transition from `before` to `after` this option
    /// selects.
    pub fn side_for(self, before: Offsets, after: Offsets) -> Side {
        let dst_to_std = before.is_dst() && !after.is_dst();
        let std_to_dst = !before.is_dst() && after.is_dst();
        match self.preference {
            DstPreference::Standard if dst_to_std => Side::Latter,
            DstPreference::Standard if std_to_dst => Side::Former,
            DstPreference::Daylight if std_to_dst => Side::Latter,
            DstPreference::Daylight if dst_to_std => Side::Former,
            _ => self.side,
        }
    }
}

/// The offset to add to a transition's UTC instant to get the local time at
/// which it takes effect, for the purpose of reading local times.
///
/// Local times that the transition skips or repeats are read against the
/// side chosen by `non_existing` or `duplicated`: choosing the latter side
/// puts the threshold at the earlier of the two local readings, so the whole
/// affected range falls after it.
pub(crate) fn local_delta(
    before: Offsets,
    after: Offsets,
    non_existing: LocalOption,
    duplicated: LocalOption,
) -> i64 {
    let option = if after.total() >= before.total() {
        non_existing
    } else {
        duplicated
    };
    match option.side_for(before, after) {
        Side::Latter => before.total().min(after.total()),
        Side::Former => before.total().max(after.total()),
    }
}

/// A lossy stand-in for a zone near some date: one initial rule, plus a
/// pair of yearly rules when the zone is observing daylight saving there.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct SimpleRules {
    pub initial: InitialTimeZoneRule,
    pub annual: Option<(AnnualTimeZoneRule, AnnualTimeZoneRule)>,
}

impl SimpleRules {
    /// The initial rule followed by the annual rules, if any.
    pub fn into_rules(self) -> Vec<TimeZoneRule> {
        let mut rules = vec![TimeZoneRule::Initial(self.initial)];
        if let Some((first, second)) = self.annual {
            rules.push(TimeZoneRule::Annual(first));
            rules.push(TimeZoneRule::Annual(second));
        }
        rules
    }
}

/// A time zone that can enumerate its transitions.
///
/// Implementors answer offset and transition queries; everything else here
/// is derived from those answers alone.
pub trait BasicTimeZone {
    /// The zone's identifier.
    fn id(&self) -> &str;

    /// The offsets in effect at a UTC instant.
    fn offset(&self, time: i64) -> Offsets;

    /// The offsets in effect at a local wall time, with explicit handling of
    /// local times that are skipped or repeated by a transition.
    fn offset_from_local(
        &self,
        local: i64,
        non_existing: LocalOption,
        duplicated: LocalOption,
    ) -> Offsets;

    /// The first transition after `base`, or at `base` when `inclusive`.
    fn next_transition(&self, base: i64, inclusive: bool) -> Option<TimeZoneTransition>;

    /// The last transition before `base`, or at `base` when `inclusive`.
    fn previous_transition(&self, base: i64, inclusive: bool) -> Option<TimeZoneTransition>;

    /// Every rule of the zone, initial rule first.
    fn time_zone_rules(&self) -> Vec<Arc<TimeZoneRule>>;

    /// Whether daylight saving is in effect at a UTC instant.
    fn in_daylight_time(&self, time: i64) -> bool {
        self.offset(time).is_dst()
    }

    /// The standard offset in effect at a UTC instant.
    fn raw_offset_at(&self, time: i64) -> i32 {
        self.offset(time).raw_offset
    }

    /// The rules needed to describe the zone from `start` onwards.
    ///
    /// The result starts with an initial rule for the offsets in effect at
    /// `start`. Annual rules that began earlier are moved to start in the
    /// year of their first transition after `start`, and time-array rules
    /// lose the entries at or before `start`. Rules that never apply after
    /// `start` are dropped.
    fn time_zone_rules_since(&self, start: i64) -> Result<Vec<Arc<TimeZoneRule>>, Error> {
        let all = self.time_zone_rules();
        let Some(at_start) = self.previous_transition(start, true) else {
            return Ok(all);
        };

        let to = at_start.to();
        let initial = InitialTimeZoneRule::new(to.name(), to.raw_offset(), to.dst_savings());
        let basis = initial.offsets();
        let mut filtered = vec![Arc::new(TimeZoneRule::Initial(initial))];

        let mut done = vec![false; all.len()];
        if let Some(initial) = done.first_mut() {
            *initial = true;
        }
        for (i, rule) in all.iter().enumerate().skip(1) {
            if rule
                .next_start(start, basis.raw_offset, basis.dst_savings, false)
                .is_none()
            {
                trace!(rule = rule.name(), "rule does not apply after {}", start);
                done[i] = true;
            }
        }

        let mut time = start;
        let (mut final_std, mut final_dst) = (false, false);
        while !(final_std && final_dst) && !done.iter().all(|&d| d) {
            let Some(transition) = self.next_transition(time, false) else {
                break;
            };
            time = transition.time();
            let to_rule = transition.to();

            let index = all
                .iter()
                .skip(1)
                .position(|rule| Arc::ptr_eq(rule, to_rule) || rule == to_rule)
                .map(|i| i + 1);
            let Some(index) = index else {
                warn!(zone = self.id(), rule = to_rule.name(), "transition into unlisted rule");
                return Err(Error::RuleNotFound(to_rule.name().to_owned()));
            };
            if done[index] {
                continue;
            }

            match &**to_rule {
                TimeZoneRule::TimeArray(array) => {
                    if let Some(rule) = trim_time_array(self, array, to_rule, start) {
                        filtered.push(rule);
                    }
                }
                TimeZoneRule::Annual(annual) => {
                    let from = transition.from();
                    let first = annual.first_start(from.raw_offset(), from.dst_savings());
                    if first == Some(transition.time()) {
                        filtered.push(to_rule.clone());
                    } else {
                        let year = grego::clamp_year(grego::year_of(transition.time()));
                        trace!(rule = annual.name(), year, "moving annual rule start");
                        filtered.push(Arc::new(TimeZoneRule::Annual(annual.with_start_year(year))));
                    }
                    if annual.is_final() {
                        if annual.dst_savings() == 0 {
                            final_std = true;
                        } else {
                            final_dst = true;
                        }
                    }
                }
                TimeZoneRule::Initial(_) => {}
            }
            done[index] = true;
        }
        Ok(filtered)
    }

    /// Approximates the zone near `date` with at most three rules: an
    /// initial rule, and a pair of annual day-of-week rules when the zone
    /// switches into and out of daylight saving within about a year of
    /// `date`.
    ///
    /// The annual rules keep a single raw offset, so they may disagree with
    /// the zone once its raw offset changes.
    fn simple_rules_near(&self, date: i64) -> SimpleRules {
        let Some(next) = self.next_transition(date, false) else {
            let initial = match self.previous_transition(date, true) {
                Some(tr) => {
                    let to = tr.to();
                    InitialTimeZoneRule::new(to.name(), to.raw_offset(), to.dst_savings())
                }
                None => {
                    let offsets = self.offset(date);
                    InitialTimeZoneRule::new(self.id(), offsets.raw_offset, offsets.dst_savings)
                }
            };
            return SimpleRules {
                initial,
                annual: None,
            };
        };

        let from = next.from();
        let mut initial =
            InitialTimeZoneRule::new(from.name(), from.raw_offset(), from.dst_savings());
        let initial_raw = from.raw_offset();
        let initial_dst = from.dst_savings();
        let next_time = next.time();

        if !flips_dst(from.offsets(), next.to().offsets())
            || date.saturating_add(MILLIS_PER_YEAR) <= next_time
        {
            return SimpleRules {
                initial,
                annual: None,
            };
        }

        let (year, rule) = wall_time_rule(&next);
        let to = next.to();
        let first = AnnualTimeZoneRule::new(
            to.name(),
            initial_raw,
            to.dst_savings(),
            rule,
            year,
            AnnualTimeZoneRule::MAX_YEAR,
        );

        let mut second = None;
        if to.raw_offset() == initial_raw {
            if let Some(after) = self.next_transition(next_time, false) {
                let (from, to) = (after.from(), after.to());
                if flips_dst(from.offsets(), to.offsets())
                    && next_time.saturating_add(MILLIS_PER_YEAR) > after.time()
                {
                    let (year, rule) = wall_time_rule(&after);
                    let candidate = AnnualTimeZoneRule::new(
                        to.name(),
                        to.raw_offset(),
                        to.dst_savings(),
                        rule,
                        year.saturating_sub(1),
                        AnnualTimeZoneRule::MAX_YEAR,
                    );
                    let applies = candidate
                        .previous_start(date, from.raw_offset(), from.dst_savings(), true)
                        .map_or(false, |d| d <= date);
                    if applies && initial_raw == to.raw_offset() && initial_dst == to.dst_savings() {
                        second = Some(candidate);
                    }
                }
            }
        }

        if second.is_none() {
            if let Some(before) = self.previous_transition(date, true) {
                let (from, to) = (before.from(), before.to());
                if flips_dst(from.offsets(), to.offsets()) {
                    let (_, rule) = wall_time_rule(&before);
                    let candidate = AnnualTimeZoneRule::new(
                        to.name(),
                        initial_raw,
                        initial_dst,
                        rule,
                        first.start_year().saturating_sub(1),
                        AnnualTimeZoneRule::MAX_YEAR,
                    );
                    let starts_later = candidate
                        .next_start(date, from.raw_offset(), from.dst_savings(), false)
                        .map_or(false, |d| d > next_time);
                    if starts_later {
                        second = Some(candidate);
                    }
                }
            }
        }

        match second {
            Some(second) => {
                // Before the previous transition the zone ran on the same
                // regime the next transition switches into.
                initial =
                    InitialTimeZoneRule::new(first.name(), first.raw_offset(), first.dst_savings());
                SimpleRules {
                    initial,
                    annual: Some((first, second)),
                }
            }
            None => SimpleRules {
                initial,
                annual: None,
            },
        }
    }

    /// Whether both zones have the same offsets at `start` and the same
    /// transitions up to and including `end`.
    ///
    /// With `ignore_dst_amount`, offsets are compared by their totals and by
    /// whether daylight saving is on, and transitions that only change the
    /// daylight saving amount while keeping the total are skipped.
    fn has_equivalent_transitions(
        &self,
        other: &dyn BasicTimeZone,
        start: i64,
        end: i64,
        ignore_dst_amount: bool,
    ) -> bool {
        if !self
            .offset(start)
            .matches(other.offset(start), ignore_dst_amount)
        {
            return false;
        }

        let mut time = start;
        loop {
            let mut tr1 = self.next_transition(time, false);
            let mut tr2 = other.next_transition(time, false);
            if ignore_dst_amount {
                while let Some(t) = dst_amount_only_time(&tr1, end) {
                    tr1 = self.next_transition(t, false);
                }
                while let Some(t) = dst_amount_only_time(&tr2, end) {
                    tr2 = other.next_transition(t, false);
                }
            }

            let tr1 = tr1.filter(|tr| tr.time() <= end);
            let tr2 = tr2.filter(|tr| tr.time() <= end);
            match (tr1, tr2) {
                (None, None) => return true,
                (Some(tr1), Some(tr2)) => {
                    if tr1.time() != tr2.time()
                        || !tr1
                            .to()
                            .offsets()
                            .matches(tr2.to().offsets(), ignore_dst_amount)
                    {
                        return false;
                    }
                    time = tr1.time();
                }
                _ => return false,
            }
        }
    }
}

/// Drops the entries of a time-array rule at or before `start`, reading
/// them against the offsets in effect before the rule's first
/// transition after `start`.
fn trim_time_array<Z: BasicTimeZone + ?Sized>(
    zone: &Z,
    array: &TimeArrayTimeZoneRule,
    rule: &Arc<TimeZoneRule>,
    start: i64,
) -> Option<Arc<TimeZoneRule>> {
    let mut t = start;
    let into_rule = loop {
        let transition = zone.next_transition(t, false)?;
        if Arc::ptr_eq(transition.to(), rule) || transition.to() == rule {
            break transition;
        }
        t = transition.time();
    };
    let before = into_rule.from().offsets();
    if array.first_start(before.raw_offset, before.dst_savings) > start {
        return Some(rule.clone());
    }
    let kept: Vec<i64> = array
        .start_times()
        .iter()
        .copied()
        .filter(|&time| {
            array
                .time_type()
                .to_utc(time, before.raw_offset, before.dst_savings)
                > start
        })
        .collect();
    trace!(rule = array.name(), kept = kept.len(), "trimmed time array rule");
    TimeArrayTimeZoneRule::new(
        array.name(),
        array.raw_offset(),
        array.dst_savings(),
        kept,
        array.time_type(),
    )
    .ok()
    .map(|trimmed| Arc::new(TimeZoneRule::TimeArray(trimmed)))
}

/// The time of a transition within range that keeps daylight saving on and
/// the total offset unchanged, altering only the split between raw and DST.
fn dst_amount_only_time(tr: &Option<TimeZoneTransition>, end: i64) -> Option<i64> {
    let tr = tr.as_ref()?;
    let (from, to) = (tr.from().offsets(), tr.to().offsets());
    let amount_only = from.total() == to.total() && from.is_dst() && to.is_dst();
    (tr.time() <= end && amount_only).then(|| tr.time())
}

/// A day-of-week-in-month rule on wall time reproducing the local date and
/// time at which `tr` happens, along with that local year.
fn wall_time_rule(tr: &TimeZoneTransition) -> (i32, DateTimeRule) {
    let local = tr.time().saturating_add(tr.from().offsets().total());
    let fields = grego::time_to_fields(local);
    let rule = DateTimeRule::new(
        DateRule::DayOfWeekInMonth {
            month: fields.month,
            week: fields.day_of_week_in_month(),
            weekday: fields.weekday,
        },
        fields.millis_in_day,
        TimeType::Wall,
    );
    (grego::clamp_year(fields.year), rule)
}

use std::fmt;
use std::sync::Arc;

use crate::rule::TimeZoneRule;

/// The instant at which a zone switches from one rule to another.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct TimeZoneTransition {
    time: i64,
    from: Arc<TimeZoneRule>,
    to: Arc<TimeZoneRule>,
}

impl TimeZoneTransition {
    pub fn new(time: i64, from: Arc<TimeZoneRule>, to: Arc<TimeZoneRule>) -> Self {
        TimeZoneTransition { time, from, to }
    }

    /// The transition instant, in milliseconds since the epoch.
    pub fn time(&self) -> i64 {
        self.time
    }

    /// The rule in effect just before the transition.
    pub fn from(&self) -> &Arc<TimeZoneRule> {
        &self.from
    }

    /// The rule in effect from the transition onwards.
    pub fn to(&self) -> &Arc<TimeZoneRule> {
        &self.to
    }

    /// Whether only the rule name changes here, with the same offsets on
    /// both sides.
    pub(crate) fn is_name_only(&self) -> bool {
        self.from.offsets() == self.to.offsets()
    }
}

impl fmt::Display for TimeZoneTransition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {} -> {}", self.time, self.from, self.to)
    }
}

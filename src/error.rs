use std::fmt;

/// Errors raised while assembling or querying rule-based zones.
#[derive(PartialEq, Eq, Debug, Clone)]
pub enum Error {
    /// An initial rule was passed where a transition rule is required.
    NotATransitionRule(String),
    /// A time-array rule was given no start times.
    EmptyStartTimes(String),
    /// A third annual rule running to the end of time was added.
    TooManyFinalRules(String),
    /// Exactly one annual rule runs to the end of time, so it has no partner
    /// to alternate with.
    IncompleteFinalRules(String),
    /// Both final rules are standard time, or both are daylight saving time.
    MismatchedFinalRules(String),
    /// A transition leads into a rule the zone does not list.
    RuleNotFound(String),
}

/// The broad class of an [`Error`].
#[derive(PartialEq, Eq, Debug, Copy, Clone)]
pub enum ErrorKind {
    /// The caller supplied an unusable value.
    InvalidArgument,
    /// The zone's rules are inconsistent with one another.
    InvalidState,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotATransitionRule(_) | Error::EmptyStartTimes(_) => ErrorKind::InvalidArgument,
            Error::TooManyFinalRules(_)
            | Error::IncompleteFinalRules(_)
            | Error::MismatchedFinalRules(_)
            | Error::RuleNotFound(_) => ErrorKind::InvalidState,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::NotATransitionRule(s) => write!(f, "rule \"{}\" is not a transition rule", s),
            Error::EmptyStartTimes(s) => {
                write!(f, "time array rule \"{}\" has no start times", s)
            }
            Error::TooManyFinalRules(s) => {
                write!(f, "zone \"{}\" already has two final rules", s)
            }
            Error::IncompleteFinalRules(s) => {
                write!(f, "zone \"{}\" has a single final rule; final rules come in pairs", s)
            }
            Error::MismatchedFinalRules(s) => write!(
                f,
                "zone \"{}\" needs one standard and one daylight saving final rule",
                s
            ),
            Error::RuleNotFound(s) => {
                write!(f, "transition into rule \"{}\" which the zone does not list", s)
            }
        }
    }
}

impl std::error::Error for Error {}

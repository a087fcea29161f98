//! Time zones described by rules, and the transitions between them.
//!
//! A zone starts from an [`InitialTimeZoneRule`] and moves between regimes
//! (a standard offset plus a daylight saving amount) at the instants its
//! transition rules produce. Two kinds of transition rule exist:
//!
//! - an [`AnnualTimeZoneRule`] takes effect once a year on a date given by a
//!   [`DateTimeRule`], such as "the second Sunday in March at 2:00 wall
//!   time", for a range of years;
//! - a [`TimeArrayTimeZoneRule`] takes effect at an explicit list of
//!   instants.
//!
//! A [`RuleBasedTimeZoneBuilder`] collects rules and works out the
//! resulting [`TimeZoneTransition`]s. The frozen [`RuleBasedTimeZone`]
//! answers offset queries for UTC instants and for local times, with
//! control over how skipped and repeated local times are read, and walks
//! its transitions in either direction. A pair of annual rules that recur
//! forever lets the zone answer queries arbitrarily far in the future.
//!
//! ```
//! use tz_rules::{
//!     AnnualTimeZoneRule, BasicTimeZone, DateRule, DateTimeRule, InitialTimeZoneRule, Month,
//!     RuleBasedTimeZoneBuilder, TimeType, Weekday,
//! };
//!
//! const HOUR: i32 = 3_600_000;
//!
//! let spring = DateTimeRule::new(
//!     DateRule::WeekdayOnOrAfter { month: Month::March, day: 8, weekday: Weekday::Sunday },
//!     2 * HOUR,
//!     TimeType::Wall,
//! );
//! let autumn = DateTimeRule::new(
//!     DateRule::WeekdayOnOrAfter { month: Month::November, day: 1, weekday: Weekday::Sunday },
//!     2 * HOUR,
//!     TimeType::Wall,
//! );
//!
//! let mut builder =
//!     RuleBasedTimeZoneBuilder::new("US/Eastern", InitialTimeZoneRule::new("EST", -5 * HOUR, 0));
//! builder
//!     .add_transition_rule(AnnualTimeZoneRule::new(
//!         "EDT", -5 * HOUR, HOUR, spring, 2007, AnnualTimeZoneRule::MAX_YEAR,
//!     ))?
//!     .add_transition_rule(AnnualTimeZoneRule::new(
//!         "EST", -5 * HOUR, 0, autumn, 2007, AnnualTimeZoneRule::MAX_YEAR,
//!     ))?;
//! let zone = builder.build()?;
//!
//! // 2007-03-11T07:00:00Z, the first spring-forward under these rules.
//! let transition = zone.next_transition(0, false).unwrap();
//! assert_eq!(transition.time(), 1_173_596_400_000);
//! assert!(zone.in_daylight_time(transition.time()));
//! # Ok::<(), tz_rules::Error>(())
//! ```
//!
//! Rules can also be read from zic(8) `Rule` lines with the [`line`]
//! module.
//!
//! # Features
//!
//! - `chrono` (default): `&RuleBasedTimeZone` implements
//!   [`chrono::TimeZone`], with [`ZoneOffset`] as its offset type.
//! - `serde`: rules and their parts implement `Serialize` and `Deserialize`.
//!
//! # Logging
//!
//! Building a zone emits [`tracing`] events: one `debug` event per built
//! timeline and `trace` events for each transition produced.

#![warn(missing_copy_implementations)]
#![warn(missing_debug_implementations)]
#![warn(trivial_casts, trivial_numeric_casts)]
#![warn(unused_qualifications)]

mod annual;
mod basic;
mod date_rule;
mod error;
pub mod grego;
pub mod line;
mod rule;
mod rule_based;
#[cfg(feature = "serde")]
mod serde;
mod time_array;
#[cfg(feature = "chrono")]
mod timezone_impl;
mod transition;

pub use annual::AnnualTimeZoneRule;
pub use basic::{BasicTimeZone, DstPreference, LocalOption, Offsets, Side, SimpleRules};
pub use date_rule::{DateRule, DateTimeRule, TimeType};
pub use error::{Error, ErrorKind};
pub use grego::{Month, Weekday};
pub use rule::{InitialTimeZoneRule, TimeZoneRule};
pub use rule_based::{RuleBasedTimeZone, RuleBasedTimeZoneBuilder};
pub use time_array::TimeArrayTimeZoneRule;
#[cfg(feature = "chrono")]
pub use timezone_impl::{OffsetComponents, OffsetName, ZoneOffset};
pub use transition::TimeZoneTransition;

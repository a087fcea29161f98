use core::fmt;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::date_rule::TimeType;
use crate::error::Error;
use crate::grego::{Month, Weekday};
use crate::time_array::TimeArrayTimeZoneRule;

impl Serialize for Month {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.abbreviation())
    }
}

impl<'de> Deserialize<'de> for Month {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct Visitor;

        impl<'de> de::Visitor<'de> for Visitor {
            type Value = Month;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                write!(formatter, "a month name")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Month, E> {
                value.parse::<Month>().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(Visitor)
    }
}

impl Serialize for Weekday {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.abbreviation())
    }
}

impl<'de> Deserialize<'de> for Weekday {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct Visitor;

        impl<'de> de::Visitor<'de> for Visitor {
            type Value = Weekday;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                write!(formatter, "a weekday name")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Weekday, E> {
                value.parse::<Weekday>().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(Visitor)
    }
}

/// The unchecked form of a time-array rule, validated on the way in.
#[derive(Debug, Deserialize)]
#[serde(rename = "TimeArrayTimeZoneRule")]
pub struct TimeArrayRepr {
    name: String,
    raw_offset: i32,
    dst_savings: i32,
    start_times: Vec<i64>,
    time_type: TimeType,
}

impl TryFrom<TimeArrayRepr> for TimeArrayTimeZoneRule {
    type Error = Error;

    fn try_from(repr: TimeArrayRepr) -> Result<Self, Error> {
        TimeArrayTimeZoneRule::new(
            repr.name,
            repr.raw_offset,
            repr.dst_savings,
            repr.start_times,
            repr.time_type,
        )
    }
}

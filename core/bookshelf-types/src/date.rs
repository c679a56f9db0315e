//! Date parsing and wire formatting.
//!
//! Publication dates arrive as `YYYY-MM-DD`, as RFC 3339 timestamps, or as
//! integer milliseconds since the Unix epoch. All are normalized to a UTC
//! instant. On the wire, instants are written as RFC 3339 with millisecond
//! precision, e.g. `1965-08-01T00:00:00.000Z`.
//!
//! Only years 0000 through 9999 (after normalizing to UTC) are accepted, since
//! the wire format has a fixed four-digit year.

use chrono::{DateTime, Datelike, NaiveDate, SecondsFormat, Utc};

use crate::{Error, Result};

/// Parses a date string into a UTC instant.
///
/// A bare calendar date is taken as midnight UTC.
pub fn parse_date(input: &str) -> Result<DateTime<Utc>> {
    let trimmed = input.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return in_range(ts.with_timezone(&Utc), input);
    }
    if let Ok(day) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        if let Some(midnight) = day.and_hms_opt(0, 0, 0) {
            return in_range(midnight.and_utc(), input);
        }
    }
    Err(Error::InvalidDate(input.to_string()))
}

/// Converts epoch milliseconds into a UTC instant.
pub fn from_millis(millis: i64) -> Result<DateTime<Utc>> {
    let ts = DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| Error::InvalidDate(millis.to_string()))?;
    in_range(ts, &millis.to_string())
}

fn in_range(ts: DateTime<Utc>, input: &str) -> Result<DateTime<Utc>> {
    if (0..=9999).contains(&ts.year()) {
        Ok(ts)
    } else {
        Err(Error::InvalidDate(format!("{input} (year outside 0000-9999)")))
    }
}

/// Formats an instant the way it is stored and sent over the wire.
#[must_use]
pub fn format_date(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Serde adapter for `DateTime<Utc>` fields using [`format_date`].
pub mod wire {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_date(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_date(&raw).map_err(serde::de::Error::custom)
    }

    /// Same as the parent module, for optional fields.
    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            ts: &Option<DateTime<Utc>>,
            s: S,
        ) -> Result<S::Ok, S::Error> {
            match ts {
                Some(ts) => super::serialize(ts, s),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            d: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            Option::<String>::deserialize(d)?
                .map(|raw| crate::date::parse_date(&raw).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}

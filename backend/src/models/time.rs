use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, NaiveTime, TimeZone, Timelike};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Formats accepted for timestamps that carry no zone information.
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Day of the week, ordered Monday first.
///
/// The derived `Ord` is the declaration order, which gives the explicit
/// Monday < Tuesday < ... < Sunday total order used by every weekly view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// Full English name, e.g. `"Monday"`.
    pub fn name(self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }

    /// Zero-based index with Monday = 0.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        Weekday::ALL[day.num_days_from_monday() as usize]
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A time-of-day label, stored as minutes since midnight and rendered `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeSlot(u16);

impl TimeSlot {
    /// Create a slot from minutes since midnight. Returns `None` past 23:59.
    pub fn from_minutes(minutes: u32) -> Option<Self> {
        (minutes < MINUTES_PER_DAY).then_some(Self(minutes as u16))
    }

    /// Slot for a minute of the day, wrapping past midnight.
    pub fn wrapping(minutes: u32) -> Self {
        Self((minutes % MINUTES_PER_DAY) as u16)
    }

    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        if minute >= 60 {
            return None;
        }
        Self::from_minutes(hour * 60 + minute)
    }

    /// Parse an `HH:MM` label.
    pub fn parse(label: &str) -> Option<Self> {
        let time = NaiveTime::parse_from_str(label.trim(), "%H:%M").ok()?;
        Self::from_hm(time.hour(), time.minute())
    }

    pub fn minutes(self) -> u32 {
        u32::from(self.0)
    }

    pub fn label(self) -> String {
        format!("{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl Serialize for TimeSlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label())
    }
}

impl<'de> Deserialize<'de> for TimeSlot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;

        let label = String::deserialize(deserializer)?;
        TimeSlot::parse(&label)
            .ok_or_else(|| D::Error::custom(format!("invalid time slot '{}'", label)))
    }
}

/// Daily opening window as a half-open range `[opening, closing)` of
/// minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpeningHours {
    opening: u32,
    closing: u32,
}

impl OpeningHours {
    /// Build from minute offsets. `closing` may be 1440 (midnight at day end).
    pub fn new(opening: u32, closing: u32) -> Result<Self, String> {
        if closing > MINUTES_PER_DAY {
            return Err(format!("closing minute {} is past midnight", closing));
        }
        if opening >= closing {
            return Err(format!(
                "opening time {} must be before closing time {}",
                format_minutes(opening),
                format_minutes(closing)
            ));
        }
        Ok(Self { opening, closing })
    }

    /// Parse from `HH:MM` labels; `"24:00"` is accepted as the closing time.
    pub fn parse(opening: &str, closing: &str) -> Result<Self, String> {
        let open = TimeSlot::parse(opening)
            .ok_or_else(|| format!("invalid opening time '{}'", opening))?;
        let close = if closing.trim() == "24:00" {
            MINUTES_PER_DAY
        } else {
            TimeSlot::parse(closing)
                .ok_or_else(|| format!("invalid closing time '{}'", closing))?
                .minutes()
        };
        Self::new(open.minutes(), close)
    }

    pub fn opening(&self) -> u32 {
        self.opening
    }

    pub fn closing(&self) -> u32 {
        self.closing
    }

    pub fn contains(&self, minute_of_day: u32) -> bool {
        minute_of_day >= self.opening && minute_of_day < self.closing
    }

    pub fn contains_slot(&self, slot: TimeSlot) -> bool {
        self.contains(slot.minutes())
    }
}

impl Default for OpeningHours {
    fn default() -> Self {
        Self {
            opening: 6 * 60,
            closing: 22 * 60,
        }
    }
}

fn format_minutes(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// What to do with timestamps that carry no zone information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NaiveTimestampPolicy {
    /// Interpret the wall-clock time in the reference zone.
    #[default]
    Localize,
    /// Treat the record as invalid.
    Reject,
}

impl FromStr for NaiveTimestampPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "localize" | "local" => Ok(Self::Localize),
            "reject" => Ok(Self::Reject),
            _ => Err(format!("Unknown naive timestamp policy: {}", s)),
        }
    }
}

/// Minutes since local midnight of a zoned instant.
pub fn minute_of_day(ts: &DateTime<Tz>) -> u32 {
    ts.hour() * 60 + ts.minute()
}

/// Truncate a zoned instant down to a multiple of `granularity_minutes` of
/// local wall-clock time, dropping seconds and sub-seconds.
///
/// Flooring works on the instant (subtracting the local remainder) rather than
/// rebuilding a local time, so repeated wall-clock hours at DST fall-back keep
/// their own offset. `floor(floor(t)) == floor(t)` for any granularity that
/// divides an hour.
pub fn floor_to_granularity(ts: DateTime<Tz>, granularity_minutes: u32) -> DateTime<Tz> {
    let granularity = granularity_minutes.max(1);
    let remainder = minute_of_day(&ts) % granularity;
    let offset = Duration::minutes(i64::from(remainder))
        + Duration::seconds(i64::from(ts.second()))
        + Duration::nanoseconds(i64::from(ts.nanosecond()));
    ts - offset
}

/// Parse a log timestamp into the reference zone.
///
/// Zoned inputs (RFC 3339, or ISO-8601 with a space separator and offset) are
/// converted. Naive inputs follow `policy`; when localized, wall-clock times
/// inside a DST gap are rejected and ambiguous ones resolve to the earlier
/// instant.
pub fn parse_timestamp(raw: &str, tz: Tz, policy: NaiveTimestampPolicy) -> Option<DateTime<Tz>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&tz));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(dt.with_timezone(&tz));
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())?;

    match policy {
        NaiveTimestampPolicy::Reject => None,
        NaiveTimestampPolicy::Localize => match tz.from_local_datetime(&naive) {
            LocalResult::Single(dt) => Some(dt),
            LocalResult::Ambiguous(earliest, _) => Some(earliest),
            LocalResult::None => None,
        },
    }
}

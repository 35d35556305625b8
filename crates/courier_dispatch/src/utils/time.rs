use jiff::civil::Time;

#[macro_export]
macro_rules! timer_debug {
    ($msg:literal,$block:expr) => {{
        let now = jiff::Timestamp::now();
        let result = $block;
        let elapsed = jiff::Timestamp::now().duration_since(now);

        tracing::debug!("{}: took {:?}", $msg, elapsed);

        result
    }};
}

const MERIDIEM_FORMAT: &str = "%I:%M %p";

/// Parses a time of day written either as `HH:MM[:SS]` or as `H:MM AM/PM`.
pub fn parse_clock_time(input: &str) -> Result<Time, jiff::Error> {
    let input = input.trim();
    let upper = input.to_uppercase();

    if upper.ends_with("AM") || upper.ends_with("PM") {
        // %I wants a two digit hour
        let padded = match upper.find(':') {
            Some(1) => format!("0{upper}"),
            _ => upper,
        };

        return jiff::fmt::strtime::parse(MERIDIEM_FORMAT, &padded)?.to_time();
    }

    input.parse::<Time>()
}

pub fn format_clock_time(time: Time) -> String {
    time.strftime(MERIDIEM_FORMAT).to_string()
}

/// Serde adapter for clock times accepting every format `parse_clock_time` does.
pub mod clock_time {
    use jiff::civil::Time;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(time: &Time, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_clock_time(*time))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Time, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        super::parse_clock_time(&value).map_err(serde::de::Error::custom)
    }
}

/// Same as [`clock_time`] for optional fields.
pub mod optional_clock_time {
    use jiff::civil::Time;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(time: &Option<Time>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match time {
            Some(time) => serializer.serialize_some(&super::format_clock_time(*time)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Time>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|value| super::parse_clock_time(&value).map_err(serde::de::Error::custom))
            .transpose()
    }
}

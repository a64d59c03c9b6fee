use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::LookupError;

/// A trimmed city name that passed input validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SearchQuery(String);

impl SearchQuery {
    /// Trim `text` and reject it if it is empty or reads as a whole integer.
    ///
    /// The integer check also rejects numeric-only place names; that is
    /// accepted as the price of catching stray digits typed into the box.
    pub fn parse(text: &str) -> Result<Self, LookupError> {
        let trimmed = text.trim();
        if trimmed.is_empty() || is_integer(trimmed) {
            return Err(LookupError::InvalidQuery);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SearchQuery {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn is_integer(s: &str) -> bool {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Decoded API payload, kept as-is so the presentation layer sees every field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeatherResult {
    payload: Value,
}

impl WeatherResult {
    pub fn from_payload(payload: Value) -> Self {
        Self { payload }
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// The embedded `cod` field. OpenWeather sends it as a number on success
    /// and as a string on failure, so both are accepted.
    pub fn status_code(&self) -> Option<u16> {
        match self.payload.get("cod")? {
            Value::Number(n) => n.as_u64().and_then(|c| u16::try_from(c).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code() == Some(200)
    }

    pub fn message(&self) -> Option<&str> {
        self.payload
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
    }

    /// Primary condition keyword, `weather[0].main`.
    pub fn condition(&self) -> Option<&str> {
        self.payload.get("weather")?.get(0)?.get("main")?.as_str()
    }

    /// Typed view for rendering. Each field is read on its own, so a missing
    /// or oddly typed value leaves only that field `None`.
    pub fn display(&self) -> WeatherDisplay {
        WeatherDisplay {
            location_name: self.text("/name").filter(|n| !n.is_empty()),
            country: self.text("/sys/country"),
            condition: self.text("/weather/0/main"),
            description: self.text("/weather/0/description"),
            temperature_c: self.number("/main/temp"),
            feels_like_c: self.number("/main/feels_like"),
            temp_min_c: self.number("/main/temp_min"),
            temp_max_c: self.number("/main/temp_max"),
            humidity_pct: self.number("/main/humidity"),
            pressure_hpa: self.number("/main/pressure"),
            wind_speed_mps: self.number("/wind/speed"),
            visibility_m: self.number("/visibility"),
            observation_time: self.timestamp("/dt"),
            sunrise: self.timestamp("/sys/sunrise"),
            sunset: self.timestamp("/sys/sunset"),
        }
    }

    fn text(&self, pointer: &str) -> Option<String> {
        self.payload.pointer(pointer)?.as_str().map(str::to_owned)
    }

    fn number(&self, pointer: &str) -> Option<f64> {
        self.payload.pointer(pointer)?.as_f64()
    }

    fn timestamp(&self, pointer: &str) -> Option<DateTime<Utc>> {
        let value = self.payload.pointer(pointer)?;
        // Unix seconds; fractional values are truncated.
        let secs = value.as_i64().or_else(|| value.as_f64().map(|f| f as i64))?;
        DateTime::from_timestamp(secs, 0)
    }
}

/// What the presentation layer needs to draw the details card.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WeatherDisplay {
    pub location_name: Option<String>,
    pub country: Option<String>,
    pub condition: Option<String>,
    pub description: Option<String>,
    pub temperature_c: Option<f64>,
    pub feels_like_c: Option<f64>,
    pub temp_min_c: Option<f64>,
    pub temp_max_c: Option<f64>,
    pub humidity_pct: Option<f64>,
    pub pressure_hpa: Option<f64>,
    pub wind_speed_mps: Option<f64>,
    pub visibility_m: Option<f64>,
    pub observation_time: Option<DateTime<Utc>>,
    pub sunrise: Option<DateTime<Utc>>,
    pub sunset: Option<DateTime<Utc>>,
}

use serde::{Deserialize, Serialize};

/// Background theme picked from the reported weather condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Clear,
    Clouds,
    Rain,
    Drizzle,
    Thunderstorm,
    Snow,
    Haze,
    Dust,
    Wind,
    #[default]
    Unknown,
}

impl Theme {
    /// Map an OpenWeather condition keyword (`weather[0].main`) to a theme.
    /// Case-insensitive; anything unrecognised lands in [`Theme::Unknown`].
    pub fn from_condition(keyword: &str) -> Self {
        match keyword.trim().to_ascii_lowercase().as_str() {
            "clear" => Theme::Clear,
            "clouds" => Theme::Clouds,
            "rain" => Theme::Rain,
            "drizzle" => Theme::Drizzle,
            "thunderstorm" => Theme::Thunderstorm,
            "snow" => Theme::Snow,
            "mist" | "haze" | "fog" | "smoke" => Theme::Haze,
            "dust" | "sand" | "ash" => Theme::Dust,
            "squall" | "tornado" => Theme::Wind,
            _ => Theme::Unknown,
        }
    }

    /// CSS class applied to the page root.
    pub fn css_class(&self) -> &'static str {
        match self {
            Theme::Clear => "clear",
            Theme::Clouds => "clouds",
            Theme::Rain => "rain",
            Theme::Drizzle => "drizzle",
            Theme::Thunderstorm => "thunderstorm",
            Theme::Snow => "snow",
            Theme::Haze => "haze",
            Theme::Dust => "dust",
            Theme::Wind => "wind",
            Theme::Unknown => "unknown",
        }
    }

    pub const fn all() -> &'static [Theme] {
        &[
            Theme::Clear,
            Theme::Clouds,
            Theme::Rain,
            Theme::Drizzle,
            Theme::Thunderstorm,
            Theme::Snow,
            Theme::Haze,
            Theme::Dust,
            Theme::Wind,
            Theme::Unknown,
        ]
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.css_class())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rain_maps_to_rain() {
        assert_eq!(Theme::from_condition("Rain"), Theme::Rain);
        assert_eq!(Theme::from_condition("Rain").css_class(), "rain");
    }

    #[test]
    fn atmosphere_keywords_share_buckets() {
        for kw in ["Mist", "Haze", "Fog", "Smoke"] {
            assert_eq!(Theme::from_condition(kw), Theme::Haze, "{kw}");
        }
        for kw in ["Dust", "Sand", "Ash"] {
            assert_eq!(Theme::from_condition(kw), Theme::Dust, "{kw}");
        }
        assert_eq!(Theme::from_condition("Tornado"), Theme::Wind);
    }

    #[test]
    fn matching_ignores_case_and_padding() {
        assert_eq!(Theme::from_condition(" clouds "), Theme::Clouds);
        assert_eq!(Theme::from_condition("THUNDERSTORM"), Theme::Thunderstorm);
    }

    #[test]
    fn unrecognised_keyword_falls_back_to_unknown() {
        assert_eq!(Theme::from_condition("Volcano"), Theme::Unknown);
        assert_eq!(Theme::from_condition(""), Theme::Unknown);
    }

    #[test]
    fn css_classes_are_distinct() {
        let mut classes: Vec<_> = Theme::all().iter().map(Theme::css_class).collect();
        classes.sort_unstable();
        classes.dedup();
        assert_eq!(classes.len(), Theme::all().len());
    }
}

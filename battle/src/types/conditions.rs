//! Field conditions

/// Weather conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Weather {
    Sun,
    Rain,
    Sand,
    Hail,
}

impl Weather {
    /// Parse from protocol string
    pub fn from_protocol(s: &str) -> Option<Self> {
        // Normalize: lowercase and remove spaces
        let normalized = s.to_lowercase().replace([' ', '-'], "");

        match normalized.as_str() {
            "sunnyday" | "sun" => Some(Weather::Sun),
            "raindance" | "rain" => Some(Weather::Rain),
            "sandstorm" | "sand" => Some(Weather::Sand),
            "hail" => Some(Weather::Hail),
            _ => None,
        }
    }

    /// Protocol name, as carried by |-weather|
    pub fn as_str(&self) -> &'static str {
        match self {
            Weather::Sun => "SunnyDay",
            Weather::Rain => "RainDance",
            Weather::Sand => "Sandstorm",
            Weather::Hail => "Hail",
        }
    }
}

impl std::fmt::Display for Weather {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for Weather {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Weather::from_protocol(&name)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown weather {name}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weather_from_protocol() {
        assert_eq!(Weather::from_protocol("RainDance"), Some(Weather::Rain));
        assert_eq!(Weather::from_protocol("Sandstorm"), Some(Weather::Sand));
        assert_eq!(Weather::from_protocol("none"), None);
        assert_eq!(Weather::Sun.to_string(), "SunnyDay");
    }
}

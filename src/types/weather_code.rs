//! Defines the `WeatherCode` enum, mapping the WMO weather interpretation codes that
//! Open-Meteo reports in the `weathercode` column to descriptive variants.

/// Represents the WMO weather interpretation code reported by Open-Meteo.
///
/// Every daily request asks for `weathercode` alongside the caller's variables. It is
/// the day's most severe condition and is handy for sanity-checking other columns
/// (e.g. a `Thunderstorm` day with zero precipitation deserves a second look). See the
/// [Open-Meteo documentation](https://open-meteo.com/en/docs#weathervariables) for the
/// code table.
///
/// You can convert an integer code (e.g., from a Polars DataFrame) into this enum
/// using [`WeatherCode::from_i64`].
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum WeatherCode {
    /// Code 0: Clear sky.
    ClearSky = 0,
    /// Code 1: Mainly clear.
    MainlyClear = 1,
    /// Code 2: Partly cloudy.
    PartlyCloudy = 2,
    /// Code 3: Overcast.
    Overcast = 3,
    /// Code 45: Fog.
    Fog = 45,
    /// Code 48: Depositing rime fog.
    RimeFog = 48,
    /// Code 51: Light drizzle.
    LightDrizzle = 51,
    /// Code 53: Moderate drizzle.
    Drizzle = 53,
    /// Code 55: Dense drizzle.
    DenseDrizzle = 55,
    /// Code 56: Light freezing drizzle.
    LightFreezingDrizzle = 56,
    /// Code 57: Dense freezing drizzle.
    DenseFreezingDrizzle = 57,
    /// Code 61: Slight rain.
    SlightRain = 61,
    /// Code 63: Moderate rain.
    Rain = 63,
    /// Code 65: Heavy rain.
    HeavyRain = 65,
    /// Code 66: Light freezing rain.
    LightFreezingRain = 66,
    /// Code 67: Heavy freezing rain.
    HeavyFreezingRain = 67,
    /// Code 71: Slight snow fall.
    SlightSnowfall = 71,
    /// Code 73: Moderate snow fall.
    Snowfall = 73,
    /// Code 75: Heavy snow fall.
    HeavySnowfall = 75,
    /// Code 77: Snow grains.
    SnowGrains = 77,
    /// Code 80: Slight rain showers.
    SlightRainShowers = 80,
    /// Code 81: Moderate rain showers.
    RainShowers = 81,
    /// Code 82: Violent rain showers.
    ViolentRainShowers = 82,
    /// Code 85: Slight snow showers.
    SlightSnowShowers = 85,
    /// Code 86: Heavy snow showers.
    HeavySnowShowers = 86,
    /// Code 95: Slight or moderate thunderstorm.
    Thunderstorm = 95,
    /// Code 96: Thunderstorm with slight hail.
    ThunderstormWithSlightHail = 96,
    /// Code 99: Thunderstorm with heavy hail.
    ThunderstormWithHeavyHail = 99,
}

impl WeatherCode {
    /// Attempts to convert a WMO code into a `WeatherCode` variant.
    ///
    /// Returns `None` for codes Open-Meteo does not emit (e.g. 4 or 100).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use openmeteo_daily::WeatherCode;
    ///
    /// assert_eq!(WeatherCode::from_i64(61), Some(WeatherCode::SlightRain));
    /// assert_eq!(WeatherCode::from_i64(4), None);
    ///
    /// match WeatherCode::from_i64(45) {
    ///     Some(WeatherCode::Fog) => println!("It's foggy!"),
    ///     Some(code) => println!("Weather is: {}", code.description()),
    ///     None => println!("Unknown weather code."),
    /// }
    /// ```
    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(WeatherCode::ClearSky),
            1 => Some(WeatherCode::MainlyClear),
            2 => Some(WeatherCode::PartlyCloudy),
            3 => Some(WeatherCode::Overcast),
            45 => Some(WeatherCode::Fog),
            48 => Some(WeatherCode::RimeFog),
            51 => Some(WeatherCode::LightDrizzle),
            53 => Some(WeatherCode::Drizzle),
            55 => Some(WeatherCode::DenseDrizzle),
            56 => Some(WeatherCode::LightFreezingDrizzle),
            57 => Some(WeatherCode::DenseFreezingDrizzle),
            61 => Some(WeatherCode::SlightRain),
            63 => Some(WeatherCode::Rain),
            65 => Some(WeatherCode::HeavyRain),
            66 => Some(WeatherCode::LightFreezingRain),
            67 => Some(WeatherCode::HeavyFreezingRain),
            71 => Some(WeatherCode::SlightSnowfall),
            73 => Some(WeatherCode::Snowfall),
            75 => Some(WeatherCode::HeavySnowfall),
            77 => Some(WeatherCode::SnowGrains),
            80 => Some(WeatherCode::SlightRainShowers),
            81 => Some(WeatherCode::RainShowers),
            82 => Some(WeatherCode::ViolentRainShowers),
            85 => Some(WeatherCode::SlightSnowShowers),
            86 => Some(WeatherCode::HeavySnowShowers),
            95 => Some(WeatherCode::Thunderstorm),
            96 => Some(WeatherCode::ThunderstormWithSlightHail),
            99 => Some(WeatherCode::ThunderstormWithHeavyHail),
            _ => None,
        }
    }

    pub fn code(&self) -> i64 {
        *self as i64
    }

    pub fn description(&self) -> &'static str {
        match self {
            WeatherCode::ClearSky => "clear sky",
            WeatherCode::MainlyClear => "mainly clear",
            WeatherCode::PartlyCloudy => "partly cloudy",
            WeatherCode::Overcast => "overcast",
            WeatherCode::Fog => "fog",
            WeatherCode::RimeFog => "depositing rime fog",
            WeatherCode::LightDrizzle => "light drizzle",
            WeatherCode::Drizzle => "moderate drizzle",
            WeatherCode::DenseDrizzle => "dense drizzle",
            WeatherCode::LightFreezingDrizzle => "light freezing drizzle",
            WeatherCode::DenseFreezingDrizzle => "dense freezing drizzle",
            WeatherCode::SlightRain => "slight rain",
            WeatherCode::Rain => "moderate rain",
            WeatherCode::HeavyRain => "heavy rain",
            WeatherCode::LightFreezingRain => "light freezing rain",
            WeatherCode::HeavyFreezingRain => "heavy freezing rain",
            WeatherCode::SlightSnowfall => "slight snow fall",
            WeatherCode::Snowfall => "moderate snow fall",
            WeatherCode::HeavySnowfall => "heavy snow fall",
            WeatherCode::SnowGrains => "snow grains",
            WeatherCode::SlightRainShowers => "slight rain showers",
            WeatherCode::RainShowers => "moderate rain showers",
            WeatherCode::ViolentRainShowers => "violent rain showers",
            WeatherCode::SlightSnowShowers => "slight snow showers",
            WeatherCode::HeavySnowShowers => "heavy snow showers",
            WeatherCode::Thunderstorm => "thunderstorm",
            WeatherCode::ThunderstormWithSlightHail => "thunderstorm with slight hail",
            WeatherCode::ThunderstormWithHeavyHail => "thunderstorm with heavy hail",
        }
    }

    /// Whether the code reports any falling precipitation.
    pub fn is_precipitation(&self) -> bool {
        self.code() >= 51
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes_round_trip() {
        for code in [
            0, 1, 2, 3, 45, 48, 51, 53, 55, 56, 57, 61, 63, 65, 66, 67, 71, 73, 75, 77, 80, 81, 82,
            85, 86, 95, 96, 99,
        ] {
            let parsed = WeatherCode::from_i64(code).unwrap();
            assert_eq!(parsed.code(), code);
        }
    }

    #[test]
    fn test_unknown_codes() {
        for code in [-1, 4, 44, 60, 100] {
            assert_eq!(WeatherCode::from_i64(code), None);
        }
    }

    #[test]
    fn test_precipitation_classification() {
        assert!(!WeatherCode::Fog.is_precipitation());
        assert!(!WeatherCode::Overcast.is_precipitation());
        assert!(WeatherCode::LightDrizzle.is_precipitation());
        assert!(WeatherCode::Thunderstorm.is_precipitation());
        assert_eq!(WeatherCode::RimeFog.description(), "depositing rime fog");
    }
}

// src/upstream/weather_code.rs
// WMO weather interpretation codes, as reported in `current_weather.weathercode`.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeatherInfo {
    pub text: &'static str,
    pub icon: &'static str,
}

const UNKNOWN: WeatherInfo = WeatherInfo {
    text: "Unknown",
    icon: "🌡️",
};

pub fn describe(code: i64) -> WeatherInfo {
    let (text, icon) = match code {
        0 => ("Clear sky", "☀️"),
        1 => ("Mainly clear", "🌤️"),
        2 => ("Partly cloudy", "⛅"),
        3 => ("Overcast", "☁️"),
        45 => ("Fog", "🌫️"),
        48 => ("Depositing rime fog", "🌫️"),
        51 => ("Light drizzle", "🌦️"),
        53 => ("Moderate drizzle", "🌦️"),
        55 => ("Dense drizzle", "🌦️"),
        61 => ("Slight rain", "🌧️"),
        63 => ("Moderate rain", "🌧️"),
        65 => ("Heavy rain", "🌧️"),
        71 => ("Slight snow fall", "🌨️"),
        73 => ("Moderate snow fall", "🌨️"),
        75 => ("Heavy snow fall", "🌨️"),
        80 => ("Slight rain showers", "🌦️"),
        81 => ("Moderate rain showers", "🌦️"),
        82 => ("Violent rain showers", "🌧️"),
        95 => ("Thunderstorm", "⛈️"),
        _ => return UNKNOWN,
    };
    WeatherInfo { text, icon }
}

/// Temperature rounded to whole degrees, e.g. `31°C`.
pub fn format_temperature(celsius: f64) -> String {
    format!("{}°C", celsius.round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        assert_eq!(describe(0).text, "Clear sky");
        assert_eq!(describe(48).text, "Depositing rime fog");
        assert_eq!(describe(95).icon, "⛈️");
    }

    #[test]
    fn test_unknown_code() {
        assert_eq!(describe(4), UNKNOWN);
        assert_eq!(describe(-1).text, "Unknown");
    }

    #[test]
    fn test_temperature_rounding() {
        assert_eq!(format_temperature(31.4), "31°C");
        assert_eq!(format_temperature(-0.6), "-1°C");
    }
}

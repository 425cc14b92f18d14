use weather_core::{Units, WeatherResult};

/// Console block for one lookup, surrounded by blank lines.
///
/// Temperatures always keep a decimal part (`15.0°C`).
pub fn render(weather: &WeatherResult, units: Units) -> String {
    format!(
        "\nWeather in {}:\n{}\nTemperature: {:?}{}\nHumidity: {}%\nConditions: {}\n\n",
        weather.city,
        "-".repeat(20),
        weather.temperature,
        units.temperature_symbol(),
        weather.humidity,
        capitalize(&weather.description),
    )
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

use std::fmt::Write;

use chrono::Local;
use weather_core::{SearchView, Suggestion, WeatherResult};

/// Formats the coordinator state the way the search screen shows it.
pub fn render(view: &SearchView) -> String {
    let mut out = String::new();

    if view.weather.is_loading() {
        out.push_str("Loading...\n");
    }

    if let Some(message) = view.weather.error() {
        let _ = writeln!(out, "Error: {message}");
    }

    if let Some(weather) = view.weather.weather() {
        if view.weather.error().is_some() {
            out.push_str("Last result:\n");
        }
        render_weather(&mut out, weather);
    }

    out
}

fn render_weather(out: &mut String, weather: &WeatherResult) {
    let observed = weather.observed_at.with_timezone(&Local).format("%Y-%m-%d %H:%M");

    let _ = writeln!(out, "{}", weather.location_name);
    let _ = writeln!(
        out,
        "  Temperature: {:.1}°C (feels like {:.1}°C)",
        weather.temperature_c, weather.feels_like_c
    );
    let _ = writeln!(out, "  Weather:     {}", weather.condition);
    let _ = writeln!(out, "  Humidity:    {}%", weather.humidity_pct);
    let _ = writeln!(out, "  Wind Speed:  {:.1} m/s", weather.wind_speed_mps);
    let _ = writeln!(out, "  Observed:    {observed}");
}

pub fn render_suggestions(suggestions: &[Suggestion]) -> String {
    let mut out = String::new();
    if suggestions.is_empty() {
        return out;
    }

    out.push_str("Did you mean:\n");
    for suggestion in suggestions {
        let _ = writeln!(out, "  - {suggestion}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use weather_core::WeatherState;

    fn london() -> WeatherResult {
        WeatherResult {
            location_name: "London".into(),
            temperature_c: 11.52,
            feels_like_c: 10.87,
            condition: "light rain".into(),
            humidity_pct: 87,
            wind_speed_mps: 4.63,
            observed_at: Utc::now(),
        }
    }

    #[test]
    fn idle_renders_nothing() {
        assert_eq!(render(&SearchView::default()), "");
    }

    #[test]
    fn success_renders_all_fields() {
        let view = SearchView {
            query: "London, GB".into(),
            suggestions: vec![],
            weather: WeatherState::Success(london()),
        };

        let out = render(&view);
        assert!(out.starts_with("London\n"));
        assert!(out.contains("Temperature: 11.5°C (feels like 10.9°C)"));
        assert!(out.contains("Weather:     light rain"));
        assert!(out.contains("Humidity:    87%"));
        assert!(out.contains("Wind Speed:  4.6 m/s"));
        assert!(!out.contains("Error"));
    }

    #[test]
    fn failure_renders_message_and_stale_result() {
        let view = SearchView {
            query: "Atlantis".into(),
            suggestions: vec![],
            weather: WeatherState::Failed { message: "nope".into(), stale: Some(london()) },
        };

        let out = render(&view);
        assert!(out.starts_with("Error: nope\nLast result:\nLondon\n"));
    }

    #[test]
    fn loading_hides_weather() {
        let view = SearchView {
            query: "London".into(),
            suggestions: vec![],
            weather: WeatherState::Loading { previous: Some(london()) },
        };

        assert_eq!(render(&view), "Loading...\n");
    }

    #[test]
    fn suggestions_list_labels() {
        let suggestions = vec![Suggestion {
            name: "London".into(),
            country: "CA".into(),
            state: Some("Ontario".into()),
            lat: 42.98,
            lon: -81.24,
        }];

        assert_eq!(render_suggestions(&suggestions), "Did you mean:\n  - London, CA (Ontario)\n");
        assert_eq!(render_suggestions(&[]), "");
    }
}

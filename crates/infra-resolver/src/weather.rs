//! Weather context resolution via Open-Meteo.
//!
//! Failure always degrades to `None`: callers treat absent weather as "no
//! threat amplification", never as an error. Responses are memoized in a
//! TTL cache keyed by coordinates rounded to two decimals.

use event_core::WeatherContext;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::warn;

const OPEN_METEO_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Default cache TTL: 5 minutes.
const CACHE_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Deserialize)]
struct OpenMeteoResponse {
    current_weather: OpenMeteoCurrent,
}

#[derive(Debug, Deserialize)]
struct OpenMeteoCurrent {
    #[serde(default)]
    temperature: f64,
    #[serde(default)]
    windspeed: f64,
    #[serde(default)]
    weathercode: i64,
}

struct CacheEntry {
    weather: WeatherContext,
    expires_at: Instant,
}

/// Open-Meteo backed weather resolver with pass-through TTL memoization.
pub struct WeatherResolver {
    client: reqwest::Client,
    base_url: String,
    cache: Arc<RwLock<HashMap<String, CacheEntry>>>,
    ttl: Duration,
}

impl WeatherResolver {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: OPEN_METEO_URL.to_string(),
            cache: Arc::new(RwLock::new(HashMap::new())),
            ttl: CACHE_TTL,
        }
    }

    fn cache_key(lat: f64, lon: f64) -> String {
        format!("{:.2},{:.2}", lat, lon)
    }

    /// Current weather at a location, or `None` on any failure.
    pub async fn fetch_event_weather(&self, lat: f64, lon: f64) -> Option<WeatherContext> {
        let key = Self::cache_key(lat, lon);

        {
            let cache = self.cache.read().await;
            if let Some(entry) = cache.get(&key) {
                if entry.expires_at > Instant::now() {
                    return Some(entry.weather.clone());
                }
            }
        }

        let weather = match self.fetch_uncached(lat, lon).await {
            Ok(wx) => wx,
            Err(e) => {
                warn!(lat, lon, "weather fetch failed: {e}");
                return None;
            }
        };

        let mut cache = self.cache.write().await;
        cache.insert(
            key,
            CacheEntry {
                weather: weather.clone(),
                expires_at: Instant::now() + self.ttl,
            },
        );

        Some(weather)
    }

    async fn fetch_uncached(&self, lat: f64, lon: f64) -> Result<WeatherContext, String> {
        let url = format!(
            "{}?latitude={:.4}&longitude={:.4}&current_weather=true",
            self.base_url, lat, lon
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            return Err(format!("Open-Meteo returned status {}", response.status()));
        }

        let data: OpenMeteoResponse = response.json().await.map_err(|e| e.to_string())?;

        Ok(WeatherContext {
            temp_c: data.current_weather.temperature,
            wind_kph: data.current_weather.windspeed,
            condition: interpret_weather_code(data.current_weather.weathercode).to_string(),
        })
    }
}

/// WMO weather interpretation codes to a human condition string.
pub fn interpret_weather_code(code: i64) -> &'static str {
    match code {
        0 => "Clear sky",
        1..=3 => "Partly cloudy",
        4..=49 => "Fog",
        50..=59 => "Drizzle",
        60..=69 => "Rain",
        70..=79 => "Snow",
        80..=89 => "Showers",
        c if c >= 95 => "Thunderstorm/Hail",
        _ => "Unknown",
    }
}

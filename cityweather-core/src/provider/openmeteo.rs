use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{Coordinate, FetchError, RunContext, WeatherReading, provider::get_json};

use super::WeatherFetcher;

/// Current conditions from the Open-Meteo forecast API.
#[derive(Debug, Clone)]
pub struct OpenMeteoFetcher {
    http: Client,
    forecast_url: String,
}

impl OpenMeteoFetcher {
    pub fn new(http: Client, base_url: &str) -> Self {
        Self {
            http,
            forecast_url: format!("{}/v1/forecast", base_url.trim_end_matches('/')),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OmCurrentWeather {
    temperature: f64,
    windspeed: f64,
}

#[derive(Debug, Deserialize)]
struct OmResponse {
    current_weather: OmCurrentWeather,
}

#[async_trait]
impl WeatherFetcher for OpenMeteoFetcher {
    async fn fetch(
        &self,
        coord: &Coordinate,
        ctx: &RunContext,
    ) -> Result<WeatherReading, FetchError> {
        let request = self.http.get(&self.forecast_url).query(&[
            ("latitude", coord.lat.as_str()),
            ("longitude", coord.lon.as_str()),
            ("current_weather", "true"),
        ]);

        let parsed: OmResponse = get_json(request, ctx, "weather info").await?;

        Ok(WeatherReading {
            temperature_c: parsed.current_weather.temperature,
            windspeed_mps: parsed.current_weather.windspeed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher(server: &MockServer) -> OpenMeteoFetcher {
        OpenMeteoFetcher::new(Client::new(), &server.uri())
    }

    fn amsterdam() -> Coordinate {
        Coordinate {
            lat: "52.37".into(),
            lon: "4.89".into(),
        }
    }

    fn ctx() -> RunContext {
        RunContext::with_timeout(Duration::from_secs(5))
    }

    #[tokio::test]
    async fn reads_current_weather() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("latitude", "52.37"))
            .and(query_param("longitude", "4.89"))
            .and(query_param("current_weather", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "latitude": 52.37,
                "current_weather": { "temperature": 18.3, "windspeed": 4.26, "weathercode": 3 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reading = fetcher(&server)
            .fetch(&amsterdam(), &ctx())
            .await
            .unwrap();

        assert_eq!(reading.temperature_c, 18.3);
        assert_eq!(reading.windspeed_mps, 4.26);
    }

    #[tokio::test]
    async fn missing_current_weather_is_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "latitude": 52.37 })),
            )
            .mount(&server)
            .await;

        let err = fetcher(&server)
            .fetch(&amsterdam(), &ctx())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "DecodeError");
        assert!(err.to_string().contains("current_weather"));
    }

    #[tokio::test]
    async fn non_json_body_is_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = fetcher(&server)
            .fetch(&amsterdam(), &ctx())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "DecodeError");
    }

    #[tokio::test]
    async fn cancelled_context_sends_nothing() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let ctx = ctx();
        ctx.cancel();

        let err = fetcher(&server)
            .fetch(&amsterdam(), &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Cancelled));
    }
}

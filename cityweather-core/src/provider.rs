use crate::{
    Config, Coordinate, FetchError, RunContext, WeatherReading,
    provider::{nominatim::NominatimResolver, openmeteo::OpenMeteoFetcher},
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::{fmt::Debug, sync::Arc};

pub mod nominatim;
pub mod openmeteo;

/// Turns a city name into coordinates.
#[async_trait]
pub trait CoordinateResolver: Send + Sync + Debug {
    async fn resolve(&self, city: &str, ctx: &RunContext) -> Result<Coordinate, FetchError>;
}

/// Looks up current conditions at a coordinate.
#[async_trait]
pub trait WeatherFetcher: Send + Sync + Debug {
    async fn fetch(
        &self,
        coord: &Coordinate,
        ctx: &RunContext,
    ) -> Result<WeatherReading, FetchError>;
}

/// One HTTP client for every pipeline; reqwest pools connections internally.
pub fn http_client(user_agent: &str) -> Result<Client, FetchError> {
    Client::builder()
        .user_agent(user_agent)
        .build()
        .map_err(FetchError::from)
}

/// Build both service clients from config, sharing one connection pool.
pub fn providers_from_config(
    config: &Config,
) -> Result<(Arc<dyn CoordinateResolver>, Arc<dyn WeatherFetcher>), FetchError> {
    let http = http_client(&config.user_agent)?;

    let resolver = NominatimResolver::new(http.clone(), &config.geocoding_url);
    let fetcher = OpenMeteoFetcher::new(http, &config.weather_url);

    Ok((Arc::new(resolver), Arc::new(fetcher)))
}

/// Send `request` under `ctx` and decode a 2xx JSON body into `T`.
pub(crate) async fn get_json<T: DeserializeOwned>(
    request: RequestBuilder,
    ctx: &RunContext,
    what: &'static str,
) -> Result<T, FetchError> {
    let (client, request) = request.build_split();
    let request = request?;
    tracing::debug!(url = %request.url(), "sending {what} request");

    ctx.run(async move {
        let res = client.execute(request).await?;
        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(FetchError::status(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| FetchError::decode(what, e))
    })
    .await
}

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{Coordinate, FetchError, RunContext, provider::get_json};

use super::CoordinateResolver;

/// Forward geocoding against a Nominatim (OpenStreetMap) search endpoint.
#[derive(Debug, Clone)]
pub struct NominatimResolver {
    http: Client,
    search_url: String,
}

impl NominatimResolver {
    pub fn new(http: Client, base_url: &str) -> Self {
        Self {
            http,
            search_url: format!("{}/search", base_url.trim_end_matches('/')),
        }
    }
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

#[async_trait]
impl CoordinateResolver for NominatimResolver {
    async fn resolve(&self, city: &str, ctx: &RunContext) -> Result<Coordinate, FetchError> {
        let request = self
            .http
            .get(&self.search_url)
            .query(&[("city", city), ("format", "json")]);

        let places: Vec<NominatimPlace> = get_json(request, ctx, "city coordinates").await?;

        let first = places
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::NotFound {
                city: city.to_string(),
            })?;

        tracing::debug!(city, lat = %first.lat, lon = %first.lon, "resolved coordinates");

        Ok(Coordinate {
            lat: first.lat,
            lon: first.lon,
        })
    }
}

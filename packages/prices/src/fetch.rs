//! Radius search against the price provider.

use async_trait::async_trait;
use fuel_map_geo_models::GeoPoint;

use crate::PricesError;

/// Fetches the current prices around a point.
#[async_trait]
pub trait PriceFetcher: Send + Sync {
    /// Returns the provider's response body for all stations within
    /// `radius_km` of `center`, authenticated with `api_key`.
    ///
    /// # Errors
    ///
    /// Returns [`PricesError`] if the request fails or the provider
    /// reports an error.
    async fn fetch(
        &self,
        center: GeoPoint,
        radius_km: f64,
        api_key: &str,
    ) -> Result<String, PricesError>;
}

/// [`PriceFetcher`] calling the provider's HTTP list endpoint.
pub struct HttpPriceFetcher {
    client: reqwest::Client,
    url: String,
}

impl HttpPriceFetcher {
    /// Creates a fetcher for the list endpoint at `url`.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    /// Creates a fetcher sharing an existing client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl PriceFetcher for HttpPriceFetcher {
    async fn fetch(
        &self,
        center: GeoPoint,
        radius_km: f64,
        api_key: &str,
    ) -> Result<String, PricesError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("lat", center.latitude.to_string()),
                ("lng", center.longitude.to_string()),
                ("rad", radius_km.to_string()),
                ("sort", "dist".to_string()),
                ("type", "all".to_string()),
                ("apikey", api_key.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        check_body(&body)?;
        Ok(body)
    }
}

/// Rejects bodies the provider marked as failed with `"ok": false`.
fn check_body(body: &str) -> Result<(), PricesError> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    if value.get("ok").and_then(serde_json::Value::as_bool) == Some(false) {
        let message = value
            .get("message")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("no message")
            .to_string();
        return Err(PricesError::Api { message });
    }
    Ok(())
}

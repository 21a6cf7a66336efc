use crate::config::Config;
use crate::error::CarrierError;
use crate::models::{Event, ShipmentResponse};
use async_trait::async_trait;
use reqwest::Client as HttpClient;

/// Correos search type for parcel lookups.
const SEARCH_TYPE: &str = "envio";

#[async_trait]
pub trait CarrierClient: Send + Sync {
    /// Tracking history for `tracking_number`, oldest first. An unknown number
    /// yields an empty list rather than an error.
    async fn fetch_events(&self, tracking_number: &str) -> Result<Vec<Event>, CarrierError>;
}

/// Fetch events, treating every failure as "no data this cycle".
pub async fn events_or_empty(carrier: &dyn CarrierClient, tracking_number: &str) -> Vec<Event> {
    match carrier.fetch_events(tracking_number).await {
        Ok(events) => events,
        Err(e) => {
            tracing::warn!(tracking_number = %tracking_number, "Carrier lookup failed: {e}");
            Vec::new()
        }
    }
}

pub struct CorreosClient {
    http: HttpClient,
    api_url: String,
    language: String,
}

impl CorreosClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: HttpClient::new(),
            api_url: config.api_url.clone(),
            language: config.language.clone(),
        }
    }
}

#[async_trait]
impl CarrierClient for CorreosClient {
    async fn fetch_events(&self, tracking_number: &str) -> Result<Vec<Event>, CarrierError> {
        let response = self
            .http
            .get(&self.api_url)
            .query(&[
                ("text", tracking_number),
                ("language", self.language.as_str()),
                ("searchType", SEARCH_TYPE),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CarrierError::Status(status));
        }

        let body = response.text().await?;
        let events = ShipmentResponse::from_json(&body)?.into_events();
        tracing::debug!(
            tracking_number = %tracking_number,
            events = events.len(),
            "Fetched shipment events"
        );
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingCarrier;

    #[async_trait]
    impl CarrierClient for FailingCarrier {
        async fn fetch_events(&self, _tracking_number: &str) -> Result<Vec<Event>, CarrierError> {
            Err(CarrierError::Status(reqwest::StatusCode::BAD_GATEWAY))
        }
    }

    struct MalformedCarrier;

    #[async_trait]
    impl CarrierClient for MalformedCarrier {
        async fn fetch_events(&self, _tracking_number: &str) -> Result<Vec<Event>, CarrierError> {
            Ok(ShipmentResponse::from_json("not json")?.into_events())
        }
    }

    #[tokio::test]
    async fn transport_failure_is_treated_as_no_data() {
        assert!(events_or_empty(&FailingCarrier, "ABC123").await.is_empty());
    }

    #[tokio::test]
    async fn parse_failure_is_distinguishable_and_treated_as_no_data() {
        let err = MalformedCarrier.fetch_events("ABC123").await.unwrap_err();
        assert!(matches!(err, CarrierError::Parse(_)));
        assert!(events_or_empty(&MalformedCarrier, "ABC123").await.is_empty());
    }
}

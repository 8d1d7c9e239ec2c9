use crate::domain::model::{PriceQuoteRequest, PriceQuoteResult};
use crate::domain::ports::{ConfigProvider, PricingService};
use crate::utils::error::Result;
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(crate::config::DEFAULT_TIMEOUT_SECONDS);

/// `POST {base_url}/get-price` client for the remote pricing service.
#[derive(Debug, Clone)]
pub struct HttpPricingClient {
    endpoint: String,
    client: Client,
}

impl HttpPricingClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            endpoint: format!("{}/get-price", base_url.trim_end_matches('/')),
            client,
        })
    }

    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Result<Self> {
        Self::new(config.pricing_endpoint(), config.request_timeout())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl PricingService for HttpPricingClient {
    async fn request_price(&self, request: &PriceQuoteRequest) -> Result<PriceQuoteResult> {
        tracing::debug!(
            "📡 POST {} (product={}, quantity={}, location={}, language={})",
            self.endpoint,
            request.product,
            request.quantity,
            request.location,
            request.language
        );

        let response = self.client.post(&self.endpoint).json(request).send().await?;
        tracing::debug!("📡 Pricing response status: {}", response.status());

        let result: PriceQuoteResult = response.error_for_status()?.json().await?;
        tracing::info!("💰 Received price range: {}", result.price_range);
        Ok(result)
    }
}

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, info};

use super::MarketDataApi;
use crate::domain::market::{CoinMarket, Exchange};
use crate::domain::ticker::Ticker;
use crate::infrastructure::http::{with_retry, RetryPolicy};
use crate::shared::errors::FetchError;
use crate::shared::types::ApiConfig;

/// `/exchanges/{id}/tickers` and `/coins/{id}/tickers` share this envelope
#[derive(Debug, Deserialize)]
struct TickersResponse {
    #[serde(default)]
    tickers: Vec<RawTicker>,
}

#[derive(Debug, Deserialize)]
struct RawTicker {
    base: String,
    #[serde(default)]
    coin_id: Option<String>,
    target: String,
    market: RawMarket,
    last: Option<f64>,
    volume: Option<f64>,
    #[serde(default)]
    converted_last: HashMap<String, f64>,
    #[serde(default)]
    is_stale: bool,
    #[serde(default)]
    is_anomaly: bool,
}

#[derive(Debug, Deserialize)]
struct RawMarket {
    identifier: String,
}

impl RawTicker {
    fn usable(&self) -> bool {
        !self.is_stale && !self.is_anomaly
    }

    fn into_ticker(self) -> Ticker {
        Ticker {
            usd_price: self.converted_last.get("usd").copied(),
            exchange_id: self.market.identifier,
            coin_id: self.coin_id,
            base: self.base,
            target: self.target,
            last_price: self.last,
            volume: self.volume,
        }
    }
}

fn decode<T: DeserializeOwned>(url: &str, body: &str) -> Result<T, FetchError> {
    if body.trim().is_empty() {
        return Err(FetchError::EmptyResponse(url.to_string()));
    }
    serde_json::from_str(body).map_err(|e| FetchError::Decode {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

fn tickers_from_body(url: &str, body: &str) -> Result<Vec<Ticker>, FetchError> {
    let response: TickersResponse = decode(url, body)?;
    Ok(response
        .tickers
        .into_iter()
        .filter(RawTicker::usable)
        .map(RawTicker::into_ticker)
        .collect())
}

/// CoinGecko v3 REST client
pub struct CoinGeckoClient {
    http_client: Client,
    base_url: String,
    vs_currency: String,
    retry: RetryPolicy,
}

impl CoinGeckoClient {
    pub fn new(config: &ApiConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = config.api_key.as_deref().filter(|k| !k.is_empty()) {
            let name = HeaderName::from_bytes(config.api_key_header.as_bytes())
                .map_err(|e| FetchError::InvalidHeader(format!("bad API key header name: {}", e)))?;
            let mut value = HeaderValue::from_str(key)
                .map_err(|e| FetchError::InvalidHeader(format!("bad API key value: {}", e)))?;
            value.set_sensitive(true);
            headers.insert(name, value);
        }

        let http_client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            vs_currency: config.vs_currency.clone(),
            retry: RetryPolicy::from_config(config),
        })
    }

    fn url(&self, path: &str, params: &[(&str, String)]) -> Result<Url, FetchError> {
        let raw = format!("{}{}", self.base_url, path);
        let parsed = if params.is_empty() {
            Url::parse(&raw)
        } else {
            Url::parse_with_params(&raw, params)
        };
        parsed.map_err(|e| FetchError::InvalidUrl(format!("{}: {}", raw, e)))
    }

    fn exchange_ticker_params(coin_ids: &[String]) -> Vec<(&'static str, String)> {
        let mut params = vec![("order", "volume_desc".to_string())];
        if !coin_ids.is_empty() {
            params.push(("coin_ids", coin_ids.join(",")));
        }
        params
    }

    /// Single attempt: send, check status, read body
    async fn get_body(&self, url: &Url) -> Result<String, FetchError> {
        let response = self.http_client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.text().await?)
    }

    async fn fetch_body(&self, what: &str, url: &Url) -> Result<String, FetchError> {
        debug!("🔍 GET {}", url);
        with_retry(&self.retry, what, || self.get_body(url)).await
    }
}

#[async_trait]
impl MarketDataApi for CoinGeckoClient {
    async fn coins_markets(&self, coin_ids: &[String], per_page: u32) -> Result<Vec<CoinMarket>, FetchError> {
        let mut params = vec![
            ("vs_currency", self.vs_currency.clone()),
            ("order", "market_cap_desc".to_string()),
            ("per_page", per_page.to_string()),
            ("page", "1".to_string()),
            ("sparkline", "false".to_string()),
            ("price_change_percentage", "24h".to_string()),
        ];
        if !coin_ids.is_empty() {
            params.push(("ids", coin_ids.join(",")));
        }

        let url = self.url("/coins/markets", &params)?;
        let body = self.fetch_body("coins/markets", &url).await?;
        let coins: Vec<CoinMarket> = decode(url.as_str(), &body)?;
        if coins.is_empty() {
            return Err(FetchError::EmptyResponse(url.to_string()));
        }

        info!("✅ Fetched {} coin market rows", coins.len());
        Ok(coins)
    }

    async fn exchanges(&self, per_page: u32) -> Result<Vec<Exchange>, FetchError> {
        let url = self.url(
            "/exchanges",
            &[("per_page", per_page.to_string()), ("page", "1".to_string())],
        )?;
        let body = self.fetch_body("exchanges", &url).await?;
        let exchanges: Vec<Exchange> = decode(url.as_str(), &body)?;
        if exchanges.is_empty() {
            return Err(FetchError::EmptyResponse(url.to_string()));
        }

        info!("✅ Fetched {} exchanges", exchanges.len());
        Ok(exchanges)
    }

    async fn exchange_tickers(&self, exchange_id: &str, coin_ids: &[String]) -> Result<Vec<Ticker>, FetchError> {
        let url = self.url(
            &format!("/exchanges/{}/tickers", exchange_id),
            &Self::exchange_ticker_params(coin_ids),
        )?;
        let what = format!("exchanges/{}/tickers", exchange_id);
        let body = self.fetch_body(&what, &url).await?;
        tickers_from_body(url.as_str(), &body)
    }

    async fn coin_tickers(&self, coin_id: &str, exchange_ids: &[String]) -> Result<Vec<Ticker>, FetchError> {
        let mut params = vec![("include_exchange_logo", "false".to_string())];
        if !exchange_ids.is_empty() {
            params.push(("exchange_ids", exchange_ids.join(",")));
        }

        let url = self.url(&format!("/coins/{}/tickers", coin_id), &params)?;
        let what = format!("coins/{}/tickers", coin_id);
        let body = self.fetch_body(&what, &url).await?;
        tickers_from_body(url.as_str(), &body)
    }
}

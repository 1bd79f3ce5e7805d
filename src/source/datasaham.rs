use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::config::Config;
use crate::models::{LadderSide, MarketSnapshot, OrderBookLadder, PriceLevel};
use crate::source::OrderBookSource;

#[derive(Debug, Deserialize)]
struct OrderBookResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    data: Option<RawOrderBook>,
}

#[derive(Debug, Deserialize)]
struct RawOrderBook {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    lastprice: Value,
    #[serde(default)]
    high: Value,
    #[serde(default)]
    low: Value,
    #[serde(default)]
    volume: Value,
    #[serde(default)]
    bid: Vec<RawLevel>,
    #[serde(default)]
    offer: Vec<RawLevel>,
    #[serde(default)]
    fbuy: Value,
    #[serde(default)]
    fsell: Value,
    #[serde(default)]
    fnet: Value,
}

#[derive(Debug, Deserialize)]
struct RawLevel {
    #[serde(default)]
    price: Value,
    #[serde(default)]
    que_num: Value,
    #[serde(default)]
    volume: Value,
}

/// Datasaham order-book endpoint. Volumes arrive in shares and are converted
/// to lots.
pub struct DatasahamClient {
    client: Client,
    api_key: String,
    base_url: String,
    request_delay: Duration,
    last_request: Option<Instant>,
}

impl DatasahamClient {
    pub fn new(cfg: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.request_timeout))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            api_key: cfg.api_key.clone(),
            base_url: cfg.base_url.clone(),
            request_delay: Duration::from_millis(cfg.request_delay_ms),
            last_request: None,
        })
    }

    async fn rate_limit(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.request_delay {
                tokio::time::sleep(self.request_delay - elapsed).await;
            }
        }
        self.last_request = Some(Instant::now());
    }

    pub async fn fetch_orderbook(&mut self, symbol: &str) -> Result<MarketSnapshot> {
        self.rate_limit().await;

        let url = format!("{}/emiten/{}/orderbook", self.base_url, symbol);
        debug!("GET {}", url);

        let resp = self
            .client
            .get(&url)
            .header("x-api-key", &self.api_key)
            .send()
            .await
            .with_context(|| format!("Failed to fetch order book for {}", symbol))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Datasaham API error {}: {}", status, body);
        }

        let body: OrderBookResponse = resp
            .json()
            .await
            .context("Failed to parse order book response")?;

        if !body.success {
            anyhow::bail!(
                "Datasaham rejected {}: {}",
                symbol,
                body.message.unwrap_or_default()
            );
        }
        let raw = body
            .data
            .with_context(|| format!("No order book data for {}", symbol))?;

        Ok(parse_orderbook(symbol, raw))
    }
}

#[async_trait]
impl OrderBookSource for DatasahamClient {
    async fn fetch_snapshot(&mut self, symbol: &str) -> Result<MarketSnapshot> {
        self.fetch_orderbook(symbol).await
    }
}

fn parse_orderbook(symbol: &str, raw: RawOrderBook) -> MarketSnapshot {
    let side = |rows: &[RawLevel]| {
        LadderSide::new(
            rows.iter()
                .map(|r| {
                    PriceLevel::new(
                        number(&r.price),
                        number(&r.volume).max(0.0) as u64,
                        number(&r.que_num).max(0.0) as u64,
                    )
                })
                .collect(),
        )
    };
    let ladder = OrderBookLadder {
        bids: side(&raw.bid),
        offers: side(&raw.offer),
    }
    .to_lots();

    MarketSnapshot {
        symbol: symbol.to_string(),
        name: raw.name.unwrap_or_default(),
        last_price: number(&raw.lastprice),
        high: number(&raw.high),
        low: number(&raw.low),
        volume: number(&raw.volume),
        ladder,
        foreign_buy: number(&raw.fbuy),
        foreign_sell: number(&raw.fsell),
        foreign_net: number(&raw.fnet),
        timestamp: Utc::now(),
    }
}

/// The feed mixes JSON numbers and formatted strings ("1,234"); missing or
/// garbled values read as zero.
fn number(v: &Value) -> f64 {
    match v {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.replace(',', "").trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

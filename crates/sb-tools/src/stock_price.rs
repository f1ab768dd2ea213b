//! Stock price lookup tool
//!
//! Fetches the most recent one-day trading window from a Yahoo-style chart
//! endpoint and reports the latest close together with the exchange's
//! reporting currency.

use async_trait::async_trait;
use reqwest::Client;
use sb_core::{Error, Result, Tool, ToolResult};
use serde::Deserialize;
use serde_json::{json, Value};

/// Stock price tool backed by a chart/quote HTTP endpoint
pub struct StockPriceTool {
    client: Client,
    base_url: String,
}

impl StockPriceTool {
    /// Create a new tool against the given quote service base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (compatible; stockbot/0.1)")
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Look up the latest close price and reporting currency for `ticker`
    /// over the most recent one-day trading window.
    async fn latest_quote(&self, ticker: &str) -> Result<(f64, String)> {
        let url = format!(
            "{}/v8/finance/chart/{}?range=1d&interval=1d",
            self.base_url.trim_end_matches('/'),
            ticker
        );

        tracing::info!(ticker = %ticker, "Fetching quote");

        let response = self.client.get(&url).send().await.map_err(Error::Http)?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::TickerNotFound(ticker.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Tool(format!(
                "Quote service error ({}): {}",
                status, body
            )));
        }

        let envelope: ChartEnvelope = response.json().await.map_err(Error::Http)?;

        let result = envelope
            .chart
            .result
            .and_then(|mut results| {
                if results.is_empty() {
                    None
                } else {
                    Some(results.remove(0))
                }
            })
            .ok_or_else(|| Error::TickerNotFound(ticker.to_string()))?;

        let currency = result
            .meta
            .currency
            .ok_or_else(|| Error::TickerNotFound(ticker.to_string()))?;

        // Latest close from the window; the live market price stands in
        // when the day's closes are not populated yet.
        let close = result
            .indicators
            .quote
            .first()
            .and_then(|q| q.close.as_ref())
            .and_then(|closes| closes.iter().rev().find_map(|c| *c));

        let price = close
            .or(result.meta.regular_market_price)
            .ok_or_else(|| Error::TickerNotFound(ticker.to_string()))?;

        Ok((price, currency))
    }
}

// -- Chart endpoint response shapes ------------------------------------------

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    currency: Option<String>,
    #[serde(rename = "regularMarketPrice")]
    regular_market_price: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteBlock>,
}

#[derive(Debug, Deserialize)]
struct QuoteBlock {
    close: Option<Vec<Option<f64>>>,
}

/// Quote input parameters
#[derive(Debug, Deserialize)]
struct QuoteInput {
    /// Ticker symbol to look up
    ticker: String,
}

#[async_trait]
impl Tool for StockPriceTool {
    fn name(&self) -> &str {
        "get_stock_price"
    }

    fn description(&self) -> &str {
        "Retrieves the current stock price for a given ticker symbol, and the currency it \
         is traded in. The ticker symbol must be a valid symbol for a publicly traded \
         company on a major US stock exchange like NYSE or NASDAQ. Returns the latest \
         trade price. Use it when the user asks about the current or most recent price of \
         a specific stock. It provides no other information about the stock or company."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "ticker": {
                    "type": "string",
                    "description": "The ticker symbol of the company. e.g. AAPL for Apple Inc."
                }
            },
            "required": ["ticker"]
        })
    }

    async fn execute(&self, input: Value) -> Result<ToolResult> {
        let input: QuoteInput = match serde_json::from_value(input) {
            Ok(input) => input,
            Err(e) => {
                return Ok(ToolResult::error(format!("Invalid input parameters: {}", e)));
            }
        };

        let ticker = input.ticker.trim().to_uppercase();
        if ticker.is_empty() {
            return Ok(ToolResult::error("Ticker cannot be empty"));
        }

        match self.latest_quote(&ticker).await {
            Ok((price, currency)) => Ok(ToolResult::success(
                json!({
                    "ticker": ticker,
                    "price": price,
                    "currency": currency,
                })
                .to_string(),
            )),
            Err(e) => Ok(ToolResult::error(format!(
                "Failed to fetch quote: {}",
                e
            ))),
        }
    }
}

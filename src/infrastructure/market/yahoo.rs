//! Yahoo Finance fundamentals provider using the public quoteSummary API
//! (no auth required).

use crate::domain::ports::market_data::MarketDataProvider;
use crate::domain::values::snapshot::MarketSnapshot;
use async_trait::async_trait;
use chrono::Utc;
use std::time::Duration;
use tracing::warn;

pub struct YahooProvider {
    client: reqwest::Client,
}

impl YahooProvider {
    /// `timeout` bounds every request; a slow upstream degrades to a missing
    /// snapshot instead of stalling the run.
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(
                    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                     AppleWebKit/537.36 (KHTML, like Gecko) \
                     Chrome/120.0.0.0 Safari/537.36",
                )
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
        }
    }

    async fn fetch(&self, symbol: &str) -> Result<MarketSnapshot, String> {
        let url = format!(
            "https://query1.finance.yahoo.com/v10/finance/quoteSummary/{symbol}\
             ?modules=price,summaryDetail,financialData,defaultKeyStatistics,summaryProfile"
        );

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;

        if !resp.status().is_success() {
            return Err(format!("Yahoo API returned {} for {symbol}", resp.status()));
        }

        let data: QuoteSummaryResponse = resp
            .json()
            .await
            .map_err(|e| format!("parse failed: {e}"))?;

        if let Some(err) = data.quote_summary.error {
            return Err(format!("Yahoo error: {err}"));
        }

        let result = data
            .quote_summary
            .result
            .and_then(|mut results| {
                if results.is_empty() {
                    None
                } else {
                    Some(results.remove(0))
                }
            })
            .ok_or_else(|| format!("no quoteSummary result for {symbol}"))?;

        let price_block = result.price.unwrap_or_default();
        let summary = result.summary_detail.unwrap_or_default();
        let financial = result.financial_data.unwrap_or_default();
        let statistics = result.default_key_statistics.unwrap_or_default();
        let profile = result.summary_profile.unwrap_or_default();

        let price = price_block
            .regular_market_price
            .raw()
            .filter(|p| *p > 0.0)
            .ok_or_else(|| format!("no price for {symbol}"))?;

        Ok(MarketSnapshot {
            symbol: symbol.to_uppercase(),
            price,
            pe_ratio: summary.trailing_pe.raw(),
            pb_ratio: statistics.price_to_book.raw(),
            peg_ratio: statistics.peg_ratio.raw(),
            market_cap: price_block.market_cap.raw().or(summary.market_cap.raw()),
            dividend_yield: summary.dividend_yield.raw(),
            current_ratio: financial.current_ratio.raw(),
            debt_to_equity: financial.debt_to_equity.raw(),
            revenue_growth: financial.revenue_growth.raw(),
            earnings_growth: financial.earnings_growth.raw(),
            profit_margin: financial.profit_margins.raw(),
            return_on_equity: financial.return_on_equity.raw(),
            beta: summary.beta.raw(),
            fifty_two_week_high: summary.fifty_two_week_high.raw(),
            fifty_two_week_low: summary.fifty_two_week_low.raw(),
            sector: profile.sector,
            fetched_at: Utc::now(),
        })
    }
}

#[async_trait]
impl MarketDataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    async fn snapshot(&self, symbol: &str) -> Option<MarketSnapshot> {
        match self.fetch(symbol).await {
            Ok(snap) => Some(snap),
            Err(e) => {
                warn!(symbol, error = %e, "quote fetch failed");
                None
            }
        }
    }
}

// Yahoo wraps every numeric field as {"raw": 12.3, "fmt": "12.30"}.
#[derive(Debug, Default, serde::Deserialize)]
struct RawValue {
    #[serde(default)]
    raw: Option<f64>,
}

impl RawValue {
    fn raw(&self) -> Option<f64> {
        self.raw.filter(|v| v.is_finite())
    }
}

#[derive(Debug, serde::Deserialize)]
struct QuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummaryResult,
}

#[derive(Debug, serde::Deserialize)]
struct QuoteSummaryResult {
    result: Option<Vec<QuoteModules>>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteModules {
    price: Option<PriceModule>,
    summary_detail: Option<SummaryDetailModule>,
    financial_data: Option<FinancialDataModule>,
    default_key_statistics: Option<KeyStatisticsModule>,
    summary_profile: Option<SummaryProfileModule>,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceModule {
    #[serde(default)]
    regular_market_price: RawValue,
    #[serde(default)]
    market_cap: RawValue,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryDetailModule {
    #[serde(default)]
    trailing_pe: RawValue,
    #[serde(default)]
    market_cap: RawValue,
    #[serde(default)]
    dividend_yield: RawValue,
    #[serde(default)]
    beta: RawValue,
    #[serde(default)]
    fifty_two_week_high: RawValue,
    #[serde(default)]
    fifty_two_week_low: RawValue,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct FinancialDataModule {
    #[serde(default)]
    current_ratio: RawValue,
    #[serde(default)]
    debt_to_equity: RawValue,
    #[serde(default)]
    revenue_growth: RawValue,
    #[serde(default)]
    earnings_growth: RawValue,
    #[serde(default)]
    profit_margins: RawValue,
    #[serde(default)]
    return_on_equity: RawValue,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyStatisticsModule {
    #[serde(default)]
    price_to_book: RawValue,
    #[serde(default)]
    peg_ratio: RawValue,
}

#[derive(Debug, Default, serde::Deserialize)]
struct SummaryProfileModule {
    #[serde(default)]
    sector: Option<String>,
}

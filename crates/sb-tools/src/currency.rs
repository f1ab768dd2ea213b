//! Currency conversion tool
//!
//! Converts between ISO currencies through euro reference rates, the way
//! central-bank reference tables quote them (units of currency per 1 EUR).
//! No network access; the table is fixed at build time.

use async_trait::async_trait;
use sb_core::{Error, Result, Tool, ToolResult};
use serde::Deserialize;
use serde_json::{json, Value};

/// Euro foreign-exchange reference rates: units per 1 EUR.
const EUR_RATES: &[(&str, f64)] = &[
    ("EUR", 1.0),
    ("USD", 1.0867),
    ("JPY", 161.22),
    ("GBP", 0.8459),
    ("CHF", 0.9407),
    ("AUD", 1.6404),
    ("CAD", 1.4811),
    ("CNY", 7.7813),
    ("SEK", 11.2742),
    ("NOK", 11.6345),
    ("DKK", 7.4587),
    ("PLN", 4.2843),
    ("CZK", 25.148),
    ("HUF", 392.45),
    ("INR", 90.672),
    ("KRW", 1478.33),
    ("SGD", 1.4609),
    ("HKD", 8.4877),
    ("NZD", 1.7756),
    ("MXN", 19.394),
    ("BRL", 5.9051),
    ("ZAR", 19.7049),
];

fn eur_rate(code: &str) -> Result<f64> {
    EUR_RATES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, r)| *r)
        .ok_or_else(|| Error::UnknownCurrency(code.to_string()))
}

/// Convert `amount` from `source` to `target` via euro cross rates.
///
/// Identity conversions return the amount unchanged.
pub fn convert(amount: f64, source: &str, target: &str) -> Result<f64> {
    let source = source.trim().to_uppercase();
    let target = target.trim().to_uppercase();

    if source == target {
        eur_rate(&source)?;
        return Ok(amount);
    }

    Ok(amount / eur_rate(&source)? * eur_rate(&target)?)
}

/// Conversion input parameters
#[derive(Debug, Deserialize)]
struct ConvertInput {
    /// Amount of the source currency to convert
    amount: f64,
    /// ISO code of the currency the amount is in
    source_currency: String,
    /// ISO code of the currency to convert to
    target_currency: String,
}

/// Currency conversion tool
pub struct CurrencyTool;

#[async_trait]
impl Tool for CurrencyTool {
    fn name(&self) -> &str {
        "convert_currency"
    }

    fn description(&self) -> &str {
        "Converts a given amount from one currency to another. Provide the amount, the \
         source currency, and the target currency as ISO codes (e.g. USD, EUR). Returns \
         the converted amount in the target currency. Use it whenever an amount needs to \
         be expressed in a different currency."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "amount": {
                    "type": "number",
                    "description": "The amount of the source currency to be converted."
                },
                "source_currency": {
                    "type": "string",
                    "description": "The currency of the amount provided. e.g. USD for US Dollars."
                },
                "target_currency": {
                    "type": "string",
                    "description": "The currency to convert the amount to. e.g. EUR for Euros."
                }
            },
            "required": ["amount", "source_currency", "target_currency"]
        })
    }

    async fn execute(&self, input: Value) -> Result<ToolResult> {
        let input: ConvertInput = match serde_json::from_value(input) {
            Ok(input) => input,
            Err(e) => {
                return Ok(ToolResult::error(format!("Invalid input parameters: {}", e)));
            }
        };

        match convert(input.amount, &input.source_currency, &input.target_currency) {
            Ok(converted) => Ok(ToolResult::success(
                json!({"converted_currency": converted}).to_string(),
            )),
            Err(e) => Ok(ToolResult::error(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_conversion_returns_amount_unchanged() {
        assert_eq!(convert(100.0, "USD", "USD").unwrap(), 100.0);
        assert_eq!(convert(0.0, "EUR", "EUR").unwrap(), 0.0);
    }

    #[test]
    fn test_usd_to_eur_uses_reference_rates() {
        let converted = convert(100.0, "USD", "EUR").unwrap();
        assert!((converted - 100.0 / 1.0867).abs() < 1e-9);
    }

    #[test]
    fn test_cross_rate_through_euro() {
        let converted = convert(185.4, "USD", "GBP").unwrap();
        assert!((converted - 185.4 / 1.0867 * 0.8459).abs() < 1e-9);
    }

    #[test]
    fn test_codes_are_case_insensitive() {
        let upper = convert(50.0, "USD", "GBP").unwrap();
        let lower = convert(50.0, "usd", "gbp").unwrap();
        assert_eq!(upper, lower);
    }

    #[test]
    fn test_unknown_currency_is_rejected() {
        let err = convert(10.0, "USD", "XYZ").unwrap_err();
        assert!(err.to_string().contains("XYZ"));

        // Identity with an unknown code still validates the code.
        assert!(convert(10.0, "XYZ", "XYZ").is_err());
    }

    #[tokio::test]
    async fn test_execute_returns_converted_payload() {
        let result = CurrencyTool
            .execute(json!({
                "amount": 100.0,
                "source_currency": "USD",
                "target_currency": "EUR"
            }))
            .await
            .unwrap();

        assert!(!result.is_error);
        let payload: Value = serde_json::from_str(&result.output).unwrap();
        assert!(payload["converted_currency"].as_f64().unwrap() > 0.0);
    }

    #[tokio::test]
    async fn test_execute_missing_field_is_error_result() {
        let result = CurrencyTool
            .execute(json!({"amount": 100.0, "source_currency": "USD"}))
            .await
            .unwrap();

        assert!(result.is_error);
        assert!(result.output.contains("target_currency"));
    }
}

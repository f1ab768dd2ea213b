//! sb-tools: Built-in tools for stockbot
//!
//! The two capabilities advertised to the model: stock price lookup and
//! currency conversion.

use sb_core::ToolRegistry;

pub mod currency;
pub mod stock_price;

pub use currency::CurrencyTool;
pub use stock_price::StockPriceTool;

use std::sync::Arc;

/// Register the default built-in tools with the registry
pub fn register_default_tools(registry: &mut ToolRegistry, quote_base_url: &str) {
    registry.register(Arc::new(StockPriceTool::new(quote_base_url)));
    registry.register(Arc::new(CurrencyTool));
}

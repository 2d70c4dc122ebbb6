//! Search backends and domain tools for Rangaayan.
//!
//! Tools give the orchestration loop access to live market data:
//! web search, page reading, competitor prices from Indian marketplaces,
//! margin arithmetic, and the seasonal demand calendar.
//!
//! Each use case gets its own registry so the model only sees the tools
//! relevant to the question.

pub mod competitor_prices;
pub mod fetch_page;
pub mod margin;
pub mod marketplace;
pub mod search;
pub mod seasonal;
pub mod web_search;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

use rangaayan_core::tool::ToolRegistry;
use std::sync::Arc;

pub use competitor_prices::CompetitorPricesTool;
pub use fetch_page::FetchPageTool;
pub use margin::MarginTool;
pub use marketplace::{CompetitorAnalyzer, CompetitorReport};
pub use search::{SearchError, SearchHit, SearchProvider, WebSearcher};
pub use seasonal::SeasonalTool;
pub use web_search::WebSearchTool;

/// Tools for price suggestions: web_search, fetch_page,
/// get_competitor_prices, calculate_margin.
pub fn pricing_tools(search: Arc<dyn SearchProvider>, page_max_chars: usize) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(
        WebSearchTool::new(search.clone())
            .with_description("Search the web for pricing data, market rates, and competitor strategies."),
    ));
    registry.register(Box::new(FetchPageTool::new(search.clone()).with_max_chars(page_max_chars)));
    registry.register(Box::new(CompetitorPricesTool::new(CompetitorAnalyzer::new(search))));
    registry.register(Box::new(MarginTool));
    registry
}

/// Tools for demand analysis: web_search, get_competitor_prices,
/// get_seasonal_info.
pub fn demand_tools(search: Arc<dyn SearchProvider>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(WebSearchTool::new(search.clone())));
    registry.register(Box::new(CompetitorPricesTool::new(CompetitorAnalyzer::new(search))));
    registry.register(Box::new(SeasonalTool));
    registry
}

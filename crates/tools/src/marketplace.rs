//! Competitor price aggregation from search results (no direct marketplace
//! scraping). Prices are pulled from result titles and snippets.

use crate::search::{SearchHit, SearchProvider};
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};
use tracing::{debug, warn};

/// First `₹` amount in a string, e.g. `₹1,299` or `₹ 249.00`.
static PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"₹\s*([\d,]+(?:\.\d{2})?)").expect("static price regex"));

const MIN_PRICE_INR: f64 = 1.0;
const MAX_PRICE_INR: f64 = 500_000.0;
const RESULTS_PER_QUERY: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub title: String,
    pub price_inr: f64,
    pub source: String,
}

/// Search-suggestion demand signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trends {
    pub query: String,
    pub related_searches: Vec<String>,
    pub demand_signal: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSummary {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub avg: Option<f64>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitorReport {
    pub product: String,
    pub listings: Vec<Listing>,
    pub trends: Trends,
    pub price_summary: PriceSummary,
}

/// Marketplace tag for a listing URL.
pub fn detect_source(url: &str) -> &'static str {
    const SOURCES: &[(&str, &str)] = &[
        ("amazon", "amazon.in"),
        ("flipkart", "flipkart"),
        ("indiamart", "indiamart"),
        ("meesho", "meesho"),
        ("jiomart", "jiomart"),
    ];
    SOURCES
        .iter()
        .find(|(needle, _)| url.contains(needle))
        .map(|(_, source)| *source)
        .unwrap_or("other")
}

/// One listing per hit that mentions a plausible INR price.
pub fn extract_listings(hits: &[SearchHit]) -> Vec<Listing> {
    hits.iter()
        .filter_map(|hit| {
            let text = format!("{} {}", hit.title, hit.snippet);
            let raw = PRICE_RE.captures(&text)?.get(1)?.as_str().replace(',', "");
            let price: f64 = raw.parse().ok()?;
            if !(MIN_PRICE_INR..=MAX_PRICE_INR).contains(&price) {
                return None;
            }
            Some(Listing {
                title: hit.title.clone(),
                price_inr: price,
                source: detect_source(&hit.url).to_string(),
            })
        })
        .collect()
}

pub fn demand_signal(suggestion_count: usize) -> &'static str {
    match suggestion_count {
        n if n > 5 => "high",
        n if n > 2 => "medium",
        _ => "low",
    }
}

pub fn summarize(listings: &[Listing]) -> PriceSummary {
    let prices: Vec<f64> = listings.iter().map(|l| l.price_inr).collect();
    if prices.is_empty() {
        return PriceSummary {
            min: None,
            max: None,
            avg: None,
            count: 0,
        };
    }
    let sum: f64 = prices.iter().sum();
    let avg = sum / prices.len() as f64;
    PriceSummary {
        min: prices.iter().copied().reduce(f64::min),
        max: prices.iter().copied().reduce(f64::max),
        avg: Some((avg * 100.0).round() / 100.0),
        count: prices.len(),
    }
}

/// Aggregates listings and demand signals for a product.
#[derive(Clone)]
pub struct CompetitorAnalyzer {
    search: Arc<dyn SearchProvider>,
}

impl CompetitorAnalyzer {
    pub fn new(search: Arc<dyn SearchProvider>) -> Self {
        Self { search }
    }

    /// Listings from a general and a marketplace-restricted query.
    async fn marketplace_listings(&self, product_name: &str) -> Vec<Listing> {
        let queries = [
            format!("{product_name} price buy India"),
            format!("{product_name} price site:amazon.in OR site:flipkart.com OR site:meesho.com"),
        ];
        let mut hits = Vec::new();
        for query in &queries {
            hits.extend(self.search.search(query, RESULTS_PER_QUERY).await);
        }
        extract_listings(&hits)
    }

    async fn trends(&self, product_name: &str) -> Trends {
        match self.search.suggestions(product_name).await {
            Ok(related_searches) => Trends {
                query: product_name.to_string(),
                demand_signal: demand_signal(related_searches.len()).to_string(),
                related_searches,
            },
            Err(e) => {
                warn!(error = %e, "Search suggestions failed");
                Trends {
                    query: product_name.to_string(),
                    related_searches: Vec::new(),
                    demand_signal: "unknown".into(),
                }
            }
        }
    }

    /// Run both lookups concurrently and summarize.
    pub async fn competitor_data(&self, product_name: &str) -> CompetitorReport {
        let (listings, trends) = tokio::join!(
            self.marketplace_listings(product_name),
            self.trends(product_name),
        );
        let price_summary = summarize(&listings);
        debug!(product = product_name, listings = listings.len(), "Competitor data collected");
        CompetitorReport {
            product: product_name.to_string(),
            listings,
            trends,
            price_summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::StaticSearch;

    fn hit(title: &str, url: &str, snippet: &str) -> SearchHit {
        SearchHit {
            title: title.into(),
            url: url.into(),
            snippet: snippet.into(),
        }
    }

    #[test]
    fn sources() {
        assert_eq!(detect_source("https://www.amazon.in/dp/1"), "amazon.in");
        assert_eq!(detect_source("https://www.flipkart.com/x"), "flipkart");
        assert_eq!(detect_source("https://dir.indiamart.com/x"), "indiamart");
        assert_eq!(detect_source("https://meesho.com/x"), "meesho");
        assert_eq!(detect_source("https://www.jiomart.com/x"), "jiomart");
        assert_eq!(detect_source("https://etsy.com/x"), "other");
    }

    #[test]
    fn first_price_per_hit_within_bounds() {
        let hits = vec![
            hit("Brass Diya ₹1,250.50", "https://amazon.in/a", "was ₹2,000"),
            hit("Diya set", "https://flipkart.com/b", "only ₹ 399"),
            hit("Free diya", "https://x.com", "₹0"),
            hit("Antique lamp", "https://x.com", "₹900,000"),
            hit("No price here", "https://x.com", "call for quote"),
        ];
        let listings = extract_listings(&hits);
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].price_inr, 1250.5);
        assert_eq!(listings[0].source, "amazon.in");
        assert_eq!(listings[1].price_inr, 399.0);
        assert_eq!(listings[1].title, "Diya set");
    }

    #[test]
    fn demand_signal_thresholds() {
        assert_eq!(demand_signal(0), "low");
        assert_eq!(demand_signal(2), "low");
        assert_eq!(demand_signal(3), "medium");
        assert_eq!(demand_signal(5), "medium");
        assert_eq!(demand_signal(6), "high");
    }

    #[test]
    fn summary_of_prices() {
        let listings: Vec<Listing> = [100.0, 200.0, 250.0]
            .into_iter()
            .map(|p| Listing {
                title: "t".into(),
                price_inr: p,
                source: "other".into(),
            })
            .collect();
        let summary = summarize(&listings);
        assert_eq!(summary.min, Some(100.0));
        assert_eq!(summary.max, Some(250.0));
        assert_eq!(summary.avg, Some(183.33));
        assert_eq!(summary.count, 3);

        let empty = summarize(&[]);
        assert_eq!(empty.count, 0);
        assert!(empty.avg.is_none());
    }

    #[tokio::test]
    async fn aggregates_both_queries_and_suggestions() {
        let search = StaticSearch::new()
            .with_hits(vec![hit("Jute bag ₹350", "https://meesho.com/j", "")])
            .with_suggestions(vec!["jute bag online".into(), "jute bag price".into(), "jute bags".into()]);
        let analyzer = CompetitorAnalyzer::new(Arc::new(search.clone()));

        let report = analyzer.competitor_data("jute bag").await;
        // The same hit comes back for both queries.
        assert_eq!(report.listings.len(), 2);
        assert_eq!(report.price_summary.avg, Some(350.0));
        assert_eq!(report.trends.demand_signal, "medium");

        let queries = search.queries();
        assert_eq!(queries.len(), 2);
        assert!(queries[0].contains("price buy India"));
        assert!(queries[1].contains("site:amazon.in"));
    }

    #[tokio::test]
    async fn failed_suggestions_degrade_to_unknown() {
        let search = StaticSearch::new().failing_suggestions();
        let report = CompetitorAnalyzer::new(Arc::new(search)).competitor_data("ghee").await;
        assert_eq!(report.trends.demand_signal, "unknown");
        assert!(report.listings.is_empty());
        assert_eq!(report.price_summary.count, 0);
    }
}

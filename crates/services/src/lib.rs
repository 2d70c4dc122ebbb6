//! Marketplace AI features for Rangaayan sellers.
//!
//! - **pricing** — price suggestion from live competitor and margin data
//! - **demand** — demand score, seasonal outlook, and selling advice
//! - **describe** — one-line product description and category
//! - **detect** — product detection and categorization from a photo
//! - **competitors** — raw competitor listings and demand signals
//!
//! Pricing and demand run the full tool-calling loop; describe and detect
//! are single tool-less rounds; competitors never calls the model.

pub mod competitors;
pub mod demand;
pub mod describe;
pub mod detect;
pub mod error;
pub mod parse;
pub mod pricing;

use rangaayan_agent::{LoopOutcome, ToolLoop};
use rangaayan_config::AppConfig;
use rangaayan_core::provider::Provider;
use rangaayan_tools::{CompetitorAnalyzer, SearchProvider, WebSearcher};
use std::sync::Arc;
use tracing::info;

pub use competitors::{CompetitorRequest, CompetitorService};
pub use demand::{DemandReport, DemandRequest, DemandService};
pub use describe::{DescribeRequest, DescribeService, Description};
pub use detect::{DetectService, Detection, DetectionResult, PRODUCT_CATEGORIES};
pub use error::ServiceError;
pub use pricing::{PricingReport, PricingRequest, PricingService};

/// Analysis text from a finished run. Blank answers are errors; an
/// exhausted run yields the fixed "could not complete" sentence.
pub(crate) fn analysis_text(outcome: LoopOutcome) -> Result<String, ServiceError> {
    match outcome {
        LoopOutcome::Answer(text) if text.trim().is_empty() => Err(ServiceError::EmptyAnalysis),
        outcome => Ok(outcome.into_text()),
    }
}

/// Every feature service, sharing one provider and one search backend.
#[derive(Clone)]
pub struct Services {
    pub pricing: PricingService,
    pub demand: DemandService,
    pub describe: DescribeService,
    pub detect: DetectService,
    pub competitors: CompetitorService,
}

impl Services {
    pub fn new(provider: Arc<dyn Provider>, search: Arc<dyn SearchProvider>, config: &AppConfig) -> Self {
        let tool_loop = ToolLoop::from_config(provider, &config.provider.model, &config.agent);

        Self {
            pricing: PricingService::new(
                tool_loop.clone(),
                rangaayan_tools::pricing_tools(search.clone(), config.search.page_max_chars),
            ),
            demand: DemandService::new(tool_loop.clone(), rangaayan_tools::demand_tools(search.clone())),
            describe: DescribeService::new(tool_loop.clone()),
            detect: DetectService::new(tool_loop),
            competitors: CompetitorService::new(CompetitorAnalyzer::new(search)),
        }
    }

    /// Build the OpenRouter-backed provider and the web searcher from config.
    pub fn from_config(config: &AppConfig) -> Result<Self, ServiceError> {
        let provider = rangaayan_providers::build_from_config(config)?;
        let search: Arc<dyn SearchProvider> = Arc::new(WebSearcher::new(config.search.clone())?);
        info!(
            provider = provider.name(),
            model = %config.provider.model,
            "Feature services ready"
        );
        Ok(Self::new(provider, search, config))
    }
}

//! Price suggestions backed by live competitor and market data.

use chrono::{DateTime, Local};
use rangaayan_agent::{LoopEvent, ToolLoop};
use rangaayan_core::message::Conversation;
use rangaayan_core::tool::ToolRegistry;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::info;

use crate::error::{ServiceError, non_blank, require_product};
use crate::parse::extract_price;

pub const SYSTEM_PROMPT: &str = "\
You are a pricing strategist for rural Indian products sold by women entrepreneurs on Rangaayan marketplace.

Use the available tools to gather real market data before responding.

Your response MUST begin with this exact line (replace N with your recommended price):
SUGGESTED_PRICE: ₹N

Then provide a concise analysis:
- Price range (minimum viable to premium)
- Competitor price comparison
- Margin analysis
- Pricing strategy recommendation
- Tips to justify the price

Keep it practical. Use plain text, no markdown headers or emojis.";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PricingRequest {
    pub product_name: String,
    #[serde(default)]
    pub cost_price: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub quality: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

impl PricingRequest {
    pub fn new(product_name: impl Into<String>) -> Self {
        Self {
            product_name: product_name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PricingReport {
    pub product: String,
    pub analysis: String,
    /// `₹N` as written by the model, if any price could be found.
    pub suggested_price: Option<String>,
    pub generated_at: DateTime<Local>,
}

/// The user turn for a pricing run.
pub fn user_message(request: &PricingRequest, product: &str) -> String {
    let mut msg = format!("Suggest optimal pricing for: {product}");
    if let Some(cost) = request.cost_price.filter(|c| *c != 0.0) {
        // Debug formatting keeps ".0" on whole amounts.
        msg.push_str(&format!("\nProduction cost: ₹{cost:?}"));
    }
    if let Some(category) = non_blank(&request.category) {
        msg.push_str(&format!("\nCategory: {category}"));
    }
    if let Some(quality) = non_blank(&request.quality) {
        msg.push_str(&format!("\nQuality: {quality}"));
    }
    if let Some(location) = non_blank(&request.location) {
        msg.push_str(&format!("\nLocation: {location}"));
    }
    msg.push_str("\n\nSearch for competitor prices and analyze the market to suggest the best price.");
    msg
}

#[derive(Clone)]
pub struct PricingService {
    tool_loop: ToolLoop,
    registry: ToolRegistry,
}

impl PricingService {
    /// `registry` should hold the pricing tools (see `rangaayan_tools::pricing_tools`).
    pub fn new(tool_loop: ToolLoop, registry: ToolRegistry) -> Self {
        Self { tool_loop, registry }
    }

    fn conversation(request: &PricingRequest) -> Result<(String, Conversation), ServiceError> {
        let product = require_product(&request.product_name)?;
        let conversation = Conversation::with_system(SYSTEM_PROMPT, user_message(request, product));
        Ok((product.to_string(), conversation))
    }

    pub async fn suggest(&self, request: &PricingRequest) -> Result<PricingReport, ServiceError> {
        let (product, mut conversation) = Self::conversation(request)?;
        info!(product = %product, "Pricing suggestion requested");

        let outcome = self
            .tool_loop
            .run_with_registry(&mut conversation, &self.registry)
            .await?;
        let analysis = crate::analysis_text(outcome)?;

        Ok(PricingReport {
            product,
            suggested_price: extract_price(&analysis),
            analysis,
            generated_at: Local::now(),
        })
    }

    /// Streamed variant of [`suggest`](Self::suggest). Input is validated
    /// before the run starts.
    pub fn suggest_stream(&self, request: &PricingRequest) -> Result<mpsc::Receiver<LoopEvent>, ServiceError> {
        let (product, conversation) = Self::conversation(request)?;
        info!(product = %product, "Streaming pricing suggestion requested");

        Ok(self
            .tool_loop
            .run_stream(conversation, self.registry.definitions(), self.registry.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rangaayan_agent::test_helpers::*;
    use rangaayan_core::message::Role;
    use rangaayan_tools::pricing_tools;
    use rangaayan_tools::test_helpers::StaticSearch;
    use std::sync::Arc;

    fn service(provider: &Arc<ScriptedProvider>) -> PricingService {
        PricingService::new(
            ToolLoop::new(provider.clone(), "test-model"),
            pricing_tools(Arc::new(StaticSearch::new()), 3000),
        )
    }

    #[test]
    fn user_message_includes_present_fields_only() {
        let request = PricingRequest {
            cost_price: Some(250.0),
            category: Some("Pottery".into()),
            quality: Some("  ".into()),
            location: Some("Khurja".into()),
            ..PricingRequest::new("terracotta planter")
        };
        let msg = user_message(&request, "terracotta planter");
        assert_eq!(
            msg,
            "Suggest optimal pricing for: terracotta planter\n\
             Production cost: ₹250.0\n\
             Category: Pottery\n\
             Location: Khurja\n\n\
             Search for competitor prices and analyze the market to suggest the best price."
        );
    }

    #[test]
    fn zero_cost_is_omitted() {
        let request = PricingRequest {
            cost_price: Some(0.0),
            ..PricingRequest::new("jute bag")
        };
        assert!(!user_message(&request, "jute bag").contains("Production cost"));
    }

    #[test]
    fn fractional_cost_keeps_its_decimals() {
        let request = PricingRequest {
            cost_price: Some(249.5),
            ..PricingRequest::new("jute bag")
        };
        assert!(user_message(&request, "jute bag").contains("Production cost: ₹249.5\n"));
    }

    #[tokio::test]
    async fn report_extracts_suggested_price() {
        let provider = Arc::new(ScriptedProvider::single_text(
            "SUGGESTED_PRICE: ₹1,200\nPrice range: ₹900 to ₹1,500",
        ));
        let report = service(&provider)
            .suggest(&PricingRequest::new("Banarasi dupatta"))
            .await
            .unwrap();

        assert_eq!(report.product, "Banarasi dupatta");
        assert_eq!(report.suggested_price.as_deref(), Some("₹1,200"));
        assert!(report.analysis.starts_with("SUGGESTED_PRICE"));

        let request = &provider.requests()[0];
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(request.tools.len(), 4);
    }

    #[tokio::test]
    async fn blank_product_never_reaches_the_model() {
        let provider = Arc::new(ScriptedProvider::single_text("unused"));
        let err = service(&provider)
            .suggest(&PricingRequest::new("   "))
            .await
            .unwrap_err();

        assert!(err.is_client_error());
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn empty_analysis_is_an_error() {
        let provider = Arc::new(ScriptedProvider::single_text(""));
        let err = service(&provider)
            .suggest(&PricingRequest::new("honey"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::EmptyAnalysis));
    }

    #[tokio::test]
    async fn stream_ends_with_result() {
        let provider = Arc::new(ScriptedProvider::single_text("SUGGESTED_PRICE: ₹300"));
        let mut rx = service(&provider)
            .suggest_stream(&PricingRequest::new("pickle"))
            .unwrap();

        let mut last = None;
        while let Some(event) = rx.recv().await {
            last = Some(event);
        }
        assert_eq!(
            last,
            Some(LoopEvent::Result {
                content: "SUGGESTED_PRICE: ₹300".into()
            })
        );
    }

    #[test]
    fn stream_rejects_blank_product() {
        let provider = Arc::new(ScriptedProvider::single_text("unused"));
        assert!(service(&provider).suggest_stream(&PricingRequest::new("")).is_err());
    }
}

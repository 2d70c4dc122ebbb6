//! Demand insights: current demand, seasonal outlook, and selling advice.

use chrono::{DateTime, Local};
use rangaayan_agent::{LoopEvent, ToolLoop};
use rangaayan_core::message::Conversation;
use rangaayan_core::tool::ToolRegistry;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::info;

use crate::error::{ServiceError, non_blank, require_product};
use crate::parse::extract_demand_score;

pub const SYSTEM_PROMPT: &str = "\
You are a demand analysis expert for rural Indian products sold by women entrepreneurs.

Use the available tools to gather real data before responding.

Your response MUST begin with this exact line (replace N with your score 0-100):
DEMAND_SCORE: N/100

Then provide a concise analysis:
- Current demand level and why
- Seasonal outlook for the next 3 months
- Recommended actions for the seller
- Best selling channels

Keep it practical. Use plain text, no markdown headers or emojis.";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DemandRequest {
    pub product_name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

impl DemandRequest {
    pub fn new(product_name: impl Into<String>) -> Self {
        Self {
            product_name: product_name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DemandReport {
    pub product: String,
    pub analysis: String,
    pub demand_score: u8,
    pub generated_at: DateTime<Local>,
}

pub fn user_message(request: &DemandRequest, product: &str) -> String {
    let mut msg = format!("Analyze the demand for: {product}");
    if let Some(category) = non_blank(&request.category) {
        msg.push_str(&format!(" (category: {category})"));
    }
    if let Some(location) = non_blank(&request.location) {
        msg.push_str(&format!(" from {location}"));
    }
    msg.push_str(". Use all available tools to gather data before giving your analysis.");
    msg
}

#[derive(Clone)]
pub struct DemandService {
    tool_loop: ToolLoop,
    registry: ToolRegistry,
}

impl DemandService {
    /// `registry` should hold the demand tools (see `rangaayan_tools::demand_tools`).
    pub fn new(tool_loop: ToolLoop, registry: ToolRegistry) -> Self {
        Self { tool_loop, registry }
    }

    fn conversation(request: &DemandRequest) -> Result<(String, Conversation), ServiceError> {
        let product = require_product(&request.product_name)?;
        let conversation = Conversation::with_system(SYSTEM_PROMPT, user_message(request, product));
        Ok((product.to_string(), conversation))
    }

    pub async fn insights(&self, request: &DemandRequest) -> Result<DemandReport, ServiceError> {
        let (product, mut conversation) = Self::conversation(request)?;
        info!(product = %product, "Demand insights requested");

        let outcome = self
            .tool_loop
            .run_with_registry(&mut conversation, &self.registry)
            .await?;
        let analysis = crate::analysis_text(outcome)?;

        Ok(DemandReport {
            product,
            demand_score: extract_demand_score(&analysis),
            analysis,
            generated_at: Local::now(),
        })
    }

    pub fn insights_stream(&self, request: &DemandRequest) -> Result<mpsc::Receiver<LoopEvent>, ServiceError> {
        let (product, conversation) = Self::conversation(request)?;
        info!(product = %product, "Streaming demand insights requested");

        Ok(self
            .tool_loop
            .run_stream(conversation, self.registry.definitions(), self.registry.clone()))
    }
}

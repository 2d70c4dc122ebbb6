//! Competitor analysis: marketplace listings and demand signals, no model.

use rangaayan_tools::{CompetitorAnalyzer, CompetitorReport};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ServiceError, require_product};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompetitorRequest {
    pub product_name: String,
}

#[derive(Clone)]
pub struct CompetitorService {
    analyzer: CompetitorAnalyzer,
}

impl CompetitorService {
    pub fn new(analyzer: CompetitorAnalyzer) -> Self {
        Self { analyzer }
    }

    pub async fn analyze(&self, request: &CompetitorRequest) -> Result<CompetitorReport, ServiceError> {
        let product = require_product(&request.product_name)?;
        info!(product = %product, "Competitor analysis requested");
        Ok(self.analyzer.competitor_data(product).await)
    }
}

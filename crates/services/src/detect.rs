//! Product detection from a photo using the vision model.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rangaayan_agent::ToolLoop;
use rangaayan_core::message::{Content, ContentPart, Conversation};
use rangaayan_core::tool::ToolRegistry;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ServiceError;
use crate::parse::strip_code_fences;

pub const PRODUCT_CATEGORIES: [&str; 20] = [
    "handicraft",
    "textile",
    "pottery",
    "jewelry",
    "food_grain",
    "spice",
    "pickle",
    "oil",
    "basket_weaving",
    "embroidery",
    "leather_craft",
    "metal_craft",
    "wood_craft",
    "bamboo_craft",
    "jute_product",
    "honey",
    "dairy_product",
    "organic_produce",
    "herbal_product",
    "handloom",
];

const FALLBACK_CATEGORY: &str = "handicraft";
const MAX_TOKENS: u32 = 512;
const QUESTION: &str = "What product(s) are in this image? Categorize them.";

pub fn system_prompt() -> String {
    format!(
        "You are a product categorization expert for Rangaayan, a marketplace for rural Indian artisans.\n\n\
         Given an image, identify the product(s) and categorize them.\n\n\
         Available categories: {}\n\n\
         Reply as raw JSON only (no code fences):\n\
         {{\"products\": [{{\"name\": \"...\", \"category\": \"...\", \"confidence\": 0.0-1.0}}], \
         \"suggested_categories\": [\"...\"]}}",
        PRODUCT_CATEGORIES.join(", ")
    )
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub detections: Vec<Detection>,
    pub suggested_categories: Vec<String>,
    pub object_count: usize,
}

impl DetectionResult {
    /// Result used when the model reply cannot be read.
    pub fn fallback() -> Self {
        Self {
            detections: Vec::new(),
            suggested_categories: vec![FALLBACK_CATEGORY.to_string()],
            object_count: 0,
        }
    }
}

#[derive(Deserialize)]
struct RawDetection {
    #[serde(default)]
    products: Vec<Detection>,
    #[serde(default)]
    suggested_categories: Vec<String>,
}

pub fn parse_detection(raw: &str) -> DetectionResult {
    let parsed = match serde_json::from_str::<RawDetection>(&strip_code_fences(raw)) {
        Ok(parsed) => parsed,
        Err(e) => {
            let preview: String = raw.chars().take(200).collect();
            warn!(error = %e, reply = %preview, "Failed to parse detection response");
            return DetectionResult::fallback();
        }
    };

    let mut suggested = parsed.suggested_categories;
    if suggested.is_empty() {
        for category in parsed.products.iter().filter_map(|p| p.category.as_ref()) {
            if !category.is_empty() && !suggested.contains(category) {
                suggested.push(category.clone());
            }
        }
    }

    DetectionResult {
        object_count: parsed.products.len(),
        detections: parsed.products,
        suggested_categories: suggested,
    }
}

/// The user turn: the image as a base64 data URL, then the question.
pub fn image_message(image: &[u8]) -> Content {
    let data_url = format!("data:image/jpeg;base64,{}", STANDARD.encode(image));
    Content::Parts(vec![ContentPart::image_url(data_url), ContentPart::text(QUESTION)])
}

#[derive(Clone)]
pub struct DetectService {
    tool_loop: ToolLoop,
}

impl DetectService {
    /// Runs are capped to one round, 512 tokens, reasoning off.
    pub fn new(tool_loop: ToolLoop) -> Self {
        Self {
            tool_loop: tool_loop
                .with_max_iterations(1)
                .with_max_tokens(MAX_TOKENS)
                .with_reasoning(false),
        }
    }

    pub async fn detect(&self, image: &[u8]) -> Result<DetectionResult, ServiceError> {
        if image.is_empty() {
            return Err(ServiceError::InvalidInput("Image file is empty".into()));
        }
        info!(bytes = image.len(), "Product detection requested");

        let mut conversation = Conversation::with_system(system_prompt(), image_message(image));
        let outcome = self
            .tool_loop
            .run(&mut conversation, &[], &ToolRegistry::new())
            .await?;

        let result = parse_detection(&crate::analysis_text(outcome)?);
        info!(objects = result.object_count, "Product detection finished");
        Ok(result)
    }
}

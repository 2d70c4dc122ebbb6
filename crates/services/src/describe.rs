//! One-line product descriptions with a category suggestion.
//!
//! A single tool-less round: the model replies with raw JSON
//! `{"description": "...", "category": "..."}`.

use rangaayan_agent::ToolLoop;
use rangaayan_core::message::Conversation;
use rangaayan_core::tool::ToolRegistry;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{ServiceError, non_blank, require_product};
use crate::parse::strip_code_fences;

pub const CATEGORIES: [&str; 8] = [
    "Weaving",
    "Pottery",
    "Embroidery",
    "Food",
    "Jewellery",
    "Painting",
    "Basket Weaving",
    "Tailoring",
];

const MAX_TOKENS: u32 = 150;

/// Keyword stems per category, checked in order.
const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "Weaving",
        &[
            "weav", "loom", "handloom", "saree", "sari", "fabric", "textile", "cloth", "cotton",
            "silk", "shawl", "stole", "dupatta",
        ],
    ),
    (
        "Pottery",
        &[
            "pot", "clay", "ceramic", "terracotta", "earthen", "mud", "pottery", "vase", "diya",
            "matka",
        ],
    ),
    (
        "Embroidery",
        &[
            "embroider", "stitch", "kantha", "chikan", "phulkari", "zardozi", "mirror work",
            "thread work", "needlework",
        ],
    ),
    (
        "Food",
        &[
            "food", "pickle", "achaar", "spice", "masala", "papad", "jam", "honey", "ghee", "oil",
            "snack", "sweet", "murabba",
        ],
    ),
    (
        "Jewellery",
        &[
            "jewel", "jewelry", "necklace", "bangle", "earring", "ring", "bracelet", "ornament",
            "tribal", "beaded", "oxidized",
        ],
    ),
    (
        "Painting",
        &["paint", "art", "madhubani", "warli", "pattachitra", "miniature", "canvas", "mural"],
    ),
    (
        "Basket Weaving",
        &["basket", "bamboo", "cane", "wicker", "jute", "grass", "moonj"],
    ),
    (
        "Tailoring",
        &["tailor", "dress", "blouse", "kurti", "kurta", "garment", "stitch", "sew", "alter"],
    ),
];

pub fn system_prompt() -> String {
    format!(
        "You write product descriptions for Rangaayan, a marketplace for rural Indian women entrepreneurs.\n\n\
         Rules:\n\
         - 1 sentence, max 100 characters\n\
         - Mention the product and one quality (handmade, natural, traditional)\n\
         - No markdown, no emojis, no filler words\n\n\
         Also pick the best category from: {}\n\n\
         Reply as raw JSON only, no code fences:\n\
         {{\"description\": \"...\", \"category\": \"...\"}}",
        CATEGORIES.join(", ")
    )
}

/// Category from keyword stems in the product name, first match wins.
pub fn suggest_category(product_name: &str) -> Option<&'static str> {
    let lower = product_name.to_lowercase();
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| lower.contains(kw)))
        .map(|(category, _)| *category)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DescribeRequest {
    pub product_name: String,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Description {
    pub description: String,
    pub category: Option<String>,
}

#[derive(Deserialize)]
struct RawDescription {
    #[serde(default)]
    description: Option<Value>,
    #[serde(default)]
    category: Option<String>,
}

/// Parse the model's JSON reply. Anything unparseable becomes the
/// description verbatim, with no category.
pub fn parse_description(raw: &str) -> Description {
    match serde_json::from_str::<RawDescription>(&strip_code_fences(raw)) {
        Ok(parsed) => Description {
            description: match parsed.description {
                Some(Value::String(s)) => s,
                Some(Value::Null) | None => String::new(),
                Some(other) => other.to_string(),
            },
            category: parsed.category,
        },
        Err(e) => {
            debug!(error = %e, "Description reply was not JSON");
            Description {
                description: raw.trim().to_string(),
                category: None,
            }
        }
    }
}

#[derive(Clone)]
pub struct DescribeService {
    tool_loop: ToolLoop,
}

impl DescribeService {
    /// Runs are capped to one round, 150 tokens, reasoning off.
    pub fn new(tool_loop: ToolLoop) -> Self {
        Self {
            tool_loop: tool_loop
                .with_max_iterations(1)
                .with_max_tokens(MAX_TOKENS)
                .with_reasoning(false),
        }
    }

    pub async fn describe(&self, request: &DescribeRequest) -> Result<Description, ServiceError> {
        let product = require_product(&request.product_name)?;
        let keyword_category = non_blank(&request.category)
            .map(str::to_string)
            .or_else(|| suggest_category(product).map(String::from));

        info!(product = %product, category = ?keyword_category, "Description requested");

        let user = match &keyword_category {
            Some(category) => format!("{product} ({category})"),
            None => product.to_string(),
        };
        let mut conversation = Conversation::with_system(system_prompt(), user);

        let outcome = self
            .tool_loop
            .run(&mut conversation, &[], &ToolRegistry::new())
            .await?;
        let mut description = parse_description(&crate::analysis_text(outcome)?);

        // The caller's or keyword category beats the model's pick.
        if keyword_category.is_some() {
            description.category = keyword_category;
        }
        Ok(description)
    }
}

//! Seasonal demand calendar for Indian festival and wedding seasons.

use async_trait::async_trait;
use chrono::Datelike;
use rangaayan_core::error::ToolError;
use rangaayan_core::tool::{Tool, ToolResult};
use serde::Serialize;
use serde_json::Value;

type MonthEntry = (&'static str, &'static str);

/// Demand level and reason per month (January first), per category.
/// Lookup order matters: the first matching key wins.
const CALENDAR: &[(&str, [MonthEntry; 12])] = &[
    (
        "textile",
        [
            ("high", "Makar Sankranti, Republic Day"),
            ("medium", "Post-festival lull"),
            ("high", "Holi, spring collections"),
            ("medium", "New financial year"),
            ("medium", "Summer, lighter fabrics"),
            ("low", "Monsoon approaching"),
            ("low", "Monsoon season"),
            ("medium", "Raksha Bandhan, Independence Day"),
            ("high", "Ganesh Chaturthi, Navratri prep"),
            ("very_high", "Dussehra + Diwali, wedding season"),
            ("very_high", "Diwali, wedding season peak"),
            ("high", "Wedding season, Christmas"),
        ],
    ),
    (
        "food",
        [
            ("high", "Makar Sankranti - til, jaggery"),
            ("medium", "Regular demand"),
            ("high", "Holi specialties"),
            ("medium", "Summer foods"),
            ("high", "Mango products, summer drinks"),
            ("medium", "Monsoon foods, immunity products"),
            ("medium", "Monsoon snacks"),
            ("high", "Festival prep begins"),
            ("high", "Navratri fasting foods"),
            ("very_high", "Festival season - sweets, dry fruits"),
            ("very_high", "Diwali gifting - pickles, organic"),
            ("high", "Winter specialties, Christmas"),
        ],
    ),
    (
        "handicraft",
        [
            ("medium", "Republic Day crafts"),
            ("medium", "Valentine's Day gifts"),
            ("medium", "Holi, spring decor"),
            ("low", "Lean season"),
            ("low", "Summer"),
            ("low", "Monsoon"),
            ("low", "Monsoon"),
            ("medium", "Rakhi gifts, Independence Day"),
            ("high", "Ganesh idols, Navratri prep"),
            ("very_high", "Diwali decor, gifting season"),
            ("very_high", "Diwali, home decoration"),
            ("high", "Christmas, New Year gifts"),
        ],
    ),
];

const FALLBACK_CATEGORY: &str = "handicraft";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonalInfo {
    pub category: String,
    pub month: i64,
    pub demand_level: &'static str,
    pub reason: &'static str,
    pub recommendation: &'static str,
}

/// Calendar key for a free-form category: the first key contained in the
/// lower-cased category, or containing it. Falls back to `handicraft`.
pub fn match_category(category: &str) -> &'static str {
    let lower = category.to_lowercase();
    CALENDAR
        .iter()
        .map(|(key, _)| *key)
        .find(|key| lower.contains(key) || key.contains(lower.as_str()))
        .unwrap_or(FALLBACK_CATEGORY)
}

pub fn recommendation(demand_level: &str) -> &'static str {
    match demand_level {
        "very_high" => "Peak season! Stock up, consider premium pricing, run festive bundles",
        "high" => "Strong demand. Ensure good stock, moderate promotions",
        "medium" => "Steady demand. Focus on marketing and building customer base",
        "low" => "Lean period. Good for product development, offer discounts for cash flow",
        _ => "Monitor market conditions",
    }
}

pub fn seasonal_info(category: &str, month: i64) -> SeasonalInfo {
    let key = match_category(category);
    let (demand_level, reason) = CALENDAR
        .iter()
        .find(|(k, _)| *k == key)
        .and_then(|(_, months)| {
            usize::try_from(month - 1).ok().and_then(|i| months.get(i)).copied()
        })
        .unwrap_or(("medium", "No specific data"));

    SeasonalInfo {
        category: category.to_string(),
        month,
        demand_level,
        reason,
        recommendation: recommendation(demand_level),
    }
}

pub struct SeasonalTool;

#[async_trait]
impl Tool for SeasonalTool {
    fn name(&self) -> &str {
        "get_seasonal_info"
    }

    fn description(&self) -> &str {
        "Get seasonal demand patterns for a product category in India."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "category": {
                    "type": "string",
                    "description": "Category like 'textile', 'food', 'handicraft'"
                },
                "month": {
                    "type": "integer",
                    "description": "Month 1-12. Defaults to current."
                }
            },
            "required": ["category"]
        })
    }

    fn status_message(&self, _arguments: &Value) -> String {
        "Checking seasonal demand...".into()
    }

    async fn execute(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        let category = arguments["category"]
            .as_str()
            .ok_or_else(|| ToolError::invalid(self.name(), "missing 'category'"))?;
        let month = arguments["month"]
            .as_f64()
            .map(|m| m as i64)
            .filter(|m| *m != 0)
            .unwrap_or_else(|| i64::from(chrono::Local::now().month()));

        ToolResult::json(self.name(), &seasonal_info(category, month))
    }
}

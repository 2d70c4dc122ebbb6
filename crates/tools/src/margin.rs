//! Margin calculator — per-unit profit after platform fee and shipping.

use async_trait::async_trait;
use rangaayan_core::error::ToolError;
use rangaayan_core::tool::{Tool, ToolResult};
use serde::Serialize;
use serde_json::Value;

pub const DEFAULT_PLATFORM_FEE_PERCENT: f64 = 10.0;
pub const DEFAULT_SHIPPING_COST: f64 = 50.0;
/// Margin percent at or above which a price counts as viable.
pub const VIABLE_MARGIN_PERCENT: f64 = 20.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarginReport {
    pub cost_price: f64,
    pub selling_price: f64,
    pub platform_fee: f64,
    pub shipping_cost: f64,
    pub total_cost: f64,
    pub profit_per_unit: f64,
    pub margin_percent: f64,
    pub viable: bool,
    pub assessment: &'static str,
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

pub fn assess(margin_percent: f64) -> &'static str {
    match margin_percent {
        m if m < 0.0 => "Not viable - costs exceed revenue",
        m if m < 15.0 => "Very thin margin - risky",
        m if m < 25.0 => "Thin margin - consider raising price",
        m if m < 40.0 => "Acceptable margin",
        _ => "Good margin",
    }
}

pub fn calculate_margin(
    cost_price: f64,
    selling_price: f64,
    platform_fee_percent: f64,
    shipping_cost: f64,
) -> MarginReport {
    let platform_fee = selling_price * platform_fee_percent / 100.0;
    let total_cost = cost_price + platform_fee + shipping_cost;
    let profit = selling_price - total_cost;
    let margin_percent = if selling_price > 0.0 {
        profit / selling_price * 100.0
    } else {
        0.0
    };

    MarginReport {
        cost_price,
        selling_price,
        platform_fee: round_to(platform_fee, 2),
        shipping_cost,
        total_cost: round_to(total_cost, 2),
        profit_per_unit: round_to(profit, 2),
        margin_percent: round_to(margin_percent, 1),
        viable: margin_percent >= VIABLE_MARGIN_PERCENT,
        assessment: assess(margin_percent),
    }
}

pub struct MarginTool;

#[async_trait]
impl Tool for MarginTool {
    fn name(&self) -> &str {
        "calculate_margin"
    }

    fn description(&self) -> &str {
        "Calculate profit margins given cost and selling price."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "cost_price": {
                    "type": "number",
                    "description": "Production cost in INR"
                },
                "selling_price": {
                    "type": "number",
                    "description": "Proposed selling price in INR"
                },
                "platform_fee_percent": {
                    "type": "number",
                    "description": "Platform fee % (default 10)",
                    "default": DEFAULT_PLATFORM_FEE_PERCENT
                },
                "shipping_cost": {
                    "type": "number",
                    "description": "Shipping cost per unit INR (default 50)",
                    "default": DEFAULT_SHIPPING_COST
                }
            },
            "required": ["cost_price", "selling_price"]
        })
    }

    fn status_message(&self, _arguments: &Value) -> String {
        "Calculating margins...".into()
    }

    async fn execute(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        let number = |key: &str| {
            arguments[key]
                .as_f64()
                .ok_or_else(|| ToolError::invalid(self.name(), format!("missing '{key}'")))
        };
        let report = calculate_margin(
            number("cost_price")?,
            number("selling_price")?,
            arguments["platform_fee_percent"].as_f64().unwrap_or(DEFAULT_PLATFORM_FEE_PERCENT),
            arguments["shipping_cost"].as_f64().unwrap_or(DEFAULT_SHIPPING_COST),
        );
        ToolResult::json(self.name(), &report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn typical_margin() {
        let r = calculate_margin(200.0, 500.0, 10.0, 50.0);
        assert_eq!(r.platform_fee, 50.0);
        assert_eq!(r.total_cost, 300.0);
        assert_eq!(r.profit_per_unit, 200.0);
        assert_eq!(r.margin_percent, 40.0);
        assert!(r.viable);
        assert_eq!(r.assessment, "Good margin");
    }

    #[test]
    fn loss_is_not_viable() {
        let r = calculate_margin(500.0, 400.0, 10.0, 50.0);
        assert!(r.profit_per_unit < 0.0);
        assert!(!r.viable);
        assert_eq!(r.assessment, "Not viable - costs exceed revenue");
    }

    #[test]
    fn zero_selling_price_has_zero_margin() {
        let r = calculate_margin(100.0, 0.0, 10.0, 50.0);
        assert_eq!(r.margin_percent, 0.0);
        assert_eq!(r.assessment, "Very thin margin - risky");
    }

    #[test]
    fn assessment_bands() {
        assert_eq!(assess(-0.1), "Not viable - costs exceed revenue");
        assert_eq!(assess(0.0), "Very thin margin - risky");
        assert_eq!(assess(14.9), "Very thin margin - risky");
        assert_eq!(assess(15.0), "Thin margin - consider raising price");
        assert_eq!(assess(24.9), "Thin margin - consider raising price");
        assert_eq!(assess(25.0), "Acceptable margin");
        assert_eq!(assess(39.9), "Acceptable margin");
        assert_eq!(assess(40.0), "Good margin");
    }

    #[test]
    fn viability_threshold() {
        // 1000 - 100 fee - 50 shipping - 650 cost = 200 profit => 20%
        assert!(calculate_margin(650.0, 1000.0, 10.0, 50.0).viable);
        assert!(!calculate_margin(660.0, 1000.0, 10.0, 50.0).viable);
    }

    #[tokio::test]
    async fn tool_uses_defaults() {
        let result = MarginTool
            .execute(json!({"cost_price": 300, "selling_price": 1000}))
            .await
            .unwrap();
        let ToolResult::Json(report) = result else {
            panic!("expected JSON result");
        };
        assert_eq!(report["platform_fee"], 100.0);
        assert_eq!(report["shipping_cost"], 50.0);
        assert_eq!(report["margin_percent"], 55.0);
    }

    #[tokio::test]
    async fn tool_honours_overrides() {
        let result = MarginTool
            .execute(json!({"cost_price": 300, "selling_price": 1000, "platform_fee_percent": 0, "shipping_cost": 0}))
            .await
            .unwrap();
        assert!(result.into_content().contains("\"profit_per_unit\":700.0"));
    }
}

//! Extraction helpers for model output.

use regex_lite::Regex;
use std::sync::LazyLock;

static FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(?:json)?\s*").expect("static fence pattern"));

static SUGGESTED_PRICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)SUGGESTED_PRICE:\s*₹\s*([\d,]+)").expect("static price pattern")
});

static RUPEE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"₹\s*([\d,]+)").expect("static rupee pattern"));

static DEMAND_SCORE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)DEMAND_SCORE:\s*(\d{1,3})\s*/\s*100").expect("static score pattern")
});

static OUT_OF_100_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,3})\s*/\s*100").expect("static score pattern"));

/// Score used when the text gives no usable signal.
pub const DEFAULT_DEMAND_SCORE: u8 = 50;

/// Phrase → score, checked in order.
const DEMAND_KEYWORDS: &[(&[&str], u8)] = &[
    (&["very high demand", "very_high"], 85),
    (&["high demand", "strong demand"], 72),
    (&["moderate demand", "medium demand"], 50),
    (&["low demand", "weak demand"], 25),
];

/// Remove markdown code fences the model adds despite being told not to.
pub fn strip_code_fences(raw: &str) -> String {
    FENCE_RE
        .replace_all(raw, "")
        .trim()
        .trim_end_matches('`')
        .to_string()
}

/// The suggested price as `₹N`, from the `SUGGESTED_PRICE:` line or the
/// first rupee amount in the text.
pub fn extract_price(raw: &str) -> Option<String> {
    SUGGESTED_PRICE_RE
        .captures(raw)
        .or_else(|| RUPEE_RE.captures(raw))
        .map(|caps| format!("₹{}", &caps[1]))
}

/// Demand score in `0..=100`: the `DEMAND_SCORE:` line, then any `N/100`,
/// then a keyword heuristic.
pub fn extract_demand_score(raw: &str) -> u8 {
    let explicit = DEMAND_SCORE_RE
        .captures(raw)
        .or_else(|| OUT_OF_100_RE.captures(raw))
        .and_then(|caps| caps[1].parse::<u32>().ok());
    if let Some(score) = explicit {
        return score.min(100) as u8;
    }

    let lower = raw.to_lowercase();
    DEMAND_KEYWORDS
        .iter()
        .find(|(phrases, _)| phrases.iter().any(|p| lower.contains(p)))
        .map(|(_, score)| *score)
        .unwrap_or(DEFAULT_DEMAND_SCORE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_json_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```{\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("  {\"a\":1} "), "{\"a\":1}");
    }

    #[test]
    fn price_from_marker_line() {
        let raw = "SUGGESTED_PRICE: ₹1,250\nCompetitors sell at ₹900.";
        assert_eq!(extract_price(raw).as_deref(), Some("₹1,250"));
    }

    #[test]
    fn price_marker_is_case_insensitive() {
        assert_eq!(extract_price("suggested_price: ₹ 499").as_deref(), Some("₹499"));
    }

    #[test]
    fn price_falls_back_to_first_rupee_amount() {
        let raw = "A fair range is ₹700 to ₹950.";
        assert_eq!(extract_price(raw).as_deref(), Some("₹700"));
        assert_eq!(extract_price("no numbers here"), None);
    }

    #[test]
    fn explicit_demand_score() {
        assert_eq!(extract_demand_score("DEMAND_SCORE: 72/100\nHigh demand."), 72);
        assert_eq!(extract_demand_score("demand_score: 40 / 100"), 40);
    }

    #[test]
    fn generic_out_of_100() {
        assert_eq!(extract_demand_score("I'd rate this 65/100 overall."), 65);
    }

    #[test]
    fn out_of_100_needs_a_whole_number() {
        assert_eq!(extract_demand_score("Sold 1500/100 units last season"), DEFAULT_DEMAND_SCORE);
        assert_eq!(extract_demand_score("Score (70/100) this month"), 70);
    }

    #[test]
    fn score_is_clamped() {
        assert_eq!(extract_demand_score("DEMAND_SCORE: 250/100"), 100);
    }

    #[test]
    fn keyword_heuristic() {
        assert_eq!(extract_demand_score("Very high demand during Diwali"), 85);
        assert_eq!(extract_demand_score("There is strong demand in metros"), 72);
        assert_eq!(extract_demand_score("Moderate demand overall"), 50);
        assert_eq!(extract_demand_score("Weak demand in summer"), 25);
        assert_eq!(extract_demand_score("nothing to say"), DEFAULT_DEMAND_SCORE);
    }
}

//! `rangaayan price|demand|describe|detect|competitors|categories`
//! — Run a marketplace feature from the terminal.

use std::path::Path;

use rangaayan_agent::LoopEvent;
use rangaayan_config::AppConfig;
use rangaayan_services::{
    CompetitorRequest, DemandRequest, DescribeRequest, PRODUCT_CATEGORIES, PricingRequest,
    Services,
};
use tokio::sync::mpsc;

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn load_services() -> Result<Services, Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    if !config.has_api_key() {
        return Err("No API key configured. Set OPENROUTER_API_KEY or add api_key to config.toml".into());
    }
    Ok(Services::from_config(&config)?)
}

pub async fn price(request: PricingRequest, stream: bool) -> CliResult {
    let services = load_services()?;
    println!("💰 Pricing: {}", request.product_name.trim());

    if stream {
        let rx = services.pricing.suggest_stream(&request)?;
        return print_stream(rx).await;
    }

    let report = services.pricing.suggest(&request).await?;
    println!();
    println!("{}", report.analysis);
    if let Some(price) = &report.suggested_price {
        println!();
        println!("   Suggested price: {price}");
    }
    Ok(())
}

pub async fn demand(request: DemandRequest, stream: bool) -> CliResult {
    let services = load_services()?;
    println!("📈 Demand: {}", request.product_name.trim());

    if stream {
        let rx = services.demand.insights_stream(&request)?;
        return print_stream(rx).await;
    }

    let report = services.demand.insights(&request).await?;
    println!();
    println!("{}", report.analysis);
    println!();
    println!("   Demand score: {}/100", report.demand_score);
    Ok(())
}

pub async fn describe(request: DescribeRequest) -> CliResult {
    let services = load_services()?;
    let description = services.describe.describe(&request).await?;

    println!("📝 {}", description.description);
    if let Some(category) = &description.category {
        println!("   Category: {category}");
    }
    Ok(())
}

pub async fn detect(image: &Path) -> CliResult {
    let bytes = tokio::fs::read(image)
        .await
        .map_err(|e| format!("Failed to read {}: {e}", image.display()))?;

    let services = load_services()?;
    let result = services.detect.detect(&bytes).await?;

    println!("🔍 {} object(s) detected", result.object_count);
    for detection in &result.detections {
        match (&detection.category, detection.confidence) {
            (Some(category), Some(confidence)) => {
                println!("   • {} ({category}, {:.0}%)", detection.name, confidence * 100.0)
            }
            (Some(category), None) => println!("   • {} ({category})", detection.name),
            _ => println!("   • {}", detection.name),
        }
    }
    if !result.suggested_categories.is_empty() {
        println!("   Suggested: {}", result.suggested_categories.join(", "));
    }
    Ok(())
}

pub async fn competitors(product: String) -> CliResult {
    let services = load_services()?;
    let report = services
        .competitors
        .analyze(&CompetitorRequest { product_name: product })
        .await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub fn categories() {
    for category in PRODUCT_CATEGORIES {
        println!("{category}");
    }
}

/// Print status lines as they arrive, then the final answer.
async fn print_stream(mut rx: mpsc::Receiver<LoopEvent>) -> CliResult {
    while let Some(event) = rx.recv().await {
        match event {
            LoopEvent::Status { message } => println!("   ⏳ {message}"),
            LoopEvent::Result { content } => {
                println!();
                println!("{content}");
                return Ok(());
            }
            LoopEvent::Error { message } => return Err(message.into()),
        }
    }
    tracing::warn!("Stream ended without a result");
    Err("Analysis ended without a result".into())
}

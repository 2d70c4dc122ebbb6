//! `rangaayan doctor` — Diagnose setup.

use rangaayan_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 Rangaayan Doctor — Setup Diagnostics");
    println!("=======================================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("  ✅ Config file found");
    } else {
        println!("  ⚠️  No config file, using defaults (run `rangaayan config init`)");
    }

    match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Configuration valid");

            if config.has_api_key() {
                println!("  ✅ API key configured");
            } else {
                println!("  ❌ No API key — set OPENROUTER_API_KEY");
                issues += 1;
            }

            match rangaayan_services::Services::from_config(&config) {
                Ok(_) => println!("  ✅ Model provider and web search ready"),
                Err(e) => {
                    println!("  ❌ Services unavailable: {e}");
                    issues += 1;
                }
            }
        }
        Err(e) => {
            println!("  ❌ Configuration invalid: {e}");
            issues += 1;
        }
    }

    // Summary
    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}

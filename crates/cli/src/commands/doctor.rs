//! `mocktrial doctor` — Diagnose system health.

use mocktrial_config::AppConfig;
use mocktrial_core::Provider;
use mocktrial_trial::KnowledgeBase;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 Mocktrial Doctor — System Diagnostics");
    println!("========================================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_dir().join("config.toml");
    if !config_path.exists() {
        println!("  ⚠️  No config file — using defaults (run `mocktrial onboard`)");
        issues += 1;
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Configuration valid");
            config
        }
        Err(e) => {
            println!("  ❌ Config file invalid: {e}");
            println!("\n  ⚠️  1 blocking issue found.");
            return Ok(());
        }
    };

    match KnowledgeBase::from_path_or_builtin(config.knowledge_base.path.as_deref()) {
        Ok(kb) => println!("  ✅ Knowledge base loaded ({} principles)", kb.len()),
        Err(e) => {
            println!("  ❌ Knowledge base: {e}");
            issues += 1;
        }
    }

    let router = mocktrial_providers::router::build_from_config(&config);
    match router.resolve(&config.default_model) {
        Some((provider, model)) => match provider.health_check().await {
            Ok(true) => {
                println!("  ✅ Provider '{}' reachable", provider.name());
                let models = provider.list_models().await.unwrap_or_default();
                if models.is_empty() || models.iter().any(|m| *m == model) {
                    println!("  ✅ Model '{model}' available");
                } else {
                    println!("  ⚠️  Model '{model}' not listed by '{}'", provider.name());
                    issues += 1;
                }
            }
            Ok(false) => {
                println!("  ❌ Provider '{}' answered but rejected the request", provider.name());
                issues += 1;
            }
            Err(e) => {
                println!("  ❌ Provider '{}' unreachable: {e}", provider.name());
                issues += 1;
            }
        },
        None => {
            println!("  ❌ No provider configured for '{}'", config.default_provider);
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}

//! `mocktrial status` — Show effective configuration.

use mocktrial_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let defaults = config.run_defaults();

    println!("⚖️  Mocktrial Status");
    println!("==================");
    println!("  Config dir:   {}", AppConfig::config_dir().display());
    println!("  Provider:     {}", config.default_provider);
    println!("  Model:        {}", config.default_model);
    println!("  API key:      {}", if config.has_api_key() { "set" } else { "not set" });
    println!("  Temperature:  {}", defaults.temperature);
    println!("  Seed:         {}", defaults.seed);
    println!("  Strictness:   {}", defaults.strictness);
    println!("  Max turns:    {} ({} cross-exam pairs)", defaults.max_turns, defaults.cross_exam_pairs());
    println!("  Retrieval k:  {}", config.simulation.retrieval_k);
    println!(
        "  Chunking:     {} chars, {} overlap",
        config.ingest.chunk_size, config.ingest.chunk_overlap
    );
    println!("  Gateway:      {}:{}", config.gateway.host, config.gateway.port);
    match &config.knowledge_base.path {
        Some(path) => println!("  Knowledge:    {}", path.display()),
        None => println!("  Knowledge:    built-in"),
    }

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("\n  ✅ Config file found");
    } else {
        println!("\n  ⚠️  No config file — run `mocktrial onboard` first");
    }

    Ok(())
}

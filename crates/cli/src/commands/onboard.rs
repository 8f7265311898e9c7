//! `mocktrial onboard` — First-time setup.

use mocktrial_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    println!("⚖️  Mocktrial — First-Time Setup");
    println!("================================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("✅ Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    if config_path.exists() {
        println!("\n⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run onboard.\n");
    } else {
        std::fs::write(&config_path, AppConfig::default_toml())?;
        println!("✅ Created config.toml at: {}", config_path.display());
        println!("\n📝 Next steps:");
        println!("   1. Start a local model server (default: Ollama with llama3.1:8b),");
        println!("      or set default_provider and an API key in {}", config_path.display());
        println!("   2. Run: mocktrial doctor");
        println!("   3. Run: mocktrial simulate case.txt\n");
    }

    println!("🎉 Setup complete!\n");

    Ok(())
}

//! `mocktrial kb` — List the legal principles injected into every phase.

use mocktrial_config::AppConfig;
use mocktrial_trial::KnowledgeBase;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let source = config.knowledge_base.path.as_deref();
    let kb = KnowledgeBase::from_path_or_builtin(source)?;

    println!("📚 Knowledge Base (version {}, {} principles)", kb.version(), kb.len());
    match source {
        Some(path) => println!("   Source: {}\n", path.display()),
        None => println!("   Source: built-in\n"),
    }

    for principle in kb.principles() {
        println!("  [{}] {}", principle.citation_key(), principle.title);
        println!("      {}", principle.text);
    }

    Ok(())
}

//! `mocktrial simulate` — Run a full proceeding over a local document.

use std::path::PathBuf;
use std::sync::Arc;

use mocktrial_config::AppConfig;
use mocktrial_core::case::Case;
use mocktrial_core::event::{DomainEvent, EventBus};
use mocktrial_trial::{ContextAssembler, KnowledgeBase, ModelClient, TrialOrchestrator, export, ingest};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

/// Overrides collected from the command line.
pub struct SimulateOptions {
    pub file: PathBuf,
    pub title: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub seed: Option<u64>,
    pub strictness: Option<f32>,
    pub max_turns: Option<u32>,
    pub export: Option<PathBuf>,
}

pub async fn run(options: SimulateOptions) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let mut run_config = config.run_defaults();
    if let Some(model) = options.model {
        run_config.model = model;
    }
    if let Some(temperature) = options.temperature {
        run_config.temperature = temperature;
    }
    if let Some(seed) = options.seed {
        run_config.seed = seed;
    }
    if let Some(strictness) = options.strictness {
        run_config.strictness = strictness;
    }
    if let Some(max_turns) = options.max_turns {
        run_config.max_turns = max_turns;
    }
    run_config.validate()?;

    // --- Document ---
    let text = ingest::load_text(&options.file)?;
    let title = options.title.unwrap_or_else(|| {
        options
            .file
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "New Case".into())
    });
    let mut case = Case::new(title);
    let summary = ingest::ingest_text(
        &mut case,
        text,
        config.ingest.chunk_size,
        config.ingest.chunk_overlap,
    )?;

    // --- Orchestrator ---
    let knowledge_base = Arc::new(KnowledgeBase::from_path_or_builtin(
        config.knowledge_base.path.as_deref(),
    )?);
    let router = mocktrial_providers::router::build_from_config(&config);
    let (provider, model) = router
        .resolve(&run_config.model)
        .ok_or("No provider configured for this model")?;
    run_config.model = model;

    let event_bus = Arc::new(EventBus::default());
    let orchestrator = TrialOrchestrator::new(
        ModelClient::new(provider).with_max_tokens(config.default_max_tokens),
        ContextAssembler::new(knowledge_base),
    )
    .with_retrieval_k(config.simulation.retrieval_k)
    .with_event_bus(event_bus.clone());

    println!();
    println!("  ⚖️  {}", case.title);
    println!("  Document:  {} ({} chars, {} chunks)", options.file.display(), summary.chars, summary.chunks);
    println!("  Model:     {} (temperature {}, seed {})", run_config.model, run_config.temperature, run_config.seed);
    println!();

    let progress = tokio::spawn(report_progress(event_bus.subscribe()));

    let result = orchestrator.run_sim(&mut case, &run_config).await;

    // Closing the bus lets the progress reporter drain and exit.
    drop(orchestrator);
    drop(event_bus);
    join_progress(progress).await;

    let case = result?;

    println!();
    println!("{}", export::render_text(case));
    println!();

    if let Some(verdict) = &case.verdict {
        println!("  🧑‍⚖️ Verdict: {}", verdict.verdict);
    }

    if let Some(path) = options.export {
        std::fs::write(&path, export::render_text(case))?;
        println!("  📝 Transcript written to {}", path.display());
    }

    Ok(())
}

/// Wait for the progress reporter. A crashed reporter is logged and otherwise
/// ignored.
async fn join_progress(progress: JoinHandle<()>) -> bool {
    match progress.await {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!("Progress reporter stopped: {err}");
            false
        }
    }
}

async fn report_progress(mut rx: broadcast::Receiver<Arc<DomainEvent>>) {
    loop {
        match rx.recv().await {
            Ok(event) => match event.as_ref() {
                DomainEvent::PhaseStarted {
                    phase,
                    retrieved_chunks,
                    ..
                } => eprintln!("  ▸ {phase} ({retrieved_chunks} chunks retrieved)"),
                DomainEvent::TurnLogged {
                    role, citations, ..
                } => eprintln!("      {role} spoke ({citations} citations)"),
                DomainEvent::RunFailed { error_message, .. } => {
                    eprintln!("  ❌ Simulation failed: {error_message}")
                }
                _ => {}
            },
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => break,
        }
    }
}

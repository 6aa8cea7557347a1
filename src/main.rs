use anyhow::Context;
use primesearch::config::ConfigManager;
use primesearch::data::{JsonLinesWriter, TargetSequence};
use primesearch::engines::generation::{ConsoleProgressCallback, EvolutionEngine, ProgressCallback};
use primesearch::ml::DeltaPredictor;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut manager = ConfigManager::new();
    if let Some(path) = std::env::args().nth(1) {
        manager
            .load_from_file(&path)
            .with_context(|| format!("failed to load configuration from {}", path))?;
    }
    let config = manager.get();

    let target = TargetSequence::primes(config.run.num_primes)?;
    let mut engine = EvolutionEngine::from_config(&config, target)?;

    if let Some(model_path) = &config.run.neural_model_path {
        match DeltaPredictor::load(model_path) {
            Ok(predictor) => {
                log::info!("Loaded guidance model from {}", model_path);
                engine = engine.with_guidance(Box::new(predictor));
            }
            Err(e) => log::warn!("Running without guidance, could not load {}: {}", model_path, e),
        }
    }

    let mut callbacks: Vec<Box<dyn ProgressCallback>> = vec![Box::new(ConsoleProgressCallback)];
    if let Some(log_file) = &config.run.log_file {
        let writer = JsonLinesWriter::create(log_file)
            .with_context(|| format!("failed to create log file {}", log_file))?;
        callbacks.push(Box::new(writer));
    }

    let outcome = engine.run(callbacks)?;

    match &outcome.best {
        Some(best) => {
            println!("Best formula: {}", best.canonical_string);
            println!(
                "Fitness {:.4}, strict hits {}/{}, near hits {}",
                best.fitness(),
                best.diagnostics.strict_hits,
                best.diagnostics.sequence_length(),
                best.diagnostics.near_hits
            );
        }
        None => println!("No formula was evaluated"),
    }

    Ok(())
}

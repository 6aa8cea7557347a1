use crate::engines::generation::population::Individual;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::Sender;

/// Flat per-generation summary of the best individual, handed to loggers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub generation: usize,
    pub best_formula: String,
    pub combined_fitness: f64,
    pub strict_hits: usize,
    pub near_hits: usize,
    pub closeness: f64,
    pub novelty: f64,
    pub complexity: usize,
    pub variance: f64,
    pub evaluation_failures: usize,
}

impl GenerationRecord {
    /// `None` if the individual has not been evaluated
    pub fn from_best(generation: usize, best: &Individual) -> Option<Self> {
        let d = best.diagnostics()?;
        Some(Self {
            generation,
            best_formula: best.formula.canonical_string(),
            combined_fitness: d.combined_fitness,
            strict_hits: d.strict_hits,
            near_hits: d.near_hits,
            closeness: d.closeness,
            novelty: d.novelty,
            complexity: d.complexity,
            variance: d.variance,
            evaluation_failures: d.evaluation_failures,
        })
    }
}

pub trait ProgressCallback {
    fn on_generation_start(&mut self, generation: usize);
    fn on_generation_complete(&mut self, record: &GenerationRecord);
}

pub struct ConsoleProgressCallback;

impl ProgressCallback for ConsoleProgressCallback {
    fn on_generation_start(&mut self, generation: usize) {
        log::debug!("Generation {} starting", generation);
    }

    fn on_generation_complete(&mut self, record: &GenerationRecord) {
        log::info!(
            "Generation {}: best {} | fitness {:.4} | hits {} | near {} | novelty {:.3} | complexity {}",
            record.generation,
            record.best_formula,
            record.combined_fitness,
            record.strict_hits,
            record.near_hits,
            record.novelty,
            record.complexity
        );
    }
}

#[derive(Debug, Clone)]
pub enum ProgressMessage {
    GenerationStart(usize),
    GenerationComplete(GenerationRecord),
}

/// Forwards progress over a channel to another thread
pub struct ChannelProgressCallback {
    sender: Sender<ProgressMessage>,
}

impl ChannelProgressCallback {
    pub fn new(sender: Sender<ProgressMessage>) -> Self {
        Self { sender }
    }
}

impl ProgressCallback for ChannelProgressCallback {
    fn on_generation_start(&mut self, generation: usize) {
        let _ = self.sender.send(ProgressMessage::GenerationStart(generation));
    }

    fn on_generation_complete(&mut self, record: &GenerationRecord) {
        let _ = self.sender.send(ProgressMessage::GenerationComplete(record.clone()));
    }
}

impl<T: ProgressCallback + ?Sized> ProgressCallback for &mut T {
    fn on_generation_start(&mut self, generation: usize) {
        (**self).on_generation_start(generation);
    }

    fn on_generation_complete(&mut self, record: &GenerationRecord) {
        (**self).on_generation_complete(record);
    }
}

impl ProgressCallback for Vec<Box<dyn ProgressCallback>> {
    fn on_generation_start(&mut self, generation: usize) {
        for callback in self.iter_mut() {
            callback.on_generation_start(generation);
        }
    }

    fn on_generation_complete(&mut self, record: &GenerationRecord) {
        for callback in self.iter_mut() {
            callback.on_generation_complete(record);
        }
    }
}

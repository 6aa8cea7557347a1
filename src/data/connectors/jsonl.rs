use crate::engines::generation::progress::{GenerationRecord, ProgressCallback};
use crate::error::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes one JSON object per generation record, one per line
pub struct JsonLinesWriter {
    writer: BufWriter<File>,
}

impl JsonLinesWriter {
    /// Create (or truncate) the log file
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    pub fn write_record(&mut self, record: &GenerationRecord) -> Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

impl ProgressCallback for JsonLinesWriter {
    fn on_generation_start(&mut self, _generation: usize) {}

    fn on_generation_complete(&mut self, record: &GenerationRecord) {
        if let Err(e) = self.write_record(record) {
            log::warn!("Failed to write generation {} to log: {}", record.generation, e);
        }
    }
}

pub mod cache;
pub mod connectors;
pub mod primes;

pub use cache::DiagnosticsCache;
pub use connectors::JsonLinesWriter;
pub use primes::{generate_primes, TargetSequence};

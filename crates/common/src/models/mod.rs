//! Domain models shared by the chunkers and indexers

mod chunk;
mod search;
mod stats;

pub use chunk::{keys, Chunk, ChunkType, Metadata};
pub use search::{IndexOutcome, SearchResult};
pub use stats::{IndexStats, StatsCounters, StrategyDetails};

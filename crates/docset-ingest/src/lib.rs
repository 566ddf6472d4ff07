//! Ingestion: normalization, boilerplate removal, deduplication,
//! token-bounded chunking, transcript merging, and the per-format pipeline
//! router that turns source files into indexable [`docset_core::types::Chunk`]
//! records.

pub mod blocks;
pub mod boilerplate;
pub mod chunk;
pub mod dedup;
pub mod normalize;
pub mod pipeline;
pub mod recognize;
pub mod transcript;
pub mod video;

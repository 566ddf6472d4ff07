//! Hybrid retrieval: one query fans out to vector and lexical search in
//! parallel and the ranked lists are merged with reciprocal-rank fusion.

pub mod context;
pub mod embed;
pub mod engine;
pub mod fusion;

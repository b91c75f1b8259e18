//! # AskDesk Knowledge
//!
//! Everything needed to turn a curated FAQ into a searchable snapshot.
//!
//! ## Design
//! - **Loader**: remote document store first, local JSON file as fallback
//! - **Encoders**: local feature hashing (always available), a local ONNX
//!   sentence transformer (`onnx` feature), or remote embedding endpoints
//!   (OpenAI-compatible, Ollama)
//! - **Index**: exact flat k-NN over squared Euclidean distance
//!
//! ```text
//! KnowledgeLoader.load()  →  [KnowledgeEntry; n]
//!   ↓ normalized questions
//! Encoder.encode_batch()  →  [Vec<f32>; n]   (position i ↔ entry i)
//!   ↓
//! FlatIndex::build()      →  query(vector, k) → [(position, distance)]
//! ```

pub mod embeddings;
pub mod index;
pub mod loader;

#[cfg(feature = "onnx")]
pub use embeddings::OnnxEncoder;
pub use embeddings::{HashingEncoder, RemoteEncoder, RemoteKind, create_encoder};
pub use index::{FlatIndex, Neighbor};
pub use loader::KnowledgeLoader;

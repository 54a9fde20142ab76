//! Information-architecture extraction
//!
//! This module turns a parsed HTML document into an IA map: landmark
//! detection, hierarchical link extraction, and section classification.

pub mod classifier;
pub mod landmark;
pub mod links;
pub mod normalize;

pub use classifier::{classify, IaResult, SectionClassifier};
pub use landmark::{locate, LandmarkCandidate, LandmarkKind, LandmarkSpec};
pub use links::{LinkExtractor, LinkNode, Section, DEFAULT_MAX_NESTING};
pub use normalize::{normalize_text, resolve_url};

#![deny(unsafe_code)]

pub mod engine;
pub mod fuzzy;
pub mod index;
pub mod resolver;
pub mod score;

pub use engine::{MIN_SET_OPERANDS, QueryEngine, intersect_columns, union_columns};
pub use fuzzy::{DeletionIndex, deletion_neighborhood};
pub use index::{Generation, GenerationId, IndexSource, IndexStats};
pub use resolver::{FuzzyResolver, Resolution};
pub use score::{
    Candidate, ConfidencePolicy, LengthNormalized, describe_edit, edit_distance,
    length_normalized_confidence,
};

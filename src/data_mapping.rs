//! Payload → record mapping
//!
//! The mapper walks a page's modules and components, decodes the embedded
//! JSON documents and normalizes the stringly-typed cells it finds there.

pub mod dictionary;
pub mod engine;
pub mod normalize;
pub mod relations;

pub use dictionary::Dictionaries;
pub use engine::{FieldRequirements, RecordMapper, normalize_curve};
pub use normalize::{Scalar, normalize_scalar};

pub mod engine;
pub mod outcome;

pub use engine::{classify, classify_statutory, normalize_text};
pub use outcome::{Classification, MatchSource, StatutoryClassification};

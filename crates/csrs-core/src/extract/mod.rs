pub mod dates;
pub mod demographics;
pub mod disposition;

pub use dates::parse_date;
pub use demographics::{age_band, age_band_text, gender, parse_age, AgeBand};
pub use disposition::{
    disposition, disposition_of, sentence_kind, sentence_of, DispositionOutcome, SentenceKind,
};

//! Sentiment scoring.
//!
//! The lexicon is loaded once and shared as an `Arc<Lexicon>` handle;
//! models are a closed enum so a new model is a new variant plus its
//! scoring function.

pub mod analyzer;
pub mod lexicon;
pub mod vader;

pub use analyzer::*;
pub use lexicon::*;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SentimentError {
    #[error("Model '{0}' is not implemented yet")]
    NotImplemented(String),

    #[error(transparent)]
    Lexicon(#[from] LexiconError),
}

//! Genotype retrieval.
//!
//! Two layers:
//!
//! - [`reader`]: positional functions. Given a decoder, a store path, variant
//!   position(s) and an optional sorted sample subset, each opens one decoder
//!   session, fills a freshly allocated buffer and releases the session.
//! - [`store::PgenStore`]: identifier-level access. Loads the sidecars, indexes
//!   ids, resolves [`SampleSelection`]s and labels every result.
//!
//! ## Retrieval modes
//!
//! | Mode | Dosages | Alleles | Row order |
//! |------|---------|---------|-----------|
//! | single | `get_dosages` | `get_alleles` | - |
//! | list | `get_dosages_list` | `get_alleles_list` | as requested |
//! | range | `get_dosages_range` | `get_alleles_range` | store order |
//! | full | `load_full_table` | - | store order |
//!
//! Range bounds are 0-based and end-inclusive; the translation to the
//! decoder's exclusive end happens in [`reader`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use pgen_retrieval::decoder::memory::InMemoryDecoder;
//! use pgen_retrieval::retrieval::store::PgenStore;
//! use ndarray::Array2;
//!
//! let decoder = InMemoryDecoder::from_alleles(Array2::zeros((10, 200))).unwrap();
//! let store = PgenStore::open("cohort", decoder).unwrap();
//!
//! let selection = store.resolve_samples(Some(&["HG00097", "HG00096"][..]), true).unwrap();
//! let dosages = store.get_dosages_list::<f32, _>(&["rs2", "rs1"], &selection).unwrap();
//! println!("{:?}", dosages.values);
//! ```
//!
//! [`SampleSelection`]: crate::selection::SampleSelection

use thiserror::Error;

use crate::config::ConfigError;
use crate::decoder::DecoderError;
use crate::index::LookupError;
use crate::parsing::ParseError;
use crate::selection::SelectionError;
use crate::utils::validation::ValidationError;

pub mod matrix;
pub mod reader;
pub mod store;

#[derive(Error, Debug)]
pub enum RetrievalError {
    /// Malformed sidecar
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Unknown variant or sample id
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// Sample subset rejected before reaching the decoder
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Failure inside the decoder, passed through unmodified
    #[error(transparent)]
    Decoder(#[from] DecoderError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid variant range: start {start} is after end {end}")]
    InvalidRange { start: u32, end: u32 },

    #[error("Variant position {index} out of range for {num_variants} variants")]
    VariantOutOfRange { index: u32, num_variants: usize },

    #[error("Decoder reports {store} samples but the sample table has {table}")]
    SampleCountMismatch { store: usize, table: usize },
}

impl From<SelectionError> for RetrievalError {
    fn from(err: SelectionError) -> Self {
        match err {
            SelectionError::Lookup(e) => Self::Lookup(e),
            SelectionError::Validation(e) => Self::Validation(e),
        }
    }
}

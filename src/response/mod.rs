//! Response handling: XML tree conversion and payload extraction.

mod unwrap;
pub mod xml;

pub use unwrap::{
    Extraction, ExtractionRules, RAW_RESPONSE_KEY, ResponseUnwrapper, UnwrapError, raw_response,
};

pub mod assignment;
pub mod configuration;
pub mod error;
/// Shifted dot product between a query and library candidates
pub mod matcher;
pub mod peak_matching;
pub mod scoring_result;
pub mod shift;
pub mod spectrum;
// Various utilities
pub mod utils;

pub use configuration::Configuration;
pub use matcher::{best_match, SpectrumMatcher};
pub use scoring_result::SpectrumSpectrumMatch;
pub use spectrum::{Peak, Spectrum, SpectrumLike};

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum Error {
    #[error("m/z ({0}) and intensities ({1}) arrays must have the same length")]
    SpectrumShape(usize, usize),
    #[error("m/z ({0}) and charges ({1}) arrays must have the same length")]
    ChargeShape(usize, usize),
    #[error("Peaks must be sorted by ascending m/z: peak {0} ({1}) follows a peak at {2}")]
    UnsortedPeaks(usize, f64, f64),
    #[error("Non-finite m/z at peak {0}")]
    NonFiniteMz(usize),
    #[error("Non-finite intensity at peak {0}")]
    NonFiniteIntensity(usize),
    #[error("Non-finite precursor m/z: {0}")]
    NonFinitePrecursorMz(f64),
    #[error("Fragment tolerance must be finite and non-negative, got {0}")]
    InvalidFragmentTolerance(f64),
    #[error("Matching cancelled before candidate {0}")]
    Cancelled(usize),
}

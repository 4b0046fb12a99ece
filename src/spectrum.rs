//! Peaks and the spectrum capability consumed by the matcher
use ndarray::Array1;

use crate::{
    error::Error,
    utils::{first_unsorted_index, mass_to_charge_to_dalton},
};

/// A single fragment peak.
///
/// `charge` of 0 means the charge is unknown (or, for a candidate working peak,
/// that the peak is unshifted). `index` points back to the peak in its source spectrum,
/// shifted copies keep the index of the peak they were derived from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    pub mz: f64,
    pub intensity: f64,
    pub charge: usize,
    pub index: usize,
}

impl Peak {
    pub fn new(mz: f64, intensity: f64, charge: usize, index: usize) -> Self {
        Self {
            mz,
            intensity,
            charge,
            index,
        }
    }
}

/// Read-only access to a spectrum as needed for matching.
///
/// Implementors must return peaks with non-decreasing m/z in `i`.
pub trait SpectrumLike {
    fn precursor_mz(&self) -> f64;

    fn precursor_charge(&self) -> usize;

    fn peak_count(&self) -> usize;

    fn peak_mz(&self, i: usize) -> f64;

    fn peak_intensity(&self, i: usize) -> f64;

    /// Charge of the peak, 0 if unknown
    fn peak_charge(&self, i: usize) -> usize;

    fn peak(&self, i: usize) -> Peak {
        Peak::new(
            self.peak_mz(i),
            self.peak_intensity(i),
            self.peak_charge(i),
            i,
        )
    }

    fn peaks(&self) -> impl Iterator<Item = Peak> + '_ {
        (0..self.peak_count()).map(|i| self.peak(i))
    }
}

impl<S: SpectrumLike> SpectrumLike for &S {
    fn precursor_mz(&self) -> f64 {
        (*self).precursor_mz()
    }

    fn precursor_charge(&self) -> usize {
        (*self).precursor_charge()
    }

    fn peak_count(&self) -> usize {
        (*self).peak_count()
    }

    fn peak_mz(&self, i: usize) -> f64 {
        (*self).peak_mz(i)
    }

    fn peak_intensity(&self, i: usize) -> f64 {
        (*self).peak_intensity(i)
    }

    fn peak_charge(&self, i: usize) -> usize {
        (*self).peak_charge(i)
    }
}

/// Centroided spectrum stored as m/z, intensity and charge columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    precursor_mz: f64,
    precursor_charge: usize,
    mz: Array1<f64>,
    intensities: Array1<f64>,
    charges: Array1<usize>,
}

impl Spectrum {
    /// Creates a new spectrum whose peak charges are all unknown.
    ///
    /// Arguments:
    /// * `precursor_mz` - Precursor m/z.
    /// * `precursor_charge` - Precursor charge.
    /// * `mz` - Peak m/z values, sorted ascending.
    /// * `intensities` - Peak intensities.
    ///
    pub fn new(
        precursor_mz: f64,
        precursor_charge: usize,
        mz: Array1<f64>,
        intensities: Array1<f64>,
    ) -> Result<Self, Error> {
        let charges = Array1::zeros(mz.len());
        Self::with_charges(precursor_mz, precursor_charge, mz, intensities, charges)
    }

    /// Creates a new spectrum with annotated peak charges (0 = unknown).
    ///
    /// Arguments:
    /// * `precursor_mz` - Precursor m/z.
    /// * `precursor_charge` - Precursor charge.
    /// * `mz` - Peak m/z values, sorted ascending.
    /// * `intensities` - Peak intensities.
    /// * `charges` - Peak charges.
    ///
    pub fn with_charges(
        precursor_mz: f64,
        precursor_charge: usize,
        mz: Array1<f64>,
        intensities: Array1<f64>,
        charges: Array1<usize>,
    ) -> Result<Self, Error> {
        if !precursor_mz.is_finite() {
            return Err(Error::NonFinitePrecursorMz(precursor_mz));
        }

        if mz.len() != intensities.len() {
            return Err(Error::SpectrumShape(mz.len(), intensities.len()));
        }

        if mz.len() != charges.len() {
            return Err(Error::ChargeShape(mz.len(), charges.len()));
        }

        if let Some(index) = mz.iter().position(|mz| !mz.is_finite()) {
            return Err(Error::NonFiniteMz(index));
        }

        if let Some(index) = intensities.iter().position(|i| !i.is_finite()) {
            return Err(Error::NonFiniteIntensity(index));
        }

        if let Some(index) = first_unsorted_index(&mz) {
            return Err(Error::UnsortedPeaks(index, mz[index], mz[index - 1]));
        }

        Ok(Self {
            precursor_mz,
            precursor_charge,
            mz,
            intensities,
            charges,
        })
    }

    /// Creates a new spectrum from `(m/z, intensity, charge)` triples.
    pub fn from_peaks(
        precursor_mz: f64,
        precursor_charge: usize,
        peaks: &[(f64, f64, usize)],
    ) -> Result<Self, Error> {
        let mz = peaks.iter().map(|p| p.0).collect::<Array1<f64>>();
        let intensities = peaks.iter().map(|p| p.1).collect::<Array1<f64>>();
        let charges = peaks.iter().map(|p| p.2).collect::<Array1<usize>>();
        Self::with_charges(precursor_mz, precursor_charge, mz, intensities, charges)
    }

    pub fn mz(&self) -> &Array1<f64> {
        &self.mz
    }

    pub fn intensities(&self) -> &Array1<f64> {
        &self.intensities
    }

    pub fn charges(&self) -> &Array1<usize> {
        &self.charges
    }

    pub fn is_empty(&self) -> bool {
        self.mz.is_empty()
    }

    /// Neutral precursor mass in Dalton
    pub fn precursor_mass(&self) -> f64 {
        mass_to_charge_to_dalton(self.precursor_mz, self.precursor_charge)
    }
}

impl SpectrumLike for Spectrum {
    fn precursor_mz(&self) -> f64 {
        self.precursor_mz
    }

    fn precursor_charge(&self) -> usize {
        self.precursor_charge
    }

    fn peak_count(&self) -> usize {
        self.mz.len()
    }

    fn peak_mz(&self, i: usize) -> f64 {
        self.mz[i]
    }

    fn peak_intensity(&self, i: usize) -> f64 {
        self.intensities[i]
    }

    fn peak_charge(&self, i: usize) -> usize {
        self.charges[i]
    }
}

use std::ops::Range;

use crate::spectrum::{Peak, SpectrumLike};

/// Charge states used to shift a candidate peak by the precursor mass difference.
///
/// A peak with an annotated charge is shifted for exactly that charge.
/// A peak with unknown charge is shifted for every charge from 1 up to the
/// candidate's precursor charge, exclusive unless `include_precursor_charge` is set.
/// `max_fragment_charge` caps the range for unknown-charge peaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShiftChargeRule {
    pub include_precursor_charge: bool,
    pub max_fragment_charge: Option<usize>,
}

impl ShiftChargeRule {
    pub fn new(include_precursor_charge: bool, max_fragment_charge: Option<usize>) -> Self {
        Self {
            include_precursor_charge,
            max_fragment_charge,
        }
    }

    /// Charges for which a shifted copy of a peak is generated.
    ///
    /// # Arguments
    /// * `peak_charge` - Charge of the candidate peak, 0 if unknown.
    /// * `precursor_charge` - Precursor charge of the candidate spectrum.
    ///
    pub fn charges(&self, peak_charge: usize, precursor_charge: usize) -> Range<usize> {
        if peak_charge > 0 {
            return peak_charge..peak_charge + 1;
        }

        let mut end = if self.include_precursor_charge {
            precursor_charge + 1
        } else {
            precursor_charge
        };
        if let Some(max_charge) = self.max_fragment_charge {
            end = end.min(max_charge + 1);
        }
        1..end.max(1)
    }
}

/// Mass difference between the query and the candidate precursor, scaled by the candidate's precursor charge.
pub fn mass_difference<Q: SpectrumLike, C: SpectrumLike>(query: &Q, candidate: &C) -> f64 {
    (query.precursor_mz() - candidate.precursor_mz()) * candidate.precursor_charge() as f64
}

/// Builds the peaks of a candidate to match against, sorted by ascending m/z.
///
/// Every candidate peak is included unshifted with charge 0, so it may match query peaks of any charge.
/// If shifting is allowed and the mass difference exceeds the fragment tolerance, shifted copies
/// are added at `mz - mass_difference / charge` for each charge given by `rule`.
/// Shifted copies with non-positive m/z are dropped.
///
/// # Arguments
/// * `candidate` - The candidate spectrum.
/// * `query` - The query spectrum.
/// * `fragment_tolerance` - Fragment m/z tolerance.
/// * `allow_shift` - Whether shifted peaks are generated.
/// * `rule` - Charge states used for shifting.
///
pub fn expand_candidate_peaks<Q: SpectrumLike, C: SpectrumLike>(
    candidate: &C,
    query: &Q,
    fragment_tolerance: f64,
    allow_shift: bool,
    rule: &ShiftChargeRule,
) -> Vec<Peak> {
    let mut peaks = candidate
        .peaks()
        .map(|peak| Peak { charge: 0, ..peak })
        .collect::<Vec<Peak>>();

    let mass_difference = mass_difference(query, candidate);
    if !(allow_shift && mass_difference > fragment_tolerance) {
        return peaks;
    }

    let unshifted = peaks.len();
    for peak in candidate.peaks() {
        for charge in rule.charges(peak.charge, candidate.precursor_charge()) {
            let mz = peak.mz - mass_difference / charge as f64;
            if mz > 0.0 {
                peaks.push(Peak { mz, charge, ..peak });
            }
        }
    }

    tracing::trace!(
        "Added {} shifted peaks for a mass difference of {mass_difference}",
        peaks.len() - unshifted
    );

    if peaks.len() > unshifted {
        peaks.sort_by(|a, b| a.mz.total_cmp(&b.mz));
    }
    peaks
}

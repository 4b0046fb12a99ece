use crate::spectrum::{Peak, SpectrumLike};

/// A tolerance compatible pair of a query peak and a candidate peak.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakMatch {
    /// Product of both peak intensities
    pub weight: f64,
    pub query_index: usize,
    /// Index of the peak in the candidate spectrum, shared by all its shifted copies
    pub candidate_index: usize,
}

/// Checks if a query peak may be paired with a candidate working peak based on their charges.
///
/// # Arguments
/// * `query_charge` - Charge of the query peak, 0 if unknown.
/// * `candidate_charge` - Charge of the candidate peak, 0 if unshifted.
///
#[inline]
pub fn charge_compatible(query_charge: usize, candidate_charge: usize) -> bool {
    // unshifted
    if candidate_charge == 0 {
        return true;
    }
    // shifted according to the peak's annotated charge
    if query_charge != 0 && query_charge == candidate_charge {
        return true;
    }
    query_charge == 0
}

/// Finds all pairs of query and candidate peaks within the fragment tolerance.
///
/// Both the query peaks and `candidate_peaks` must be sorted by ascending m/z.
/// A single cursor into `candidate_peaks` only moves forward, so candidate peaks
/// within the tolerance window may be paired with several query peaks.
///
/// # Arguments
/// * `query` - The query spectrum.
/// * `candidate_peaks` - The candidate's (possibly shifted) working peaks.
/// * `fragment_tolerance` - Fragment m/z tolerance.
///
pub fn match_peaks<Q: SpectrumLike>(
    query: &Q,
    candidate_peaks: &[Peak],
    fragment_tolerance: f64,
) -> Vec<PeakMatch> {
    let mut matches = Vec::new();
    let mut cursor = 0;

    for query_peak in query.peaks() {
        while cursor < candidate_peaks.len()
            && candidate_peaks[cursor].mz < query_peak.mz - fragment_tolerance
        {
            cursor += 1;
        }

        matches.extend(
            candidate_peaks[cursor..]
                .iter()
                .take_while(|peak| (query_peak.mz - peak.mz).abs() <= fragment_tolerance)
                .filter(|peak| charge_compatible(query_peak.charge, peak.charge))
                .map(|peak| PeakMatch {
                    weight: query_peak.intensity * peak.intensity,
                    query_index: query_peak.index,
                    candidate_index: peak.index,
                }),
        );
    }

    matches
}

use std::cmp::Ordering;

use crate::peak_matching::PeakMatch;

/// Order of peak matches for the greedy assignment:
/// weight descending, then query index and candidate index ascending.
fn assignment_order(a: &PeakMatch, b: &PeakMatch) -> Ordering {
    b.weight
        .total_cmp(&a.weight)
        .then(a.query_index.cmp(&b.query_index))
        .then(a.candidate_index.cmp(&b.candidate_index))
}

/// Greedily assigns peak matches one-to-one, heaviest first.
///
/// A match is accepted if neither its query peak nor its candidate peak were accepted before.
/// This does not guarantee a maximum weight matching.
///
/// Returns the summed weight of the accepted matches and their `(query index, candidate index)` pairs
/// in acceptance order.
///
/// # Arguments
/// * `matches` - Peak matches, consumed for sorting.
/// * `query_peak_count` - Number of peaks in the query spectrum.
/// * `candidate_peak_count` - Number of peaks in the candidate spectrum (unshifted).
///
pub fn greedy_assignment(
    mut matches: Vec<PeakMatch>,
    query_peak_count: usize,
    candidate_peak_count: usize,
) -> (f64, Vec<(usize, usize)>) {
    matches.sort_unstable_by(assignment_order);

    let mut query_peaks_used = vec![false; query_peak_count];
    let mut candidate_peaks_used = vec![false; candidate_peak_count];
    let mut score = 0.0;
    let mut pairs = Vec::new();

    for peak_match in matches {
        if query_peaks_used[peak_match.query_index]
            || candidate_peaks_used[peak_match.candidate_index]
        {
            continue;
        }
        score += peak_match.weight;
        pairs.push((peak_match.query_index, peak_match.candidate_index));
        query_peaks_used[peak_match.query_index] = true;
        candidate_peaks_used[peak_match.candidate_index] = true;
    }

    (score, pairs)
}

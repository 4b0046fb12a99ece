/// Result of matching the query against a single candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumSpectrumMatch {
    /// Position of the candidate in the list of candidates
    pub candidate_index: usize,
    /// Sum of the intensity products of all assigned peak pairs
    pub score: f64,
    /// `(query peak index, candidate peak index)`, each index used at most once
    pub peak_matches: Vec<(usize, usize)>,
    /// Precursor mass difference used for shifting the candidate's peaks
    pub mass_difference: f64,
    /// Number of query peaks
    pub peaks_total: usize,
}

impl SpectrumSpectrumMatch {
    pub fn peaks_matched(&self) -> usize {
        self.peak_matches.len()
    }
}

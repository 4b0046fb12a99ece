use std::sync::atomic::{AtomicBool, Ordering};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::{
    assignment::greedy_assignment,
    configuration::Configuration,
    error::Error,
    peak_matching::match_peaks,
    scoring_result::SpectrumSpectrumMatch,
    shift::{expand_candidate_peaks, mass_difference},
    spectrum::SpectrumLike,
};

/// Keeps `best` unless `this` has a strictly higher score.
#[allow(clippy::neg_cmp_op_on_partial_ord)]
fn retain_best(
    best: Option<SpectrumSpectrumMatch>,
    this: SpectrumSpectrumMatch,
) -> Option<SpectrumSpectrumMatch> {
    match best {
        // a NaN score on either side keeps the current best
        Some(best) if !(best.score < this.score) => Some(best),
        _ => Some(this),
    }
}

/// Shifted dot product scoring of a query spectrum against library candidates.
pub struct SpectrumMatcher<'a> {
    config: &'a Configuration,
}

impl SpectrumMatcher<'_> {
    /// Creates a new SpectrumMatcher instance.
    ///
    /// Arguments:
    /// * `config` - The configuration to use for scoring.
    ///
    pub fn new(config: &Configuration) -> SpectrumMatcher<'_> {
        SpectrumMatcher { config }
    }

    pub fn config(&self) -> &Configuration {
        self.config
    }

    /// Scores a single candidate against the query.
    ///
    /// # Arguments
    /// * `query` - The query spectrum.
    /// * `candidate` - The candidate spectrum.
    /// * `candidate_index` - Position of the candidate, stored in the result.
    ///
    pub fn score_candidate<Q: SpectrumLike, C: SpectrumLike>(
        &self,
        query: &Q,
        candidate: &C,
        candidate_index: usize,
    ) -> SpectrumSpectrumMatch {
        let candidate_peaks = expand_candidate_peaks(
            candidate,
            query,
            self.config.fragment_tolerance,
            self.config.allow_shift,
            &self.config.shift_charges,
        );
        let peak_matches = match_peaks(query, &candidate_peaks, self.config.fragment_tolerance);
        drop(candidate_peaks);

        let (score, peak_matches) =
            greedy_assignment(peak_matches, query.peak_count(), candidate.peak_count());

        tracing::trace!(
            "Candidate {candidate_index} scored {score} with {} matched peaks",
            peak_matches.len()
        );

        SpectrumSpectrumMatch {
            candidate_index,
            score,
            peak_matches,
            mass_difference: mass_difference(query, candidate),
            peaks_total: query.peak_count(),
        }
    }

    /// Scores every candidate and returns the matches in candidate order.
    ///
    /// # Arguments
    /// * `query` - The query spectrum.
    /// * `candidates` - The candidate spectra.
    ///
    pub fn score_all<Q: SpectrumLike, C: SpectrumLike>(
        &self,
        query: &Q,
        candidates: &[C],
    ) -> Vec<SpectrumSpectrumMatch> {
        candidates
            .iter()
            .enumerate()
            .map(|(candidate_index, candidate)| {
                self.score_candidate(query, candidate, candidate_index)
            })
            .collect()
    }

    /// Returns the best scoring candidate, `None` if there are no candidates.
    ///
    /// Candidates with equal scores are resolved in favour of the earlier one.
    ///
    /// # Arguments
    /// * `query` - The query spectrum.
    /// * `candidates` - The candidate spectra.
    ///
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn best_match<Q: SpectrumLike, C: SpectrumLike>(
        &self,
        query: &Q,
        candidates: &[C],
    ) -> Option<SpectrumSpectrumMatch> {
        tracing::debug!("Scoring {} candidates", candidates.len());

        let best = candidates
            .iter()
            .enumerate()
            .map(|(candidate_index, candidate)| {
                self.score_candidate(query, candidate, candidate_index)
            })
            .fold(None, retain_best);

        if let Some(best) = &best {
            tracing::debug!(
                "Best candidate {} with score {}",
                best.candidate_index,
                best.score
            );
        }
        best
    }

    /// Same as [`SpectrumMatcher::best_match`] but stops with [`Error::Cancelled`]
    /// as soon as `cancel` is set before the next candidate is scored.
    ///
    /// # Arguments
    /// * `query` - The query spectrum.
    /// * `candidates` - The candidate spectra.
    /// * `cancel` - Cancellation flag, checked once per candidate.
    ///
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn best_match_cancellable<Q: SpectrumLike, C: SpectrumLike>(
        &self,
        query: &Q,
        candidates: &[C],
        cancel: &AtomicBool,
    ) -> Result<Option<SpectrumSpectrumMatch>, Error> {
        let mut best = None;
        for (candidate_index, candidate) in candidates.iter().enumerate() {
            if cancel.load(Ordering::Relaxed) {
                tracing::debug!("Cancelled at candidate {candidate_index}");
                return Err(Error::Cancelled(candidate_index));
            }
            best = retain_best(best, self.score_candidate(query, candidate, candidate_index));
        }
        Ok(best)
    }

    /// Parallel version of [`SpectrumMatcher::best_match`] with identical results.
    ///
    /// # Arguments
    /// * `query` - The query spectrum.
    /// * `candidates` - The candidate spectra.
    ///
    #[cfg(feature = "parallel")]
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn par_best_match<Q, C>(&self, query: &Q, candidates: &[C]) -> Option<SpectrumSpectrumMatch>
    where
        Q: SpectrumLike + Sync,
        C: SpectrumLike + Sync,
    {
        tracing::debug!("Scoring {} candidates in parallel", candidates.len());

        candidates
            .par_iter()
            .enumerate()
            .map(|(candidate_index, candidate)| {
                self.score_candidate(query, candidate, candidate_index)
            })
            .reduce_with(|a, b| {
                // equal scores keep the earlier candidate regardless of the reduction order
                if b.score > a.score
                    || (b.score == a.score && b.candidate_index < a.candidate_index)
                {
                    b
                } else {
                    a
                }
            })
    }
}

/// Returns the best scoring candidate for the query, `None` if there are no candidates.
///
/// Uses the default [`crate::shift::ShiftChargeRule`]. The fragment tolerance is not validated,
/// use [`Configuration::new`] and [`SpectrumMatcher`] for validated input.
///
/// # Arguments
/// * `query` - The query spectrum.
/// * `candidates` - The candidate spectra.
/// * `fragment_tolerance` - Fragment m/z tolerance.
/// * `allow_shift` - Whether candidate peaks are shifted by the precursor mass difference.
///
pub fn best_match<Q: SpectrumLike, C: SpectrumLike>(
    query: &Q,
    candidates: &[C],
    fragment_tolerance: f64,
    allow_shift: bool,
) -> Option<SpectrumSpectrumMatch> {
    let config = Configuration {
        fragment_tolerance,
        allow_shift,
        ..Configuration::default()
    };
    SpectrumMatcher::new(&config).best_match(query, candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{shift::ShiftChargeRule, spectrum::Spectrum};

    fn scenario_a() -> (Spectrum, Vec<Spectrum>) {
        let query =
            Spectrum::from_peaks(500.0, 2, &[(100.0, 10.0, 0), (105.0, 5.0, 0)]).unwrap();
        let candidate = Spectrum::from_peaks(500.0, 2, &[(100.0, 8.0, 0)]).unwrap();
        (query, vec![candidate])
    }

    /// Query precursor is 16 Da heavier than the candidate's, the candidate peak at 300 carries charge 1.
    fn scenario_b() -> (Spectrum, Vec<Spectrum>) {
        let query =
            Spectrum::from_peaks(516.0, 1, &[(284.0, 4.0, 1), (300.0, 2.0, 0)]).unwrap();
        let candidate = Spectrum::from_peaks(500.0, 1, &[(300.0, 5.0, 1)]).unwrap();
        (query, vec![candidate])
    }

    /// A handful of candidates with modified and unmodified peaks
    fn library() -> (Spectrum, Vec<Spectrum>) {
        let query = Spectrum::from_peaks(
            508.0,
            2,
            &[
                (150.0, 3.0, 0),
                (201.0, 7.0, 1),
                (250.0, 2.0, 0),
                (309.0, 5.0, 0),
                (410.0, 1.0, 2),
            ],
        )
        .unwrap();
        let candidates = vec![
            Spectrum::from_peaks(500.0, 2, &[(150.0, 1.0, 0), (217.0, 6.0, 1)]).unwrap(),
            Spectrum::from_peaks(
                500.0,
                3,
                &[(150.02, 2.0, 0), (250.0, 2.0, 0), (333.0, 4.0, 0)],
            )
            .unwrap(),
            Spectrum::from_peaks(508.0, 2, &[(201.0, 1.0, 0), (309.0, 1.0, 0)]).unwrap(),
            Spectrum::from_peaks(300.0, 2, &[]).unwrap(),
        ];
        (query, candidates)
    }

    #[test_log::test]
    fn test_scenario_a() {
        let (query, candidates) = scenario_a();
        let ssm = best_match(&query, &candidates, 0.5, false).unwrap();
        assert_eq!(ssm.candidate_index, 0);
        assert_eq!(ssm.score, 80.0);
        assert_eq!(ssm.peak_matches, vec![(0, 0)]);
        assert_eq!(ssm.peaks_matched(), 1);
        assert_eq!(ssm.peaks_total, 2);
    }

    #[test_log::test]
    fn test_scenario_b() {
        let (query, candidates) = scenario_b();

        // the shifted peak at 284 matches the charge 1 query peak
        let ssm = best_match(&query, &candidates, 0.1, true).unwrap();
        assert_eq!(ssm.mass_difference, 16.0);
        assert_eq!(ssm.score, 20.0);
        assert_eq!(ssm.peak_matches, vec![(0, 0)]);

        // the unshifted peak at 300 is still matchable
        let ssm = best_match(&query, &candidates, 0.1, false).unwrap();
        assert_eq!(ssm.score, 10.0);
        assert_eq!(ssm.peak_matches, vec![(1, 0)]);
    }

    #[test]
    fn test_empty_candidates() {
        let (query, _) = scenario_a();
        let candidates: Vec<Spectrum> = Vec::new();
        assert_eq!(best_match(&query, &candidates, 0.5, true), None);

        let config = Configuration::default();
        let cancel = AtomicBool::new(false);
        assert_eq!(
            SpectrumMatcher::new(&config).best_match_cancellable(&query, &candidates, &cancel),
            Ok(None)
        );
    }

    #[test]
    fn test_tie_break() {
        let (query, mut candidates) = scenario_a();
        candidates.push(candidates[0].clone());
        candidates.insert(
            0,
            Spectrum::from_peaks(500.0, 2, &[(300.0, 8.0, 0)]).unwrap(),
        );
        let ssm = best_match(&query, &candidates, 0.5, false).unwrap();
        assert_eq!(ssm.candidate_index, 1);
        assert_eq!(ssm.score, 80.0);
    }

    #[test]
    fn test_zero_score_candidate_is_returned() {
        let (query, _) = scenario_a();
        let candidates = vec![Spectrum::from_peaks(500.0, 2, &[(300.0, 8.0, 0)]).unwrap()];
        let ssm = best_match(&query, &candidates, 0.5, false).unwrap();
        assert_eq!(ssm.candidate_index, 0);
        assert_eq!(ssm.score, 0.0);
        assert!(ssm.peak_matches.is_empty());
    }

    #[test]
    fn test_retain_best_keeps_current_on_nan() {
        let ssm = |candidate_index: usize, score: f64| SpectrumSpectrumMatch {
            candidate_index,
            score,
            peak_matches: Vec::new(),
            mass_difference: 0.0,
            peaks_total: 0,
        };

        let best = retain_best(Some(ssm(0, 5.0)), ssm(1, f64::NAN)).unwrap();
        assert_eq!(best.candidate_index, 0);

        let best = retain_best(Some(ssm(0, f64::NAN)), ssm(1, 5.0)).unwrap();
        assert_eq!(best.candidate_index, 0);

        let best = retain_best(Some(ssm(0, 5.0)), ssm(1, 5.0)).unwrap();
        assert_eq!(best.candidate_index, 0);

        let best = retain_best(Some(ssm(0, 5.0)), ssm(1, 6.0)).unwrap();
        assert_eq!(best.candidate_index, 1);

        let best = retain_best(None, ssm(2, f64::NAN)).unwrap();
        assert_eq!(best.candidate_index, 2);
    }

    #[test]
    fn test_determinism() {
        let (query, candidates) = library();
        let first = best_match(&query, &candidates, 0.05, true);
        for _ in 0..10 {
            assert_eq!(best_match(&query, &candidates, 0.05, true), first);
        }
    }

    #[test]
    fn test_unique_peak_indices() {
        let (query, candidates) = library();
        let config = Configuration::new(0.05, true).unwrap();
        for ssm in SpectrumMatcher::new(&config).score_all(&query, &candidates) {
            let mut query_indices = ssm.peak_matches.iter().map(|p| p.0).collect::<Vec<_>>();
            let mut candidate_indices = ssm.peak_matches.iter().map(|p| p.1).collect::<Vec<_>>();
            query_indices.sort_unstable();
            query_indices.dedup();
            candidate_indices.sort_unstable();
            candidate_indices.dedup();
            assert_eq!(query_indices.len(), ssm.peaks_matched());
            assert_eq!(candidate_indices.len(), ssm.peaks_matched());
        }
    }

    #[test]
    fn test_shift_monotonicity() {
        let (query, candidates) = library();
        let shifted = Configuration::new(0.05, true).unwrap();
        let unshifted = Configuration::new(0.05, false).unwrap();
        let shifted = SpectrumMatcher::new(&shifted).score_all(&query, &candidates);
        let unshifted = SpectrumMatcher::new(&unshifted).score_all(&query, &candidates);
        for (s, u) in shifted.iter().zip(unshifted.iter()) {
            assert!(s.score >= u.score, "{} < {}", s.score, u.score);
        }
        let best_shifted = best_match(&query, &candidates, 0.05, true).unwrap();
        let best_unshifted = best_match(&query, &candidates, 0.05, false).unwrap();
        assert!(best_shifted.score >= best_unshifted.score);
    }

    #[test]
    fn test_library_search() {
        let (query, candidates) = library();
        let config = Configuration::new(0.05, true).unwrap();
        let matches = SpectrumMatcher::new(&config).score_all(&query, &candidates);
        let scores = matches.iter().map(|m| m.score).collect::<Vec<f64>>();
        // 0: 150 unshifted (3 * 1) + 217 - 16 = 201 shifted with charge 1 (7 * 6)
        // 1: 150.02 (3 * 2) + 250 (2 * 2) + 333 - 24 = 309 shifted with charge 1 (5 * 4)
        // 2: 201 (7 * 1) + 309 (5 * 1), no shift
        // 3: no peaks
        assert_eq!(scores, vec![45.0, 30.0, 12.0, 0.0]);

        let ssm = SpectrumMatcher::new(&config)
            .best_match(&query, &candidates)
            .unwrap();
        assert_eq!(ssm.candidate_index, 0);
        assert_eq!(ssm.peak_matches, vec![(1, 1), (0, 0)]);
    }

    #[test]
    fn test_no_shift_needed_idempotence() {
        let query = Spectrum::from_peaks(500.01, 2, &[(100.0, 1.0, 1), (200.0, 2.0, 0)]).unwrap();
        let candidates = vec![
            Spectrum::from_peaks(500.0, 2, &[(100.0, 3.0, 2), (199.98, 1.0, 0)]).unwrap(),
            Spectrum::from_peaks(500.0, 2, &[(80.0, 3.0, 0), (200.01, 4.0, 0)]).unwrap(),
        ];
        assert_eq!(
            best_match(&query, &candidates, 0.05, true),
            best_match(&query, &candidates, 0.05, false)
        );
    }

    #[test]
    fn test_single_candidate_identity() {
        let (query, candidates) = library();
        let config = Configuration::new(0.05, true).unwrap();
        let matcher = SpectrumMatcher::new(&config);
        for candidate in candidates.iter() {
            let single = std::slice::from_ref(candidate);
            let ssm = matcher.best_match(&query, single).unwrap();
            assert_eq!(ssm.candidate_index, 0);
            assert_eq!(ssm, matcher.score_candidate(&query, candidate, 0));
        }
    }

    #[test]
    fn test_shift_charge_rule_changes_score() {
        let (query, candidates) = library();
        // candidate 1 has precursor charge 3, the modified peak only aligns when shifted with charge 1
        let config = Configuration::new(0.05, true)
            .unwrap()
            .with_shift_charges(ShiftChargeRule::new(false, Some(1)));
        let ssm = SpectrumMatcher::new(&config).score_candidate(&query, &candidates[1], 1);
        assert_eq!(ssm.score, 30.0);

        // without any shift charge the modified peak stays unmatched
        let config = Configuration::new(0.05, true)
            .unwrap()
            .with_shift_charges(ShiftChargeRule::new(false, Some(0)));
        let ssm = SpectrumMatcher::new(&config).score_candidate(&query, &candidates[1], 1);
        assert_eq!(ssm.score, 10.0);
    }

    #[test]
    fn test_cancellation() {
        let (query, candidates) = library();
        let config = Configuration::new(0.05, true).unwrap();
        let matcher = SpectrumMatcher::new(&config);

        let cancel = AtomicBool::new(true);
        assert_eq!(
            matcher.best_match_cancellable(&query, &candidates, &cancel),
            Err(Error::Cancelled(0))
        );

        let cancel = AtomicBool::new(false);
        assert_eq!(
            matcher.best_match_cancellable(&query, &candidates, &cancel),
            Ok(matcher.best_match(&query, &candidates))
        );
    }

    #[test]
    fn test_generic_spectrum_references() {
        let (query, candidates) = library();
        let references = candidates.iter().collect::<Vec<&Spectrum>>();
        assert_eq!(
            best_match(&query, &references, 0.05, true),
            best_match(&query, &candidates, 0.05, true)
        );
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_par_best_match() {
        let (query, mut candidates) = library();
        // duplicates to exercise the tie-break across rayon splits
        for _ in 0..5 {
            candidates.extend(candidates.clone());
        }
        let config = Configuration::new(0.05, true).unwrap();
        let matcher = SpectrumMatcher::new(&config);
        assert_eq!(
            matcher.par_best_match(&query, &candidates),
            matcher.best_match(&query, &candidates)
        );
    }
}

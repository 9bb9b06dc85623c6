use std::cmp::Ordering;

use super::labels::ClassLabels;
use super::model::InferenceError;

/// Size of the shortlist returned next to the best class.
pub const TOP_K: usize = 3;

/// One ranked class. `confidence` is a percentage and is kept unrounded.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub index: usize,
    pub label: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    pub top1: Candidate,
    pub top_k: Vec<Candidate>,
}

/// Orders class indices by descending probability. Equal probabilities keep
/// index order and NaN sorts after every number.
pub fn ranked_indices(probabilities: &[f32]) -> Vec<usize> {
    let mut indexed: Vec<(usize, f32)> = probabilities.iter().copied().enumerate().collect();
    // sort_by is stable, so ties stay in index order.
    indexed.sort_by(|a, b| descending(a.1, b.1));
    indexed.into_iter().map(|(idx, _)| idx).collect()
}

fn descending(a: f32, b: f32) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

pub fn rank(probabilities: &[f32], labels: &ClassLabels) -> Result<Ranking, InferenceError> {
    if probabilities.len() != labels.len() || probabilities.len() < TOP_K {
        return Err(InferenceError::OutputMismatch {
            expected: labels.len(),
            got: probabilities.len(),
        });
    }

    let top_k: Vec<Candidate> = ranked_indices(probabilities)
        .into_iter()
        .take(TOP_K)
        .map(|index| Candidate {
            index,
            label: labels.get(index).unwrap_or_default().to_string(),
            // Scaled in the classifier's f32 so 0.8 reports and scores as exactly 80.
            confidence: (probabilities[index] * 100.0) as f64,
        })
        .collect();

    let top1 = top_k[0].clone();
    Ok(Ranking { top1, top_k })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(n: usize) -> ClassLabels {
        ClassLabels::new((0..n).map(|i| format!("class_{}", i)).collect()).unwrap()
    }

    #[test]
    fn test_ties_prefer_lower_index() {
        let probs = [0.1, 0.7, 0.05, 0.1, 0.05];
        let ranking = rank(&probs, &labels(5)).unwrap();

        assert_eq!(ranking.top1.index, 1);
        assert!((ranking.top1.confidence - 70.0).abs() < 1e-4);

        let order: Vec<usize> = ranking.top_k.iter().map(|c| c.index).collect();
        assert_eq!(order, vec![1, 0, 3]);
        assert_eq!(ranking.top_k[1].label, "class_0");
    }

    #[test]
    fn test_all_equal_returns_first_three() {
        let ranking = rank(&[0.25; 4], &labels(4)).unwrap();
        assert_eq!(ranking.top1.index, 0);
        let order: Vec<usize> = ranking.top_k.iter().map(|c| c.index).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn test_ranking_uses_unrounded_values() {
        // Both round to 50.00% but the second is larger.
        let probs = [0.500001, 0.500004, 0.0];
        let ranking = rank(&probs, &labels(3)).unwrap();
        assert_eq!(ranking.top1.index, 1);
    }

    #[test]
    fn test_threshold_probabilities_scale_exactly() {
        let cases = [(0.8f32, 80.0), (0.75, 75.0), (0.7, 70.0)];
        for (probability, percent) in cases {
            let ranking = rank(&[probability, 0.1, 0.05], &labels(3)).unwrap();
            assert_eq!(ranking.top1.confidence, percent);
        }
    }

    #[test]
    fn test_nan_ranks_last() {
        let probs = [f32::NAN, 0.2, 0.3, 0.1];
        let order = ranked_indices(&probs);
        assert_eq!(order, vec![2, 1, 3, 0]);
    }

    #[test]
    fn test_length_mismatch_is_an_error() {
        let err = rank(&[0.5, 0.5, 0.0], &labels(4)).unwrap_err();
        assert!(matches!(
            err,
            InferenceError::OutputMismatch { expected: 4, got: 3 }
        ));
    }
}

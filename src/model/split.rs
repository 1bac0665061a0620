//! Split
//!
//! Train/test splitting of labelled rows before fitting a classifier.
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

// A sampler partitions row indices into a training and a held out set.
pub trait Sampler {
    /// Sample the data, returning a tuple, where the first item is the samples
    /// chosen for training, and the second are the samples held out.
    fn sample(&mut self, rng: &mut StdRng, index: &[usize]) -> (Vec<usize>, Vec<usize>);
}

/// Holds out `test_size` of every class, so both sides keep the class ratio.
pub struct StratifiedSampler<'a> {
    labels: &'a [u8],
    test_size: f64,
}

impl<'a> StratifiedSampler<'a> {
    pub fn new(labels: &'a [u8], test_size: f64) -> Self {
        StratifiedSampler { labels, test_size }
    }
}

impl Sampler for StratifiedSampler<'_> {
    fn sample(&mut self, rng: &mut StdRng, index: &[usize]) -> (Vec<usize>, Vec<usize>) {
        let mut chosen = Vec::new();
        let mut excluded = Vec::new();
        for class in [0u8, 1u8] {
            let mut members: Vec<usize> = index.iter().copied().filter(|&i| self.labels[i] == class).collect();
            if members.is_empty() {
                continue;
            }
            members.shuffle(rng);
            let mut n_test = (members.len() as f64 * self.test_size).round() as usize;
            // Keep at least one row of the class on each side when possible.
            if members.len() >= 2 {
                n_test = n_test.clamp(1, members.len() - 1);
            } else {
                n_test = 0;
            }
            excluded.extend_from_slice(&members[..n_test]);
            chosen.extend_from_slice(&members[n_test..]);
        }
        chosen.sort_unstable();
        excluded.sort_unstable();
        (chosen, excluded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_stratified_sampler() {
        let labels: Vec<u8> = (0..100).map(|i| if i < 80 { 0 } else { 1 }).collect();
        let index: Vec<usize> = (0..100).collect();
        let mut rng = StdRng::seed_from_u64(42);
        let (train, test) = StratifiedSampler::new(&labels, 0.25).sample(&mut rng, &index);

        assert_eq!(train.len() + test.len(), 100);
        assert_eq!(test.len(), 25);
        assert_eq!(test.iter().filter(|&&i| labels[i] == 1).count(), 5);
        assert!(train.iter().all(|i| !test.contains(i)));
    }

    #[test]
    fn test_stratified_sampler_is_seeded() {
        let labels: Vec<u8> = (0..40).map(|i| (i % 2) as u8).collect();
        let index: Vec<usize> = (0..40).collect();
        let a = StratifiedSampler::new(&labels, 0.3).sample(&mut StdRng::seed_from_u64(7), &index);
        let b = StratifiedSampler::new(&labels, 0.3).sample(&mut StdRng::seed_from_u64(7), &index);
        assert_eq!(a, b);
    }

    #[test]
    fn test_small_class_keeps_a_training_row() {
        let labels = vec![0, 0, 0, 0, 1, 1];
        let index: Vec<usize> = (0..6).collect();
        let mut rng = StdRng::seed_from_u64(0);
        let (train, test) = StratifiedSampler::new(&labels, 0.1).sample(&mut rng, &index);
        assert!(train.iter().any(|&i| labels[i] == 1));
        assert!(test.iter().any(|&i| labels[i] == 1));
    }
}

/// String similarity in `[0.0, 1.0]` over already-folded text.
///
/// Implementations must be pure: same inputs, same output, on every thread.
pub trait Similarity: Send + Sync {
    fn similarity(&self, a: &str, b: &str) -> f64;
}

/// Jaro-Winkler with the standard 0.1 prefix scale over up to 4 characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct JaroWinkler;

impl Similarity for JaroWinkler {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        if a == b {
            return 1.0;
        }
        let score = strsim::jaro_winkler(a, b);
        debug_assert!((0.0..=1.0).contains(&score), "similarity {score} out of range");
        score
    }
}

//! Creation-time ids for favorites and tool shortcuts

use chrono::Utc;

/// Hands out millisecond timestamps, bumped forward so two ids created in the
/// same millisecond still differ.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: i64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next token, skipping any value for which `taken` returns true
    pub fn next_token(&mut self, taken: impl Fn(&str) -> bool) -> String {
        let mut candidate = Utc::now().timestamp_millis().max(self.last + 1);
        while taken(&candidate.to_string()) {
            candidate += 1;
        }
        self.last = candidate;
        candidate.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_are_strictly_increasing() {
        let mut ids = IdGenerator::new();
        let a: i64 = ids.next_token(|_| false).parse().unwrap();
        let b: i64 = ids.next_token(|_| false).parse().unwrap();
        assert!(b > a);
    }

    #[test]
    fn test_taken_tokens_are_skipped() {
        let mut ids = IdGenerator::new();
        let limit = Utc::now().timestamp_millis() + 1_000;
        let token = ids.next_token(|t| t.parse::<i64>().map_or(false, |v| v < limit));
        assert_eq!(token, limit.to_string());
    }
}

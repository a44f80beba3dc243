//! Visited-URL registry shared by every branch of one crawl

use std::collections::HashSet;
use std::sync::Mutex;

/// Set of URLs already claimed by a crawl branch
///
/// One registry is created per crawl and shared (behind an `Arc`) by all of
/// its concurrent branches. Claiming is a single test-and-insert under the
/// lock, so two branches racing for the same URL can never both win.
#[derive(Debug, Default)]
pub struct VisitedRegistry {
    claimed: Mutex<HashSet<String>>,
}

impl VisitedRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `url` for the caller
    ///
    /// Returns `true` if this call performed the claim and `false` if the
    /// URL had already been claimed.
    pub fn try_claim(&self, url: &str) -> bool {
        let mut claimed = self.claimed.lock().unwrap_or_else(|e| e.into_inner());
        claimed.insert(url.to_string())
    }

    /// Returns true if `url` has been claimed
    ///
    /// The answer can be stale by the time the caller acts on it; use it only
    /// as an early filter and rely on [`try_claim`](Self::try_claim) for the
    /// authoritative decision.
    pub fn is_claimed(&self, url: &str) -> bool {
        let claimed = self.claimed.lock().unwrap_or_else(|e| e.into_inner());
        claimed.contains(url)
    }

    /// Number of URLs claimed so far
    pub fn len(&self) -> usize {
        self.claimed.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Returns true if nothing has been claimed yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_first_claim_wins() {
        let registry = VisitedRegistry::new();
        assert!(registry.try_claim("https://example.com/"));
        assert!(!registry.try_claim("https://example.com/"));
        assert!(registry.try_claim("https://example.com/other"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_is_claimed() {
        let registry = VisitedRegistry::new();
        assert!(registry.is_empty());
        assert!(!registry.is_claimed("https://example.com/"));

        registry.try_claim("https://example.com/");
        assert!(registry.is_claimed("https://example.com/"));
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_concurrent_claims_have_single_winner() {
        let registry = Arc::new(VisitedRegistry::new());
        let winners = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let winners = Arc::clone(&winners);
                std::thread::spawn(move || {
                    for i in 0..100 {
                        if registry.try_claim(&format!("https://example.com/{}", i)) {
                            winners.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(winners.load(Ordering::SeqCst), 100);
        assert_eq!(registry.len(), 100);
    }
}

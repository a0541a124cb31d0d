//! Drink catalog search with keystroke debouncing.
//!
//! Every search takes a ticket from a monotonic generation counter. A
//! search whose ticket is no longer the latest when its delay elapses
//! resolves to `None`, so a slow, superseded search can never overwrite
//! the results of a newer one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::debug;

use crate::catalog;
use crate::metrics::MetricsCollector;
use crate::models::DrinkProduct;

/// Generation token handed out per search request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchTicket(u64);

/// Debounced search over a drink list
#[derive(Debug)]
pub struct DrinkSearch {
    drinks: Vec<DrinkProduct>,
    generation: AtomicU64,
    debounce: Duration,
    max_results: usize,
    metrics: MetricsCollector,
}

impl DrinkSearch {
    /// Search the bundled catalog
    #[must_use]
    pub fn new(debounce: Duration, max_results: usize) -> Self {
        Self::with_drinks(catalog::drinks().to_vec(), debounce, max_results)
    }

    /// Search a custom drink list
    #[must_use]
    pub fn with_drinks(drinks: Vec<DrinkProduct>, debounce: Duration, max_results: usize) -> Self {
        Self {
            drinks,
            generation: AtomicU64::new(0),
            debounce,
            max_results,
            metrics: MetricsCollector::default(),
        }
    }

    /// Immediate, case-insensitive match on drink name or brand
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<DrinkProduct> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.drinks
            .iter()
            .filter(|d| {
                d.name.to_lowercase().contains(&needle) || d.brand.to_lowercase().contains(&needle)
            })
            .take(self.max_results)
            .cloned()
            .collect()
    }

    /// Start a new request, superseding every earlier ticket
    pub fn begin(&self) -> SearchTicket {
        SearchTicket(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// True if no newer request has started since `ticket`
    #[must_use]
    pub fn is_current(&self, ticket: SearchTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.0
    }

    /// Keep `results` only if `ticket` is still the latest request
    pub fn accept<T>(&self, ticket: SearchTicket, results: T) -> Option<T> {
        let current = self.is_current(ticket);
        self.metrics.record_search(!current);
        if current {
            Some(results)
        } else {
            debug!(ticket = ticket.0, "Discarding superseded search");
            None
        }
    }

    /// Wait for the debounce delay, then search unless superseded
    pub async fn debounced(&self, query: &str) -> Option<Vec<DrinkProduct>> {
        let ticket = self.begin();
        tokio::time::sleep(self.debounce).await;
        if !self.is_current(ticket) {
            return self.accept(ticket, Vec::new());
        }
        let results = self.search(query);
        self.accept(ticket, results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_matches_name_and_brand() {
        let search = DrinkSearch::new(Duration::ZERO, 50);
        let by_name = search.search("杨枝甘露");
        assert!(by_name.iter().any(|d| d.brand == "茶百道"));
        let by_brand = search.search("coco");
        assert!(!by_brand.is_empty());
        assert!(by_brand.iter().all(|d| d.brand == "COCO都可"));
        assert!(search.search("   ").is_empty());
    }

    #[test]
    fn test_stale_ticket_is_rejected() {
        let search = DrinkSearch::new(Duration::ZERO, 10);
        let first = search.begin();
        let second = search.begin();
        assert_eq!(search.accept(first, 1), None);
        assert_eq!(search.accept(second, 2), Some(2));
    }

    #[tokio::test]
    async fn test_superseded_search_resolves_to_none() {
        let search = DrinkSearch::new(Duration::from_millis(50), 10);
        let later = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            search.debounced("茶百道").await
        };
        let (first, second) = tokio::join!(search.debounced("喜茶"), later);
        assert_eq!(first, None);
        let second = second.unwrap();
        assert!(!second.is_empty());
        assert!(second.iter().all(|d| d.brand == "茶百道"));
    }

    #[tokio::test]
    async fn test_lone_search_completes() {
        let search = DrinkSearch::new(Duration::from_millis(1), 10);
        assert!(search.debounced("coco").await.is_some_and(|r| !r.is_empty()));
    }

    #[test]
    fn test_max_results_limits_output() {
        let search = DrinkSearch::new(Duration::ZERO, 1);
        assert_eq!(search.search("奶").len(), 1);
    }
}

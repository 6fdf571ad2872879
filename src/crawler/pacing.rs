//! Randomized pacing
//!
//! Every pause during a run is drawn uniformly from a configured range so the
//! session never settles into a fixed, detectable cadence.

use crate::config::{DelayRange, PacingConfig};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::time::Duration;

/// Source of randomized delays
pub struct Pacer {
    config: PacingConfig,
    rng: Box<dyn RngCore + Send>,
}

impl Pacer {
    /// Creates a pacer drawing delays from `rng`
    ///
    /// # Arguments
    ///
    /// * `config` - Delay ranges for each kind of pause
    /// * `rng` - Random source; production seeds one from OS entropy
    pub fn new(config: PacingConfig, rng: impl RngCore + Send + 'static) -> Self {
        Self {
            config,
            rng: Box::new(rng),
        }
    }

    /// A pacer that never sleeps
    pub fn disabled() -> Self {
        Self::new(PacingConfig::zero(), StdRng::seed_from_u64(0))
    }

    /// Draws one delay from `range`
    pub fn draw(&mut self, range: DelayRange) -> Duration {
        if range.max_ms <= range.min_ms {
            return Duration::from_millis(range.min_ms);
        }
        Duration::from_millis(self.rng.random_range(range.min_ms..=range.max_ms))
    }

    async fn pause(&mut self, range: DelayRange, reason: &str) -> Duration {
        let delay = self.draw(range);
        if !delay.is_zero() {
            tracing::debug!("Waiting {:.1}s {}", delay.as_secs_f64(), reason);
            tokio::time::sleep(delay).await;
        }
        delay
    }

    /// Pause after issuing a search, while results populate
    pub async fn settle(&mut self) -> Duration {
        let range = self.config.settle;
        self.pause(range, "for search results").await
    }

    /// Pause after opening a listing's detail view
    pub async fn after_click(&mut self) -> Duration {
        let range = self.config.click;
        self.pause(range, "after opening listing").await
    }

    /// Pause after dismissing a listing's detail view
    pub async fn after_dismiss(&mut self) -> Duration {
        let range = self.config.dismiss;
        self.pause(range, "after closing listing").await
    }

    /// Pause after clicking a pagination control
    pub async fn page_turn(&mut self) -> Duration {
        let range = self.config.page;
        self.pause(range, "after changing page").await
    }

    /// Pause between two locations
    pub async fn between_locations(&mut self) -> Duration {
        let delay = self.draw(self.config.location);
        if !delay.is_zero() {
            tracing::info!(
                "Waiting {:.1}s before the next location",
                delay.as_secs_f64()
            );
            tokio::time::sleep(delay).await;
        }
        delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_stays_in_range() {
        let mut pacer = Pacer::new(PacingConfig::default(), StdRng::seed_from_u64(5));
        let range = DelayRange::new(45_000, 120_000);
        for _ in 0..200 {
            let delay = pacer.draw(range);
            assert!(delay >= Duration::from_secs(45));
            assert!(delay <= Duration::from_secs(120));
        }
    }

    #[test]
    fn test_draw_degenerate_range() {
        let mut pacer = Pacer::disabled();
        assert_eq!(pacer.draw(DelayRange::new(250, 250)), Duration::from_millis(250));
        assert_eq!(pacer.draw(DelayRange::zero()), Duration::ZERO);
    }

    #[test]
    fn test_draw_varies() {
        let mut pacer = Pacer::new(PacingConfig::default(), StdRng::seed_from_u64(9));
        let range = DelayRange::new(1_000, 3_000);
        let draws: Vec<Duration> = (0..20).map(|_| pacer.draw(range)).collect();
        assert!(draws.iter().any(|d| *d != draws[0]));
    }

    #[tokio::test]
    async fn test_disabled_pacer_does_not_sleep() {
        let mut pacer = Pacer::disabled();
        assert_eq!(pacer.settle().await, Duration::ZERO);
        assert_eq!(pacer.after_click().await, Duration::ZERO);
        assert_eq!(pacer.after_dismiss().await, Duration::ZERO);
        assert_eq!(pacer.page_turn().await, Duration::ZERO);
        assert_eq!(pacer.between_locations().await, Duration::ZERO);
    }
}

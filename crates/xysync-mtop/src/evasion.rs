//! Request fingerprint randomization and pacing.
//!
//! Both services draw from an explicit random source so tests can pin the
//! sequence with a seeded [`StdRng`]. Neither retries anything.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use xysync_core::EvasionPools;

/// Header values chosen for one request. `None` leaves the client default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderProfile {
    pub user_agent: Option<String>,
    pub accept_language: Option<String>,
    pub referer: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HeaderRandomizer {
    pools: EvasionPools,
}

impl HeaderRandomizer {
    #[must_use]
    pub fn new(pools: EvasionPools) -> Self {
        Self { pools }
    }

    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> HeaderProfile {
        HeaderProfile {
            user_agent: self.pools.user_agents.choose(rng).cloned(),
            accept_language: self.pools.accept_languages.choose(rng).cloned(),
            referer: self.pools.referers.choose(rng).cloned(),
        }
    }
}

/// Uniform random pause in `[min_ms, max_ms]`; `[0, 0]` never sleeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayManager {
    min_ms: u64,
    max_ms: u64,
}

impl DelayManager {
    /// An inverted range is normalized rather than rejected.
    #[must_use]
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self {
            min_ms: min_ms.min(max_ms),
            max_ms: min_ms.max(max_ms),
        }
    }

    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.max_ms == 0
    }

    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.is_noop() {
            return Duration::ZERO;
        }
        Duration::from_millis(rng.random_range(self.min_ms..=self.max_ms))
    }
}

/// The pair of services the protocol client consults before each send.
#[derive(Debug)]
pub struct Evasion {
    headers: HeaderRandomizer,
    delay: DelayManager,
    rng: Mutex<StdRng>,
}

impl Evasion {
    #[must_use]
    pub fn new(pools: EvasionPools, delay: DelayManager) -> Self {
        Self::with_rng(pools, delay, StdRng::from_os_rng())
    }

    /// Deterministic variant for tests and reproducible runs.
    #[must_use]
    pub fn with_seed(pools: EvasionPools, delay: DelayManager, seed: u64) -> Self {
        Self::with_rng(pools, delay, StdRng::seed_from_u64(seed))
    }

    fn with_rng(pools: EvasionPools, delay: DelayManager, rng: StdRng) -> Self {
        Self {
            headers: HeaderRandomizer::new(pools),
            delay,
            rng: Mutex::new(rng),
        }
    }

    /// Draws the pause and header set for the next request.
    ///
    /// The lock is released before the caller sleeps or sends.
    pub fn next_request(&self) -> (Duration, HeaderProfile) {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let pause = self.delay.pick(&mut *rng);
        let profile = self.headers.pick(&mut *rng);
        (pause, profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_pools() -> EvasionPools {
        EvasionPools {
            user_agents: vec!["ua-1".to_string(), "ua-2".to_string()],
            accept_languages: vec!["zh-CN".to_string()],
            referers: vec!["https://www.goofish.com/".to_string()],
        }
    }

    #[test]
    fn picks_come_from_pools() {
        let randomizer = HeaderRandomizer::new(small_pools());
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let profile = randomizer.pick(&mut rng);
            let ua = profile.user_agent.unwrap();
            assert!(ua == "ua-1" || ua == "ua-2");
            assert_eq!(profile.accept_language.as_deref(), Some("zh-CN"));
            assert_eq!(profile.referer.as_deref(), Some("https://www.goofish.com/"));
        }
    }

    #[test]
    fn empty_pool_yields_none() {
        let pools = EvasionPools {
            user_agents: Vec::new(),
            ..small_pools()
        };
        let profile = HeaderRandomizer::new(pools).pick(&mut StdRng::seed_from_u64(1));
        assert!(profile.user_agent.is_none());
    }

    #[test]
    fn same_seed_same_sequence() {
        let randomizer = HeaderRandomizer::new(EvasionPools::default());
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        for _ in 0..10 {
            assert_eq!(randomizer.pick(&mut a), randomizer.pick(&mut b));
        }
    }

    #[test]
    fn delay_stays_within_range() {
        let delay = DelayManager::new(1000, 3000);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let d = delay.pick(&mut rng);
            assert!(d >= Duration::from_millis(1000) && d <= Duration::from_millis(3000));
        }
    }

    #[test]
    fn zero_range_is_noop() {
        let delay = DelayManager::new(0, 0);
        assert!(delay.is_noop());
        assert_eq!(delay.pick(&mut StdRng::seed_from_u64(3)), Duration::ZERO);
    }

    #[test]
    fn fixed_range_returns_exact_value() {
        let delay = DelayManager::new(250, 250);
        assert_eq!(
            delay.pick(&mut StdRng::seed_from_u64(9)),
            Duration::from_millis(250)
        );
    }

    #[test]
    fn inverted_range_is_normalized() {
        assert_eq!(DelayManager::new(3000, 1000), DelayManager::new(1000, 3000));
    }

    #[test]
    fn seeded_evasion_is_reproducible() {
        let a = Evasion::with_seed(EvasionPools::default(), DelayManager::new(10, 20), 5);
        let b = Evasion::with_seed(EvasionPools::default(), DelayManager::new(10, 20), 5);
        for _ in 0..5 {
            assert_eq!(a.next_request(), b.next_request());
        }
    }
}

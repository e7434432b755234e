use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;

pub type Limiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// The public ORS plan allows 40 directions requests per minute.
pub const ORS_REQUESTS_PER_MINUTE: u32 = 40;

/// A direct limiter; zero is clamped to one request per minute.
pub fn limiter_per_minute(requests: u32) -> Limiter {
    let quota = Quota::per_minute(NonZeroU32::new(requests).unwrap_or(NonZeroU32::MIN));
    Arc::new(RateLimiter::direct(quota))
}

/// Nominatim's usage policy caps clients at one request per second, no burst.
pub fn nominatim_limiter() -> Limiter {
    Arc::new(RateLimiter::direct(Quota::per_second(NonZeroU32::MIN)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_matches_quota() {
        let limiter = limiter_per_minute(3);
        assert!((0..3).all(|_| limiter.check().is_ok()));
        assert!(limiter.check().is_err());
    }

    #[test]
    fn zero_is_clamped() {
        let limiter = limiter_per_minute(0);
        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_err());
    }

    #[test]
    fn nominatim_allows_no_burst() {
        let limiter = nominatim_limiter();
        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_err());
    }
}

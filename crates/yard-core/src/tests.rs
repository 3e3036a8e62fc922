//! Unit tests for yard-core primitives.

#[cfg(test)]
mod ids {
    use crate::{SwitchId, TrackId, TrainNumber};

    #[test]
    fn ordering() {
        assert!(TrainNumber(1) < TrainNumber(2));
        assert!(SwitchId(103) > SwitchId(102));
    }

    #[test]
    fn display_is_bare_integer() {
        assert_eq!(SwitchId(102).to_string(), "102");
        assert_eq!(TrackId(9).to_string(), "9");
    }

    #[test]
    fn from_raw() {
        assert_eq!(TrainNumber::from(7), TrainNumber(7));
        assert_eq!(TrackId(50).get(), 50);
    }
}

#[cfg(test)]
mod config {
    use std::time::Duration;

    use crate::DispatchConfig;

    #[test]
    fn defaults_match_yard_constants() {
        let c = DispatchConfig::default();
        assert_eq!(c.switch_timeout(), Duration::from_millis(1_000));
        assert_eq!(c.max_attempts, 3);
        assert_eq!(c.backoff_min(), Duration::from_millis(1_000));
        assert_eq!(c.backoff_max(), Duration::from_millis(3_000));
        assert_eq!(c.max_concurrency, 30);
        assert_eq!(c.global_deadline(), Duration::from_secs(300));
        assert!(c.validate().is_ok());
    }

    #[test]
    fn zero_attempts_rejected() {
        let c = DispatchConfig { max_attempts: 0, ..DispatchConfig::default() };
        assert!(c.validate().is_err());
    }

    #[test]
    fn zero_concurrency_rejected() {
        let c = DispatchConfig { max_concurrency: 0, ..DispatchConfig::default() };
        assert!(c.validate().is_err());
    }

    #[test]
    fn inverted_backoff_rejected() {
        let c = DispatchConfig {
            backoff_min_ms: 500,
            backoff_max_ms: 100,
            ..DispatchConfig::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn zero_deadline_rejected() {
        let c = DispatchConfig { global_deadline_ms: 0, ..DispatchConfig::default() };
        assert!(c.validate().is_err());
    }
}

#[cfg(test)]
mod rng {
    use std::time::Duration;

    use crate::{TrainNumber, TrainRng};

    #[test]
    fn same_seed_same_sequence() {
        let mut a = TrainRng::new(42, TrainNumber(3));
        let mut b = TrainRng::new(42, TrainNumber(3));
        let min = Duration::from_millis(1_000);
        let max = Duration::from_millis(3_000);
        for _ in 0..20 {
            assert_eq!(a.backoff(min, max), b.backoff(min, max));
        }
    }

    #[test]
    fn backoff_within_bounds() {
        let mut rng = TrainRng::new(7, TrainNumber(1));
        let min = Duration::from_millis(10);
        let max = Duration::from_millis(30);
        for _ in 0..500 {
            let d = rng.backoff(min, max);
            assert!(d >= min && d <= max, "got {d:?}");
        }
    }

    #[test]
    fn degenerate_range() {
        let mut rng = TrainRng::new(7, TrainNumber(1));
        let d = Duration::from_millis(25);
        assert_eq!(rng.backoff(d, d), d);
    }
}

#[cfg(test)]
mod cancel {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::{Duration, Instant};

    use crate::{CancelReason, CancelToken, Wake};

    struct CountingWaker(AtomicUsize);

    impl Wake for CountingWaker {
        fn wake(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn first_reason_wins() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        assert!(token.cancel(CancelReason::Deadline));
        assert!(!token.cancel(CancelReason::Operator));
        assert_eq!(token.reason(), Some(CancelReason::Deadline));
    }

    #[test]
    fn clones_share_state() {
        let token = CancelToken::new();
        let other = token.clone();
        other.cancel(CancelReason::Operator);
        assert!(token.is_cancelled());
        assert_eq!(token.reason(), Some(CancelReason::Operator));
    }

    #[test]
    fn uncancelled_sleep_runs_to_completion() {
        let token = CancelToken::new();
        let t0 = Instant::now();
        assert!(token.sleep(Duration::from_millis(30)));
        assert!(t0.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn cancel_interrupts_sleep() {
        let token = CancelToken::new();
        let sleeper = token.clone();
        let handle = thread::spawn(move || {
            let t0 = Instant::now();
            let completed = sleeper.sleep(Duration::from_secs(30));
            (completed, t0.elapsed())
        });
        thread::sleep(Duration::from_millis(50));
        token.cancel(CancelReason::Operator);
        let (completed, elapsed) = handle.join().unwrap();
        assert!(!completed);
        assert!(elapsed < Duration::from_secs(5), "sleep took {elapsed:?}");
    }

    #[test]
    fn sleep_on_cancelled_token_returns_immediately() {
        let token = CancelToken::new();
        token.cancel(CancelReason::Deadline);
        assert!(!token.sleep(Duration::from_secs(30)));
    }

    #[test]
    fn registered_wakers_fire_once() {
        let token = CancelToken::new();
        let waker = Arc::new(CountingWaker(AtomicUsize::new(0)));
        token.register(waker.clone());
        token.cancel(CancelReason::Deadline);
        token.cancel(CancelReason::Operator);
        assert_eq!(waker.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn late_registration_wakes_immediately() {
        let token = CancelToken::new();
        token.cancel(CancelReason::Deadline);
        let waker = Arc::new(CountingWaker(AtomicUsize::new(0)));
        token.register(waker.clone());
        assert_eq!(waker.0.load(Ordering::SeqCst), 1);
    }
}

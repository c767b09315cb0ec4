use std::time::{Duration, Instant};

/// Pausable measurement progress.
///
/// Converts elapsed wall-clock time since the measurement started, minus
/// accumulated paused intervals, into a 0-100 percentage. The clock is
/// injected through `Instant` parameters, so the tracker itself never reads
/// the system time.
///
/// Invariants: `total_paused` only grows, and only while not paused;
/// `paused_since` is `Some` iff currently paused; percent never exceeds
/// 100 and is 0 before the tracker is started.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    started_at: Option<Instant>,
    paused_since: Option<Instant>,
    total_paused: Duration,
    target: Duration,
}

impl ProgressTracker {
    pub fn new(target: Duration) -> Self {
        Self {
            started_at: None,
            paused_since: None,
            total_paused: Duration::ZERO,
            target,
        }
    }

    /// Clear all tracking state; percent returns to 0.
    pub fn reset(&mut self) {
        self.started_at = None;
        self.paused_since = None;
        self.total_paused = Duration::ZERO;
    }

    /// Begin tracking from `now`, discarding any previous run.
    pub fn start(&mut self, now: Instant) {
        self.started_at = Some(now);
        self.paused_since = None;
        self.total_paused = Duration::ZERO;
    }

    /// Begin tracking only if not already started.
    ///
    /// Guards against a missed state-change callback: the first processing
    /// tick can establish the start time instead.
    pub fn start_if_unset(&mut self, now: Instant) {
        if self.started_at.is_none() {
            self.start(now);
        }
    }

    /// Freeze progress at its current value. No-op if already paused or
    /// not started.
    pub fn pause(&mut self, now: Instant) {
        if self.started_at.is_some() && self.paused_since.is_none() {
            self.paused_since = Some(now);
        }
    }

    /// Resume after a pause, folding the paused interval into
    /// `total_paused`. No-op if not paused.
    pub fn resume(&mut self, now: Instant) {
        if let Some(paused_since) = self.paused_since.take() {
            self.total_paused += now.saturating_duration_since(paused_since);
        }
    }

    pub fn is_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.paused_since.is_some()
    }

    /// Progress percentage at `now`, clamped to [0, 100].
    pub fn percent(&self, now: Instant) -> f64 {
        let started_at = match self.started_at {
            Some(started_at) => started_at,
            None => return 0.0,
        };

        // While paused, the clock effectively stops at the pause instant.
        let effective_now = self.paused_since.unwrap_or(now);
        let elapsed = effective_now
            .saturating_duration_since(started_at)
            .saturating_sub(self.total_paused);

        if self.target.is_zero() {
            return 100.0;
        }

        (elapsed.as_secs_f64() / self.target.as_secs_f64() * 100.0).clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TARGET: Duration = Duration::from_secs(50);

    #[test]
    fn percent_is_zero_before_start() {
        let tracker = ProgressTracker::new(TARGET);
        assert_eq!(tracker.percent(Instant::now()), 0.0);
    }

    #[test]
    fn percent_tracks_elapsed_time() {
        let t0 = Instant::now();
        let mut tracker = ProgressTracker::new(TARGET);
        tracker.start(t0);

        let percent = tracker.percent(t0 + Duration::from_secs(8));
        assert!((percent - 16.0).abs() < 0.5, "got {}", percent);
    }

    #[test]
    fn percent_clamps_at_one_hundred() {
        let t0 = Instant::now();
        let mut tracker = ProgressTracker::new(TARGET);
        tracker.start(t0);

        assert_eq!(tracker.percent(t0 + Duration::from_secs(120)), 100.0);
    }

    #[test]
    fn pause_freezes_percent() {
        let t0 = Instant::now();
        let mut tracker = ProgressTracker::new(TARGET);
        tracker.start(t0);

        tracker.pause(t0 + Duration::from_secs(10));
        let frozen = tracker.percent(t0 + Duration::from_secs(10));
        assert_eq!(tracker.percent(t0 + Duration::from_secs(40)), frozen);
    }

    #[test]
    fn resume_excludes_paused_interval() {
        let t0 = Instant::now();
        let mut tracker = ProgressTracker::new(TARGET);
        tracker.start(t0);

        tracker.pause(t0 + Duration::from_secs(10));
        tracker.resume(t0 + Duration::from_secs(30));

        // 40s on the wall clock, 20s of it paused: 20s of progress.
        let percent = tracker.percent(t0 + Duration::from_secs(40));
        assert!((percent - 40.0).abs() < 0.5, "got {}", percent);
    }

    #[test]
    fn double_pause_and_double_resume_are_noops() {
        let t0 = Instant::now();
        let mut tracker = ProgressTracker::new(TARGET);
        tracker.start(t0);

        tracker.pause(t0 + Duration::from_secs(5));
        tracker.pause(t0 + Duration::from_secs(15));
        tracker.resume(t0 + Duration::from_secs(20));
        tracker.resume(t0 + Duration::from_secs(25));

        // Only the 5s..20s interval counts as paused.
        let percent = tracker.percent(t0 + Duration::from_secs(25));
        assert!((percent - 20.0).abs() < 0.5, "got {}", percent);
    }

    #[test]
    fn pause_before_start_is_a_noop() {
        let mut tracker = ProgressTracker::new(TARGET);
        tracker.pause(Instant::now());
        assert!(!tracker.is_paused());
    }

    #[test]
    fn start_if_unset_keeps_existing_start() {
        let t0 = Instant::now();
        let mut tracker = ProgressTracker::new(TARGET);
        tracker.start(t0);
        tracker.start_if_unset(t0 + Duration::from_secs(10));

        let percent = tracker.percent(t0 + Duration::from_secs(10));
        assert!((percent - 20.0).abs() < 0.5, "got {}", percent);
    }

    #[test]
    fn reset_returns_percent_to_zero() {
        let t0 = Instant::now();
        let mut tracker = ProgressTracker::new(TARGET);
        tracker.start(t0);
        tracker.reset();
        assert_eq!(tracker.percent(t0 + Duration::from_secs(10)), 0.0);
        assert!(!tracker.is_started());
    }
}

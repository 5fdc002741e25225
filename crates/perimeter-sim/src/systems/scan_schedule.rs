//! Scan scheduling: manual, or automatic on a fixed period.
//!
//! The schedule is a single optional due time, so there is never more than
//! one outstanding periodic scan. Changing mode or interval replaces it.

use perimeter_core::enums::ScanMode;

#[derive(Debug, Clone)]
pub struct ScanSchedule {
    mode: ScanMode,
    interval_ms: f64,
    next_due_ms: Option<f64>,
}

impl ScanSchedule {
    pub fn new(mode: ScanMode, interval_ms: f64, now_ms: f64) -> Self {
        let mut schedule = Self {
            mode: ScanMode::Manual,
            interval_ms,
            next_due_ms: None,
        };
        schedule.set_mode(mode, now_ms);
        schedule
    }

    pub fn mode(&self) -> ScanMode {
        self.mode
    }

    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    /// Simulation time of the next automatic scan.
    pub fn next_due_ms(&self) -> Option<f64> {
        self.next_due_ms
    }

    /// Number of outstanding periodic schedules (0 or 1).
    pub fn active_schedules(&self) -> usize {
        usize::from(self.next_due_ms.is_some())
    }

    /// Switch mode. Auto schedules its first scan one interval from now.
    pub fn set_mode(&mut self, mode: ScanMode, now_ms: f64) {
        self.mode = mode;
        self.next_due_ms = match mode {
            ScanMode::Manual => None,
            ScanMode::Auto => Some(now_ms + self.interval_ms),
        };
        tracing::debug!(?mode, interval_ms = self.interval_ms, "scan schedule replaced");
    }

    /// Change the period, restarting the countdown in auto mode.
    pub fn set_interval(&mut self, interval_ms: f64, now_ms: f64) {
        self.interval_ms = interval_ms;
        self.set_mode(self.mode, now_ms);
    }

    /// True when an automatic scan is due; advances the schedule.
    pub fn poll(&mut self, now_ms: f64) -> bool {
        let Some(due) = self.next_due_ms else {
            return false;
        };
        if now_ms < due {
            return false;
        }
        let mut next = due + self.interval_ms;
        if next <= now_ms {
            next = now_ms + self.interval_ms;
        }
        self.next_due_ms = Some(next);
        true
    }
}

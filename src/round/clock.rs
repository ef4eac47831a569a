#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockTick {
    Running,
    /// The countdown just hit zero on this tick.
    Expired,
    Idle,
}

/// Countdown for a single round. It never pauses for pair resolution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoundClock {
    starting: f64,
    remaining: f64,
}

impl RoundClock {
    pub fn new(starting_secs: f64) -> Self {
        let starting = starting_secs.max(0.0);
        RoundClock {
            starting,
            remaining: starting,
        }
    }

    pub fn starting(&self) -> f64 {
        self.starting
    }

    pub fn remaining(&self) -> f64 {
        self.remaining
    }

    pub fn is_expired(&self) -> bool {
        self.remaining <= 0.0
    }

    pub fn tick(&mut self, dt: f64) -> ClockTick {
        if self.is_expired() {
            return ClockTick::Idle;
        }
        if !dt.is_finite() || dt <= 0.0 {
            return ClockTick::Running;
        }
        self.remaining = (self.remaining - dt).max(0.0);
        if self.is_expired() {
            ClockTick::Expired
        } else {
            ClockTick::Running
        }
    }

    pub fn label(&self) -> String {
        format_mm_ss(self.remaining)
    }
}

/// `mm:ss`, rounding down to whole seconds.
pub fn format_mm_ss(seconds: f64) -> String {
    let total_secs = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    let mins = total_secs / 60;
    let secs = total_secs % 60;
    format!("{:02}:{:02}", mins, secs)
}

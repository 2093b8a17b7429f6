use chrono::{Duration, NaiveDateTime, NaiveTime};
use rand::{rngs::ThreadRng, Rng};

use crate::{config::Config, history::AlarmRecord};

/// source of the uniform draw behind every random interval.
/// swapped out in tests to pin exact boundary values.
pub trait IntervalSource {
    /// uniform value in `[0, 1]`
    fn unit(&mut self) -> f64;
}

pub struct RandomIntervals(ThreadRng);

impl RandomIntervals {
    #[must_use]
    pub fn new() -> Self {
        Self(rand::thread_rng())
    }
}

impl Default for RandomIntervals {
    fn default() -> Self {
        Self::new()
    }
}

impl IntervalSource for RandomIntervals {
    fn unit(&mut self) -> f64 {
        self.0.gen_range(0.0..=1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Inactive,
    /// next timer expiry rings the alarm
    ArmedInWindow,
    /// outside the active window, next timer expiry re-arms at window start
    ArmedWaitingForWindow,
    /// alarm is ringing; the next timer is already armed
    Firing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerPurpose {
    Fire,
    WindowWait,
}

#[derive(Debug, Clone, Copy)]
struct PendingTimer {
    deadline: NaiveDateTime,
    purpose: TimerPurpose,
}

/// the whole clock: decides when the next alarm goes off and tracks the
/// lifecycle from armed to ringing. takes the current time and config as
/// explicit inputs so none of this needs a real clock to test.
///
/// at most one timer is ever pending; arming a new one replaces (and so
/// cancels) the old one. the host loop polls [`tick`](Self::tick) and plays
/// the sound/notification whenever it hands back a record.
#[derive(Debug, Default)]
pub struct AlarmScheduler {
    phase: Phase,
    pending: Option<PendingTimer>,
}

impl AlarmScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.phase != Phase::Inactive
    }

    /// expiry of the pending timer, whether that means "alarm rings" or
    /// "window opens"
    #[must_use]
    pub fn next_fire_at(&self) -> Option<NaiveDateTime> {
        self.pending.map(|pending| pending.deadline)
    }

    /// arm the first timer. does nothing if already running.
    pub fn start(
        &mut self,
        now: NaiveDateTime,
        config: &Config,
        intervals: &mut dyn IntervalSource,
    ) {
        if self.phase != Phase::Inactive {
            return;
        }
        self.arm(now, config, intervals);
        self.phase = self.armed_phase();
        log::info!("scheduler started, next timer at {:?}", self.next_fire_at());
    }

    /// cancel the pending timer and go back to idle. safe to call twice.
    pub fn stop(&mut self) {
        self.pending = None;
        self.phase = Phase::Inactive;
        log::info!("scheduler stopped");
    }

    /// acknowledge a ringing alarm. scheduling is untouched, the next timer
    /// was already armed when the alarm fired.
    pub fn dismiss(&mut self) {
        if self.phase == Phase::Firing {
            self.phase = self.armed_phase();
        }
    }

    /// drive the pending timer. returns a record exactly when the alarm rings,
    /// in which case the next timer is already armed again.
    pub fn tick(
        &mut self,
        now: NaiveDateTime,
        config: &Config,
        intervals: &mut dyn IntervalSource,
    ) -> Option<AlarmRecord> {
        let pending = self.pending?;
        if now < pending.deadline {
            return None;
        }
        self.arm(now, config, intervals);
        match pending.purpose {
            TimerPurpose::Fire => {
                self.phase = Phase::Firing;
                log::info!("alarm fired at {now}, next timer at {:?}", self.next_fire_at());
                Some(AlarmRecord {
                    fired_at: now,
                    sound: config.sound,
                })
            }
            TimerPurpose::WindowWait => {
                // window start reached: no sound yet, a real random interval
                // is armed instead
                self.phase = self.armed_phase();
                log::info!("window opened at {now}, next timer at {:?}", self.next_fire_at());
                None
            }
        }
    }

    // replacing the option is the cancel: one timer pending, ever
    fn arm(&mut self, now: NaiveDateTime, config: &Config, intervals: &mut dyn IntervalSource) {
        self.pending = Some(
            if is_in_window(now.time(), config.window_start, config.window_end) {
                PendingTimer {
                    deadline: now
                        + random_interval(
                            config.min_interval_minutes,
                            config.max_interval_minutes,
                            intervals,
                        ),
                    purpose: TimerPurpose::Fire,
                }
            } else {
                PendingTimer {
                    deadline: next_window_start(now, config.window_start),
                    purpose: TimerPurpose::WindowWait,
                }
            },
        );
    }

    fn armed_phase(&self) -> Phase {
        match self.pending.map(|pending| pending.purpose) {
            Some(TimerPurpose::Fire) => Phase::ArmedInWindow,
            Some(TimerPurpose::WindowWait) => Phase::ArmedWaitingForWindow,
            None => Phase::Inactive,
        }
    }
}

/// membership of `now` in the daily active window, both ends inclusive.
/// `start == end` means the window spans the whole day; `start > end` wraps
/// past midnight (22:00-06:00 means "after 22:00 or before 06:00").
#[must_use]
pub fn is_in_window(now: NaiveTime, start: NaiveTime, end: NaiveTime) -> bool {
    if start == end {
        true
    } else if start < end {
        start <= now && now <= end
    } else {
        now >= start || now <= end
    }
}

/// the next occurrence of `start`: today if still ahead of `now`, otherwise
/// tomorrow. never an instant in the past, even inside the idle gap of an
/// overnight window.
#[must_use]
pub fn next_window_start(now: NaiveDateTime, start: NaiveTime) -> NaiveDateTime {
    let today = now.date().and_time(start);
    if today > now {
        today
    } else {
        today + Duration::days(1)
    }
}

/// uniform delay in `[min_minutes, max_minutes]`, both bounds reachable.
/// callers keep `min <= max` (the config is sanitized before it gets here).
#[must_use]
pub fn random_interval(
    min_minutes: u32,
    max_minutes: u32,
    intervals: &mut dyn IntervalSource,
) -> Duration {
    debug_assert!(min_minutes <= max_minutes);
    let span_seconds = f64::from((max_minutes - min_minutes) * 60);
    #[allow(clippy::cast_possible_truncation)]
    let extra = (intervals.unit() * span_seconds).round() as i64;
    Duration::seconds(i64::from(min_minutes) * 60 + extra)
}

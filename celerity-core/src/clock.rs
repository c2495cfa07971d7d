//! Clock Adapter
//!
//! Monotonic tick source used for every timed region. Ticks from
//! [`MonotonicClock`] are nanoseconds since a process-wide epoch taken from
//! `std::time::Instant`, so wall-clock adjustments never reach a measurement.
//!
//! The runner is generic over [`TickSource`], which keeps `now()` statically
//! dispatched and lets tests substitute a deterministic clock.

use crate::error::MeasurementAnomaly;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock, PoisonError};
use std::time::Instant;

/// Raw clock reading
pub type Ticks = u64;

/// A monotonic source of ticks convertible to wall time.
pub trait TickSource {
    /// Current reading
    fn now(&self) -> Ticks;

    /// Convert a tick delta to nanoseconds
    fn ticks_to_nanos(&self, ticks: Ticks) -> f64;

    /// Convert a tick delta to microseconds
    #[inline]
    fn ticks_to_micros(&self, ticks: Ticks) -> f64 {
        self.ticks_to_nanos(ticks) / 1_000.0
    }
}

fn epoch() -> Instant {
    static EPOCH: OnceLock<Instant> = OnceLock::new();
    *EPOCH.get_or_init(Instant::now)
}

/// Stateless monotonic clock with nanosecond ticks
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

impl MonotonicClock {
    /// Create the clock, fixing the process epoch if it is not set yet.
    pub fn new() -> Self {
        let _ = epoch();
        Self
    }
}

impl TickSource for MonotonicClock {
    #[inline(always)]
    fn now(&self) -> Ticks {
        epoch().elapsed().as_nanos() as Ticks
    }

    #[inline(always)]
    fn ticks_to_nanos(&self, ticks: Ticks) -> f64 {
        ticks as f64
    }
}

/// Elapsed ticks between two readings.
///
/// A reading that goes backwards is reported as an anomaly instead of
/// wrapping to a huge value.
#[inline]
pub fn elapsed_between(start: Ticks, end: Ticks) -> Result<Ticks, MeasurementAnomaly> {
    end.checked_sub(start)
        .ok_or(MeasurementAnomaly::ClockWentBackwards { start, end })
}

/// Deterministic clock advancing by a fixed step on every read.
///
/// Every timed region therefore measures exactly `step` ticks.
#[derive(Debug)]
pub struct SteppingClock {
    next: AtomicU64,
    step: Ticks,
}

impl SteppingClock {
    /// Clock starting at zero and advancing `step` nanoseconds per read
    pub fn new(step: Ticks) -> Self {
        Self {
            next: AtomicU64::new(0),
            step,
        }
    }
}

impl TickSource for SteppingClock {
    fn now(&self) -> Ticks {
        self.next.fetch_add(self.step, Ordering::Relaxed)
    }

    fn ticks_to_nanos(&self, ticks: Ticks) -> f64 {
        ticks as f64
    }
}

/// Clock replaying a fixed list of readings, then repeating the last one.
#[derive(Debug, Default)]
pub struct ScriptedClock {
    readings: Mutex<VecDeque<Ticks>>,
    last: AtomicU64,
}

impl ScriptedClock {
    /// Replay `readings` in order
    pub fn new(readings: impl IntoIterator<Item = Ticks>) -> Self {
        Self {
            readings: Mutex::new(readings.into_iter().collect()),
            last: AtomicU64::new(0),
        }
    }
}

impl TickSource for ScriptedClock {
    fn now(&self) -> Ticks {
        let mut readings = self.readings.lock().unwrap_or_else(PoisonError::into_inner);
        match readings.pop_front() {
            Some(t) => {
                self.last.store(t, Ordering::Relaxed);
                t
            }
            None => self.last.load(Ordering::Relaxed),
        }
    }

    fn ticks_to_nanos(&self, ticks: Ticks) -> f64 {
        ticks as f64
    }
}

/// Pin the calling thread to one CPU to avoid migrations mid-measurement.
#[cfg(target_os = "linux")]
pub fn pin_current_thread(cpu: usize) -> Result<(), std::io::Error> {
    if cpu >= libc::CPU_SETSIZE as usize {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("cpu index {cpu} exceeds CPU_SETSIZE ({})", libc::CPU_SETSIZE),
        ));
    }
    // SAFETY: cpu_set_t is plain data; zeroed is its empty state and the
    // CPU_* helpers only touch the set we own.
    unsafe {
        let mut set: libc::cpu_set_t = std::mem::zeroed();
        libc::CPU_ZERO(&mut set);
        libc::CPU_SET(cpu, &mut set);
        if libc::sched_setaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &set) == 0 {
            Ok(())
        } else {
            Err(std::io::Error::last_os_error())
        }
    }
}

/// Thread pinning is a no-op off Linux.
#[cfg(not(target_os = "linux"))]
pub fn pin_current_thread(_cpu: usize) -> Result<(), std::io::Error> {
    Ok(())
}

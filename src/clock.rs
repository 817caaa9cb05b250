//! Monotonic time and absolute-deadline pacing.

use std::io;
use std::time::Duration;

const NANOS_PER_SEC: u32 = 1_000_000_000;

/// Point on the monotonic clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MonotonicTime {
    secs: u64,
    nanos: u32,
}

impl MonotonicTime {
    pub const fn new(secs: u64, nanos: u32) -> Self {
        MonotonicTime {
            secs: secs + (nanos / NANOS_PER_SEC) as u64,
            nanos: nanos % NANOS_PER_SEC,
        }
    }

    /// Move forward by `period`, carrying whole seconds out of the
    /// nanosecond field
    pub fn advance(&mut self, period: Duration) {
        let mut nanos = self.nanos + period.subsec_nanos();
        let mut secs = self.secs + period.as_secs();
        if nanos >= NANOS_PER_SEC {
            nanos -= NANOS_PER_SEC;
            secs += 1;
        }
        self.secs = secs;
        self.nanos = nanos;
    }

    pub fn duration_since(&self, earlier: MonotonicTime) -> Duration {
        let this = Duration::new(self.secs, self.nanos);
        let earlier = Duration::new(earlier.secs, earlier.nanos);
        this.saturating_sub(earlier)
    }

    fn to_timespec(self) -> libc::timespec {
        // SAFETY: timespec is plain data; zeroing also covers padding fields
        let mut ts: libc::timespec = unsafe { std::mem::zeroed() };
        ts.tv_sec = self.secs as _;
        ts.tv_nsec = self.nanos as _;
        ts
    }
}

pub trait Clock {
    fn now(&self) -> io::Result<MonotonicTime>;
    /// Block until the clock reaches `deadline`; returns at once if it
    /// already has
    fn sleep_until(&self, deadline: MonotonicTime) -> io::Result<()>;
}

/// `CLOCK_MONOTONIC`, slept on with `TIMER_ABSTIME`
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn now(&self) -> io::Result<MonotonicTime> {
        // SAFETY: as above
        let mut ts: libc::timespec = unsafe { std::mem::zeroed() };
        // SAFETY: ts is a valid, writable timespec
        if unsafe { libc::clock_gettime(libc::CLOCK_MONOTONIC, &mut ts) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(MonotonicTime::new(ts.tv_sec as u64, ts.tv_nsec as u32))
    }

    fn sleep_until(&self, deadline: MonotonicTime) -> io::Result<()> {
        let ts = deadline.to_timespec();
        loop {
            // SAFETY: ts outlives the call; no remaining time is requested
            let rc = unsafe {
                libc::clock_nanosleep(
                    libc::CLOCK_MONOTONIC,
                    libc::TIMER_ABSTIME,
                    &ts,
                    std::ptr::null_mut(),
                )
            };
            match rc {
                0 => return Ok(()),
                libc::EINTR => continue,
                errno => return Err(io::Error::from_raw_os_error(errno)),
            }
        }
    }
}

/// Fixed-period schedule anchored at its start time.
///
/// Deadlines sit on the grid `start + k * period` no matter how long the
/// work between waits takes.
#[derive(Debug, Clone)]
pub struct Pacer {
    next: MonotonicTime,
    period: Duration,
}

impl Pacer {
    pub fn start<C: Clock>(clock: &C, period: Duration) -> io::Result<Self> {
        Ok(Pacer {
            next: clock.now()?,
            period,
        })
    }

    /// Advance to the next deadline and sleep until it
    pub fn wait<C: Clock>(&mut self, clock: &C) -> io::Result<MonotonicTime> {
        self.next.advance(self.period);
        clock.sleep_until(self.next)?;
        Ok(self.next)
    }
}

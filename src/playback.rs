use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::clock::{Clock, Pacer};
use crate::frame_buffer::PackedFrames;
use crate::geometry::PanelSize;
use crate::panel::Panel;
use crate::transport::Transport;

/// Streams packed frames to the panel at a fixed period until stopped
pub struct Player {
    frames: PackedFrames,
    period: Duration,
    running: Arc<AtomicBool>,
}

impl Player {
    pub fn new(frames: PackedFrames, period: Duration) -> Self {
        Player {
            frames,
            period,
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Get a clone of the running flag for signal handlers
    pub fn get_running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Loop over the frames until the running flag is cleared, which is
    /// checked between frames. Returns the number of frames written.
    pub fn run<T: Transport, C: Clock>(&self, panel: &mut Panel<T>, clock: &C) -> Result<u64> {
        let size = PanelSize::PANEL;
        let mut pacer = Pacer::start(clock, self.period).context("Failed to read monotonic clock")?;
        let cycle_start = clock.now().context("Failed to read monotonic clock")?;

        info!(
            "Playing {} frames every {} ms (Press Ctrl-C to stop)",
            self.frames.frame_count(),
            self.period.as_millis()
        );

        let mut written = 0u64;
        let mut cycles = 0u64;
        'playback: while self.running.load(Ordering::Relaxed) {
            for frame in self.frames.frames() {
                if !self.running.load(Ordering::Relaxed) {
                    break 'playback;
                }
                panel.set_column_range(0, size.last_column())?;
                panel.set_row_range(0, size.last_row())?;
                panel.write_memory(frame)?;
                written += 1;

                pacer.wait(clock).context("Failed to sleep until next frame")?;
            }

            cycles += 1;
            let elapsed = clock
                .now()
                .context("Failed to read monotonic clock")?
                .duration_since(cycle_start);
            let fps = written as f64 / elapsed.as_secs_f64().max(f64::EPSILON);
            debug!("[Stats] Cycle {}: {} frames written, {:.1} fps", cycles, written, fps);
        }

        info!("Playback stopped after {} frames", written);
        Ok(written)
    }
}

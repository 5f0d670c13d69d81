//! Background thread that streams pen reports on the interrupt endpoint.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use hid_pen_protocol::PenPath;
use softtablet_raw_gadget::{EpHandle, GadgetTransport};
use tracing::{debug, error, trace};

use crate::{EmulatorError, EmulatorResult};

/// Interval between input reports.
pub const REPORT_INTERVAL: Duration = Duration::from_millis(10);

/// Handle to the running streamer thread.
///
/// Dropping it raises the stop flag and joins the thread, so a dropped
/// streamer never writes to an endpoint that is being torn down.
#[derive(Debug)]
pub struct Streamer {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl Streamer {
    /// Start streaming reports on `ep`, one every `interval`.
    ///
    /// # Errors
    ///
    /// Returns [`EmulatorError::StreamerSpawn`] if the OS refuses the
    /// thread.
    pub fn spawn(
        transport: Arc<dyn GadgetTransport>,
        ep: EpHandle,
        interval: Duration,
    ) -> EmulatorResult<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let thread = thread::Builder::new()
            .name("pen-streamer".into())
            .spawn(move || stream_reports(&*transport, ep, &flag, interval))
            .map_err(EmulatorError::StreamerSpawn)?;
        Ok(Self {
            stop,
            thread: Some(thread),
        })
    }
}

impl Drop for Streamer {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!("report streamer thread panicked");
            }
        }
    }
}

fn stream_reports(
    transport: &dyn GadgetTransport,
    ep: EpHandle,
    stop: &AtomicBool,
    interval: Duration,
) {
    let mut path = PenPath::new();
    let mut next_tick = Instant::now() + interval;
    loop {
        let report = path.step();
        trace!(x = report.x, y = report.y, "report tick");
        if let Err(err) = transport.ep_write(ep, &report.encode()) {
            // Endpoint I/O failure ends the stream, not the process; the
            // dispatcher keeps serving control transfers.
            error!(error = %err, "interrupt write failed, stopping report stream");
            return;
        }
        if stop.load(Ordering::Relaxed) {
            debug!("report stream stopped");
            return;
        }
        // Absolute schedule: sleeping to the next tick boundary keeps
        // ep_write jitter from accumulating into drift.
        thread::sleep(next_tick.saturating_duration_since(Instant::now()));
        next_tick += interval;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use softtablet_raw_gadget::mock::MockTransport;

    #[test]
    fn first_report_is_one_step_into_the_path() {
        let mock = Arc::new(MockTransport::new());
        let streamer = Streamer::spawn(
            Arc::clone(&mock) as Arc<dyn GadgetTransport>,
            EpHandle(3),
            Duration::from_millis(1),
        )
        .unwrap();
        drop(streamer);

        let written = mock.ep_written();
        assert!(!written.is_empty());
        let (ep, first) = &written[0];
        assert_eq!(*ep, 3);
        // x = 2100, y = 2000, hovering.
        assert_eq!(first.as_slice(), &[6, 0b0010_0000, 0x34, 0x08, 0xD0, 0x07, 0, 0]);
    }

    #[test]
    fn consecutive_reports_advance_the_path() {
        let mock = Arc::new(MockTransport::new());
        let streamer = Streamer::spawn(
            Arc::clone(&mock) as Arc<dyn GadgetTransport>,
            EpHandle(1),
            Duration::from_millis(1),
        )
        .unwrap();
        thread::sleep(Duration::from_millis(50));
        drop(streamer);

        let written = mock.ep_written();
        assert!(written.len() >= 2, "expected several reports, got {}", written.len());
        let x0 = u16::from_le_bytes([written[0].1[2], written[0].1[3]]);
        let x1 = u16::from_le_bytes([written[1].1[2], written[1].1[3]]);
        assert_eq!(x1, x0 + 100);
    }

    #[test]
    fn drop_stops_the_stream() {
        let mock = Arc::new(MockTransport::new());
        let streamer = Streamer::spawn(
            Arc::clone(&mock) as Arc<dyn GadgetTransport>,
            EpHandle(1),
            Duration::from_millis(1),
        )
        .unwrap();
        drop(streamer);
        let settled = mock.ep_written().len();
        thread::sleep(Duration::from_millis(20));
        assert_eq!(mock.ep_written().len(), settled);
    }
}

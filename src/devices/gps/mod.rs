//! Satellite-fix decoding pipeline
//!
//! Raw bytes arrive from the receive interrupt, are assembled into
//! delimited sentences, and run through the decode gates (checksum,
//! sentence type, field extraction, range validation). Accepted fixes
//! are published atomically; everything else is silently discarded.
//! The decode task is itself a monitored worker and answers liveness
//! probes at the end of each wake.

pub mod decoder;
pub mod extract;
pub mod frame;
pub mod position;
pub mod validate;

pub use decoder::FixDecoder;
pub use frame::{FeedOutcome, FrameAssembler, SharedRxQueue, FRAME_HEADER};
pub use position::{Coordinate, Fix, PublishedPosition, SharedPositionState, UtcDate, UtcTime};
pub use validate::ValidationLimits;

use crate::core::supervisor::{LivenessReporter, ProbeFlag, WorkerId};
use crate::platform::WatchdogInterface;

/// The satellite-fix worker
///
/// Drains the interrupt-fed byte queue, decodes completed frames and
/// publishes accepted fixes. Shared state is injected at construction:
/// the device is the only writer of the published position.
pub struct GpsDevice<'a, W: WatchdogInterface> {
    rx: &'a SharedRxQueue,
    assembler: FrameAssembler,
    decoder: FixDecoder,
    position: &'a SharedPositionState,
    probe: &'a ProbeFlag,
    reporter: LivenessReporter<'a, W>,
}

impl<'a, W: WatchdogInterface> GpsDevice<'a, W> {
    /// Create the worker around its injected shared state
    pub fn new(
        rx: &'a SharedRxQueue,
        position: &'a SharedPositionState,
        probe: &'a ProbeFlag,
        reporter: LivenessReporter<'a, W>,
    ) -> Self {
        Self {
            rx,
            assembler: FrameAssembler::new(),
            decoder: FixDecoder::new(),
            position,
            probe,
            reporter,
        }
    }

    /// One wake of the decode task
    ///
    /// Drains the byte queue, decodes any completed frames whose header
    /// byte checks out, then answers a pending liveness probe. Decode
    /// failures change nothing and are not surfaced.
    pub fn process(&mut self) {
        while let Some(byte) = self.rx.pop() {
            if self.assembler.push(byte) {
                let frame = self.assembler.frame();
                if frame.first() == Some(&FRAME_HEADER) {
                    if let Some(fix) = self.decoder.decode(&frame[1..]) {
                        self.position.publish(fix);
                        crate::log_debug!("fix accepted, age reset");
                    }
                }
                self.assembler.reset();
            }
        }

        if self.probe.take() {
            self.reporter.report(WorkerId::Gps);
        }
    }
}

/// Async glue for embassy targets
///
/// The receive interrupt feeds bytes and raises the frame signal; the
/// decode loop wakes on it. The epoch watcher turns the ~1 Hz pulse
/// into fix aging and re-arms itself when the pulse source goes silent.
#[cfg(feature = "embassy")]
pub mod task {
    use super::{FeedOutcome, GpsDevice, SharedPositionState, SharedRxQueue};
    use crate::platform::WatchdogInterface;
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
    use embassy_sync::signal::Signal;
    use embassy_time::{with_timeout, Duration};

    /// Raised when a frame boundary arrived or the queue needs draining
    pub static FRAME_SIGNAL: Signal<CriticalSectionRawMutex, ()> = Signal::new();

    /// Raised by the pulse-source interrupt on each epoch pulse
    pub static EPOCH_SIGNAL: Signal<CriticalSectionRawMutex, ()> = Signal::new();

    /// Slightly over the nominal 1 Hz pulse period
    const EPOCH_TIMEOUT_MS: u64 = 1100;

    /// Byte ingestion entry point, called from the receive interrupt
    pub fn on_byte_received(rx: &SharedRxQueue, byte: u8) {
        match rx.feed_from_isr(byte) {
            FeedOutcome::Queued => {}
            FeedOutcome::FrameBoundary | FeedOutcome::Full => FRAME_SIGNAL.signal(()),
        }
    }

    /// Pulse ingestion entry point, called from the pulse interrupt
    pub fn on_epoch_pulse() {
        EPOCH_SIGNAL.signal(());
    }

    /// Decode loop
    pub async fn run<W: WatchdogInterface>(mut device: GpsDevice<'_, W>) -> ! {
        loop {
            FRAME_SIGNAL.wait().await;
            device.process();
        }
    }

    /// Fix aging loop
    ///
    /// Each pulse ages the published fix; a missing pulse ages it too
    /// and detection re-arms on the next iteration.
    pub async fn epoch_watch(position: &SharedPositionState) -> ! {
        loop {
            match with_timeout(Duration::from_millis(EPOCH_TIMEOUT_MS), EPOCH_SIGNAL.wait()).await
            {
                Ok(()) => position.on_epoch_tick(),
                Err(_) => position.on_epoch_missed(),
            }
        }
    }
}

//! Face-landmark detection, run off the render thread.
//!
//! The detector itself is an opaque black box behind the [`Detector`] trait.
//! [`DetectionWorker`] drives it on a dedicated thread: the render loop
//! offers frames without blocking and picks up whatever result arrived most
//! recently. A result may therefore belong to an older frame than the one on
//! screen; [`Detection::frame_id`] makes that lag visible.

pub mod protocol;
pub mod subprocess;

use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use image::RgbImage;

use crate::error::{Error, Result};
use crate::landmarks::{Face, Topology};

pub use subprocess::SubprocessDetector;

/// How long dropping a [`DetectionWorker`] waits for a stuck detector before
/// leaving its thread behind.
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

/// Aborts a [`Detector::detect`] call in flight from another thread.
pub type Canceller = Box<dyn FnOnce() + Send>;

/// An external face-landmark model.
pub trait Detector: Send + 'static {
    /// Fixed triangle topology over this detector's keypoints.
    fn topology(&self) -> &Topology;

    /// Landmarks for every face found in `frame`, in frame pixel space.
    fn detect(&mut self, frame: &RgbImage) -> Result<Vec<Face>>;

    /// Handle used at shutdown to unblock a detector waiting on its model.
    fn canceller(&self) -> Option<Canceller> {
        None
    }
}

/// One detection result.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Id returned by [`DetectionWorker::submit`] for the frame this came from.
    pub frame_id: u64,
    pub faces: Vec<Face>,
}

pub struct DetectionWorker {
    frame_tx: Option<Sender<(u64, RgbImage)>>,
    result_rx: Receiver<Detection>,
    topology: Topology,
    next_frame_id: u64,
    canceller: Option<Canceller>,
    exited_rx: Receiver<()>,
    thread: Option<thread::JoinHandle<()>>,
}

impl DetectionWorker {
    /// Reads the detector's topology and starts detecting on a worker thread.
    pub fn start<D: Detector>(mut detector: D) -> Result<Self> {
        let topology = detector.topology().clone();
        let canceller = detector.canceller();

        // Capacity 1: at most one frame waits while the detector is busy.
        let (frame_tx, frame_rx) = bounded::<(u64, RgbImage)>(1);
        let (result_tx, result_rx) = unbounded();
        // Never sent on; disconnects when the thread exits.
        let (exited_tx, exited_rx) = bounded::<()>(0);

        let thread = thread::Builder::new()
            .name("detector".to_string())
            .spawn(move || {
                let _exited = exited_tx;
                for (frame_id, frame) in frame_rx.iter() {
                    match detector.detect(&frame) {
                        Ok(faces) => {
                            if result_tx.send(Detection { frame_id, faces }).is_err() {
                                break;
                            }
                        }
                        Err(e) => log::warn!("Detection failed for frame {}: {}", frame_id, e),
                    }
                }
                log::debug!("Detector thread exiting");
            })
            .map_err(|e| Error::Detector(format!("Failed to spawn detector thread: {}", e)))?;

        Ok(Self {
            frame_tx: Some(frame_tx),
            result_rx,
            topology,
            next_frame_id: 0,
            canceller,
            exited_rx,
            thread: Some(thread),
        })
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Offer a frame without blocking.
    ///
    /// Returns the frame's id, or `None` if the worker was still busy and the
    /// frame was dropped.
    pub fn submit(&mut self, frame: &RgbImage) -> Option<u64> {
        let frame_tx = self.frame_tx.as_ref()?;
        if frame_tx.is_full() {
            return None;
        }
        let frame_id = self.next_frame_id;

        match frame_tx.try_send((frame_id, frame.clone())) {
            Ok(()) => {
                self.next_frame_id += 1;
                Some(frame_id)
            }
            Err(TrySendError::Full(_)) => None,
            Err(TrySendError::Disconnected(_)) => {
                log::warn!("Detector thread is gone; no further detections");
                self.frame_tx = None;
                None
            }
        }
    }

    /// Newest result received since the last call, discarding older ones.
    pub fn latest(&self) -> Option<Detection> {
        self.result_rx.try_iter().last()
    }

    /// Blocks until the next result arrives. Used where ordering matters.
    pub fn wait(&self) -> Option<Detection> {
        self.result_rx.recv().ok()
    }
}

impl Drop for DetectionWorker {
    fn drop(&mut self) {
        // Closing the frame channel ends the worker loop once `detect` returns.
        self.frame_tx = None;
        if let Some(cancel) = self.canceller.take() {
            cancel();
        }

        let Some(thread) = self.thread.take() else {
            return;
        };
        match self.exited_rx.recv_timeout(SHUTDOWN_TIMEOUT) {
            Err(RecvTimeoutError::Timeout) => {
                log::warn!(
                    "Detector did not stop within {:?}; leaving its thread behind",
                    SHUTDOWN_TIMEOUT
                );
            }
            _ => {
                if thread.join().is_err() {
                    log::error!("Detector thread panicked");
                }
            }
        }
    }
}

use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, Sender};
use facemesh_overlay::detector::{Canceller, SHUTDOWN_TIMEOUT};
use facemesh_overlay::prelude::*;
use facemesh_overlay::Error;
use image::RgbImage;

/// Tags each result with the width of the frame it came from.
fn face_for(frame: &RgbImage) -> Face {
    Face::new(vec![Keypoint::new(frame.width() as f32, frame.height() as f32)])
}

struct EchoDetector {
    topology: Topology,
}

impl Detector for EchoDetector {
    fn topology(&self) -> &Topology {
        &self.topology
    }

    fn detect(&mut self, frame: &RgbImage) -> facemesh_overlay::Result<Vec<Face>> {
        Ok(vec![face_for(frame)])
    }
}

/// Announces each detection and blocks until released.
struct GatedDetector {
    topology: Topology,
    started: Sender<u32>,
    gate: Receiver<()>,
}

impl Detector for GatedDetector {
    fn topology(&self) -> &Topology {
        &self.topology
    }

    fn detect(&mut self, frame: &RgbImage) -> facemesh_overlay::Result<Vec<Face>> {
        let _ = self.started.send(frame.width());
        let _ = self.gate.recv();
        Ok(vec![face_for(frame)])
    }
}

/// Blocks in `detect` until its canceller fires.
struct CancellableDetector {
    topology: Topology,
    started: Sender<u32>,
    gate: Receiver<()>,
    release: Sender<()>,
}

impl Detector for CancellableDetector {
    fn topology(&self) -> &Topology {
        &self.topology
    }

    fn detect(&mut self, frame: &RgbImage) -> facemesh_overlay::Result<Vec<Face>> {
        let _ = self.started.send(frame.width());
        let _ = self.gate.recv();
        Err(Error::Detector("cancelled".to_string()))
    }

    fn canceller(&self) -> Option<Canceller> {
        let release = self.release.clone();
        Some(Box::new(move || {
            let _ = release.send(());
        }))
    }
}

/// Fails on single-column frames.
struct FlakyDetector {
    topology: Topology,
}

impl Detector for FlakyDetector {
    fn topology(&self) -> &Topology {
        &self.topology
    }

    fn detect(&mut self, frame: &RgbImage) -> facemesh_overlay::Result<Vec<Face>> {
        if frame.width() == 1 {
            Err(Error::Detector("no model".to_string()))
        } else {
            Ok(vec![face_for(frame)])
        }
    }
}

fn triangle_topology() -> Topology {
    Topology::new(vec![[0, 1, 2], [2, 3, 0]])
}

fn gated() -> (DetectionWorker, Receiver<u32>, Sender<()>) {
    let (started_tx, started_rx) = unbounded();
    let (gate_tx, gate_rx) = unbounded();
    let worker = DetectionWorker::start(GatedDetector {
        topology: triangle_topology(),
        started: started_tx,
        gate: gate_rx,
    })
    .unwrap();
    (worker, started_rx, gate_tx)
}

#[test]
fn topology_is_read_once_at_start() {
    let worker = DetectionWorker::start(EchoDetector {
        topology: triangle_topology(),
    })
    .unwrap();
    assert_eq!(worker.topology(), &triangle_topology());
}

#[test]
fn result_is_delivered_with_its_frame_id() {
    let mut worker = DetectionWorker::start(EchoDetector {
        topology: triangle_topology(),
    })
    .unwrap();

    let id = worker.submit(&RgbImage::new(7, 5)).expect("idle worker accepts a frame");
    let detection = worker.wait().unwrap();

    assert_eq!(detection.frame_id, id);
    assert_eq!(detection.faces, vec![Face::new(vec![Keypoint::new(7.0, 5.0)])]);
}

#[test]
fn busy_worker_drops_frames() {
    let (mut worker, started, gate) = gated();

    assert_eq!(worker.submit(&RgbImage::new(10, 1)), Some(0));
    assert_eq!(started.recv().unwrap(), 10);

    // One frame may wait while the detector is busy; the next is dropped.
    assert_eq!(worker.submit(&RgbImage::new(11, 1)), Some(1));
    assert_eq!(worker.submit(&RgbImage::new(12, 1)), None);

    gate.send(()).unwrap();
    gate.send(()).unwrap();

    let first = worker.wait().unwrap();
    let second = worker.wait().unwrap();
    assert_eq!(first.frame_id, 0);
    assert_eq!(second.frame_id, 1);
    assert_eq!(second.faces[0].keypoints[0].x, 11.0);
}

#[test]
fn latest_keeps_only_the_newest_result() {
    let (mut worker, started, gate) = gated();

    assert_eq!(worker.submit(&RgbImage::new(20, 1)), Some(0));
    assert_eq!(started.recv().unwrap(), 20);
    assert_eq!(worker.submit(&RgbImage::new(21, 1)), Some(1));

    gate.send(()).unwrap();
    gate.send(()).unwrap();

    // Once frame 22 has started, frames 0 and 1 have both been delivered.
    while worker.submit(&RgbImage::new(22, 1)).is_none() {
        thread::sleep(Duration::from_millis(1));
    }
    assert_eq!(started.recv().unwrap(), 21);
    assert_eq!(started.recv().unwrap(), 22);

    let latest = worker.latest().unwrap();
    assert_eq!(latest.frame_id, 1);
    assert_eq!(latest.faces[0].keypoints[0].x, 21.0);
    assert!(worker.latest().is_none());

    gate.send(()).unwrap();
}

#[test]
fn failed_detection_is_skipped() {
    let mut worker = DetectionWorker::start(FlakyDetector {
        topology: triangle_topology(),
    })
    .unwrap();

    assert_eq!(worker.submit(&RgbImage::new(1, 1)), Some(0));
    let id = loop {
        if let Some(id) = worker.submit(&RgbImage::new(3, 1)) {
            break id;
        }
        thread::sleep(Duration::from_millis(1));
    };

    let detection = worker.wait().unwrap();
    assert_eq!(detection.frame_id, id);
    assert_eq!(detection.faces[0].keypoints[0].x, 3.0);
}

#[test]
fn latest_is_none_before_any_result() {
    let worker = DetectionWorker::start(EchoDetector {
        topology: triangle_topology(),
    })
    .unwrap();
    assert!(worker.latest().is_none());
}

#[test]
fn applying_results_replaces_faces() {
    let mut worker = DetectionWorker::start(EchoDetector {
        topology: triangle_topology(),
    })
    .unwrap();
    let mut state = AppState::new(Toggles::default(), worker.topology().clone());
    state.update_faces(vec![Face::default(), Face::default()]);

    worker.submit(&RgbImage::new(4, 4)).unwrap();
    let detection = worker.wait().unwrap();
    state.update_faces(detection.faces);

    assert_eq!(state.faces.len(), 1);
    assert_eq!(state.primary_face().unwrap().keypoints[0], Keypoint::new(4.0, 4.0));
}

#[test]
fn drop_cancels_a_blocked_detection() {
    let (started_tx, started_rx) = unbounded();
    let (release_tx, gate_rx) = unbounded();
    let mut worker = DetectionWorker::start(CancellableDetector {
        topology: triangle_topology(),
        started: started_tx,
        gate: gate_rx,
        release: release_tx,
    })
    .unwrap();

    worker.submit(&RgbImage::new(5, 1)).unwrap();
    assert_eq!(started_rx.recv().unwrap(), 5);

    let start = Instant::now();
    drop(worker);
    assert!(start.elapsed() < SHUTDOWN_TIMEOUT, "drop took {:?}", start.elapsed());
}

#[test]
fn drop_gives_up_on_a_detector_that_never_returns() {
    let (mut worker, started, gate) = gated();

    worker.submit(&RgbImage::new(6, 1)).unwrap();
    assert_eq!(started.recv().unwrap(), 6);

    let start = Instant::now();
    drop(worker);
    let elapsed = start.elapsed();
    assert!(elapsed >= SHUTDOWN_TIMEOUT, "drop took {:?}", elapsed);
    assert!(elapsed < SHUTDOWN_TIMEOUT * 3, "drop took {:?}", elapsed);

    // Release the abandoned thread.
    drop(gate);
}

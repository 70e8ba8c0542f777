//! The render loop tying capture, detection and drawing together.

use image::RgbImage;

use crate::camera::{self, FrameSource};
use crate::config::Config;
use crate::detector::{DetectionWorker, SubprocessDetector};
use crate::error::Result;
use crate::overlay::Overlay;
use crate::state::{AppState, Command};
use crate::window::{FrameLimiter, Window, WindowEvent};

/// What the loop should do after handling a batch of window events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Applies window events to the state and overlay.
///
/// Kept free of SDL so the event handling can be exercised without a display.
/// Returns the new fullscreen flag when a pointer press toggled it.
pub fn handle_events(
    events: &[WindowEvent],
    state: &mut AppState,
    overlay: &mut Overlay,
) -> (Flow, Option<bool>) {
    let mut fullscreen_change = None;

    for event in events {
        match *event {
            WindowEvent::Quit => return (Flow::Quit, fullscreen_change),
            WindowEvent::Resize(w, h) => {
                log::debug!("Canvas resized to {}x{}", w, h);
                overlay.resize(w, h);
            }
            WindowEvent::Key(command) => {
                state.apply(command);
                log::debug!("{:?} -> {:?}", command, state.toggles);
            }
            WindowEvent::PointerPressed => {
                log::info!("{}", state.describe_detection());
                log::debug!("Faces: {:?}", state.faces);
                state.apply(Command::ToggleFullscreen);
                fullscreen_change = Some(state.fullscreen);
            }
        }
    }

    (Flow::Continue, fullscreen_change)
}

/// Pulls the newest detection result, if any, into the state.
pub fn apply_latest(worker: &DetectionWorker, state: &mut AppState) {
    if let Some(detection) = worker.latest() {
        log::trace!(
            "Detection for frame {}: {} face(s)",
            detection.frame_id,
            detection.faces.len()
        );
        state.update_faces(detection.faces);
    }
}

pub fn run(config: &Config) -> Result<()> {
    let mut source = camera::open_source(&config.capture)?;
    let detector = SubprocessDetector::spawn(&config.detector)?;
    let mut worker = DetectionWorker::start(detector)?;

    let mut state = AppState::new(config.toggles.into(), worker.topology().clone());
    let mut window = Window::new(&config.window.title, config.window.width, config.window.height)?;
    let mut overlay = Overlay::new(window.width(), window.height(), config.mesh.clone());
    let mut limiter = FrameLimiter::new(&window, config.window.fps);

    let (w, h) = source.resolution();
    let mut frame = RgbImage::new(w, h);

    log::info!(
        "Running: {}x{} canvas, {}x{} capture, {} triangles",
        overlay.width(),
        overlay.height(),
        w,
        h,
        state.topology.len()
    );

    loop {
        let events = window.poll_events();
        let (flow, fullscreen) = handle_events(&events, &mut state, &mut overlay);
        if flow == Flow::Quit {
            break;
        }
        if let Some(fullscreen) = fullscreen {
            if let Err(e) = window.set_fullscreen(fullscreen) {
                log::warn!("Failed to change fullscreen mode: {}", e);
            }
        }
        if (overlay.width(), overlay.height()) != (window.width(), window.height()) {
            window.resize(overlay.width(), overlay.height())?;
        }

        match source.next_frame() {
            Ok(next) => frame = next,
            Err(e) => log::warn!("{}; reusing previous frame", e),
        }

        worker.submit(&frame);
        apply_latest(&worker, &mut state);

        overlay.render(&frame, &state);
        window.present(overlay.frame_buffer())?;

        limiter.wait_and_get_delta(&window);
    }

    log::info!("Shutting down");
    Ok(())
}

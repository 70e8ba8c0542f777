//! Video frame sources.
//!
//! Every source delivers RGB frames at the fixed capture resolution,
//! mirrored if configured, so keypoints from the detector and pixels on
//! screen share one coordinate space.

use std::path::Path;

use image::imageops::{self, FilterType};
use image::RgbImage;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
};
use nokhwa::Camera;

use crate::config::CaptureConfig;
use crate::error::{Error, Result};

const CAPTURE_FPS: u32 = 30;

pub trait FrameSource {
    /// Grab the next frame. Blocks until the device has one.
    fn next_frame(&mut self) -> Result<RgbImage>;

    /// Fixed resolution of every frame this source returns.
    fn resolution(&self) -> (u32, u32);
}

/// Resize to the capture resolution if needed, then mirror.
fn conform(mut frame: RgbImage, width: u32, height: u32, mirror: bool) -> RgbImage {
    if frame.dimensions() != (width, height) {
        frame = imageops::resize(&frame, width, height, FilterType::Triangle);
    }
    if mirror {
        imageops::flip_horizontal_in_place(&mut frame);
    }
    frame
}

/// Live webcam capture.
pub struct CameraSource {
    camera: Camera,
    width: u32,
    height: u32,
    mirror: bool,
}

impl CameraSource {
    pub fn open(config: &CaptureConfig) -> Result<Self> {
        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(
            CameraFormat::new(
                Resolution::new(config.width, config.height),
                FrameFormat::MJPEG,
                CAPTURE_FPS,
            ),
        ));

        let mut camera = Camera::new(CameraIndex::Index(config.camera_index), requested)
            .map_err(|e| {
                Error::Camera(format!("Failed to open camera {}: {}", config.camera_index, e))
            })?;
        camera
            .open_stream()
            .map_err(|e| Error::Camera(format!("Failed to start stream: {}", e)))?;

        log::info!(
            "Camera {} opened ({:?}), capturing at {}x{}",
            config.camera_index,
            camera.camera_format(),
            config.width,
            config.height
        );

        Ok(Self {
            camera,
            width: config.width,
            height: config.height,
            mirror: config.mirror,
        })
    }
}

impl FrameSource for CameraSource {
    fn next_frame(&mut self) -> Result<RgbImage> {
        let buffer = self
            .camera
            .frame()
            .map_err(|e| Error::Camera(format!("Failed to capture frame: {}", e)))?;
        let decoded = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| Error::Camera(format!("Failed to decode frame: {}", e)))?;

        let (w, h) = (decoded.width(), decoded.height());
        let frame = RgbImage::from_raw(w, h, decoded.into_raw())
            .ok_or_else(|| Error::Camera(format!("Frame buffer too small for {}x{}", w, h)))?;

        Ok(conform(frame, self.width, self.height, self.mirror))
    }

    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl Drop for CameraSource {
    fn drop(&mut self) {
        if let Err(e) = self.camera.stop_stream() {
            log::warn!("Failed to stop camera stream: {}", e);
        }
    }
}

/// Serves the same still image on every call. Stands in for a camera.
pub struct StillSource {
    frame: RgbImage,
}

impl StillSource {
    pub fn from_image(image: RgbImage, config: &CaptureConfig) -> Self {
        Self {
            frame: conform(image, config.width, config.height, config.mirror),
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P, config: &CaptureConfig) -> Result<Self> {
        let image = image::open(path.as_ref())?.to_rgb8();
        log::info!(
            "Using still image {} ({}x{})",
            path.as_ref().display(),
            image.width(),
            image.height()
        );
        Ok(Self::from_image(image, config))
    }
}

impl FrameSource for StillSource {
    fn next_frame(&mut self) -> Result<RgbImage> {
        Ok(self.frame.clone())
    }

    fn resolution(&self) -> (u32, u32) {
        self.frame.dimensions()
    }
}

/// Opens the still image if one is configured, otherwise the camera.
pub fn open_source(config: &CaptureConfig) -> Result<Box<dyn FrameSource>> {
    match &config.still_image {
        Some(path) => Ok(Box::new(StillSource::from_file(path, config)?)),
        None => Ok(Box::new(CameraSource::open(config)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn capture(width: u32, height: u32, mirror: bool) -> CaptureConfig {
        CaptureConfig {
            width,
            height,
            mirror,
            ..CaptureConfig::default()
        }
    }

    #[test]
    fn still_source_is_resized_to_capture_resolution() {
        let mut source = StillSource::from_image(RgbImage::new(320, 240), &capture(640, 480, false));
        assert_eq!(source.resolution(), (640, 480));
        assert_eq!(source.next_frame().unwrap().dimensions(), (640, 480));
    }

    #[test]
    fn still_source_mirrors() {
        let mut image = RgbImage::new(4, 2);
        image.put_pixel(0, 0, Rgb([255, 0, 0]));

        let mut source = StillSource::from_image(image, &capture(4, 2, true));
        let frame = source.next_frame().unwrap();
        assert_eq!(frame.get_pixel(3, 0), &Rgb([255, 0, 0]));
        assert_eq!(frame.get_pixel(0, 0), &Rgb([0, 0, 0]));
    }

    #[test]
    fn missing_still_image_is_an_error() {
        let result = StillSource::from_file("/nonexistent/face.png", &CaptureConfig::default());
        assert!(result.is_err());
    }
}

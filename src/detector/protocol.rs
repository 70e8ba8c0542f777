//! Line protocol spoken with an external landmark program.
//!
//! ```text
//! program → us   {"triangles": [[a, b, c], ...]}            once, at start-up
//! us → program   FRAME <width> <height>\n<width*height*3 RGB bytes>
//! program → us   {"faces": [{"keypoints": [{"x": .., "y": ..}, ...]}, ...]}
//!            or  {"error": "..."}
//! ```
//!
//! One reply line per frame, in order.

use std::io::{BufRead, Write};

use image::RgbImage;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::landmarks::{Face, Topology};

/// First line the program prints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hello {
    pub triangles: Topology,
}

/// Reply to one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reply {
    Faces { faces: Vec<Face> },
    Failure { error: String },
}

impl Reply {
    pub fn into_faces(self) -> Result<Vec<Face>> {
        match self {
            Reply::Faces { faces } => Ok(faces),
            Reply::Failure { error } => Err(Error::Detector(error)),
        }
    }
}

pub fn write_frame<W: Write>(writer: &mut W, frame: &RgbImage) -> Result<()> {
    writeln!(writer, "FRAME {} {}", frame.width(), frame.height())?;
    writer.write_all(frame.as_raw())?;
    writer.flush()?;
    Ok(())
}

/// Reads the next non-blank line and decodes it as JSON.
pub fn read_message<R: BufRead, T: DeserializeOwned>(reader: &mut R) -> Result<T> {
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Err(Error::Protocol("detector closed its output".to_string()));
        }
        if !line.trim().is_empty() {
            break;
        }
    }

    serde_json::from_str(line.trim()).map_err(|e| {
        Error::Protocol(format!("invalid message {:?}: {}", truncate(line.trim()), e))
    })
}

fn truncate(line: &str) -> &str {
    match line.char_indices().nth(80) {
        Some((i, _)) => &line[..i],
        None => line,
    }
}

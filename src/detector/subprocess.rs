//! External landmark program run as a child process.

use std::io::{BufReader, BufWriter};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::{Arc, Mutex};

use image::RgbImage;

use super::protocol::{self, Hello, Reply};
use super::{Canceller, Detector};
use crate::config::DetectorConfig;
use crate::error::{Error, Result};
use crate::landmarks::{Face, Topology};

/// Talks to a landmark program over its stdin/stdout.
///
/// The program is launched as `<command> <args...> --max-faces <n>` and must
/// print its triangle topology before anything else. It is killed on drop,
/// or earlier through its [`Canceller`].
pub struct SubprocessDetector {
    child: Arc<Mutex<Child>>,
    pid: u32,
    stdin: BufWriter<ChildStdin>,
    stdout: BufReader<ChildStdout>,
    topology: Topology,
}

impl SubprocessDetector {
    /// Launch the program and wait for its topology.
    pub fn spawn(config: &DetectorConfig) -> Result<Self> {
        let mut child = Command::new(&config.command)
            .args(&config.args)
            .args(["--max-faces", &config.max_faces.to_string()])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| {
                Error::Detector(format!("Failed to launch '{}': {}", config.command, e))
            })?;

        log::info!(
            "Detector subprocess started (pid: {}, command: {} {})",
            child.id(),
            config.command,
            config.args.join(" ")
        );

        let (stdin, stdout) = match (child.stdin.take(), child.stdout.take()) {
            (Some(stdin), Some(stdout)) => (stdin, stdout),
            _ => {
                let _ = child.kill();
                return Err(Error::Detector("Detector pipes unavailable".to_string()));
            }
        };

        let pid = child.id();
        let mut detector = Self {
            child: Arc::new(Mutex::new(child)),
            pid,
            stdin: BufWriter::new(stdin),
            stdout: BufReader::new(stdout),
            topology: Topology::default(),
        };

        let hello: Hello = protocol::read_message(&mut detector.stdout)?;
        if hello.triangles.is_empty() {
            return Err(Error::Protocol("detector sent an empty topology".to_string()));
        }
        log::info!("Detector topology: {} triangles", hello.triangles.len());
        detector.topology = hello.triangles;

        Ok(detector)
    }

    pub fn id(&self) -> u32 {
        self.pid
    }
}

impl Detector for SubprocessDetector {
    fn topology(&self) -> &Topology {
        &self.topology
    }

    fn detect(&mut self, frame: &RgbImage) -> Result<Vec<Face>> {
        protocol::write_frame(&mut self.stdin, frame)?;
        let reply: Reply = protocol::read_message(&mut self.stdout)?;
        reply.into_faces()
    }

    /// Kills the child, so a pending read sees end of file.
    fn canceller(&self) -> Option<Canceller> {
        let child = Arc::clone(&self.child);
        let pid = self.pid;
        Some(Box::new(move || {
            if let Ok(mut child) = child.lock() {
                log::debug!("Cancelling detector subprocess (pid: {})", pid);
                let _ = child.kill();
            }
        }))
    }
}

impl Drop for SubprocessDetector {
    fn drop(&mut self) {
        log::info!("Stopping detector subprocess (pid: {})", self.pid);
        if let Ok(mut child) = self.child.lock() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

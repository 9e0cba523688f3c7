//! Sample sources — where eye-aspect-ratio scores come from.
//!
//! The detector is written against [`SampleSource`] only; which variant is
//! plugged in is a configuration choice.

use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};

use drowse_core::config::SourceKind;

/// Normal EAR hovers around here; drowsy samples sit at 0.10-0.20.
const SIM_BASE: f64 = 0.28;
const SIM_SPREAD: f64 = 0.08;
const SIM_MIN: f64 = 0.10;
const SIM_MAX: f64 = 0.40;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("frame carries no eye landmarks")]
    MissingLandmarks,
    #[error("eye landmarks have zero horizontal span")]
    DegenerateLandmarks,
}

/// One captured frame as sent by the client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Frame {
    /// Opaque image payload (data URL). Not decoded by the built-in sources.
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub landmarks: Option<EyeLandmarks>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    fn dist(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Six contour points per eye, in the usual p1..p6 order: p1/p4 are the
/// corners, p2/p3 the upper lid, p6/p5 the lower lid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EyeLandmarks {
    pub left: [Point; 6],
    pub right: [Point; 6],
}

/// Supplier of one drowsiness score per detect request.
pub trait SampleSource: Send + Sync {
    /// Short label reported back to clients, e.g. "simulation".
    fn mode(&self) -> &'static str;

    fn sample_score(&self, frame: &Frame) -> Result<f64, SourceError>;
}

/// Random scores around a normal baseline. Ignores the frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedSource;

impl SampleSource for SimulatedSource {
    fn mode(&self) -> &'static str {
        "simulation"
    }

    fn sample_score(&self, _frame: &Frame) -> Result<f64, SourceError> {
        let variation = rand::thread_rng().gen_range(-SIM_SPREAD..=SIM_SPREAD);
        let ear = (SIM_BASE + variation).clamp(SIM_MIN, SIM_MAX);
        Ok((ear * 100.0).round() / 100.0)
    }
}

/// Scores from landmarks produced by a client-side face model.
#[derive(Debug, Default, Clone, Copy)]
pub struct LandmarkSource;

impl SampleSource for LandmarkSource {
    fn mode(&self) -> &'static str {
        "landmarks"
    }

    fn sample_score(&self, frame: &Frame) -> Result<f64, SourceError> {
        let lm = frame.landmarks.as_ref().ok_or(SourceError::MissingLandmarks)?;
        let left = eye_aspect_ratio(&lm.left)?;
        let right = eye_aspect_ratio(&lm.right)?;
        Ok((left + right) / 2.0)
    }
}

/// EAR = (|p2-p6| + |p3-p5|) / (2 |p1-p4|)
pub fn eye_aspect_ratio(eye: &[Point; 6]) -> Result<f64, SourceError> {
    let [p1, p2, p3, p4, p5, p6] = *eye;
    let horizontal = p1.dist(p4);
    if horizontal == 0.0 || !horizontal.is_finite() {
        return Err(SourceError::DegenerateLandmarks);
    }
    Ok((p2.dist(p6) + p3.dist(p5)) / (2.0 * horizontal))
}

pub fn build_source(kind: SourceKind) -> Arc<dyn SampleSource> {
    match kind {
        SourceKind::Simulated => Arc::new(SimulatedSource),
        SourceKind::Landmarks => Arc::new(LandmarkSource),
    }
}

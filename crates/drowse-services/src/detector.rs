//! Detection service — pulls a score from the configured source and feeds
//! it through the session's classifier and alert machine.

use std::sync::Arc;

use drowse_core::{AlertState, DetectError};

use crate::session::{SessionId, SessionRegistry};
use crate::source::{Frame, SampleSource, SourceError};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DetectionError {
    #[error(transparent)]
    Session(#[from] DetectError),
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Result of one detect call, as reported to the client.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub alert_state: AlertState,
    pub ear: f64,
    pub is_drowsy: bool,
    pub frame_count: u64,
    pub alert_count: u64,
    /// True only on the sample that raised the alert.
    pub alert_raised: bool,
    pub mode: &'static str,
}

#[derive(Clone)]
pub struct DetectionService {
    registry: SessionRegistry,
    source: Arc<dyn SampleSource>,
    default_threshold: f64,
}

impl DetectionService {
    pub fn new(
        registry: SessionRegistry,
        source: Arc<dyn SampleSource>,
        default_threshold: f64,
    ) -> Self {
        Self {
            registry,
            source,
            default_threshold,
        }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn mode(&self) -> &'static str {
        self.source.mode()
    }

    pub fn default_threshold(&self) -> f64 {
        self.default_threshold
    }

    pub async fn detect(
        &self,
        session_id: &SessionId,
        frame: &Frame,
        threshold: Option<f64>,
    ) -> Result<Detection, DetectionError> {
        // Unknown sessions must not consume a sample.
        if !self.registry.contains(session_id) {
            return Err(DetectError::UnknownSession(hex::encode(session_id)).into());
        }
        let ear = self.source.sample_score(frame)?;
        let threshold = threshold.unwrap_or(self.default_threshold);
        let c = self
            .registry
            .classify_sample(session_id, ear, threshold)
            .await?;

        Ok(Detection {
            alert_state: c.alert_state,
            ear: c.ear,
            is_drowsy: c.is_drowsy,
            frame_count: c.frame_count,
            alert_count: c.alert_count,
            alert_raised: c.transition == drowse_core::Transition::Raised,
            mode: self.source.mode(),
        })
    }
}

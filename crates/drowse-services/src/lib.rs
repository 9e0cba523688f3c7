//! drowse-services — stateful pieces built on drowse-core: the session
//! registry, sample sources, accounts, and the background sweeper.

pub mod accounts;
pub mod detector;
pub mod session;
pub mod source;
pub mod sweeper;

pub use accounts::AccountStore;
pub use detector::{Detection, DetectionError, DetectionService};
pub use session::{
    Classification, RegistrySettings, SessionId, SessionRegistry, SessionSnapshot, SessionStats,
    SweepReport,
};
pub use source::{
    build_source, EyeLandmarks, Frame, LandmarkSource, Point, SampleSource, SimulatedSource,
    SourceError,
};
pub use sweeper::sweep_loop;

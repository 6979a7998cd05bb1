// Active-trip telemetry engine
// Folds a stream of GPS fixes into live trip statistics and a finalized trip record

pub mod config;
pub mod distance;
pub mod error;
pub mod events;
pub mod filter;
pub mod fix;
pub mod publish;
pub mod score;
pub mod session;
pub mod speed;
pub mod storage;
pub mod tracker;

pub use config::EngineConfig;
pub use error::{TripError, TripResult};
pub use events::{DrivingEvent, HarshEvent};
pub use filter::{FixFilter, FixVerdict, RejectReason};
pub use fix::{AcceptedFix, RawFix};
pub use publish::{ChannelPublisher, NullPublisher, SnapshotPublisher};
pub use score::eco_score;
pub use session::{FinalizedTrip, FixOutcome, TripIdentity, TripSession, TripSnapshot, TripState};
pub use storage::{JsonDirSink, TripExport, TripSink};
pub use tracker::TripTracker;

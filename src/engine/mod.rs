pub mod session;
pub mod speed;
pub mod steps;
pub mod timeline;
pub mod topology;

pub use session::{AnimationTiming, EngineCommand, FrameSink, RunOutcome, TimelineEngine};
pub use speed::{SpeedFactor, SpeedRange};
pub use steps::{Step, STEPS, STEP_COUNT, TLS_ENCRYPTION_STEP};
pub use timeline::{Marker, RunPhase, Snapshot, TimelineState};
pub use topology::{interpolated_position, Node, Position, NODES, NODE_COUNT};

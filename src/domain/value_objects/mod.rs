pub mod agent_phase;
pub mod metric;
pub mod thresholds;

pub use agent_phase::AgentPhase;
pub use metric::Metric;
pub use thresholds::ThresholdSet;

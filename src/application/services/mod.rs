pub mod agent;
pub mod dispatcher;
pub mod sampler;
pub mod state;

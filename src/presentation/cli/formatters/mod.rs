pub mod sample_fmt;
pub mod status_fmt;

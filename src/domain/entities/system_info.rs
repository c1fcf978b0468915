use serde::{Deserialize, Serialize};

/// Static description of the host the agent runs on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemInfo {
    pub os: String,
    pub os_version: String,
    pub processor: String,
    pub machine: String,
    pub hostname: String,
}

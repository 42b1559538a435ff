use crossbeam_channel::Sender;
use serde::Deserialize;

use super::{AxisSelection, TelemetryStatus};

/// Commands handled by the control loop between ticks
#[derive(Debug, Clone)]
pub enum Command {
    ArmRecording,
    DisarmRecording,
    ResetOrientation(AxisSelection),
    FetchLog {
        response_sender: Sender<Result<String, String>>,
    },
    GetStatus {
        response_sender: Sender<TelemetryStatus>,
    },
    Shutdown,
}

/// Wire form of a remote command, e.g. `{"command":"reset","axis":"x"}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum CommandRequest {
    Arm,
    Disarm,
    Reset {
        #[serde(default)]
        axis: AxisSelection,
    },
    FetchLog,
    Status,
    Shutdown,
}

impl CommandRequest {
    pub fn parse(payload: &[u8]) -> Result<Self, String> {
        let payload_str = std::str::from_utf8(payload)
            .map_err(|e| format!("Invalid UTF-8: {}", e))?;

        serde_json::from_str::<CommandRequest>(payload_str.trim())
            .map_err(|e| format!("Command parsing error: {}", e))
    }
}

//! Wire protocol shared by the signaling server and its clients.
//!
//! Frames are JSON objects of the shape `{"type": <event>, "data": {...}}`.
//! Event and field names match the platform's browser clients.

pub mod event {
    use serde::{Deserialize, Serialize};
    use serde_json::Value;

    /// Opaque WebRTC signal blob (SDP/ICE). Relayed structurally unchanged,
    /// never inspected.
    pub type SignalBlob = Value;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CallUser {
        pub user_to_call: String,
        pub signal_data: SignalBlob,
        pub from: String,
        pub name: String,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct AnswerCall {
        /// Identity of the original caller, supplied by the answering party.
        pub to: String,
        pub signal: SignalBlob,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct EndCall {
        pub to: String,
        pub from: String,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct TimerStart {
        pub to: String,
        /// Duration in minutes.
        pub duration: u32,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct TimerCancel {
        pub to: String,
    }

    /// Client-to-server events.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(tag = "type", content = "data")]
    pub enum ClientEvent {
        #[serde(rename = "callUser")]
        CallUser(CallUser),
        #[serde(rename = "answerCall")]
        AnswerCall(AnswerCall),
        #[serde(rename = "endCall")]
        EndCall(EndCall),
        #[serde(rename = "timer-start")]
        TimerStart(TimerStart),
        #[serde(rename = "timer-cancel")]
        TimerCancel(TimerCancel),
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct CallInvite {
        pub signal: SignalBlob,
        pub from: String,
        pub name: String,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct CallEnded {
        pub from: String,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TimerUpdate {
        /// Absolute deadline, milliseconds since the Unix epoch. Both peers
        /// compute remaining time locally from this shared value.
        pub end_time: i64,
    }

    /// Server-to-client events.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(tag = "type", content = "data")]
    pub enum ServerEvent {
        #[serde(rename = "callUser")]
        CallUser(CallInvite),
        #[serde(rename = "callAccepted")]
        CallAccepted(SignalBlob),
        #[serde(rename = "callEnded")]
        CallEnded(CallEnded),
        #[serde(rename = "getOnlineUsers")]
        GetOnlineUsers(Vec<String>),
        #[serde(rename = "timer-update")]
        TimerUpdate(TimerUpdate),
        #[serde(rename = "timer-cancel")]
        TimerCancel,
    }

    #[derive(Debug, thiserror::Error)]
    pub enum DecodeError {
        #[error("malformed frame: {0}")]
        Malformed(#[from] serde_json::Error),
        #[error("unsupported event `{kind}`")]
        Unsupported { kind: String },
    }

    impl ClientEvent {
        /// Decodes an inbound text frame. Distinguishes frames that are not
        /// JSON from well-formed frames carrying an event kind this server
        /// does not handle, so the gateway can log them apart.
        pub fn decode(text: &str) -> Result<ClientEvent, DecodeError> {
            let frame: Value = serde_json::from_str(text)?;
            let kind = frame
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            serde_json::from_value(frame).map_err(|_| DecodeError::Unsupported { kind })
        }
    }

}

//! Protocol module - JSON message types for the control adapter
//!
//! Implements the line-delimited JSON protocol used to drive a board from an
//! external client. All messages have: type, seq (sequence number), ts
//! (timestamp in ms).

use serde::{Deserialize, Serialize};

use tilematch_types::{Coord, Directive, SoundCue, Stage};

// ============== Client -> Game Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum HelloType {
    #[serde(rename = "hello")]
    #[default]
    Hello,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CommandType {
    #[serde(rename = "command")]
    #[default]
    Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ControlType {
    #[serde(rename = "control")]
    #[default]
    Control,
}

/// Client hello message (first message to establish connection)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: HelloType,
    pub seq: u64,
    pub ts: u64,
    pub client: ClientInfo,
    pub protocol_version: String,
    pub requested: RequestedCapabilities,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestedCapabilities {
    #[serde(rename = "stream_observations")]
    pub stream_observations: bool,
    /// Optional role request for deterministic controller/observer
    /// negotiation; omitted means first-come-first-served.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<RequestedRole>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestedRole {
    Auto,
    Controller,
    Observer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignedRole {
    Controller,
    Observer,
}

/// A swap request as it travels on the wire: `[row, col]` pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireSwap {
    pub from: [u8; 2],
    pub to: [u8; 2],
}

impl WireSwap {
    pub fn from_coords(from: Coord, to: Coord) -> Self {
        Self {
            from: [from.row, from.col],
            to: [to.row, to.col],
        }
    }

    pub fn coords(&self) -> (Coord, Coord) {
        (
            Coord::new(self.from[0], self.from[1]),
            Coord::new(self.to[0], self.to[1]),
        )
    }
}

/// Command message (controller only)
#[derive(Debug, Clone, Deserialize)]
pub struct CommandMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: CommandType,
    pub seq: u64,
    pub ts: u64,
    pub mode: CommandMode,
    /// For swap mode.
    #[serde(default)]
    pub swap: Option<WireSwap>,
    /// For select mode.
    #[serde(default)]
    pub cell: Option<[u8; 2]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandMode {
    /// Two-cell swap attempt (the usual move).
    Swap,
    /// Single-cell selection, for clients that mirror click input.
    Select,
    /// Rebuild the board, continuing the RNG sequence.
    Restart,
    /// Ask the engine for productive swaps.
    Suggest,
}

/// Control message (claim/release controller status)
#[derive(Debug, Clone, Deserialize)]
pub struct ControlMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: ControlType,
    pub seq: u64,
    pub ts: u64,
    pub action: ControlAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlAction {
    Claim,
    Release,
}

// ============== Game -> Client Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WelcomeType {
    #[serde(rename = "welcome")]
    Welcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckType {
    #[serde(rename = "ack")]
    Ack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckStatus {
    #[serde(rename = "ok")]
    Ok,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorType {
    #[serde(rename = "error")]
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "handshake_required")]
    HandshakeRequired,
    #[serde(rename = "protocol_mismatch")]
    ProtocolMismatch,
    #[serde(rename = "not_controller")]
    NotController,
    #[serde(rename = "controller_active")]
    ControllerActive,
    #[serde(rename = "invalid_command")]
    InvalidCommand,
    #[serde(rename = "invalid_swap")]
    InvalidSwap,
    #[serde(rename = "backpressure")]
    Backpressure,
}

/// Welcome message (response to hello)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeMessage {
    #[serde(rename = "type")]
    pub msg_type: WelcomeType,
    pub seq: u64,
    pub ts: u64,
    pub protocol_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<AssignedRole>,
    pub game_id: String,
    pub capabilities: ServerCapabilities,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerCapabilities {
    #[serde(rename = "command_modes")]
    pub command_modes: [CommandMode; 4],
    pub features: Vec<CapabilityFeature>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CapabilityFeature {
    #[serde(rename = "events")]
    Events,
    #[serde(rename = "state_hash")]
    StateHash,
    #[serde(rename = "score")]
    Score,
    #[serde(rename = "suggest")]
    Suggest,
}

/// Acknowledgment for command receipt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckMessage {
    #[serde(rename = "type")]
    pub msg_type: AckType,
    pub seq: u64,
    pub ts: u64,
    pub status: AckStatus,
}

/// Error message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    #[serde(rename = "type")]
    pub msg_type: ErrorType,
    pub seq: u64,
    pub ts: u64,
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObservationType {
    #[serde(rename = "observation")]
    Observation,
}

/// Board snapshot on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireBoard {
    pub rows: u8,
    pub cols: u8,
    /// Row-major codes: 0 = empty, 1.. = variant + 1, 255 = bomb.
    pub cells: Vec<Vec<u8>>,
}

/// Stage names on the wire, converted at the boundary so the core stays
/// serde-free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageName {
    Pick,
    Move,
    Assemble,
    Fall,
    Frozen,
}

impl From<Stage> for StageName {
    fn from(value: Stage) -> Self {
        match value {
            Stage::Pick => StageName::Pick,
            Stage::Move => StageName::Move,
            Stage::Assemble => StageName::Assemble,
            Stage::Fall => StageName::Fall,
            Stage::Frozen => StageName::Frozen,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SoundName {
    Switch,
    StackClear,
    BombCreate,
    BombExplode,
    Win,
}

impl From<SoundCue> for SoundName {
    fn from(value: SoundCue) -> Self {
        match value {
            SoundCue::Switch => SoundName::Switch,
            SoundCue::StackClear => SoundName::StackClear,
            SoundCue::BombCreate => SoundName::BombCreate,
            SoundCue::BombExplode => SoundName::BombExplode,
            SoundCue::Win => SoundName::Win,
        }
    }
}

/// Observation-level event, the wire form of the score-relevant directives.
/// Motion and face details stay local to the embedder; observers reconstruct
/// the board from the cell grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum WireEvent {
    Score { cleared: u32 },
    Combo,
    Sound { cue: SoundName },
    Settled,
}

/// Best-effort wire projection of a directive.
pub fn wire_event(directive: &Directive) -> Option<WireEvent> {
    match directive {
        Directive::Score { cleared } => Some(WireEvent::Score { cleared: *cleared }),
        Directive::Combo => Some(WireEvent::Combo),
        Directive::Sound(cue) => Some(WireEvent::Sound { cue: (*cue).into() }),
        Directive::Settled => Some(WireEvent::Settled),
        _ => None,
    }
}

/// Game state observation (sent to all streaming clients)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationMessage {
    #[serde(rename = "type")]
    pub msg_type: ObservationType,
    pub seq: u64,
    pub ts: u64,
    pub stage: StageName,
    pub board: WireBoard,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection: Option<[u8; 2]>,
    pub seed: u32,
    pub score: u32,
    pub combo: u32,
    pub win: bool,
    #[serde(rename = "state_hash")]
    pub state_hash: StateHash,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<WireEvent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SuggestionType {
    #[serde(rename = "suggestion")]
    Suggestion,
}

/// Productive swaps found by the engine, answer to a `suggest` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionMessage {
    #[serde(rename = "type")]
    pub msg_type: SuggestionType,
    pub seq: u64,
    pub ts: u64,
    pub swaps: Vec<SuggestedSwap>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestedSwap {
    pub from: [u8; 2],
    pub to: [u8; 2],
    pub effect: String,
}

/// Deterministic state hash serialized as lowercase hex (without heap allocation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateHash(pub u64);

impl Serialize for StateHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        const HEX: &[u8; 16] = b"0123456789abcdef";
        let mut buf = [0u8; 16];
        let mut v = self.0;
        for i in 0..16 {
            let nib = (v & 0x0f) as usize;
            buf[15 - i] = HEX[nib];
            v >>= 4;
        }
        let s = std::str::from_utf8(&buf).expect("hex is valid utf8");
        serializer.serialize_str(s)
    }
}

impl<'de> Deserialize<'de> for StateHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <&str>::deserialize(deserializer)?;
        let s = s.trim();
        let mut v: u64 = 0;
        for b in s.as_bytes() {
            let d = match b {
                b'0'..=b'9' => (b - b'0') as u64,
                b'a'..=b'f' => (b - b'a' + 10) as u64,
                b'A'..=b'F' => (b - b'A' + 10) as u64,
                _ => return Err(serde::de::Error::custom("invalid hex")),
            };
            v = (v << 4) | d;
        }
        Ok(StateHash(v))
    }
}

// ============== Message Parsing ==============

/// Parse a JSON message from a string
pub fn parse_message(json: &str) -> Result<ParsedMessage, serde_json::Error> {
    #[derive(Debug, Deserialize)]
    #[serde(tag = "type")]
    enum InboundMessage {
        #[serde(rename = "hello")]
        Hello(HelloMessage),
        #[serde(rename = "command")]
        Command(CommandMessage),
        #[serde(rename = "control")]
        Control(ControlMessage),
    }

    match serde_json::from_str::<InboundMessage>(json) {
        Ok(InboundMessage::Hello(m)) => Ok(ParsedMessage::Hello(m)),
        Ok(InboundMessage::Command(m)) => Ok(ParsedMessage::Command(m)),
        Ok(InboundMessage::Control(m)) => Ok(ParsedMessage::Control(m)),
        Err(e) => {
            // Unknown message type is not a hard parse error for the protocol.
            #[derive(Debug, Deserialize)]
            struct TypeOnly<'a> {
                #[serde(rename = "type")]
                msg_type: Option<&'a str>,
            }
            let msg_type = serde_json::from_str::<TypeOnly>(json)?
                .msg_type
                .unwrap_or("unknown");
            if msg_type != "hello" && msg_type != "command" && msg_type != "control" {
                #[derive(Debug, Deserialize)]
                struct SeqOnly {
                    seq: Option<u64>,
                }
                let seq = serde_json::from_str::<SeqOnly>(json)?.seq.unwrap_or(0);
                return Ok(ParsedMessage::Unknown(UnknownMessage { seq }));
            }
            Err(e)
        }
    }
}

/// Parsed incoming message
#[derive(Debug, Clone)]
pub enum ParsedMessage {
    Hello(HelloMessage),
    Command(CommandMessage),
    Control(ControlMessage),
    Unknown(UnknownMessage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownMessage {
    pub seq: u64,
}

// ============== Utility Functions ==============

/// Create a hello message
pub fn create_hello(seq: u64, client_name: &str, protocol_version: &str) -> HelloMessage {
    HelloMessage {
        msg_type: HelloType::Hello,
        seq,
        ts: current_timestamp_ms(),
        client: ClientInfo {
            name: client_name.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        protocol_version: protocol_version.to_string(),
        requested: RequestedCapabilities {
            stream_observations: true,
            role: Some(RequestedRole::Auto),
        },
    }
}

/// Create a welcome message
pub fn create_welcome(
    seq: u64,
    protocol_version: &str,
    client_id: u64,
    role: AssignedRole,
) -> WelcomeMessage {
    WelcomeMessage {
        msg_type: WelcomeType::Welcome,
        seq,
        ts: current_timestamp_ms(),
        protocol_version: protocol_version.to_string(),
        client_id: Some(client_id),
        role: Some(role),
        game_id: "tilematch".to_string(),
        capabilities: ServerCapabilities {
            command_modes: [
                CommandMode::Swap,
                CommandMode::Select,
                CommandMode::Restart,
                CommandMode::Suggest,
            ],
            features: vec![
                CapabilityFeature::Events,
                CapabilityFeature::StateHash,
                CapabilityFeature::Score,
                CapabilityFeature::Suggest,
            ],
        },
    }
}

/// Create an acknowledgment
pub fn create_ack(seq: u64) -> AckMessage {
    AckMessage {
        msg_type: AckType::Ack,
        seq,
        ts: current_timestamp_ms(),
        status: AckStatus::Ok,
    }
}

/// Create an error message
pub fn create_error(seq: u64, code: ErrorCode, message: &str) -> ErrorMessage {
    ErrorMessage {
        msg_type: ErrorType::Error,
        seq,
        ts: current_timestamp_ms(),
        code,
        message: message.to_string(),
    }
}

/// Get current timestamp in milliseconds
pub fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hello() {
        let json = r#"{"type":"hello","seq":1,"ts":1234567890,"client":{"name":"test-ai","version":"1.0.0"},"protocol_version":"1.0.0","requested":{"stream_observations":true}}"#;

        let result = parse_message(json).unwrap();
        match result {
            ParsedMessage::Hello(msg) => {
                assert_eq!(msg.msg_type, HelloType::Hello);
                assert_eq!(msg.seq, 1);
                assert_eq!(msg.client.name, "test-ai");
                assert_eq!(msg.protocol_version, "1.0.0");
                assert_eq!(msg.requested.role, None);
            }
            _ => panic!("Expected Hello message"),
        }
    }

    #[test]
    fn test_parse_command_swap() {
        let json = r#"{"type":"command","seq":2,"ts":1234567900,"mode":"swap","swap":{"from":[3,3],"to":[3,4]}}"#;

        let result = parse_message(json).unwrap();
        match result {
            ParsedMessage::Command(msg) => {
                assert_eq!(msg.mode, CommandMode::Swap);
                let swap = msg.swap.unwrap();
                let (from, to) = swap.coords();
                assert_eq!(from, Coord::new(3, 3));
                assert_eq!(to, Coord::new(3, 4));
            }
            _ => panic!("Expected Command message"),
        }
    }

    #[test]
    fn test_parse_command_suggest() {
        let json = r#"{"type":"command","seq":5,"ts":1,"mode":"suggest"}"#;
        let result = parse_message(json).unwrap();
        match result {
            ParsedMessage::Command(msg) => {
                assert_eq!(msg.mode, CommandMode::Suggest);
                assert!(msg.swap.is_none());
            }
            _ => panic!("Expected Command message"),
        }
    }

    #[test]
    fn test_parse_control() {
        let json = r#"{"type":"control","seq":3,"ts":1234567910,"action":"claim"}"#;

        let result = parse_message(json).unwrap();
        match result {
            ParsedMessage::Control(msg) => {
                assert_eq!(msg.action, ControlAction::Claim);
            }
            _ => panic!("Expected Control message"),
        }
    }

    #[test]
    fn test_parse_unknown_type() {
        let json = r#"{"type":"telemetry","seq":9}"#;
        match parse_message(json).unwrap() {
            ParsedMessage::Unknown(u) => assert_eq!(u.seq, 9),
            _ => panic!("Expected Unknown message"),
        }
    }

    #[test]
    fn test_create_welcome() {
        let welcome = create_welcome(1, "1.0.0", 7, AssignedRole::Controller);
        assert_eq!(welcome.msg_type, WelcomeType::Welcome);
        assert_eq!(welcome.seq, 1);
        assert_eq!(welcome.client_id, Some(7));
        assert_eq!(welcome.role, Some(AssignedRole::Controller));
        assert_eq!(welcome.game_id, "tilematch");
    }

    #[test]
    fn test_create_error() {
        let error = create_error(5, ErrorCode::NotController, "Only controller may send commands");
        assert_eq!(error.msg_type, ErrorType::Error);
        assert_eq!(error.code, ErrorCode::NotController);
    }

    #[test]
    fn test_serde_roundtrip_ack() {
        let ack = create_ack(10);
        let json = serde_json::to_string(&ack).unwrap();
        let parsed: AckMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.seq, ack.seq);
        assert_eq!(parsed.status, ack.status);
    }

    #[test]
    fn test_state_hash_hex_roundtrip() {
        let hash = StateHash(0xdead_beef_0042_1100);
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, "\"deadbeef00421100\"");
        let parsed: StateHash = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, hash);
    }

    #[test]
    fn test_wire_event_projection() {
        assert_eq!(
            wire_event(&Directive::Score { cleared: 4 }),
            Some(WireEvent::Score { cleared: 4 })
        );
        assert_eq!(
            wire_event(&Directive::Sound(SoundCue::BombExplode)),
            Some(WireEvent::Sound {
                cue: SoundName::BombExplode
            })
        );
        assert_eq!(wire_event(&Directive::Settled), Some(WireEvent::Settled));
        assert_eq!(
            wire_event(&Directive::SelectionChanged { selected: None }),
            None
        );
    }

    #[test]
    fn test_wire_event_json_shape() {
        let json = serde_json::to_string(&WireEvent::Sound {
            cue: SoundName::StackClear,
        })
        .unwrap();
        assert_eq!(json, r#"{"kind":"sound","cue":"stack-clear"}"#);
    }
}

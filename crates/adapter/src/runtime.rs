//! Adapter runtime integration.
//!
//! Bridges the sync board loop with the async TCP server.

use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use tilematch_types::Coord;

use crate::protocol::{AckMessage, ErrorMessage, ObservationMessage, SuggestionMessage};
use crate::server::{run_server, ServerConfig, ServerState};

/// Command delivered to the board loop.
#[derive(Debug, Clone)]
pub struct InboundCommand {
    pub client_id: usize,
    pub seq: u64,
    pub payload: InboundPayload,
}

#[derive(Debug, Clone)]
pub enum InboundPayload {
    Command(ClientCommand),
    /// A freshly handshaken client wants an immediate observation.
    SnapshotRequest,
}

/// Command payload, already validated against the static protocol rules
/// (swap adjacency); board-level legality is the loop's concern.
#[derive(Debug, Clone)]
pub enum ClientCommand {
    Swap { from: Coord, to: Coord },
    Select { at: Coord },
    Restart,
    Suggest,
}

/// Outbound message to be delivered by the server.
#[derive(Debug, Clone)]
pub enum OutboundMessage {
    ToClientObservation {
        client_id: usize,
        obs: ObservationMessage,
    },
    BroadcastObservation {
        obs: ObservationMessage,
    },
    ToClientAck {
        client_id: usize,
        ack: AckMessage,
    },
    ToClientError {
        client_id: usize,
        err: ErrorMessage,
    },
    ToClientSuggestion {
        client_id: usize,
        msg: SuggestionMessage,
    },
}

/// Running adapter instance.
pub struct Adapter {
    _rt: Runtime,
    cmd_rx: mpsc::Receiver<InboundCommand>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
}

impl Adapter {
    /// Start the adapter from environment variables.
    ///
    /// Returns None if `TILEMATCH_AI_DISABLED` is set.
    pub fn start_from_env() -> Option<Self> {
        if ServerState::is_disabled() {
            return None;
        }

        let config = ServerConfig::from_env();
        Some(Self::start(config))
    }

    /// Start the adapter with an explicit configuration.
    pub fn start(config: ServerConfig) -> Self {
        let max_pending = config.max_pending_commands.max(1);
        let (cmd_tx, cmd_rx) = mpsc::channel::<InboundCommand>(max_pending);
        let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();

        let rt = Runtime::new().expect("Failed to create tokio runtime");
        rt.spawn(async move {
            let _ = run_server(config, cmd_tx, out_rx, None).await;
        });

        Self {
            _rt: rt,
            cmd_rx,
            out_tx,
        }
    }

    pub fn try_recv(&mut self) -> Option<InboundCommand> {
        self.cmd_rx.try_recv().ok()
    }

    pub fn send(&self, msg: OutboundMessage) {
        let _ = self.out_tx.send(msg);
    }
}

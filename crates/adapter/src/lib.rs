//! Adapter module - external control via TCP socket with JSON protocol
//!
//! This module lets external clients (AI agents, remote UIs, test drivers)
//! drive a board over a TCP socket.
//!
//! # Protocol Overview
//!
//! The adapter implements a **line-delimited JSON protocol** over TCP:
//!
//! 1. **Connection**: Client connects to the TCP socket (default: 127.0.0.1:7878)
//! 2. **Handshake**: Client sends `hello`, server responds with `welcome`
//! 3. **Controller Assignment**: First client to hello becomes the controller
//! 4. **Observation Streaming**: Server sends board observations as the game evolves
//! 5. **Commanding**: Controller sends swap/select/restart commands
//!
//! # Message Types
//!
//! ## Client -> Server
//!
//! - **hello**: Initial handshake with client info and requested capabilities
//! - **command**: `swap` (two adjacent cells), `select` (one cell, mirroring
//!   click input), `restart`, or `suggest` (ask for productive swaps)
//! - **control**: Claim or release controller status
//!
//! ## Server -> Client
//!
//! - **welcome**: Response to hello with server capabilities
//! - **observation**: Board snapshot (cells, stage, selection, score, state hash)
//!   plus the score-relevant events since the previous observation
//! - **suggestion**: Productive swaps found by the engine
//! - **ack**: Command acknowledgment
//! - **error**: Error response with code and message
//!
//! # Environment Variables
//!
//! - `TILEMATCH_AI_HOST`: Bind address (default: "127.0.0.1")
//! - `TILEMATCH_AI_PORT`: Port number (default: 7878)
//! - `TILEMATCH_AI_MAX_PENDING`: Command queue depth (default: 10)
//! - `TILEMATCH_AI_DISABLED`: Set to "1" or "true" to disable the adapter
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"type":"hello","seq":1,"ts":1,"client":{"name":"my-ai","version":"1.0.0"},"protocol_version":"1.0.0","requested":{"stream_observations":true}}
//! Server -> Client: {"type":"welcome","seq":1,"ts":2,"protocol_version":"1.0.0",...}
//! Server -> Client: {"type":"observation","seq":2,"ts":3,"stage":"pick","board":{...},...}
//! Client -> Server: {"type":"command","seq":2,"ts":4,"mode":"swap","swap":{"from":[3,3],"to":[3,4]}}
//! Server -> Client: {"type":"ack","seq":3,"ts":5,"status":"ok"}
//! ```
//!
//! # Implementation
//!
//! - Uses **tokio** for async networking
//! - Multiple clients can connect (only one controller at a time)
//! - Controller can release control for another client to take over
//! - See [`protocol`] for message structure definitions
//! - See [`server`] for the TCP server implementation
//!
//! # Testing
//!
//! Connect to the adapter using netcat for manual testing:
//!
//! ```bash
//! nc 127.0.0.1 7878
//! {"type":"hello","seq":1,"ts":1,"client":{"name":"test","version":"1.0.0"},"protocol_version":"1.0.0","requested":{"stream_observations":true}}
//! ```

pub mod protocol;
pub mod runtime;
pub mod server;

pub use tilematch_core as core;
pub use tilematch_types as types;

// Re-export protocol types for convenience
pub use protocol::*;
pub use runtime::{Adapter, ClientCommand, InboundCommand, InboundPayload, OutboundMessage};
pub use server::{build_observation, run_server, ServerConfig, ServerState};

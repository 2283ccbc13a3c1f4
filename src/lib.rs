//! Tilematch (workspace facade crate).
//!
//! This package keeps the `tilematch::{core,engine,adapter,types}` public API
//! stable while the implementation lives in dedicated crates under `crates/`.

pub use tilematch_adapter as adapter;
pub use tilematch_core as core;
pub use tilematch_engine as engine;
pub use tilematch_types as types;

//! WebSocket telemetry ingestion for Tremorlog.
//!
//! Wearable devices hold a persistent WebSocket connection to this server
//! and send one telemetry frame per message, either in the compact binary
//! format or as JSON (see [`codec`]). Every message is acknowledged
//! individually:
//!
//! ```json
//! {"status": "success", "message": "Binary data received"}
//! {"status": "error", "message": "invalid frame: ..."}
//! ```
//!
//! Unknown devices sending binary frames are auto-provisioned; the JSON path
//! deliberately drops readings for unknown devices instead (soft drop,
//! logged, still acknowledged).

pub mod codec;
pub mod config;
pub mod error;
pub mod server;

pub use codec::{decode_binary, decode_json, encode_binary, CodecError, SensorFrame};
pub use config::IngestConfig;
pub use error::IngestError;
pub use server::IngestState;

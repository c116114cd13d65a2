//! WebSocket ingestion server.
//!
//! Each connection runs as its own task: messages are decoded, persisted,
//! and acknowledged one at a time, so a device's stream is stored in the
//! order it arrived. Errors are per-message negative acknowledgements; the
//! connection stays open until the transport closes it.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use chrono::Utc;
use serde::Serialize;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use database::models::NewReading;
use database::{device, reading, Database};

use crate::codec::{self, SensorFrame};
use crate::error::{IngestError, Result};

/// Shared ingestion server state.
#[derive(Clone)]
pub struct IngestState {
    db: Database,
    /// Currently connected clients; observability only, no fan-out.
    connected: Arc<AtomicUsize>,
}

impl IngestState {
    /// Create new ingestion state over a database handle.
    pub fn new(db: Database) -> Self {
        Self {
            db,
            connected: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of currently connected clients.
    pub fn connected_clients(&self) -> usize {
        self.connected.load(Ordering::SeqCst)
    }
}

/// Per-message acknowledgement sent back over the socket.
#[derive(Debug, Serialize)]
struct Ack {
    status: &'static str,
    message: String,
}

impl Ack {
    fn success(message: &str) -> Self {
        Self {
            status: "success",
            message: message.to_string(),
        }
    }

    fn error(err: &IngestError) -> Self {
        Self {
            status: "error",
            message: err.to_string(),
        }
    }
}

/// Run the ingestion listener until the process is stopped.
pub async fn run(db: Database, addr: SocketAddr) -> std::io::Result<()> {
    let state = IngestState::new(db);
    let app = Router::new().route("/", get(ws_handler)).with_state(state);

    info!(%addr, "Ingestion server listening");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<IngestState>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: IngestState) {
    let clients = state.connected.fetch_add(1, Ordering::SeqCst) + 1;
    info!(clients, "New client connected");

    while let Some(message) = socket.recv().await {
        let message = match message {
            Ok(message) => message,
            Err(err) => {
                debug!(%err, "Client connection closed");
                break;
            }
        };

        let ack = match message {
            Message::Binary(bytes) => match ingest_binary(&state, &bytes).await {
                Ok(frame) => {
                    debug!(device_id = %frame.device_id, "Stored binary reading");
                    Ack::success("Binary data received")
                }
                Err(err) => {
                    error!(%err, "Error processing binary message");
                    Ack::error(&err)
                }
            },
            Message::Text(text) => match ingest_text(&state, &text).await {
                Ok(_) => Ack::success("Data received"),
                Err(err) => {
                    error!(%err, "Error processing message");
                    Ack::error(&err)
                }
            },
            Message::Close(_) => break,
            // Pings are answered by the protocol layer.
            Message::Ping(_) | Message::Pong(_) => continue,
        };

        let payload = serde_json::to_string(&ack).expect("ack serializes");
        if socket.send(Message::Text(payload)).await.is_err() {
            break;
        }
    }

    let remaining = state.connected.fetch_sub(1, Ordering::SeqCst) - 1;
    info!(clients = remaining, "Client disconnected");
}

/// Process one binary frame: decode, auto-provision, touch, append.
///
/// The decode happens before any registry or store access, so a malformed
/// packet has no side effects.
pub(crate) async fn ingest_binary(state: &IngestState, bytes: &[u8]) -> Result<SensorFrame> {
    let frame = codec::decode_binary(bytes)?;
    let pool = state.db.pool();

    let resolved = device::resolve_or_create(pool, &frame.device_id).await?;
    let now = Utc::now().naive_utc();
    device::touch_last_seen(pool, &resolved.id, now).await?;
    reading::insert_reading(pool, &new_reading(&frame, now)).await?;

    Ok(frame)
}

/// Process one JSON frame.
///
/// Unlike the binary path, an unknown device does not get provisioned: the
/// reading is dropped with a warning and the message still acknowledged.
/// Returns whether the reading was stored.
pub(crate) async fn ingest_text(state: &IngestState, text: &str) -> Result<bool> {
    let frame = codec::decode_json(text)?;
    info!(device_id = %frame.device_id, "Received JSON data");
    let pool = state.db.pool();

    if !device::device_exists(pool, &frame.device_id).await? {
        warn!(device_id = %frame.device_id, "Unknown device in JSON payload, dropping reading");
        return Ok(false);
    }

    let now = Utc::now().naive_utc();
    device::touch_last_seen(pool, &frame.device_id, now).await?;
    reading::insert_reading(pool, &new_reading(&frame, now)).await?;

    Ok(true)
}

fn new_reading(frame: &SensorFrame, timestamp: chrono::NaiveDateTime) -> NewReading {
    NewReading {
        device_id: frame.device_id.clone(),
        timestamp,
        accel_x: frame.accel_x as f64,
        accel_y: frame.accel_y as f64,
        accel_z: frame.accel_z as f64,
        gyro_x: frame.gyro_x as f64,
        gyro_y: frame.gyro_y as f64,
        gyro_z: frame.gyro_z as f64,
        battery_level: Some(frame.battery_level as f64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CodecError;

    async fn test_state() -> IngestState {
        let db = Database::connect_with_pool_size("sqlite::memory:", 1)
            .await
            .unwrap();
        db.migrate().await.unwrap();
        IngestState::new(db)
    }

    fn sample_frame() -> SensorFrame {
        SensorFrame {
            device_id: "c27fb365-0c84-4cf2-8555-814bb065e448".to_string(),
            accel_x: 1.0,
            accel_y: 2.0,
            accel_z: 3.0,
            gyro_x: 0.1,
            gyro_y: 0.2,
            gyro_z: 0.3,
            battery_level: 95.0,
        }
    }

    #[tokio::test]
    async fn test_binary_frame_provisions_device_and_stores_reading() {
        let state = test_state().await;
        let frame = sample_frame();
        let bytes = codec::encode_binary(&frame).unwrap();

        ingest_binary(&state, &bytes).await.unwrap();

        let pool = state.db.pool();
        let stored = device::get_device(pool, &frame.device_id).await.unwrap();
        assert_eq!(stored.device_type, device::AUTO_DEVICE_TYPE);
        assert!(stored.last_seen.is_some());

        let rows = reading::list_readings(pool, &frame.device_id, 10, 0).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].accel_x, 1.0);
        assert_eq!(rows[0].gyro_z, 0.3f32 as f64);
        assert_eq!(rows[0].battery_level, Some(95.0));
    }

    #[tokio::test]
    async fn test_undersized_packet_has_no_side_effects() {
        let state = test_state().await;

        let result = ingest_binary(&state, &[0u8; 20]).await;
        assert!(matches!(
            result,
            Err(IngestError::Codec(CodecError::Undersized { .. }))
        ));

        let frame = sample_frame();
        let exists = device::device_exists(state.db.pool(), &frame.device_id)
            .await
            .unwrap();
        assert!(!exists);
    }

    #[tokio::test]
    async fn test_unknown_json_device_is_soft_dropped() {
        let state = test_state().await;

        let stored = ingest_text(
            &state,
            r#"{"device_id": "never-seen", "accel_x": 1.0, "gyro_x": 2.0}"#,
        )
        .await
        .unwrap();
        assert!(!stored);

        let pool = state.db.pool();
        let exists = device::device_exists(pool, "never-seen").await.unwrap();
        assert!(!exists);
        let readings = reading::count_readings(pool, "never-seen").await.unwrap();
        assert_eq!(readings, 0);
    }

    #[tokio::test]
    async fn test_known_json_device_stores_reading() {
        let state = test_state().await;
        let pool = state.db.pool();

        let provisioned = device::resolve_or_create(pool, "11111111-2222-3333-4444-555555555555")
            .await
            .unwrap();

        let stored = ingest_text(
            &state,
            &format!(r#"{{"device_id": "{}", "accel_x": 4.5}}"#, provisioned.id),
        )
        .await
        .unwrap();
        assert!(stored);

        let rows = reading::list_readings(pool, &provisioned.id, 10, 0).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].accel_x, 4.5);
        // Absent fields default to zero.
        assert_eq!(rows[0].gyro_y, 0.0);
    }
}

//! Tremor analytics engine for Tremorlog.
//!
//! Turns stored shake metrics into the views the HTTP surface serves:
//! per-minute and per-day aggregates, medication-response comparisons, and
//! short-horizon trend predictions. The trend classifier itself is an
//! external collaborator abstracted behind [`TrendClassifier`].
//!
//! # Example
//!
//! ```no_run
//! use analytics::shake;
//!
//! # async fn example() -> analytics::Result<()> {
//! let db = database::Database::connect("sqlite:tremorlog.db?mode=rwc").await?;
//!
//! let submission = serde_json::from_str(
//!     r#"{"user_id":"u1","accel_x":1.0,"accel_y":0.0,"accel_z":0.0,
//!         "gyro_x":0.0,"gyro_y":0.0,"gyro_z":1.0}"#,
//! )
//! .unwrap();
//! let metric = shake::log_shake(db.pool(), &submission).await?;
//! println!("intensity: {}", metric.shake_per_minute);
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod error;
pub mod medication;
pub mod shake;
pub mod trend;

pub use aggregate::{medication_effect, shake_by_minute, MedicationEffect};
pub use error::{AnalyticsError, Result};
pub use medication::{log_medication, medication_response, MedicationResponse};
pub use shake::{log_shake, shake_intensity, ShakeSubmission};
pub use trend::{HeuristicClassifier, TrendClassifier, TrendPrediction, TIMESTEPS};

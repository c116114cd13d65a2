//! Short-horizon trend prediction over daily shake averages.
//!
//! The engine owns series construction and label derivation; the classifier
//! itself is abstracted behind [`TrendClassifier`] so a real model service
//! can be swapped in without touching the engine. A deterministic
//! [`HeuristicClassifier`] ships as the default implementation.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::SqlitePool;

use database::shake_metric;

use crate::error::{AnalyticsError, Result};

/// Number of prior days a prediction window covers.
pub const TIMESTEPS: usize = 3;

/// A binary better/worse prediction for one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPrediction {
    /// The day the prediction is for.
    pub date: NaiveDate,
    /// Probability that the user improved relative to the previous day.
    pub probability_better: f64,
    /// `"better"` when the probability reaches 0.5, else `"worse"`.
    pub prediction: &'static str,
}

/// A trainable binary predictor over windows of daily shake averages.
///
/// Implementations hold per-user fitted state and must be safe to share
/// across request handlers. This trait is object-safe and can be used with
/// `Arc<dyn TrendClassifier>`.
pub trait TrendClassifier: Send + Sync {
    /// Fit the user's model on the full daily-average series and its derived
    /// labels (label for day `t` is true when intensity strictly decreased
    /// from day `t-1`).
    fn fit(&self, user_id: &str, series: &[f64], labels: &[bool]) -> Result<()>;

    /// Probability of "better", given the window of daily averages
    /// immediately preceding the target day.
    fn predict(&self, user_id: &str, window: &[f64]) -> Result<f64>;

    /// Whether a fitted model exists for the user.
    fn is_trained(&self, user_id: &str) -> bool;
}

#[derive(Debug, Clone, Copy)]
struct FittedTrend {
    /// Fraction of training days labeled "better".
    improvement_rate: f64,
}

/// Deterministic stand-in classifier.
///
/// Blends the fraction of strictly-decreasing steps in the prediction window
/// with the user's training-time improvement base rate. Not a learned model;
/// it exists so the engine and its callers are fully exercisable without an
/// external model service.
#[derive(Debug, Default)]
pub struct HeuristicClassifier {
    models: RwLock<HashMap<String, FittedTrend>>,
}

impl TrendClassifier for HeuristicClassifier {
    fn fit(&self, user_id: &str, _series: &[f64], labels: &[bool]) -> Result<()> {
        let improvement_rate = if labels.is_empty() {
            0.5
        } else {
            labels.iter().filter(|l| **l).count() as f64 / labels.len() as f64
        };

        let mut models = self.models.write().expect("classifier lock poisoned");
        models.insert(user_id.to_string(), FittedTrend { improvement_rate });
        Ok(())
    }

    fn predict(&self, user_id: &str, window: &[f64]) -> Result<f64> {
        let fitted = self
            .models
            .read()
            .expect("classifier lock poisoned")
            .get(user_id)
            .copied()
            .ok_or_else(|| AnalyticsError::ModelNotTrained(user_id.to_string()))?;

        let decreasing = window.windows(2).filter(|w| w[1] < w[0]).count();
        let steps = window.len().saturating_sub(1).max(1);
        let window_vote = decreasing as f64 / steps as f64;

        Ok(((window_vote + fitted.improvement_rate) / 2.0).clamp(0.0, 1.0))
    }

    fn is_trained(&self, user_id: &str) -> bool {
        self.models
            .read()
            .expect("classifier lock poisoned")
            .contains_key(user_id)
    }
}

/// The user's ascending-date series of daily-average intensities.
pub async fn daily_series(pool: &SqlitePool, user_id: &str) -> Result<Vec<(NaiveDate, f64)>> {
    let rows = shake_metric::daily_averages(pool, user_id).await?;
    rows.into_iter()
        .map(|(day, avg)| {
            let date = NaiveDate::parse_from_str(&day, "%Y-%m-%d")?;
            Ok((date, avg))
        })
        .collect()
}

/// Fit the user's classifier on their recorded history.
///
/// Returns the number of training samples. Fails with
/// [`AnalyticsError::InsufficientHistory`] when fewer than `TIMESTEPS + 1`
/// days are recorded.
pub async fn train(
    pool: &SqlitePool,
    user_id: &str,
    classifier: &dyn TrendClassifier,
) -> Result<usize> {
    let series = daily_series(pool, user_id).await?;
    if series.len() < TIMESTEPS + 1 {
        return Err(AnalyticsError::InsufficientHistory);
    }

    let values: Vec<f64> = series.iter().map(|(_, v)| *v).collect();
    let labels: Vec<bool> = (TIMESTEPS..values.len())
        .map(|i| values[i] < values[i - 1])
        .collect();

    classifier.fit(user_id, &values, &labels)?;
    tracing::info!(user_id, samples = labels.len(), "Trend model trained");
    Ok(labels.len())
}

/// Predict better/worse for a recorded day.
///
/// Requires a fitted classifier, a recorded daily average for `target_date`,
/// and at least `TIMESTEPS` recorded days immediately preceding it.
pub async fn predict(
    pool: &SqlitePool,
    user_id: &str,
    target_date: NaiveDate,
    classifier: &dyn TrendClassifier,
) -> Result<TrendPrediction> {
    if !classifier.is_trained(user_id) {
        return Err(AnalyticsError::ModelNotTrained(user_id.to_string()));
    }

    let series = daily_series(pool, user_id).await?;
    let idx = series
        .iter()
        .position(|(date, _)| *date == target_date)
        .ok_or(AnalyticsError::DateNotFound(target_date))?;
    if idx < TIMESTEPS {
        return Err(AnalyticsError::InsufficientHistory);
    }

    let window: Vec<f64> = series[idx - TIMESTEPS..idx].iter().map(|(_, v)| *v).collect();
    let probability = classifier.predict(user_id, &window)?;

    Ok(TrendPrediction {
        date: target_date,
        probability_better: probability,
        prediction: if probability >= 0.5 { "better" } else { "worse" },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use database::models::{ShakeMetric, User};
    use database::{user, Database};
    use uuid::Uuid;

    async fn test_db() -> Database {
        let db = Database::connect_with_pool_size("sqlite::memory:", 1)
            .await
            .unwrap();
        db.migrate().await.unwrap();
        db
    }

    async fn seed_daily_values(db: &Database, user_id: &str, values: &[f64]) {
        let record = User {
            id: user_id.to_string(),
            name: "Test".to_string(),
            medications: None,
        };
        user::create_user(db.pool(), &record).await.unwrap();

        let start = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        for (i, value) in values.iter().enumerate() {
            let metric = ShakeMetric {
                id: Uuid::new_v4().to_string(),
                user_id: user_id.to_string(),
                timestamp: (start + chrono::Duration::days(i as i64))
                    .and_hms_opt(12, 0, 0)
                    .unwrap(),
                shake_per_minute: *value,
            };
            shake_metric::insert_shake_metric(db.pool(), &metric).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_train_requires_history() {
        let db = test_db().await;
        seed_daily_values(&db, "user-1", &[5.0, 4.0, 3.0]).await;

        let classifier = HeuristicClassifier::default();
        let result = train(db.pool(), "user-1", &classifier).await;
        assert!(matches!(result, Err(AnalyticsError::InsufficientHistory)));
        assert!(!classifier.is_trained("user-1"));
    }

    #[tokio::test]
    async fn test_train_then_predict_improving_user() {
        let db = test_db().await;
        seed_daily_values(&db, "user-1", &[9.0, 8.0, 7.0, 6.0, 5.0]).await;

        let classifier = HeuristicClassifier::default();
        let samples = train(db.pool(), "user-1", &classifier).await.unwrap();
        assert_eq!(samples, 2);

        let target = NaiveDate::from_ymd_opt(2025, 5, 5).unwrap();
        let prediction = predict(db.pool(), "user-1", target, &classifier).await.unwrap();
        assert_eq!(prediction.date, target);
        assert_eq!(prediction.prediction, "better");
        assert_eq!(prediction.probability_better, 1.0);
    }

    #[tokio::test]
    async fn test_predict_unfitted_model() {
        let db = test_db().await;
        seed_daily_values(&db, "user-1", &[9.0, 8.0, 7.0, 6.0]).await;

        let classifier = HeuristicClassifier::default();
        let target = NaiveDate::from_ymd_opt(2025, 5, 4).unwrap();
        let result = predict(db.pool(), "user-1", target, &classifier).await;
        assert!(matches!(result, Err(AnalyticsError::ModelNotTrained(_))));
    }

    #[tokio::test]
    async fn test_predict_unknown_date() {
        let db = test_db().await;
        seed_daily_values(&db, "user-1", &[9.0, 8.0, 7.0, 6.0]).await;

        let classifier = HeuristicClassifier::default();
        train(db.pool(), "user-1", &classifier).await.unwrap();

        let target = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
        let result = predict(db.pool(), "user-1", target, &classifier).await;
        assert!(matches!(result, Err(AnalyticsError::DateNotFound(_))));
    }

    #[tokio::test]
    async fn test_predict_insufficient_preceding_days() {
        let db = test_db().await;
        seed_daily_values(&db, "user-1", &[9.0, 8.0, 7.0, 6.0]).await;

        let classifier = HeuristicClassifier::default();
        train(db.pool(), "user-1", &classifier).await.unwrap();

        // The second recorded day has only one predecessor, fitted or not.
        let target = NaiveDate::from_ymd_opt(2025, 5, 2).unwrap();
        let result = predict(db.pool(), "user-1", target, &classifier).await;
        assert!(matches!(result, Err(AnalyticsError::InsufficientHistory)));
    }

    #[test]
    fn test_heuristic_is_deterministic() {
        let classifier = HeuristicClassifier::default();
        classifier
            .fit("user-1", &[5.0, 4.0, 3.0, 2.0], &[true, false])
            .unwrap();

        let a = classifier.predict("user-1", &[3.0, 2.0, 1.0]).unwrap();
        let b = classifier.predict("user-1", &[3.0, 2.0, 1.0]).unwrap();
        assert_eq!(a, b);
        assert!((0.0..=1.0).contains(&a));
    }
}

//! Daily accident-count forecasting

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{round_to, AnalyticsError, AnalyticsResult};

/// Upper bound on forecast horizon, in days
pub const MAX_FORECAST_PERIODS: usize = 30;

/// Days averaged by the naive strategy
pub const NAIVE_WINDOW: usize = 30;

/// Minimum series length before weekday offsets are fitted
pub const SEASONAL_MIN_DAYS: usize = 14;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ForecastStrategy {
    /// Linear trend plus day-of-week offsets
    #[default]
    Trend,
    /// Constant mean of the most recent counts
    Naive,
}

impl std::fmt::Display for ForecastStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ForecastStrategy::Trend => write!(f, "trend"),
            ForecastStrategy::Naive => write!(f, "naive"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub predicted_count: f64,
}

/// A fitted forecasting model, also the persisted blob format
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FittedForecast {
    Trend {
        intercept: f64,
        slope: f64,
        /// Additive offsets indexed by days from Monday
        weekday_offsets: [f64; 7],
        first_date: NaiveDate,
        last_date: NaiveDate,
    },
    Mean {
        mean: f64,
    },
}

/// Count accidents per calendar day
///
/// Days between the first and last accident with no accidents count as 0.
pub fn daily_counts(timestamps: &[NaiveDateTime]) -> Vec<(NaiveDate, f64)> {
    let mut per_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for ts in timestamps {
        *per_day.entry(ts.date()).or_insert(0.0) += 1.0;
    }

    let (first, last) = match (per_day.keys().next(), per_day.keys().next_back()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return Vec::new(),
    };

    first
        .iter_days()
        .take_while(|day| *day <= last)
        .map(|day| (day, per_day.get(&day).copied().unwrap_or(0.0)))
        .collect()
}

impl FittedForecast {
    /// Fit a model to an ordered daily series
    pub fn fit(series: &[(NaiveDate, f64)], strategy: ForecastStrategy) -> AnalyticsResult<Self> {
        let (first_date, last_date) = match (series.first(), series.last()) {
            (Some(first), Some(last)) => (first.0, last.0),
            _ => return Err(AnalyticsError::EmptyInput),
        };

        match strategy {
            ForecastStrategy::Naive => {
                let window = &series[series.len().saturating_sub(NAIVE_WINDOW)..];
                let mean = window.iter().map(|(_, count)| count).sum::<f64>() / window.len() as f64;
                Ok(FittedForecast::Mean { mean })
            }
            ForecastStrategy::Trend => {
                let xs: Vec<f64> = series
                    .iter()
                    .map(|(date, _)| (*date - first_date).num_days() as f64)
                    .collect();
                let ys: Vec<f64> = series.iter().map(|(_, count)| *count).collect();
                let (intercept, slope) = least_squares(&xs, &ys);

                let mut weekday_offsets = [0.0; 7];
                if series.len() >= SEASONAL_MIN_DAYS {
                    let mut sums = [0.0; 7];
                    let mut counts = [0usize; 7];
                    for ((date, count), x) in series.iter().zip(&xs) {
                        let day = date.weekday().num_days_from_monday() as usize;
                        sums[day] += count - (intercept + slope * x);
                        counts[day] += 1;
                    }
                    for day in 0..7 {
                        if counts[day] > 0 {
                            weekday_offsets[day] = sums[day] / counts[day] as f64;
                        }
                    }
                }

                Ok(FittedForecast::Trend {
                    intercept,
                    slope,
                    weekday_offsets,
                    first_date,
                    last_date,
                })
            }
        }
    }

    pub fn strategy(&self) -> ForecastStrategy {
        match self {
            FittedForecast::Trend { .. } => ForecastStrategy::Trend,
            FittedForecast::Mean { .. } => ForecastStrategy::Naive,
        }
    }

    /// Project `periods` days ahead (capped at [`MAX_FORECAST_PERIODS`])
    pub fn predict(&self, periods: usize) -> Vec<ForecastPoint> {
        self.predict_from(periods, Utc::now().date_naive())
    }

    /// Like [`predict`](Self::predict), with an explicit "today" for the
    /// mean model
    pub fn predict_from(&self, periods: usize, today: NaiveDate) -> Vec<ForecastPoint> {
        let periods = periods.min(MAX_FORECAST_PERIODS);

        (1..=periods as i64)
            .map(|step| match self {
                FittedForecast::Trend {
                    intercept,
                    slope,
                    weekday_offsets,
                    first_date,
                    last_date,
                } => {
                    let date = *last_date + Duration::days(step);
                    let x = (date - *first_date).num_days() as f64;
                    let offset = weekday_offsets[date.weekday().num_days_from_monday() as usize];
                    ForecastPoint {
                        date,
                        predicted_count: round_to((intercept + slope * x + offset).max(0.0), 2),
                    }
                }
                FittedForecast::Mean { mean } => ForecastPoint {
                    date: today + Duration::days(step),
                    predicted_count: round_to(mean.max(0.0), 2),
                },
            })
            .collect()
    }

    /// Persist as JSON via write-to-temp-then-rename
    pub fn save(&self, path: impl AsRef<Path>) -> AnalyticsResult<()> {
        static SEQUENCE: AtomicU64 = AtomicU64::new(0);

        let path = path.as_ref();
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| AnalyticsError::ModelIo(e.to_string()))?;
        }

        let blob = serde_json::to_vec_pretty(self).map_err(|e| AnalyticsError::ModelIo(e.to_string()))?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "model".to_string());
        let tmp = path.with_file_name(format!(
            ".{}.{}.{}.tmp",
            file_name,
            std::process::id(),
            SEQUENCE.fetch_add(1, Ordering::Relaxed)
        ));

        fs::write(&tmp, blob).map_err(|e| AnalyticsError::ModelIo(e.to_string()))?;
        fs::rename(&tmp, path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            AnalyticsError::ModelIo(e.to_string())
        })
    }

    /// Load a persisted model; `None` when nothing has been saved yet
    pub fn load(path: impl AsRef<Path>) -> AnalyticsResult<Option<Self>> {
        match fs::read(path.as_ref()) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| AnalyticsError::ModelIo(e.to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AnalyticsError::ModelIo(e.to_string())),
        }
    }
}

/// Returns (intercept, slope); slope is 0 when x has no spread
fn least_squares(xs: &[f64], ys: &[f64]) -> (f64, f64) {
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let sxx: f64 = xs.iter().map(|x| (x - mean_x).powi(2)).sum();
    let sxy: f64 = xs
        .iter()
        .zip(ys)
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum();

    let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };
    (mean_y - slope * mean_x, slope)
}

/// Predict with a model that may not have been fitted
pub fn predict(model: Option<&FittedForecast>, periods: usize) -> AnalyticsResult<Vec<ForecastPoint>> {
    model
        .map(|m| m.predict(periods))
        .ok_or(AnalyticsError::UnfittedModel)
}

/// Request-owned forecaster holding at most one fitted model
#[derive(Debug, Clone, Default)]
pub struct Forecaster {
    strategy: ForecastStrategy,
    model: Option<FittedForecast>,
}

impl Forecaster {
    pub fn new(strategy: ForecastStrategy) -> Self {
        Self {
            strategy,
            model: None,
        }
    }

    pub fn with_model(model: FittedForecast) -> Self {
        Self {
            strategy: model.strategy(),
            model: Some(model),
        }
    }

    pub fn fit(&mut self, series: &[(NaiveDate, f64)]) -> AnalyticsResult<&FittedForecast> {
        let model = FittedForecast::fit(series, self.strategy)?;
        Ok(&*self.model.insert(model))
    }

    pub fn model(&self) -> Option<&FittedForecast> {
        self.model.as_ref()
    }

    pub fn predict(&self, periods: usize) -> AnalyticsResult<Vec<ForecastPoint>> {
        predict(self.model.as_ref(), periods)
    }
}

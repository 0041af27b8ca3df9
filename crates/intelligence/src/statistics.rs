use chrono::{DateTime, Utc};

const SECONDS_PER_DAY: f32 = 86_400.0;

#[must_use]
pub fn mean(values: &[f32]) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let len = values.len() as f32;
    Some(values.iter().sum::<f32>() / len)
}

/// Population standard deviation divided by the mean.
///
/// Undefined for an empty series or a mean of zero.
#[must_use]
pub fn coefficient_of_variation(values: &[f32]) -> Option<f32> {
    let mean = mean(values)?;
    if mean == 0.0 {
        return None;
    }
    let variance = self::mean(
        &values
            .iter()
            .map(|v| (v - mean).powi(2))
            .collect::<Vec<_>>(),
    )?;
    Some(variance.sqrt() / mean)
}

/// Mean difference between consecutive values.
#[must_use]
pub fn mean_difference(values: &[f32]) -> Option<f32> {
    mean(
        &values
            .windows(2)
            .map(|w| w[1] - w[0])
            .collect::<Vec<_>>(),
    )
}

/// Elapsed time in fractional days, never negative.
#[must_use]
pub fn days_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f32 {
    #[allow(clippy::cast_precision_loss)]
    let seconds = (later - earlier).num_seconds().max(0) as f32;
    seconds / SECONDS_PER_DAY
}

/// Exponential decay with the given time constant in days.
#[must_use]
pub fn decay(days: f32, time_constant: f32) -> f32 {
    (-days / time_constant).exp()
}

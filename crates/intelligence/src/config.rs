use std::collections::BTreeMap;

use kinetic_domain::{Equipment, Muscle};

/// Parameters of all engines, read from a single document.
#[derive(Debug, Default, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    pub fatigue: FatigueConfig,
    pub progression: ProgressionConfig,
    pub generation: GenerationConfig,
}

/// Parameters of the fatigue estimation.
///
/// Every field may be omitted when deserializing, missing fields take their
/// default value.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct FatigueConfig {
    pub lookback_days: u32,
    pub rpe_weighting: f32,
    pub volume_weighting: f32,
    pub recency_weighting: f32,
    /// Hours until a muscle is half recovered, overriding the built-in table.
    pub recovery_rates: BTreeMap<Muscle, f32>,
    /// Used for muscles without a positive recovery rate.
    pub default_recovery_hours: f32,
    /// Upper bound of sessions read per analysis.
    pub session_limit: usize,
}

impl Default for FatigueConfig {
    fn default() -> Self {
        Self {
            lookback_days: 7,
            rpe_weighting: 0.4,
            volume_weighting: 0.3,
            recency_weighting: 0.3,
            recovery_rates: BTreeMap::new(),
            default_recovery_hours: 48.0,
            session_limit: 50,
        }
    }
}

impl FatigueConfig {
    #[must_use]
    pub fn recovery_hours(&self, muscle: Muscle) -> f32 {
        self.recovery_rates
            .get(&muscle)
            .copied()
            .or_else(|| Some(typical_recovery_hours(muscle)))
            .filter(|hours| *hours > 0.0)
            .unwrap_or(self.default_recovery_hours)
    }
}

fn typical_recovery_hours(muscle: Muscle) -> f32 {
    match muscle {
        Muscle::PectoralisMajor | Muscle::LatissimusDorsi => 60.0,
        Muscle::Trapezius
        | Muscle::Rhomboids
        | Muscle::AnteriorDeltoid
        | Muscle::BicepsBrachii
        | Muscle::TricepsBrachii => 48.0,
        Muscle::LateralDeltoid
        | Muscle::PosteriorDeltoid
        | Muscle::Forearms
        | Muscle::Calves => 36.0,
        Muscle::Abdominals | Muscle::Obliques => 24.0,
        Muscle::ErectorSpinae
        | Muscle::GluteusMaximus
        | Muscle::Quadriceps
        | Muscle::Hamstrings => 72.0,
    }
}

/// Parameters of the progression planning.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct ProgressionConfig {
    /// Halve the weight increments.
    pub conservative_mode: bool,
    pub plateau_detection_sensitivity: usize,
    pub deload_threshold: f32,
    pub max_weight_increase: f32,
    pub max_rep_increase: u32,
    pub history_limit: usize,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            conservative_mode: false,
            plateau_detection_sensitivity: 3,
            deload_threshold: 0.95,
            max_weight_increase: 10.0,
            max_rep_increase: 2,
            history_limit: 20,
        }
    }
}

/// Parameters of the workout generation.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub min_exercises_per_workout: usize,
    pub max_exercises_per_workout: usize,
    /// Minutes, used when a request names no available time.
    pub preferred_workout_duration: u32,
    pub muscle_balance_weighting: f32,
    pub equipment_preferences: BTreeMap<Equipment, f32>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            min_exercises_per_workout: 3,
            max_exercises_per_workout: 6,
            preferred_workout_duration: 60,
            muscle_balance_weighting: 1.0,
            equipment_preferences: BTreeMap::new(),
        }
    }
}

impl GenerationConfig {
    #[must_use]
    pub fn equipment_preference(&self, equipment: Equipment) -> f32 {
        self.equipment_preferences
            .get(&equipment)
            .copied()
            .unwrap_or(match equipment {
                Equipment::Barbell => 1.0,
                Equipment::Dumbbell => 0.9,
                Equipment::Cable | Equipment::Kettlebell => 0.8,
                Equipment::Machine => 0.7,
                Equipment::Bodyweight => 0.6,
                Equipment::ResistanceBand | Equipment::PullUpBar | Equipment::Bench => 0.5,
            })
    }
}

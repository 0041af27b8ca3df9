use std::collections::BTreeMap;

use chrono::NaiveDate;
use kinetic_domain::{
    Exercise, ExerciseID, ExerciseRepository, Name, PerformedSet, RPE, Reps, UserID, Weight,
    WorkoutSessionID, WorkoutSessionRepository,
};
use log::debug;

use crate::{
    ExerciseCategory, Operation, ProgressionConfig, ProgressionError,
    statistics::{coefficient_of_variation, mean, mean_difference},
};

const TREND_WINDOW: usize = 5;
const TREND_THRESHOLD: f32 = 2.0;
const DELOAD_FACTOR: f32 = 0.9;
const WEIGHT_STEP: f32 = 0.25;
const DEFAULT_RPE: f32 = 7.0;
const MIN_TARGET_RPE: f32 = 6.0;
const MAX_TARGET_RPE: f32 = 9.0;
const BEGINNER_CONFIDENCE: f32 = 0.6;
const FALLBACK_CONFIDENCE: f32 = 0.3;

#[derive(strum::Display, Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Declining,
    Plateau,
    InsufficientData,
}

impl Trend {
    #[must_use]
    pub fn is_known(self) -> bool {
        self != Trend::InsufficientData
    }
}

#[derive(strum::Display, Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProgressionType {
    WeightIncrease,
    RepIncrease,
    Deload,
    Maintain,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ProgressionPlan {
    pub exercise_id: ExerciseID,
    pub exercise_name: Name,
    pub weight: Weight,
    pub reps: Reps,
    pub sets: u32,
    pub target_rpe: RPE,
    pub progression_type: ProgressionType,
    pub trend: Trend,
    pub plateau_detected: bool,
    pub deload_recommended: bool,
    pub confidence: f32,
    /// Number of completed sets the plan is based on.
    pub data_points: usize,
    /// Best estimated one-rep max of the latest session.
    pub last_session_best: Option<f32>,
    pub form_focus: Vec<String>,
    pub reasoning: Vec<String>,
}

impl ProgressionPlan {
    /// Plan for an exercise without any completed sets.
    #[must_use]
    pub fn beginner(exercise: &Exercise) -> Self {
        Self::starting_plan(
            exercise,
            BEGINNER_CONFIDENCE,
            "No completed sets recorded, starting with beginner defaults",
        )
    }

    /// Conservative plan used when the history of an exercise cannot be read.
    #[must_use]
    pub fn fallback(exercise: &Exercise) -> Self {
        Self::starting_plan(
            exercise,
            FALLBACK_CONFIDENCE,
            "Training history unavailable, using conservative defaults",
        )
    }

    fn starting_plan(exercise: &Exercise, confidence: f32, reason: &str) -> Self {
        let category = ExerciseCategory::from(&exercise.name);
        let (weight, reps, sets) = category.starting_load();
        Self {
            exercise_id: exercise.id,
            exercise_name: exercise.name.clone(),
            weight: if exercise.is_bodyweight() {
                Weight::ZERO
            } else {
                weight
            },
            reps,
            sets,
            target_rpe: RPE::SEVEN,
            progression_type: ProgressionType::Maintain,
            trend: Trend::InsufficientData,
            plateau_detected: false,
            deload_recommended: false,
            confidence,
            data_points: 0,
            last_session_best: None,
            form_focus: form_focus(category),
            reasoning: vec![reason.to_string()],
        }
    }
}

#[allow(async_fn_in_trait)]
pub trait ProgressionService {
    async fn plan_progression(
        &self,
        user_id: UserID,
        exercise_id: ExerciseID,
    ) -> Result<ProgressionPlan, ProgressionError>;
}

pub struct ProgressionPlanner<'a, R> {
    repository: &'a R,
    config: ProgressionConfig,
}

impl<'a, R> ProgressionPlanner<'a, R>
where
    R: WorkoutSessionRepository + ExerciseRepository,
{
    pub fn new(repository: &'a R, config: ProgressionConfig) -> Self {
        Self { repository, config }
    }

    pub async fn plan(
        &self,
        user_id: UserID,
        exercise_id: ExerciseID,
    ) -> Result<ProgressionPlan, ProgressionError> {
        let exercise = self
            .repository
            .read_exercise(exercise_id)
            .await
            .map_err(|source| ProgressionError::DataAccess {
                user_id,
                exercise_id,
                operation: Operation::ReadExercise,
                source,
            })?
            .ok_or(ProgressionError::ExerciseNotFound(exercise_id))?;
        self.plan_exercise(user_id, &exercise).await
    }

    pub async fn plan_exercise(
        &self,
        user_id: UserID,
        exercise: &Exercise,
    ) -> Result<ProgressionPlan, ProgressionError> {
        let history = self
            .repository
            .read_exercise_history(user_id, exercise.id, self.config.history_limit)
            .await
            .map_err(|source| ProgressionError::DataAccess {
                user_id,
                exercise_id: exercise.id,
                operation: Operation::ReadExerciseHistory,
                source,
            })?;
        Ok(progression_plan(exercise, &history, &self.config))
    }
}

/// Plan the next session of an exercise from its recent sets.
#[must_use]
pub fn progression_plan(
    exercise: &Exercise,
    history: &[PerformedSet],
    config: &ProgressionConfig,
) -> ProgressionPlan {
    let completed = history
        .iter()
        .filter(|s| s.completed)
        .cloned()
        .collect::<Vec<_>>();
    let sessions = group_sessions(&completed);
    let Some((_, latest)) = sessions.last() else {
        return ProgressionPlan::beginner(exercise);
    };
    let Some(best) = latest
        .iter()
        .max_by(|a, b| estimated_1rm(a).total_cmp(&estimated_1rm(b)))
    else {
        return ProgressionPlan::beginner(exercise);
    };

    let bests = sessions
        .iter()
        .map(|(_, sets)| {
            sets.iter()
                .map(|s| estimated_1rm(s))
                .fold(f32::MIN, f32::max)
        })
        .collect::<Vec<_>>();
    let trend = trend(&bests);
    let plateau = plateau_detected(
        &bests,
        config.plateau_detection_sensitivity,
        config.deload_threshold,
    );
    let consistency = consistency_score(&completed);
    let last_rpe = mean(
        &latest
            .iter()
            .filter_map(|s| s.rpe)
            .map(f32::from)
            .collect::<Vec<_>>(),
    );
    let progression_type = select_strategy(plateau, trend, last_rpe);

    let category = ExerciseCategory::from(&exercise.name);
    let current_weight = f32::from(best.weight);
    let base_rpe = last_rpe.unwrap_or(DEFAULT_RPE);
    let (weight, reps, target_rpe) = match progression_type {
        ProgressionType::WeightIncrease => (
            current_weight + weight_increment(category, config),
            best.reps,
            base_rpe + 1.0,
        ),
        ProgressionType::RepIncrease => (
            current_weight,
            best.reps.saturating_add(config.max_rep_increase.min(1)),
            base_rpe + 0.5,
        ),
        ProgressionType::Deload => (current_weight * DELOAD_FACTOR, best.reps, DEFAULT_RPE),
        ProgressionType::Maintain => (current_weight, best.reps, base_rpe),
    };

    debug!(
        "planned {progression_type} for exercise {} ({trend}, plateau: {plateau})",
        exercise.id
    );

    let mut reasoning = vec![format!(
        "Trend over the last {} sessions: {trend}",
        sessions.len().min(TREND_WINDOW)
    )];
    if plateau {
        reasoning.push(String::from("Plateau detected"));
    }
    reasoning.push(match last_rpe {
        Some(rpe) => format!("Average RPE of the last session: {rpe:.1}"),
        None => String::from("No RPE recorded in the last session"),
    });
    reasoning.push(format!("Strategy: {progression_type}"));

    ProgressionPlan {
        exercise_id: exercise.id,
        exercise_name: exercise.name.clone(),
        weight: Weight::clamped(weight).rounded(WEIGHT_STEP),
        reps,
        sets: u32::try_from(latest.len()).unwrap_or(u32::MAX),
        target_rpe: RPE::nearest(target_rpe.clamp(MIN_TARGET_RPE, MAX_TARGET_RPE)),
        progression_type,
        trend,
        plateau_detected: plateau,
        deload_recommended: progression_type == ProgressionType::Deload,
        confidence: confidence(completed.len(), consistency, trend),
        data_points: completed.len(),
        last_session_best: bests.last().copied(),
        form_focus: if progression_type == ProgressionType::Deload {
            form_focus(category)
        } else {
            vec![]
        },
        reasoning,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SessionKey {
    Session(WorkoutSessionID),
    Date(NaiveDate),
}

impl From<&PerformedSet> for SessionKey {
    fn from(set: &PerformedSet) -> Self {
        match set.session_id {
            Some(id) => SessionKey::Session(id),
            None => SessionKey::Date(set.completed_on()),
        }
    }
}

/// Group sets by session id, or by completion date for sets without a session.
///
/// Groups are ordered chronologically by their latest completion time, equal
/// times are ordered by key.
#[must_use]
pub fn group_sessions(sets: &[PerformedSet]) -> Vec<(SessionKey, Vec<&PerformedSet>)> {
    let mut groups: BTreeMap<SessionKey, Vec<&PerformedSet>> = BTreeMap::new();
    for set in sets {
        groups.entry(SessionKey::from(set)).or_default().push(set);
    }
    let mut groups = groups
        .into_iter()
        .map(|(key, mut sets)| {
            sets.sort_by_key(|s| s.completed_at);
            (key, sets)
        })
        .collect::<Vec<_>>();
    groups.sort_by_key(|(key, sets)| (sets.last().map(|s| s.completed_at), *key));
    groups
}

#[must_use]
pub fn estimated_1rm(set: &PerformedSet) -> f32 {
    set.estimated_1rm.map_or_else(
        || brzycki(f32::from(set.weight), u32::from(set.reps)),
        f32::from,
    )
}

/// One-rep max estimate, only extrapolated for up to ten reps.
#[must_use]
pub fn brzycki(weight: f32, reps: u32) -> f32 {
    match reps {
        1 => weight,
        2..=10 => {
            #[allow(clippy::cast_precision_loss)]
            let reps = reps as f32;
            weight / (1.0278 - 0.0278 * reps)
        }
        _ => weight,
    }
}

/// Trend of the best one-rep max estimates of the last sessions, oldest first.
#[must_use]
pub fn trend(bests: &[f32]) -> Trend {
    let window = &bests[bests.len().saturating_sub(TREND_WINDOW)..];
    if window.len() < 3 {
        return Trend::InsufficientData;
    }
    match mean_difference(window) {
        Some(d) if d > TREND_THRESHOLD => Trend::Improving,
        Some(d) if d < -TREND_THRESHOLD => Trend::Declining,
        Some(_) => Trend::Plateau,
        None => Trend::InsufficientData,
    }
}

#[must_use]
pub fn plateau_detected(bests: &[f32], sensitivity: usize, threshold: f32) -> bool {
    if sensitivity == 0 || bests.len() < sensitivity {
        return false;
    }
    let window = &bests[bests.len() - sensitivity..];
    let max = window.iter().copied().fold(f32::MIN, f32::max);
    window
        .last()
        .is_some_and(|latest| *latest < max * threshold)
}

/// Score between 0 and 1, higher for less variation of RPE and reps.
#[must_use]
pub fn consistency_score(sets: &[PerformedSet]) -> f32 {
    let rpes = sets
        .iter()
        .filter_map(|s| s.rpe)
        .map(f32::from)
        .collect::<Vec<_>>();
    if rpes.is_empty() {
        return 0.5;
    }
    let reps = sets.iter().map(|s| f32::from(s.reps)).collect::<Vec<_>>();
    let variation = (coefficient_of_variation(&rpes).unwrap_or(0.0)
        + coefficient_of_variation(&reps).unwrap_or(0.0))
        / 2.0;
    (1.0 - variation).clamp(0.0, 1.0)
}

#[must_use]
pub fn select_strategy(plateau: bool, trend: Trend, last_rpe: Option<f32>) -> ProgressionType {
    match last_rpe {
        Some(rpe) if plateau && rpe >= 9.0 => ProgressionType::Deload,
        _ if trend == Trend::Declining => ProgressionType::Maintain,
        Some(rpe) if (1.0..=7.0).contains(&rpe) => ProgressionType::WeightIncrease,
        Some(rpe) if rpe > 7.0 && rpe <= 9.0 => ProgressionType::RepIncrease,
        _ => ProgressionType::Maintain,
    }
}

#[must_use]
pub fn confidence(data_points: usize, consistency: f32, trend: Trend) -> f32 {
    #[allow(clippy::cast_precision_loss)]
    let data = (data_points as f32 / 20.0).min(0.3);
    let trend_bonus = if trend.is_known() { 0.1 } else { 0.0 };
    (0.5 + data + consistency * 0.2 + trend_bonus).clamp(0.1, 1.0)
}

fn weight_increment(category: ExerciseCategory, config: &ProgressionConfig) -> f32 {
    let increment = if config.conservative_mode {
        category.increment() / 2.0
    } else {
        category.increment()
    };
    increment.min(config.max_weight_increase).max(0.0)
}

fn form_focus(category: ExerciseCategory) -> Vec<String> {
    category
        .form_cues()
        .iter()
        .map(ToString::to_string)
        .collect()
}

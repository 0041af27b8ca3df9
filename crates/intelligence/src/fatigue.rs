use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use futures_util::future::try_join_all;
use kinetic_domain::{
    Engagement, Exercise, ExerciseID, ExerciseRepository, Muscle, Property, SessionLog, UserID,
    WorkoutSessionRepository,
};
use log::debug;

use crate::{
    FatigueConfig, FatigueError, Operation,
    statistics::{days_between, decay, mean},
};

/// Days since last trained of a muscle without any training in the window.
pub const NEVER_TRAINED_DAYS: u32 = 999;

const RECOVERED_SCORE: f32 = 20.0;
const FATIGUED_SCORE: f32 = 50.0;
const DELOAD_SCORE: f32 = 80.0;
const VOLUME_DECAY_DAYS: f32 = 3.0;
const RECENCY_DECAY_DAYS: f32 = 2.0;

#[derive(
    strum::Display, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RecoveryStatus {
    Recovered,
    Recovering,
    Fatigued,
}

impl RecoveryStatus {
    #[must_use]
    pub fn new(fatigue_score: f32, days_since_last_trained: u32) -> Self {
        if fatigue_score < RECOVERED_SCORE && days_since_last_trained >= 2 {
            RecoveryStatus::Recovered
        } else if fatigue_score < FATIGUED_SCORE {
            RecoveryStatus::Recovering
        } else {
            RecoveryStatus::Fatigued
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct MuscleGroupFatigue {
    pub muscle: Muscle,
    pub fatigue_score: f32,
    pub status: RecoveryStatus,
    pub last_trained: Option<DateTime<Utc>>,
    pub estimated_recovery: Option<DateTime<Utc>>,
    /// Engagement-scaled volume load, weighted by recency.
    pub volume: f32,
    pub avg_rpe: Option<f32>,
    pub days_since_last_trained: u32,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FatigueAnalysis {
    pub analyzed_at: DateTime<Utc>,
    pub lookback_days: u32,
    pub sessions_analyzed: usize,
    pub muscles: Vec<MuscleGroupFatigue>,
    pub overall_recovery_score: f32,
    pub ready_for_training: Vec<Muscle>,
    pub needing_rest: Vec<Muscle>,
    pub recommended_focus: Vec<Muscle>,
    pub deload_recommended: bool,
    pub summary: String,
}

impl FatigueAnalysis {
    fn without_history(analyzed_at: DateTime<Utc>, lookback_days: u32) -> Self {
        Self {
            analyzed_at,
            lookback_days,
            sessions_analyzed: 0,
            muscles: vec![],
            overall_recovery_score: 100.0,
            ready_for_training: vec![],
            needing_rest: vec![],
            recommended_focus: vec![],
            deload_recommended: false,
            summary: format!(
                "No training in the last {lookback_days} days, fully recovered and ready to train."
            ),
        }
    }

    #[must_use]
    pub fn muscle(&self, muscle: Muscle) -> Option<&MuscleGroupFatigue> {
        self.muscles.iter().find(|m| m.muscle == muscle)
    }

    /// Muscles not part of the analysis count as recovered.
    #[must_use]
    pub fn status_of(&self, muscle: Muscle) -> RecoveryStatus {
        self.muscle(muscle)
            .map_or(RecoveryStatus::Recovered, |m| m.status)
    }
}

#[allow(async_fn_in_trait)]
pub trait FatigueService {
    async fn analyze_fatigue(
        &self,
        user_id: UserID,
        lookback_days: Option<u32>,
    ) -> Result<FatigueAnalysis, FatigueError>;
}

pub struct FatigueAnalyzer<'a, R> {
    repository: &'a R,
    config: FatigueConfig,
}

impl<'a, R> FatigueAnalyzer<'a, R>
where
    R: WorkoutSessionRepository + ExerciseRepository,
{
    pub fn new(repository: &'a R, config: FatigueConfig) -> Self {
        Self { repository, config }
    }

    pub async fn analyze(
        &self,
        user_id: UserID,
        lookback_days: Option<u32>,
    ) -> Result<FatigueAnalysis, FatigueError> {
        let lookback_days = lookback_days.unwrap_or(self.config.lookback_days);
        let now = Utc::now();
        let since = Duration::try_days(i64::from(lookback_days))
            .and_then(|lookback| now.checked_sub_signed(lookback))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let sessions = self
            .repository
            .read_workout_sessions(user_id, self.config.session_limit)
            .await
            .map_err(|source| FatigueError::DataAccess {
                user_id,
                operation: Operation::ReadWorkoutSessions,
                source,
            })?
            .into_iter()
            .filter(|s| s.started_at >= since)
            .collect::<Vec<_>>();

        if sessions.is_empty() {
            debug!("no sessions of user {user_id} in the last {lookback_days} days");
            return Ok(FatigueAnalysis::without_history(now, lookback_days));
        }

        let sets = try_join_all(
            sessions
                .iter()
                .map(|s| self.repository.read_performed_sets(s.id)),
        )
        .await
        .map_err(|source| FatigueError::DataAccess {
            user_id,
            operation: Operation::ReadPerformedSets,
            source,
        })?;

        let exercises = self
            .repository
            .read_exercises()
            .await
            .map_err(|source| FatigueError::DataAccess {
                user_id,
                operation: Operation::ReadExercises,
                source,
            })?
            .into_iter()
            .map(|e| (e.id, e))
            .collect::<BTreeMap<_, _>>();

        let logs = sessions
            .into_iter()
            .zip(sets)
            .map(|(session, sets)| SessionLog { session, sets })
            .collect::<Vec<_>>();

        Ok(fatigue_analysis(
            &logs,
            &exercises,
            &self.config,
            lookback_days,
            now,
        ))
    }
}

/// Analyze the fatigue of all muscles after the given sessions.
///
/// Without any session no muscle is analyzed and the result indicates full
/// readiness.
#[must_use]
pub fn fatigue_analysis(
    logs: &[SessionLog],
    exercises: &BTreeMap<ExerciseID, Exercise>,
    config: &FatigueConfig,
    lookback_days: u32,
    now: DateTime<Utc>,
) -> FatigueAnalysis {
    if logs.is_empty() {
        return FatigueAnalysis::without_history(now, lookback_days);
    }

    let volumes = logs
        .iter()
        .map(|log| log.volume_per_muscle(exercises))
        .collect::<Vec<_>>();
    let muscles = Muscle::iter()
        .map(|muscle| muscle_fatigue(*muscle, logs, &volumes, exercises, config, now))
        .collect::<Vec<_>>();

    let overall_recovery_score = mean(
        &muscles
            .iter()
            .map(|m| 100.0 - m.fatigue_score)
            .collect::<Vec<_>>(),
    )
    .unwrap_or(100.0);
    let ready_for_training = with_status(&muscles, RecoveryStatus::Recovered);
    let needing_rest = with_status(&muscles, RecoveryStatus::Fatigued);

    let mut recovered = muscles
        .iter()
        .filter(|m| m.status == RecoveryStatus::Recovered)
        .collect::<Vec<_>>();
    recovered.sort_by(|a, b| b.days_since_last_trained.cmp(&a.days_since_last_trained));
    let recommended_focus = recovered.iter().take(3).map(|m| m.muscle).collect::<Vec<_>>();

    let deload_recommended = needing_rest.len() * 10 > muscles.len() * 6
        || muscles.iter().any(|m| m.fatigue_score > DELOAD_SCORE);

    let summary = summary(
        muscles.len(),
        &ready_for_training,
        &needing_rest,
        &recommended_focus,
        deload_recommended,
    );

    FatigueAnalysis {
        analyzed_at: now,
        lookback_days,
        sessions_analyzed: logs.len(),
        muscles,
        overall_recovery_score,
        ready_for_training,
        needing_rest,
        recommended_focus,
        deload_recommended,
        summary,
    }
}

fn muscle_fatigue(
    muscle: Muscle,
    logs: &[SessionLog],
    volumes: &[BTreeMap<Muscle, f32>],
    exercises: &BTreeMap<ExerciseID, Exercise>,
    config: &FatigueConfig,
    now: DateTime<Utc>,
) -> MuscleGroupFatigue {
    let mut volume = 0.0;
    let mut weighted_rpe = 0.0;
    let mut rpe_weight = 0.0;
    let mut last_trained: Option<DateTime<Utc>> = None;

    for (log, session_volume) in logs.iter().zip(volumes) {
        let weight = decay(
            days_between(log.session.started_at, now),
            VOLUME_DECAY_DAYS,
        );
        volume += session_volume.get(&muscle).copied().unwrap_or(0.0) * weight;

        let mut rpes = vec![];
        let mut trained = false;
        for set in log.completed_sets() {
            let Some(exercise) = exercises.get(&set.exercise_id) else {
                continue;
            };
            let engagement = exercise.engagement(muscle);
            if engagement == Engagement::NONE {
                continue;
            }
            if let Some(rpe) = set.rpe {
                rpes.push(f32::from(rpe));
            }
            trained |= engagement.is_trained();
        }

        if let Some(rpe) = mean(&rpes) {
            weighted_rpe += rpe * weight;
            rpe_weight += weight;
        }
        if trained {
            last_trained = last_trained.max(Some(log.session.started_at));
        }
    }

    let avg_rpe = (rpe_weight > 0.0).then(|| weighted_rpe / rpe_weight);
    let days_since_last_trained = last_trained.map_or(NEVER_TRAINED_DAYS, |t| {
        u32::try_from((now - t).num_days().max(0))
            .unwrap_or(NEVER_TRAINED_DAYS)
            .min(NEVER_TRAINED_DAYS)
    });
    let recovery_hours = config.recovery_hours(muscle);
    let fatigue_score = fatigue_score(
        volume,
        avg_rpe,
        days_since_last_trained,
        recovery_hours,
        config,
    );
    let estimated_recovery = last_trained
        .filter(|_| fatigue_score >= RECOVERED_SCORE)
        .map(|t| {
            #[allow(clippy::cast_possible_truncation)]
            let seconds = (fatigue_score / 100.0 * recovery_hours * 3600.0).round() as i64;
            t + Duration::seconds(seconds)
        });

    MuscleGroupFatigue {
        muscle,
        fatigue_score,
        status: RecoveryStatus::new(fatigue_score, days_since_last_trained),
        last_trained,
        estimated_recovery,
        volume,
        avg_rpe,
        days_since_last_trained,
    }
}

/// Fatigue of a muscle between 0 (fully recovered) and 100.
#[must_use]
pub fn fatigue_score(
    volume: f32,
    avg_rpe: Option<f32>,
    days_since_last_trained: u32,
    recovery_hours: f32,
    config: &FatigueConfig,
) -> f32 {
    #[allow(clippy::cast_precision_loss)]
    let days = days_since_last_trained as f32;
    let volume_fatigue = (volume / 1000.0).min(100.0) * config.volume_weighting;
    let rpe_fatigue = avg_rpe.map_or(0.0, |rpe| rpe / 10.0 * 100.0 * config.rpe_weighting);
    let time_recovery = (100.0 - days / recovery_hours * 100.0).max(0.0);
    let recency_factor = decay(days, RECENCY_DECAY_DAYS) * config.recency_weighting;
    ((volume_fatigue + rpe_fatigue) * (time_recovery / 100.0) * (1.0 + recency_factor))
        .clamp(0.0, 100.0)
}

fn with_status(muscles: &[MuscleGroupFatigue], status: RecoveryStatus) -> Vec<Muscle> {
    muscles
        .iter()
        .filter(|m| m.status == status)
        .map(|m| m.muscle)
        .collect()
}

fn summary(
    analyzed: usize,
    ready_for_training: &[Muscle],
    needing_rest: &[Muscle],
    recommended_focus: &[Muscle],
    deload_recommended: bool,
) -> String {
    let mut sentences = vec![format!(
        "{} of {analyzed} muscle groups are ready for training.",
        ready_for_training.len()
    )];
    if !needing_rest.is_empty() {
        sentences.push(format!("Needing rest: {}.", names(needing_rest)));
    }
    if !recommended_focus.is_empty() {
        sentences.push(format!("Recommended focus: {}.", names(recommended_focus)));
    }
    if deload_recommended {
        sentences.push(String::from("A deload is recommended."));
    }
    sentences.join(" ")
}

fn names(muscles: &[Muscle]) -> String {
    muscles
        .iter()
        .map(|m| m.name())
        .collect::<Vec<_>>()
        .join(", ")
}

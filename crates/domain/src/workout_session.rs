use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use derive_more::{Deref, Display};
use uuid::Uuid;

use crate::{Engagement, Exercise, ExerciseID, Muscle, RPE, ReadError, Reps, UserID, Weight};

#[allow(async_fn_in_trait)]
pub trait WorkoutSessionRepository {
    /// The most recent sessions of a user, newest first.
    async fn read_workout_sessions(
        &self,
        user_id: UserID,
        limit: usize,
    ) -> Result<Vec<WorkoutSession>, ReadError>;
    async fn read_performed_sets(
        &self,
        session_id: WorkoutSessionID,
    ) -> Result<Vec<PerformedSet>, ReadError>;
    /// The most recent sets of an exercise performed by a user, newest first.
    async fn read_exercise_history(
        &self,
        user_id: UserID,
        exercise_id: ExerciseID,
        limit: usize,
    ) -> Result<Vec<PerformedSet>, ReadError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutSession {
    pub id: WorkoutSessionID,
    pub user_id: UserID,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub notes: String,
}

#[derive(
    Deref,
    Display,
    Debug,
    Default,
    Clone,
    Copy,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    serde::Serialize,
)]
pub struct WorkoutSessionID(Uuid);

impl WorkoutSessionID {
    #[must_use]
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl From<Uuid> for WorkoutSessionID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for WorkoutSessionID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

/// A logged set. Only RPE and notes may be corrected after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformedSet {
    pub session_id: Option<WorkoutSessionID>,
    pub exercise_id: ExerciseID,
    pub target_reps: Option<Reps>,
    pub target_weight: Option<Weight>,
    pub reps: Reps,
    pub weight: Weight,
    pub completed: bool,
    pub rpe: Option<RPE>,
    pub estimated_1rm: Option<Weight>,
    pub completed_at: DateTime<Utc>,
    pub notes: String,
}

impl PerformedSet {
    #[must_use]
    pub fn volume_load(&self) -> f32 {
        f32::from(self.reps) * f32::from(self.weight)
    }

    #[must_use]
    pub fn completed_on(&self) -> NaiveDate {
        self.completed_at.date_naive()
    }
}

/// A session together with the sets performed in it.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionLog {
    pub session: WorkoutSession,
    pub sets: Vec<PerformedSet>,
}

impl SessionLog {
    pub fn completed_sets(&self) -> impl Iterator<Item = &PerformedSet> {
        self.sets.iter().filter(|s| s.completed)
    }

    /// Plain volume load: reps × weight summed over completed sets.
    #[must_use]
    pub fn volume_load(&self) -> f32 {
        self.completed_sets().map(PerformedSet::volume_load).sum()
    }

    /// Volume load per muscle, scaled by the muscle's engagement in each exercise.
    #[must_use]
    pub fn volume_per_muscle(
        &self,
        exercises: &BTreeMap<ExerciseID, Exercise>,
    ) -> BTreeMap<Muscle, f32> {
        let mut result: BTreeMap<Muscle, f32> = BTreeMap::new();
        for set in self.completed_sets() {
            if let Some(exercise) = exercises.get(&set.exercise_id) {
                for (muscle, engagement) in exercise.muscle_engagement() {
                    if engagement == Engagement::NONE {
                        continue;
                    }
                    *result.entry(muscle).or_insert(0.0) +=
                        set.volume_load() * engagement.fraction();
                }
            }
        }
        result
    }
}

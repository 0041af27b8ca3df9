use kinetic_domain::{
    ExerciseID, ExerciseRepository, ReadError, StorageError, UserID, WorkoutSessionRepository,
};
use log::{debug, error};

use crate::{
    Config, FatigueAnalysis, FatigueAnalyzer, FatigueError, FatigueService, GeneratedWorkout,
    GenerationError, GenerationRequest, ProgressionError, ProgressionPlan, ProgressionPlanner,
    ProgressionService, WorkoutGenerator, WorkoutService,
};

pub struct Service<R> {
    repository: R,
    config: Config,
}

impl<R> Service<R>
where
    R: WorkoutSessionRepository + ExerciseRepository,
{
    pub fn new(repository: R, config: Config) -> Self {
        Self { repository, config }
    }
}

macro_rules! log_on_error {
    ($func: expr, $action: literal, $entity: literal) => {{
        let result = $func.await;
        match result {
            Ok(_) => {}
            Err(ref err) => match err.read_error() {
                Some(ReadError::Storage(StorageError::NoConnection)) => {
                    debug!("failed to {} {}: {err}", $action, $entity);
                }
                _ => {
                    error!("failed to {} {}: {err}", $action, $entity);
                }
            },
        }
        result
    }};
}

impl<R> FatigueService for Service<R>
where
    R: WorkoutSessionRepository + ExerciseRepository,
{
    async fn analyze_fatigue(
        &self,
        user_id: UserID,
        lookback_days: Option<u32>,
    ) -> Result<FatigueAnalysis, FatigueError> {
        log_on_error!(
            FatigueAnalyzer::new(&self.repository, self.config.fatigue.clone())
                .analyze(user_id, lookback_days),
            "analyze",
            "fatigue"
        )
    }
}

impl<R> ProgressionService for Service<R>
where
    R: WorkoutSessionRepository + ExerciseRepository,
{
    async fn plan_progression(
        &self,
        user_id: UserID,
        exercise_id: ExerciseID,
    ) -> Result<ProgressionPlan, ProgressionError> {
        log_on_error!(
            ProgressionPlanner::new(&self.repository, self.config.progression.clone())
                .plan(user_id, exercise_id),
            "plan",
            "progression"
        )
    }
}

impl<R> WorkoutService for Service<R>
where
    R: WorkoutSessionRepository + ExerciseRepository,
{
    async fn generate_workout(
        &self,
        request: &GenerationRequest,
    ) -> Result<GeneratedWorkout, GenerationError> {
        log_on_error!(
            WorkoutGenerator::new(
                &self.repository,
                self.config.fatigue.clone(),
                self.config.progression.clone(),
                self.config.generation.clone(),
            )
            .generate(request),
            "generate",
            "workout"
        )
    }
}

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use kinetic_domain::{
    Engagement, Equipment, Exercise, ExerciseFilter, ExerciseID, ExerciseRepository, Muscle, Name,
    RPE, Reps, UserID, Weight, WorkoutSessionRepository,
};
use log::{debug, warn};

use crate::{
    ExerciseCategory, FatigueAnalysis, FatigueAnalyzer, FatigueConfig, GenerationConfig,
    GenerationError, Operation, ProgressionConfig, ProgressionPlan, ProgressionPlanner,
    ProgressionType, RecoveryStatus, statistics::mean,
};

const TIME_BUDGET_SHARE: f32 = 0.8;
const PREPARATION_ALLOWANCE: u32 = 10;
const WARMUP_LIMIT: usize = 3;
const COOLDOWN_LIMIT: usize = 2;
const FOCUS_AREA_LIMIT: usize = 4;
const PRIORITY_GOAL_WEIGHT: f32 = 0.8;

#[derive(
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    serde::Serialize,
    serde::Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    Strength,
    Hypertrophy,
    Endurance,
    GeneralFitness,
}

impl Goal {
    /// Importance of a muscle for reaching the goal, between 0 and 1.
    #[must_use]
    pub fn muscle_priority(self, muscle: Muscle) -> f32 {
        match self {
            Goal::Strength => match muscle {
                Muscle::Quadriceps
                | Muscle::Hamstrings
                | Muscle::GluteusMaximus
                | Muscle::ErectorSpinae
                | Muscle::PectoralisMajor
                | Muscle::LatissimusDorsi => 1.0,
                Muscle::Trapezius
                | Muscle::Rhomboids
                | Muscle::AnteriorDeltoid
                | Muscle::TricepsBrachii => 0.7,
                _ => 0.4,
            },
            Goal::Hypertrophy => match muscle {
                Muscle::PectoralisMajor
                | Muscle::LatissimusDorsi
                | Muscle::Quadriceps
                | Muscle::GluteusMaximus
                | Muscle::Hamstrings => 0.9,
                Muscle::Trapezius
                | Muscle::Rhomboids
                | Muscle::AnteriorDeltoid
                | Muscle::LateralDeltoid
                | Muscle::PosteriorDeltoid
                | Muscle::BicepsBrachii
                | Muscle::TricepsBrachii => 0.8,
                _ => 0.5,
            },
            Goal::Endurance => match muscle {
                Muscle::Quadriceps
                | Muscle::Hamstrings
                | Muscle::GluteusMaximus
                | Muscle::Calves
                | Muscle::Abdominals
                | Muscle::Obliques => 0.8,
                Muscle::PectoralisMajor | Muscle::LatissimusDorsi | Muscle::ErectorSpinae => 0.6,
                _ => 0.4,
            },
            Goal::GeneralFitness => match muscle {
                Muscle::Quadriceps
                | Muscle::GluteusMaximus
                | Muscle::Hamstrings
                | Muscle::PectoralisMajor
                | Muscle::LatissimusDorsi
                | Muscle::Abdominals => 0.7,
                _ => 0.5,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct GenerationRequest {
    pub user_id: UserID,
    pub goal: Goal,
    /// Available equipment, all equipment if empty.
    #[serde(default)]
    pub equipment: Vec<Equipment>,
    /// Minutes, the preferred workout duration if absent.
    #[serde(default)]
    pub available_time: Option<u32>,
}

#[derive(
    strum::Display, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    fn of_position(index: usize) -> Self {
        match index {
            0 | 1 => Priority::High,
            2 | 3 => Priority::Medium,
            _ => Priority::Low,
        }
    }
}

#[derive(strum::Display, Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
    Low,
    Moderate,
    High,
}

impl Intensity {
    #[must_use]
    pub fn from_mean_rpe(rpe: Option<f32>) -> Self {
        match rpe {
            Some(rpe) if rpe >= 8.5 => Intensity::High,
            Some(rpe) if rpe >= 7.0 => Intensity::Moderate,
            _ => Intensity::Low,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ExerciseRecommendation {
    pub exercise_id: ExerciseID,
    pub name: Name,
    pub equipment: Equipment,
    pub sets: u32,
    pub reps: Reps,
    pub weight: Weight,
    pub target_rpe: RPE,
    /// Minutes.
    pub duration: u32,
    pub priority: Priority,
    pub score: f32,
    pub progression_type: ProgressionType,
    pub confidence: f32,
    pub form_focus: Vec<String>,
    pub target_muscles: Vec<Muscle>,
    /// The plan was replaced by conservative defaults.
    pub fallback: bool,
    pub reasoning: Vec<String>,
}

impl ExerciseRecommendation {
    fn planned(
        exercise: &Exercise,
        plan: ProgressionPlan,
        score: f32,
        priority: Priority,
        fallback: bool,
    ) -> Self {
        let category = ExerciseCategory::from(&exercise.name);
        Self {
            exercise_id: exercise.id,
            name: exercise.name.clone(),
            equipment: exercise.equipment,
            sets: plan.sets,
            reps: plan.reps,
            weight: plan.weight,
            target_rpe: plan.target_rpe,
            duration: estimate_duration(category, plan.sets, plan.target_rpe),
            priority,
            score,
            progression_type: plan.progression_type,
            confidence: plan.confidence,
            form_focus: plan.form_focus,
            target_muscles: exercise.primary_muscles(),
            fallback,
            reasoning: plan.reasoning,
        }
    }

    fn preparatory(exercise: &Exercise, target_rpe: RPE, reason: &str) -> Self {
        let category = ExerciseCategory::from(&exercise.name);
        let (weight, reps, sets) = category.starting_load();
        Self {
            exercise_id: exercise.id,
            name: exercise.name.clone(),
            equipment: exercise.equipment,
            sets,
            reps,
            weight,
            target_rpe,
            duration: category.base_duration(),
            priority: Priority::Low,
            score: 0.0,
            progression_type: ProgressionType::Maintain,
            confidence: 1.0,
            form_focus: vec![],
            target_muscles: exercise
                .muscle_engagement()
                .into_iter()
                .filter(|(_, e)| *e > Engagement::NONE)
                .map(|(m, _)| m)
                .collect(),
            fallback: false,
            reasoning: vec![reason.to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct GeneratedWorkout {
    pub user_id: UserID,
    pub goal: Goal,
    pub generated_at: DateTime<Utc>,
    pub exercises: Vec<ExerciseRecommendation>,
    pub warmup: Vec<ExerciseRecommendation>,
    pub cooldown: Vec<ExerciseRecommendation>,
    /// Minutes, including a flat allowance for warmup and cooldown.
    pub estimated_duration: u32,
    pub intensity: Intensity,
    pub focus_areas: Vec<Muscle>,
    pub coaching_notes: Vec<String>,
    pub confidence: f32,
    pub fatigue_summary: String,
}

#[allow(async_fn_in_trait)]
pub trait WorkoutService {
    async fn generate_workout(
        &self,
        request: &GenerationRequest,
    ) -> Result<GeneratedWorkout, GenerationError>;
}

pub struct WorkoutGenerator<'a, R> {
    repository: &'a R,
    fatigue_analyzer: FatigueAnalyzer<'a, R>,
    progression_planner: ProgressionPlanner<'a, R>,
    config: GenerationConfig,
}

impl<'a, R> WorkoutGenerator<'a, R>
where
    R: WorkoutSessionRepository + ExerciseRepository,
{
    pub fn new(
        repository: &'a R,
        fatigue_config: FatigueConfig,
        progression_config: ProgressionConfig,
        config: GenerationConfig,
    ) -> Self {
        Self {
            repository,
            fatigue_analyzer: FatigueAnalyzer::new(repository, fatigue_config),
            progression_planner: ProgressionPlanner::new(repository, progression_config),
            config,
        }
    }

    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GeneratedWorkout, GenerationError> {
        let user_id = request.user_id;
        let fatigue = self.fatigue_analyzer.analyze(user_id, None).await?;

        let exercises = self
            .repository
            .read_exercises()
            .await
            .map_err(|source| GenerationError::DataAccess {
                user_id,
                operation: Operation::ReadExercises,
                source,
            })?;
        let filter = request.equipment.iter().copied().collect::<ExerciseFilter>();
        let available = filter.exercises(exercises.iter());
        let candidates = available
            .iter()
            .copied()
            .filter(|e| {
                let category = ExerciseCategory::from(&e.name);
                !(e.is_bodyweight() && (category.is_warmup() || category.is_cooldown()))
            })
            .collect::<Vec<_>>();

        let selected = select_exercises(&candidates, &fatigue, request.goal, &self.config);

        let plans = join_all(
            selected
                .iter()
                .map(|(exercise, _)| self.progression_planner.plan_exercise(user_id, exercise)),
        )
        .await;

        let main = selected
            .into_iter()
            .zip(plans)
            .enumerate()
            .map(|(i, ((exercise, score), plan))| {
                let (plan, fallback) = match plan {
                    Ok(plan) => (plan, false),
                    Err(err) => {
                        warn!("using fallback plan for exercise {}: {err}", exercise.id);
                        (ProgressionPlan::fallback(exercise), true)
                    }
                };
                ExerciseRecommendation::planned(
                    exercise,
                    plan,
                    score,
                    Priority::of_position(i),
                    fallback,
                )
            })
            .collect::<Vec<_>>();

        let available_time = request
            .available_time
            .unwrap_or(self.config.preferred_workout_duration);
        let main = balance_time(main, available_time);
        let warmup = warmup(&available);
        let cooldown = cooldown(&available, &warmup);

        Ok(workout(request, main, warmup, cooldown, &fatigue))
    }
}

/// Preference of an exercise for the next workout.
#[must_use]
pub fn score_exercise(
    exercise: &Exercise,
    fatigue: &FatigueAnalysis,
    goal: Goal,
    config: &GenerationConfig,
) -> f32 {
    let primary_muscles = exercise.primary_muscles();
    let recovery = primary_muscles
        .iter()
        .map(|m| match fatigue.status_of(*m) {
            RecoveryStatus::Recovered => 30.0,
            RecoveryStatus::Recovering => 15.0,
            RecoveryStatus::Fatigued => 0.0,
        })
        .sum::<f32>()
        * config.muscle_balance_weighting;
    let goal = primary_muscles
        .iter()
        .map(|m| goal.muscle_priority(*m))
        .sum::<f32>()
        * 20.0;
    let equipment = config.equipment_preference(exercise.equipment) * 10.0;
    let compound = if exercise.is_compound() { 15.0 } else { 5.0 };
    #[allow(clippy::cast_precision_loss)]
    let efficiency = exercise.total_engagement() as f32 / 10.0;
    recovery + goal + equipment + compound + efficiency
}

/// Select the main exercises in descending score.
///
/// An exercise is accepted if it covers a new primary muscle or a primary
/// muscle important for the goal. Only muscles engaged at or above
/// [`Engagement::PRIMARY`] count as covered, so an exercise that merely
/// assists an uncovered muscle is not accepted for it. Missing exercises up to
/// the minimum are filled with the best remaining candidates.
#[must_use]
pub fn select_exercises<'a>(
    candidates: &[&'a Exercise],
    fatigue: &FatigueAnalysis,
    goal: Goal,
    config: &GenerationConfig,
) -> Vec<(&'a Exercise, f32)> {
    let mut scored = candidates
        .iter()
        .map(|e| (*e, score_exercise(e, fatigue, goal, config)))
        .collect::<Vec<_>>();
    scored.sort_by(|(a, a_score), (b, b_score)| {
        b_score.total_cmp(a_score).then_with(|| a.name.cmp(&b.name))
    });

    let max = config.max_exercises_per_workout;
    let min = config.min_exercises_per_workout.min(max);
    let mut accepted = vec![false; scored.len()];
    let mut covered = BTreeSet::new();
    let mut selected = vec![];

    for (i, (exercise, score)) in scored.iter().enumerate() {
        if selected.len() >= max {
            break;
        }
        let primary_muscles = exercise.primary_muscles();
        if primary_muscles
            .iter()
            .any(|m| !covered.contains(m) || goal.muscle_priority(*m) >= PRIORITY_GOAL_WEIGHT)
        {
            covered.extend(primary_muscles);
            accepted[i] = true;
            selected.push((*exercise, *score));
        }
    }

    for (i, (exercise, score)) in scored.iter().enumerate() {
        if selected.len() >= min {
            break;
        }
        if !accepted[i] {
            debug!("backfilling exercise {}", exercise.id);
            selected.push((*exercise, *score));
        }
    }

    selected
}

/// Minutes needed for an exercise, longer for hard sets.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn estimate_duration(category: ExerciseCategory, sets: u32, target_rpe: RPE) -> u32 {
    let intensity = if target_rpe >= RPE::EIGHT { 1.2 } else { 1.0 };
    (category.base_duration() as f32 * sets as f32 / 3.0 * intensity).round() as u32
}

/// Drop the least important exercises until the workout fits into the time budget.
///
/// Exercises are kept by priority as long as their total duration stays within
/// the budget, all exercises after the first one exceeding it are dropped.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn balance_time(
    mut exercises: Vec<ExerciseRecommendation>,
    available_time: u32,
) -> Vec<ExerciseRecommendation> {
    let budget = available_time as f32 * TIME_BUDGET_SHARE;
    let total = exercises.iter().map(|e| e.duration).sum::<u32>();
    if total as f32 <= budget {
        return exercises;
    }

    exercises.sort_by_key(|e| e.priority);
    let mut used = 0;
    let mut kept = vec![];
    let mut exceeded = false;
    for exercise in exercises {
        let fits = (used + exercise.duration) as f32 <= budget;
        if exceeded || !fits {
            exceeded = true;
            debug!(
                "dropped exercise {} to fit into {available_time} minutes",
                exercise.exercise_id
            );
            continue;
        }
        used += exercise.duration;
        kept.push(exercise);
    }
    kept
}

fn warmup(exercises: &[&Exercise]) -> Vec<ExerciseRecommendation> {
    preparation_candidates(exercises, ExerciseCategory::is_warmup, &[])
        .into_iter()
        .take(WARMUP_LIMIT)
        .map(|e| ExerciseRecommendation::preparatory(e, RPE::THREE, "Warmup"))
        .collect()
}

fn cooldown(
    exercises: &[&Exercise],
    warmup: &[ExerciseRecommendation],
) -> Vec<ExerciseRecommendation> {
    let used = warmup.iter().map(|e| e.exercise_id).collect::<Vec<_>>();
    preparation_candidates(exercises, ExerciseCategory::is_cooldown, &used)
        .into_iter()
        .take(COOLDOWN_LIMIT)
        .map(|e| ExerciseRecommendation::preparatory(e, RPE::TWO, "Cooldown"))
        .collect()
}

fn preparation_candidates<'a>(
    exercises: &[&'a Exercise],
    is_category: fn(ExerciseCategory) -> bool,
    excluded: &[ExerciseID],
) -> Vec<&'a Exercise> {
    let mut result = exercises
        .iter()
        .copied()
        .filter(|e| e.is_bodyweight())
        .filter(|e| is_category(ExerciseCategory::from(&e.name)))
        .filter(|e| !excluded.contains(&e.id))
        .collect::<Vec<_>>();
    result.sort_by(|a, b| a.name.cmp(&b.name));
    result
}

fn workout(
    request: &GenerationRequest,
    exercises: Vec<ExerciseRecommendation>,
    warmup: Vec<ExerciseRecommendation>,
    cooldown: Vec<ExerciseRecommendation>,
    fatigue: &FatigueAnalysis,
) -> GeneratedWorkout {
    let estimated_duration =
        exercises.iter().map(|e| e.duration).sum::<u32>() + PREPARATION_ALLOWANCE;
    let intensity = Intensity::from_mean_rpe(mean(
        &exercises
            .iter()
            .map(|e| f32::from(e.target_rpe))
            .collect::<Vec<_>>(),
    ));
    let mut focus_areas = vec![];
    for muscle in exercises.iter().flat_map(|e| &e.target_muscles) {
        if focus_areas.len() >= FOCUS_AREA_LIMIT {
            break;
        }
        if !focus_areas.contains(muscle) {
            focus_areas.push(*muscle);
        }
    }
    let confidence = mean(
        &exercises
            .iter()
            .map(|e| e.confidence)
            .collect::<Vec<_>>(),
    )
    .unwrap_or(0.0);
    let coaching_notes = coaching_notes(&exercises, intensity, fatigue.deload_recommended);

    GeneratedWorkout {
        user_id: request.user_id,
        goal: request.goal,
        generated_at: Utc::now(),
        exercises,
        warmup,
        cooldown,
        estimated_duration,
        intensity,
        focus_areas,
        coaching_notes,
        confidence,
        fatigue_summary: fatigue.summary.clone(),
    }
}

#[must_use]
pub fn coaching_notes(
    exercises: &[ExerciseRecommendation],
    intensity: Intensity,
    deload_recommended: bool,
) -> Vec<String> {
    let mut notes = vec![];
    if intensity == Intensity::High {
        notes.push(String::from(
            "High intensity session, warm up thoroughly before the working sets.",
        ));
    }
    if deload_recommended {
        notes.push(String::from(
            "Fatigue is accumulating, prioritize sleep and recovery and consider a deload week.",
        ));
    }
    let progressing = names(
        exercises
            .iter()
            .filter(|e| e.progression_type == ProgressionType::WeightIncrease),
    );
    if !progressing.is_empty() {
        notes.push(format!("Time to add weight: {progressing}."));
    }
    let form_focus = names(exercises.iter().filter(|e| !e.form_focus.is_empty()));
    if !form_focus.is_empty() {
        notes.push(format!("Focus on form: {form_focus}."));
    }
    if notes.is_empty() {
        notes.push(String::from(
            "Keep a controlled tempo and stop each set one or two reps before failure.",
        ));
    }
    notes
}

fn names<'a>(exercises: impl Iterator<Item = &'a ExerciseRecommendation>) -> String {
    exercises
        .map(|e| e.name.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use assert_approx_eq::assert_approx_eq;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use strum::IntoEnumIterator;

    use crate::tests::data::{
        self, ARM_CIRCLES_ID, BACK_SQUAT_ID, BARBELL_ROW_ID, BENCH_PRESS_ID, BRISK_WALK_ID,
        CABLE_FLY_ID, CHILDS_POSE_HOLD_ID, DEADLIFT_ID, FOAM_ROLL_QUADS_ID, Failure,
        HAMSTRING_STRETCH_ID, OVERHEAD_PRESS_ID, PLANK_ID, Repository, USER_ID, WALKING_LUNGE_ID,
    };

    use super::*;

    fn generator(repository: &Repository, config: GenerationConfig) -> WorkoutGenerator<'_, Repository> {
        WorkoutGenerator::new(
            repository,
            FatigueConfig::default(),
            ProgressionConfig::default(),
            config,
        )
    }

    fn request(goal: Goal, equipment: &[Equipment], available_time: Option<u32>) -> GenerationRequest {
        GenerationRequest {
            user_id: USER_ID.into(),
            goal,
            equipment: equipment.to_vec(),
            available_time,
        }
    }

    fn ids(exercises: &[ExerciseRecommendation]) -> Vec<ExerciseID> {
        exercises.iter().map(|e| e.exercise_id).collect()
    }

    fn exercise_ids(ids: &[u128]) -> Vec<ExerciseID> {
        ids.iter().copied().map(ExerciseID::from).collect()
    }

    fn recommendation(name: &str, duration: u32, priority: Priority) -> ExerciseRecommendation {
        let exercise = data::EXERCISES
            .iter()
            .find(|e| e.name.to_string() == name)
            .unwrap();
        ExerciseRecommendation {
            duration,
            priority,
            ..ExerciseRecommendation::planned(
                exercise,
                ProgressionPlan::beginner(exercise),
                0.0,
                priority,
                false,
            )
        }
    }

    #[test]
    fn test_goal_from_str() {
        assert_eq!(Goal::from_str("general_fitness"), Ok(Goal::GeneralFitness));
        assert_eq!(Goal::from_str("strength"), Ok(Goal::Strength));
        assert!(Goal::from_str("cardio").is_err());
    }

    #[test]
    fn test_goal_muscle_priority_range() {
        for goal in Goal::iter() {
            for muscle in [Muscle::Quadriceps, Muscle::Calves, Muscle::Forearms] {
                let priority = goal.muscle_priority(muscle);
                assert!((0.0..=1.0).contains(&priority));
            }
        }
    }

    #[test]
    fn test_generation_request_deserialization() {
        let request: GenerationRequest = serde_json::from_str(
            r#"{
                "user_id": "00000000-0000-0000-0000-000000000001",
                "goal": "hypertrophy",
                "equipment": ["Dumbbell", "Cable"]
            }"#,
        )
        .unwrap();
        assert_eq!(
            request,
            request_with(Goal::Hypertrophy, &[Equipment::Dumbbell, Equipment::Cable])
        );
    }

    fn request_with(goal: Goal, equipment: &[Equipment]) -> GenerationRequest {
        request(goal, equipment, None)
    }

    #[rstest]
    #[case(None, Intensity::Low)]
    #[case(Some(6.5), Intensity::Low)]
    #[case(Some(7.0), Intensity::Moderate)]
    #[case(Some(8.4), Intensity::Moderate)]
    #[case(Some(8.5), Intensity::High)]
    fn test_intensity_from_mean_rpe(#[case] rpe: Option<f32>, #[case] expected: Intensity) {
        assert_eq!(Intensity::from_mean_rpe(rpe), expected);
    }

    #[rstest]
    #[case(0, Priority::High)]
    #[case(1, Priority::High)]
    #[case(2, Priority::Medium)]
    #[case(3, Priority::Medium)]
    #[case(4, Priority::Low)]
    #[case(9, Priority::Low)]
    fn test_priority_of_position(#[case] index: usize, #[case] expected: Priority) {
        assert_eq!(Priority::of_position(index), expected);
    }

    #[rstest]
    #[case(ExerciseCategory::Squat, 3, RPE::SEVEN, 10)]
    #[case(ExerciseCategory::Squat, 3, RPE::EIGHT, 12)]
    #[case(ExerciseCategory::BenchPress, 3, RPE::EIGHT, 10)]
    #[case(ExerciseCategory::Curl, 4, RPE::SEVEN, 7)]
    #[case(ExerciseCategory::Core, 1, RPE::NINE, 2)]
    fn test_estimate_duration(
        #[case] category: ExerciseCategory,
        #[case] sets: u32,
        #[case] target_rpe: RPE,
        #[case] expected: u32,
    ) {
        assert_eq!(estimate_duration(category, sets, target_rpe), expected);
    }

    #[test]
    fn test_balance_time_within_budget() {
        let exercises = vec![
            recommendation("Deadlift", 10, Priority::High),
            recommendation("Back Squat", 10, Priority::High),
        ];
        assert_eq!(balance_time(exercises.clone(), 60), exercises);
    }

    #[rstest]
    #[case(60, vec![DEADLIFT_ID, BACK_SQUAT_ID, WALKING_LUNGE_ID, BARBELL_ROW_ID, BENCH_PRESS_ID])]
    #[case(30, vec![DEADLIFT_ID, BACK_SQUAT_ID])]
    #[case(15, vec![DEADLIFT_ID])]
    #[case(10, vec![])]
    fn test_balance_time(#[case] available_time: u32, #[case] expected: Vec<u128>) {
        let exercises = vec![
            recommendation("Deadlift", 10, Priority::High),
            recommendation("Back Squat", 10, Priority::High),
            recommendation("Walking Lunge", 7, Priority::Medium),
            recommendation("Barbell Row", 8, Priority::Medium),
            recommendation("Bench Press", 8, Priority::Low),
            recommendation("Overhead Press", 8, Priority::Low),
        ];
        let balanced = balance_time(exercises, available_time);
        assert_eq!(ids(&balanced), exercise_ids(&expected));
        #[allow(clippy::cast_precision_loss)]
        let budget = available_time as f32 * 0.8;
        #[allow(clippy::cast_precision_loss)]
        let total = balanced.iter().map(|e| e.duration).sum::<u32>() as f32;
        assert!(total <= budget);
    }

    #[test]
    fn test_balance_time_sorts_by_priority() {
        let exercises = vec![
            recommendation("Bench Press", 8, Priority::Low),
            recommendation("Deadlift", 10, Priority::High),
            recommendation("Barbell Row", 8, Priority::Medium),
        ];
        assert_eq!(
            ids(&balance_time(exercises, 25)),
            exercise_ids(&[DEADLIFT_ID, BARBELL_ROW_ID])
        );
    }

    #[test]
    fn test_coaching_notes_default() {
        let mut exercise = recommendation("Deadlift", 10, Priority::High);
        exercise.form_focus.clear();
        assert_eq!(
            coaching_notes(&[exercise], Intensity::Moderate, false),
            vec![String::from(
                "Keep a controlled tempo and stop each set one or two reps before failure."
            )]
        );
    }

    #[test]
    fn test_coaching_notes() {
        let mut deadlift = recommendation("Deadlift", 10, Priority::High);
        deadlift.progression_type = ProgressionType::WeightIncrease;
        deadlift.form_focus.clear();
        let squat = recommendation("Back Squat", 10, Priority::High);
        let notes = coaching_notes(&[deadlift, squat], Intensity::High, true);
        assert_eq!(notes.len(), 4);
        assert!(notes[0].contains("warm up"));
        assert!(notes[1].contains("deload"));
        assert_eq!(notes[2], "Time to add weight: Deadlift.");
        assert_eq!(notes[3], "Focus on form: Back Squat.");
    }

    #[tokio::test]
    async fn test_generate_without_history() {
        let repository = Repository::new();
        let workout = generator(&repository, GenerationConfig::default())
            .generate(&request(Goal::Strength, &[], Some(180)))
            .await
            .unwrap();

        assert_eq!(
            ids(&workout.exercises),
            exercise_ids(&[
                DEADLIFT_ID,
                BACK_SQUAT_ID,
                WALKING_LUNGE_ID,
                BARBELL_ROW_ID,
                BENCH_PRESS_ID,
                OVERHEAD_PRESS_ID
            ])
        );
        assert_eq!(
            workout
                .exercises
                .iter()
                .map(|e| e.priority)
                .collect::<Vec<_>>(),
            vec![
                Priority::High,
                Priority::High,
                Priority::Medium,
                Priority::Medium,
                Priority::Low,
                Priority::Low
            ]
        );
        let squat = &workout.exercises[1];
        assert_eq!(squat.weight, Weight::new(45.0).unwrap());
        assert_eq!(squat.reps, Reps::new(8).unwrap());
        assert_eq!(squat.sets, 3);
        assert_eq!(squat.target_rpe, RPE::SEVEN);
        assert!(!squat.fallback);
        assert_eq!(
            ids(&workout.warmup),
            exercise_ids(&[ARM_CIRCLES_ID, BRISK_WALK_ID, HAMSTRING_STRETCH_ID])
        );
        assert!(workout.warmup.iter().all(|e| e.sets == 1
            && e.reps == Reps::new(10).unwrap()
            && e.target_rpe == RPE::THREE));
        assert_eq!(
            ids(&workout.cooldown),
            exercise_ids(&[CHILDS_POSE_HOLD_ID, FOAM_ROLL_QUADS_ID])
        );
        assert!(workout.cooldown.iter().all(|e| e.target_rpe == RPE::TWO));
        assert_eq!(workout.estimated_duration, 10 + 10 + 7 + 8 + 8 + 8 + 10);
        assert_eq!(workout.intensity, Intensity::Moderate);
        assert_eq!(
            workout.focus_areas,
            vec![
                Muscle::ErectorSpinae,
                Muscle::GluteusMaximus,
                Muscle::Hamstrings,
                Muscle::Quadriceps
            ]
        );
        assert_approx_eq!(workout.confidence, 0.6);
        assert_eq!(workout.goal, Goal::Strength);
        assert!(workout.fatigue_summary.contains("ready to train"));
        assert_eq!(workout.coaching_notes.len(), 1);
        assert!(workout.coaching_notes[0].starts_with("Focus on form: Deadlift, Back Squat"));
    }

    #[tokio::test]
    async fn test_generate_bench_press_day_ago() {
        let (session, sets) = data::bench_press_session();
        let repository = Repository::new().with_session(session, sets);
        let workout = generator(&repository, GenerationConfig::default())
            .generate(&request(Goal::Strength, &[Equipment::Barbell], Some(180)))
            .await
            .unwrap();

        let bench_press = workout
            .exercises
            .iter()
            .find(|e| e.exercise_id == ExerciseID::from(BENCH_PRESS_ID))
            .unwrap();
        assert_eq!(bench_press.weight, Weight::new(137.5).unwrap());
        assert_eq!(bench_press.reps, Reps::new(8).unwrap());
        assert_eq!(bench_press.sets, 3);
        assert_eq!(bench_press.target_rpe, RPE::EIGHT);
        assert_eq!(bench_press.progression_type, ProgressionType::WeightIncrease);
        assert_eq!(bench_press.duration, 10);
        assert!(
            workout
                .coaching_notes
                .contains(&String::from("Time to add weight: Bench Press."))
        );
        assert!(
            workout
                .exercises
                .iter()
                .all(|e| e.equipment == Equipment::Barbell || e.equipment == Equipment::Bodyweight)
        );
    }

    #[rstest]
    #[case::default(GenerationConfig::default(), 3, 6)]
    #[case::max_below_min(
        GenerationConfig { min_exercises_per_workout: 3, max_exercises_per_workout: 2, ..GenerationConfig::default() },
        2,
        2
    )]
    #[case::narrow(
        GenerationConfig { min_exercises_per_workout: 4, max_exercises_per_workout: 4, ..GenerationConfig::default() },
        4,
        4
    )]
    #[tokio::test]
    async fn test_generate_exercise_count(
        #[case] config: GenerationConfig,
        #[case] min: usize,
        #[case] max: usize,
    ) {
        let repository = Repository::new();
        for goal in Goal::iter() {
            let workout = generator(&repository, config.clone())
                .generate(&request(goal, &[], Some(240)))
                .await
                .unwrap();
            assert!(workout.exercises.len() >= min, "{goal}");
            assert!(workout.exercises.len() <= max, "{goal}");
        }
    }

    #[tokio::test]
    async fn test_generate_backfills_to_minimum() {
        let repository = Repository::new();
        let config = GenerationConfig {
            min_exercises_per_workout: 4,
            ..GenerationConfig::default()
        };
        let workout = generator(&repository, config)
            .generate(&request(Goal::GeneralFitness, &[Equipment::Cable], Some(240)))
            .await
            .unwrap();
        assert_eq!(workout.exercises.len(), 4);
        assert_eq!(workout.exercises[3].exercise_id, ExerciseID::from(CABLE_FLY_ID));
        assert!(
            workout
                .exercises
                .iter()
                .any(|e| e.exercise_id == ExerciseID::from(PLANK_ID))
        );
    }

    #[rstest]
    #[case(60)]
    #[case(30)]
    #[case(15)]
    #[tokio::test]
    async fn test_generate_time_budget(#[case] available_time: u32) {
        let repository = Repository::new();
        let workout = generator(&repository, GenerationConfig::default())
            .generate(&request(Goal::Strength, &[], Some(available_time)))
            .await
            .unwrap();
        #[allow(clippy::cast_precision_loss)]
        let main = workout.exercises.iter().map(|e| e.duration).sum::<u32>() as f32;
        #[allow(clippy::cast_precision_loss)]
        let budget = available_time as f32 * 0.8;
        assert!(main <= budget);
        assert_eq!(
            workout.estimated_duration,
            workout.exercises.iter().map(|e| e.duration).sum::<u32>() + 10
        );
    }

    #[tokio::test]
    async fn test_generate_uses_preferred_duration() {
        let repository = Repository::new();
        let workout = generator(&repository, GenerationConfig::default())
            .generate(&request(Goal::Strength, &[], None))
            .await
            .unwrap();
        assert_eq!(
            ids(&workout.exercises),
            exercise_ids(&[
                DEADLIFT_ID,
                BACK_SQUAT_ID,
                WALKING_LUNGE_ID,
                BARBELL_ROW_ID,
                BENCH_PRESS_ID
            ])
        );
    }

    #[tokio::test]
    async fn test_generate_with_failing_history() {
        let repository = Repository::new().with_failure(Failure::History(BACK_SQUAT_ID));
        let workout = generator(&repository, GenerationConfig::default())
            .generate(&request(Goal::Strength, &[], Some(180)))
            .await
            .unwrap();
        let squat = workout
            .exercises
            .iter()
            .find(|e| e.exercise_id == ExerciseID::from(BACK_SQUAT_ID))
            .unwrap();
        assert!(squat.fallback);
        assert_approx_eq!(squat.confidence, 0.3);
        assert_eq!(squat.weight, Weight::new(45.0).unwrap());
        assert_eq!(
            workout.exercises.iter().filter(|e| e.fallback).count(),
            1
        );
    }

    #[tokio::test]
    async fn test_generate_loaded_carries() {
        let repository = Repository {
            exercises: vec![
                data::exercise(
                    20,
                    "Farmer's Walk",
                    Equipment::Kettlebell,
                    &[(Muscle::Forearms, 80), (Muscle::Trapezius, 70)],
                ),
                data::exercise(
                    21,
                    "Suitcase Hold",
                    Equipment::Dumbbell,
                    &[(Muscle::Obliques, 80), (Muscle::Forearms, 60)],
                ),
            ],
            ..Repository::default()
        };
        let workout = generator(&repository, GenerationConfig::default())
            .generate(&request(
                Goal::Strength,
                &[Equipment::Kettlebell, Equipment::Dumbbell],
                Some(60),
            ))
            .await
            .unwrap();
        let mut main = ids(&workout.exercises);
        main.sort();
        assert_eq!(main, exercise_ids(&[20, 21]));
        assert!(workout.warmup.is_empty());
        assert!(workout.cooldown.is_empty());
    }

    #[tokio::test]
    async fn test_generate_fatigue_failure() {
        let repository = Repository::new().with_failure(Failure::Sessions);
        let result = generator(&repository, GenerationConfig::default())
            .generate(&request(Goal::Strength, &[], None))
            .await;
        assert!(matches!(result, Err(GenerationError::Fatigue(_))));
    }

    #[tokio::test]
    async fn test_generate_exercises_failure() {
        let repository = Repository::new().with_failure(Failure::Exercises);
        let result = generator(&repository, GenerationConfig::default())
            .generate(&request(Goal::Strength, &[], None))
            .await;
        assert!(matches!(
            result,
            Err(GenerationError::DataAccess {
                user_id,
                operation: Operation::ReadExercises,
                ..
            }) if user_id == UserID::from(USER_ID)
        ));
    }
}

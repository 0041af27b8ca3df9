use std::{
    collections::{BTreeMap, HashSet},
    ops::{Add, AddAssign},
    slice::Iter,
};

use derive_more::{Deref, Display};
use uuid::Uuid;

use crate::{Name, ReadError};

#[allow(async_fn_in_trait)]
pub trait ExerciseRepository {
    async fn read_exercises(&self) -> Result<Vec<Exercise>, ReadError>;
    async fn read_exercise(&self, id: ExerciseID) -> Result<Option<Exercise>, ReadError>;
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Exercise {
    pub id: ExerciseID,
    pub name: Name,
    pub equipment: Equipment,
    pub muscles: Vec<ExerciseMuscle>,
}

impl Exercise {
    #[must_use]
    pub fn muscle_engagement(&self) -> BTreeMap<Muscle, Engagement> {
        let mut result: BTreeMap<Muscle, Engagement> = BTreeMap::new();
        for m in &self.muscles {
            *result.entry(m.muscle).or_insert(Engagement::NONE) += m.engagement;
        }
        result
    }

    #[must_use]
    pub fn engagement(&self, muscle: Muscle) -> Engagement {
        self.muscles
            .iter()
            .filter(|m| m.muscle == muscle)
            .fold(Engagement::NONE, |acc, m| acc + m.engagement)
    }

    /// Muscles engaged at or above [`Engagement::PRIMARY`], in enumeration order.
    #[must_use]
    pub fn primary_muscles(&self) -> Vec<Muscle> {
        self.muscle_engagement()
            .into_iter()
            .filter(|(_, e)| e.is_primary())
            .map(|(m, _)| m)
            .collect()
    }

    #[must_use]
    pub fn is_compound(&self) -> bool {
        self.primary_muscles().len() > 1
    }

    #[must_use]
    pub fn total_engagement(&self) -> u32 {
        self.muscles.iter().map(|m| *m.engagement).sum()
    }

    #[must_use]
    pub fn is_bodyweight(&self) -> bool {
        self.equipment == Equipment::Bodyweight
    }
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
pub struct ExerciseID(Uuid);

impl ExerciseID {
    #[must_use]
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl From<Uuid> for ExerciseID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for ExerciseID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ExerciseMuscle {
    pub muscle: Muscle,
    pub engagement: Engagement,
}

/// Estimated contribution of a muscle to a movement, in percent.
///
/// The engagements of an exercise need not sum to 100, and several muscles may
/// be primary at the same time.
#[derive(Deref, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize)]
pub struct Engagement(u32);

impl Engagement {
    pub const FULL: Engagement = Engagement(100);
    pub const PRIMARY: Engagement = Engagement(50);
    pub const TRAINED: Engagement = Engagement(20);
    pub const NONE: Engagement = Engagement(0);

    pub fn new(value: u32) -> Result<Self, EngagementError> {
        if value > 100 {
            return Err(EngagementError::OutOfRange(value));
        }
        Ok(Self(value))
    }

    #[must_use]
    pub fn fraction(self) -> f32 {
        #[allow(clippy::cast_precision_loss)]
        let value = self.0 as f32;
        value / 100.0
    }

    #[must_use]
    pub fn is_primary(self) -> bool {
        self >= Self::PRIMARY
    }

    #[must_use]
    pub fn is_trained(self) -> bool {
        self >= Self::TRAINED
    }
}

impl Add for Engagement {
    type Output = Engagement;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Engagement {
    fn add_assign(&mut self, rhs: Self) {
        *self = Self(self.0 + rhs.0);
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum EngagementError {
    #[error("Engagement must be 100 or less ({0} > 100)")]
    OutOfRange(u32),
}

#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    PartialEq,
    PartialOrd,
    Ord,
    serde::Serialize,
    serde::Deserialize,
)]
pub enum Muscle {
    // Chest
    PectoralisMajor,
    // Back
    Trapezius,
    LatissimusDorsi,
    Rhomboids,
    // Shoulders
    AnteriorDeltoid,
    LateralDeltoid,
    PosteriorDeltoid,
    // Upper arms
    BicepsBrachii,
    TricepsBrachii,
    // Forearms
    Forearms,
    // Waist
    Abdominals,
    Obliques,
    ErectorSpinae,
    // Hips
    GluteusMaximus,
    // Thighs
    Quadriceps,
    Hamstrings,
    // Calves
    Calves,
}

impl Property for Muscle {
    fn iter() -> Iter<'static, Muscle> {
        static MUSCLES: [Muscle; 17] = [
            Muscle::PectoralisMajor,
            Muscle::Trapezius,
            Muscle::LatissimusDorsi,
            Muscle::Rhomboids,
            Muscle::AnteriorDeltoid,
            Muscle::LateralDeltoid,
            Muscle::PosteriorDeltoid,
            Muscle::BicepsBrachii,
            Muscle::TricepsBrachii,
            Muscle::Forearms,
            Muscle::Abdominals,
            Muscle::Obliques,
            Muscle::ErectorSpinae,
            Muscle::GluteusMaximus,
            Muscle::Quadriceps,
            Muscle::Hamstrings,
            Muscle::Calves,
        ];
        MUSCLES.iter()
    }

    fn name(self) -> &'static str {
        match self {
            Muscle::PectoralisMajor => "Pectoralis Major",
            Muscle::Trapezius => "Trapezius",
            Muscle::LatissimusDorsi => "Latissimus Dorsi",
            Muscle::Rhomboids => "Rhomboids",
            Muscle::AnteriorDeltoid => "Anterior Deltoid",
            Muscle::LateralDeltoid => "Lateral Deltoid",
            Muscle::PosteriorDeltoid => "Posterior Deltoid",
            Muscle::BicepsBrachii => "Biceps Brachii",
            Muscle::TricepsBrachii => "Triceps Brachii",
            Muscle::Forearms => "Forearms",
            Muscle::Abdominals => "Abdominals",
            Muscle::Obliques => "Obliques",
            Muscle::ErectorSpinae => "Erector Spinae",
            Muscle::GluteusMaximus => "Gluteus Maximus",
            Muscle::Quadriceps => "Quadriceps",
            Muscle::Hamstrings => "Hamstrings",
            Muscle::Calves => "Calves",
        }
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    PartialEq,
    PartialOrd,
    Ord,
    serde::Serialize,
    serde::Deserialize,
)]
pub enum Equipment {
    Bodyweight,
    Barbell,
    Dumbbell,
    Cable,
    Machine,
    Kettlebell,
    ResistanceBand,
    PullUpBar,
    Bench,
}

impl Property for Equipment {
    fn iter() -> Iter<'static, Equipment> {
        static EQUIPMENT: [Equipment; 9] = [
            Equipment::Bodyweight,
            Equipment::Barbell,
            Equipment::Dumbbell,
            Equipment::Cable,
            Equipment::Machine,
            Equipment::Kettlebell,
            Equipment::ResistanceBand,
            Equipment::PullUpBar,
            Equipment::Bench,
        ];
        EQUIPMENT.iter()
    }

    fn name(self) -> &'static str {
        match self {
            Equipment::Bodyweight => "Bodyweight",
            Equipment::Barbell => "Barbell",
            Equipment::Dumbbell => "Dumbbell",
            Equipment::Cable => "Cable",
            Equipment::Machine => "Machine",
            Equipment::Kettlebell => "Kettlebell",
            Equipment::ResistanceBand => "Resistance Band",
            Equipment::PullUpBar => "Pull Up Bar",
            Equipment::Bench => "Bench",
        }
    }
}

/// Selects the exercises usable with a set of available equipment.
///
/// An empty set applies no filtering. Bodyweight exercises always pass.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ExerciseFilter {
    pub equipment: HashSet<Equipment>,
}

impl ExerciseFilter {
    #[must_use]
    pub fn exercises<'a>(
        &self,
        exercises: impl Iterator<Item = &'a Exercise>,
    ) -> Vec<&'a Exercise> {
        exercises.filter(|e| self.matches(e)).collect()
    }

    #[must_use]
    pub fn matches(&self, exercise: &Exercise) -> bool {
        self.equipment.is_empty()
            || exercise.is_bodyweight()
            || self.equipment.contains(&exercise.equipment)
    }
}

impl FromIterator<Equipment> for ExerciseFilter {
    fn from_iter<T: IntoIterator<Item = Equipment>>(iter: T) -> Self {
        Self {
            equipment: iter.into_iter().collect(),
        }
    }
}

pub trait Property: Clone + Copy + Sized {
    fn iter() -> Iter<'static, Self>;
    fn name(self) -> &'static str;
}

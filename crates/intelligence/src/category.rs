use kinetic_domain::{Name, Reps, Weight};

/// Movement pattern of an exercise, derived from the words of its name.
#[derive(strum::Display, strum::EnumIter, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[strum(serialize_all = "snake_case")]
pub enum ExerciseCategory {
    Squat,
    Deadlift,
    BenchPress,
    OverheadPress,
    Row,
    PullUp,
    Lunge,
    Curl,
    Extension,
    Raise,
    Fly,
    Core,
    Locomotion,
    Circle,
    Stretch,
    Hold,
    FoamRoll,
    Other,
}

/// Checked in order, the first rule with a word starting with one of its
/// keywords decides the category.
const RULES: [(&[&str], ExerciseCategory); 17] = [
    (&["deadlift", "rdl"], ExerciseCategory::Deadlift),
    (&["squat"], ExerciseCategory::Squat),
    (&["lunge"], ExerciseCategory::Lunge),
    (&["bench"], ExerciseCategory::BenchPress),
    (&["press"], ExerciseCategory::OverheadPress),
    (&["row"], ExerciseCategory::Row),
    (&["pull", "chin"], ExerciseCategory::PullUp),
    (&["curl"], ExerciseCategory::Curl),
    (
        &["extension", "pushdown", "skullcrusher"],
        ExerciseCategory::Extension,
    ),
    (&["raise"], ExerciseCategory::Raise),
    (&["fly"], ExerciseCategory::Fly),
    (&["plank", "crunch", "twist"], ExerciseCategory::Core),
    (&["foam"], ExerciseCategory::FoamRoll),
    (&["stretch"], ExerciseCategory::Stretch),
    (&["hold"], ExerciseCategory::Hold),
    (&["walk", "march"], ExerciseCategory::Locomotion),
    (&["circle"], ExerciseCategory::Circle),
];

impl From<&Name> for ExerciseCategory {
    fn from(name: &Name) -> Self {
        let words = name.words().collect::<Vec<_>>();
        RULES
            .iter()
            .find(|(keywords, _)| {
                words
                    .iter()
                    .any(|word| keywords.iter().any(|keyword| word.starts_with(keyword)))
            })
            .map_or(ExerciseCategory::Other, |(_, category)| *category)
    }
}

impl ExerciseCategory {
    /// Weight added by a single weight progression step.
    #[must_use]
    pub fn increment(self) -> f32 {
        match self {
            ExerciseCategory::Squat | ExerciseCategory::Deadlift => 5.0,
            _ => 2.5,
        }
    }

    /// Minutes needed for three working sets including rest.
    #[must_use]
    pub fn base_duration(self) -> u32 {
        match self {
            ExerciseCategory::Squat | ExerciseCategory::Deadlift => 10,
            ExerciseCategory::BenchPress
            | ExerciseCategory::OverheadPress
            | ExerciseCategory::Row => 8,
            ExerciseCategory::PullUp | ExerciseCategory::Lunge => 7,
            ExerciseCategory::Curl
            | ExerciseCategory::Extension
            | ExerciseCategory::Raise
            | ExerciseCategory::Fly => 5,
            ExerciseCategory::Core => 4,
            ExerciseCategory::Locomotion
            | ExerciseCategory::Circle
            | ExerciseCategory::Stretch
            | ExerciseCategory::Hold
            | ExerciseCategory::FoamRoll => 2,
            ExerciseCategory::Other => 6,
        }
    }

    /// Weight, reps and sets recommended without any training history.
    #[must_use]
    pub fn starting_load(self) -> (Weight, Reps, u32) {
        let (weight, reps, sets) = match self {
            ExerciseCategory::Squat | ExerciseCategory::BenchPress => (45.0, 8, 3),
            ExerciseCategory::Deadlift => (65.0, 5, 3),
            ExerciseCategory::OverheadPress => (35.0, 8, 3),
            ExerciseCategory::Row => (40.0, 10, 3),
            ExerciseCategory::PullUp => (0.0, 6, 3),
            ExerciseCategory::Lunge | ExerciseCategory::Other => (20.0, 10, 3),
            ExerciseCategory::Curl | ExerciseCategory::Extension | ExerciseCategory::Fly => {
                (15.0, 12, 3)
            }
            ExerciseCategory::Raise => (10.0, 12, 3),
            ExerciseCategory::Core => (0.0, 15, 3),
            ExerciseCategory::Locomotion
            | ExerciseCategory::Circle
            | ExerciseCategory::Stretch
            | ExerciseCategory::Hold
            | ExerciseCategory::FoamRoll => (0.0, 10, 1),
        };
        (Weight::clamped(weight), Reps::new(reps).unwrap_or_default(), sets)
    }

    #[must_use]
    pub fn form_cues(self) -> &'static [&'static str] {
        match self {
            ExerciseCategory::Squat => &[
                "Keep the chest up and the knees tracking over the toes",
                "Reach at least parallel depth",
            ],
            ExerciseCategory::Deadlift => &[
                "Keep a neutral spine throughout the pull",
                "Keep the bar close to the legs",
            ],
            ExerciseCategory::BenchPress => &[
                "Retract the shoulder blades",
                "Touch the lower chest with controlled tempo",
            ],
            ExerciseCategory::OverheadPress => &[
                "Brace the core and squeeze the glutes",
                "Press in a straight bar path",
            ],
            ExerciseCategory::Row => &["Pull with the elbows", "Avoid using momentum"],
            ExerciseCategory::PullUp => &["Start from a full hang", "Pull the chest to the bar"],
            ExerciseCategory::Lunge => &[
                "Keep the torso upright",
                "Step long enough to keep the front knee stable",
            ],
            ExerciseCategory::Curl | ExerciseCategory::Extension => {
                &["Keep the upper arm still", "Control the lowering phase"]
            }
            ExerciseCategory::Raise | ExerciseCategory::Fly => {
                &["Keep a slight bend in the elbows", "Avoid swinging the weight"]
            }
            ExerciseCategory::Core => &["Keep the lower back neutral", "Breathe steadily"],
            ExerciseCategory::Locomotion
            | ExerciseCategory::Circle
            | ExerciseCategory::Stretch
            | ExerciseCategory::Hold
            | ExerciseCategory::FoamRoll => &["Move slowly and stay relaxed"],
            ExerciseCategory::Other => &["Use a full range of motion with controlled tempo"],
        }
    }

    #[must_use]
    pub fn is_warmup(self) -> bool {
        matches!(
            self,
            ExerciseCategory::Locomotion | ExerciseCategory::Circle | ExerciseCategory::Stretch
        )
    }

    #[must_use]
    pub fn is_cooldown(self) -> bool {
        matches!(
            self,
            ExerciseCategory::Stretch | ExerciseCategory::Hold | ExerciseCategory::FoamRoll
        )
    }
}

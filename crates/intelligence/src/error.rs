use kinetic_domain::{ExerciseID, ReadError, UserID};

#[derive(strum::Display, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    #[strum(serialize = "read workout sessions")]
    ReadWorkoutSessions,
    #[strum(serialize = "read performed sets")]
    ReadPerformedSets,
    #[strum(serialize = "read exercises")]
    ReadExercises,
    #[strum(serialize = "read exercise")]
    ReadExercise,
    #[strum(serialize = "read exercise history")]
    ReadExerciseHistory,
}

#[derive(thiserror::Error, Debug)]
pub enum FatigueError {
    #[error("failed to {operation} of user {user_id}: {source}")]
    DataAccess {
        user_id: UserID,
        operation: Operation,
        #[source]
        source: ReadError,
    },
}

impl FatigueError {
    #[must_use]
    pub fn read_error(&self) -> Option<&ReadError> {
        match self {
            FatigueError::DataAccess { source, .. } => Some(source),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ProgressionError {
    #[error("failed to {operation} of exercise {exercise_id} for user {user_id}: {source}")]
    DataAccess {
        user_id: UserID,
        exercise_id: ExerciseID,
        operation: Operation,
        #[source]
        source: ReadError,
    },
    #[error("exercise {0} not found")]
    ExerciseNotFound(ExerciseID),
}

impl ProgressionError {
    #[must_use]
    pub fn read_error(&self) -> Option<&ReadError> {
        match self {
            ProgressionError::DataAccess { source, .. } => Some(source),
            ProgressionError::ExerciseNotFound(_) => None,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum GenerationError {
    #[error(transparent)]
    Fatigue(#[from] FatigueError),
    #[error("failed to {operation} for user {user_id}: {source}")]
    DataAccess {
        user_id: UserID,
        operation: Operation,
        #[source]
        source: ReadError,
    },
}

impl GenerationError {
    #[must_use]
    pub fn read_error(&self) -> Option<&ReadError> {
        match self {
            GenerationError::Fatigue(err) => err.read_error(),
            GenerationError::DataAccess { source, .. } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use kinetic_domain::StorageError;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_fatigue_error_display() {
        let err = FatigueError::DataAccess {
            user_id: 1.into(),
            operation: Operation::ReadWorkoutSessions,
            source: StorageError::Timeout.into(),
        };
        assert_eq!(
            err.to_string(),
            "failed to read workout sessions of user 00000000-0000-0000-0000-000000000001: request timed out"
        );
        assert!(err.read_error().is_some_and(ReadError::is_timeout));
    }

    #[test]
    fn test_progression_error_display() {
        assert_eq!(
            ProgressionError::ExerciseNotFound(2.into()).to_string(),
            "exercise 00000000-0000-0000-0000-000000000002 not found"
        );
        assert_eq!(
            ProgressionError::DataAccess {
                user_id: 1.into(),
                exercise_id: 2.into(),
                operation: Operation::ReadExerciseHistory,
                source: StorageError::NoConnection.into(),
            }
            .to_string(),
            "failed to read exercise history of exercise 00000000-0000-0000-0000-000000000002 \
             for user 00000000-0000-0000-0000-000000000001: no connection"
        );
        assert!(ProgressionError::ExerciseNotFound(2.into()).read_error().is_none());
    }

    #[test]
    fn test_generation_error_from_fatigue_error() {
        let err = GenerationError::from(FatigueError::DataAccess {
            user_id: 1.into(),
            operation: Operation::ReadPerformedSets,
            source: StorageError::NoSession.into(),
        });
        assert!(matches!(
            err.read_error(),
            Some(ReadError::Storage(StorageError::NoSession))
        ));
        assert_eq!(
            err.to_string(),
            "failed to read performed sets of user 00000000-0000-0000-0000-000000000001: no session"
        );
    }
}

//! Entity records mapped to database rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// A single logged exercise set.
///
/// Equality is structural over all fields, including the generated `id`, so
/// two freshly constructed logs with identical inputs but different persisted
/// ids compare unequal. Equality is for in-memory comparison only; persistence
/// identity is the row id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GymLog {
    /// Row id. Zero until the record has been persisted.
    pub id: i64,
    /// Name of the exercise (e.g., "Bench Press").
    pub exercise: String,
    /// Weight used during the exercise.
    pub weight: f64,
    /// Number of repetitions performed.
    pub reps: u32,
    /// When this entry was created. Stamped at construction, never updated.
    pub logged_at: DateTime<Utc>,
    /// Id of the user who owns this log. By-value reference, not enforced.
    pub user_id: i64,
}

impl GymLog {
    /// Create a new log entry. The timestamp is set to the current time.
    pub fn new(exercise: String, weight: f64, reps: u32, user_id: i64) -> Self {
        Self {
            id: 0,
            exercise,
            weight,
            reps,
            logged_at: Utc::now(),
            user_id,
        }
    }
}

impl Hash for GymLog {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.exercise.hash(state);
        self.weight.to_bits().hash(state);
        self.reps.hash(state);
        self.logged_at.hash(state);
        self.user_id.hash(state);
    }
}

impl std::fmt::Display for GymLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.exercise)?;
        writeln!(f, "weight: {}", self.weight)?;
        writeln!(f, "reps: {}", self.reps)?;
        writeln!(f, "date: {}", self.logged_at)
    }
}

/// A user account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    /// Row id. Zero until the record has been persisted.
    pub id: i64,
    /// Login name. Intended unique, but not enforced at the schema level.
    pub username: String,
    /// Stored in clear text. A future credential component must not inherit
    /// this storage format without hashing.
    pub password: String,
    /// Whether this account has administrator rights.
    pub is_admin: bool,
}

impl User {
    /// Create a new user. Admin rights default to false.
    pub fn new(username: String, password: String) -> Self {
        Self {
            id: 0,
            username,
            password,
            is_admin: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_gym_log_new_stamps_timestamp() {
        let before = Utc::now();
        let log = GymLog::new("Squat".to_string(), 225.0, 5, 1);
        let after = Utc::now();

        assert_eq!(log.id, 0);
        assert_eq!(log.exercise, "Squat");
        assert_eq!(log.weight, 225.0);
        assert_eq!(log.reps, 5);
        assert_eq!(log.user_id, 1);
        assert!(log.logged_at >= before && log.logged_at <= after);
    }

    #[test]
    fn test_gym_log_equality_is_structural() {
        let log = GymLog::new("Bench Press".to_string(), 135.0, 5, 2);
        let same = log.clone();
        assert_eq!(log, same);
        assert_eq!(hash_of(&log), hash_of(&same));

        // Same inputs, different persisted id: not equal.
        let mut persisted = log.clone();
        persisted.id = 7;
        assert_ne!(log, persisted);
    }

    #[test]
    fn test_gym_log_equality_covers_every_field() {
        let log = GymLog::new("Deadlift".to_string(), 315.0, 3, 1);

        let mut other = log.clone();
        other.weight = 320.0;
        assert_ne!(log, other);

        let mut other = log.clone();
        other.reps = 4;
        assert_ne!(log, other);

        let mut other = log.clone();
        other.user_id = 2;
        assert_ne!(log, other);

        let mut other = log.clone();
        other.exercise = "Deadlift (sumo)".to_string();
        assert_ne!(log, other);
    }

    #[test]
    fn test_user_new_defaults_admin_false() {
        let user = User::new("testuser1".to_string(), "testuser1".to_string());
        assert_eq!(user.id, 0);
        assert!(!user.is_admin);
    }

    #[test]
    fn test_user_equality_is_structural() {
        let user = User::new("admin1".to_string(), "admin1".to_string());
        let same = user.clone();
        assert_eq!(user, same);
        assert_eq!(hash_of(&user), hash_of(&same));

        let mut admin = user.clone();
        admin.is_admin = true;
        assert_ne!(user, admin);
    }

    #[test]
    fn test_gym_log_display_lists_fields() {
        let log = GymLog::new("Bench Press".to_string(), 135.0, 5, 2);
        let rendered = log.to_string();
        assert!(rendered.starts_with("Bench Press\n"));
        assert!(rendered.contains("weight: 135"));
        assert!(rendered.contains("reps: 5"));
    }
}

//! Intake state: which question a user is on and what they answered so far.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The steps of the intake conversation.
///
/// Progresses linearly: Age → Smoker → Family → Symptoms → City. There is
/// no terminal variant; finishing the City step deletes the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakeStep {
    Age,
    Smoker,
    Family,
    Symptoms,
    City,
}

impl IntakeStep {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: IntakeStep) -> bool {
        use IntakeStep::*;
        matches!(
            (self, target),
            (Age, Smoker) | (Smoker, Family) | (Family, Symptoms) | (Symptoms, City)
        )
    }

    /// Get the next step in the linear progression, if any.
    pub fn next(&self) -> Option<IntakeStep> {
        use IntakeStep::*;
        match self {
            Age => Some(Smoker),
            Smoker => Some(Family),
            Family => Some(Symptoms),
            Symptoms => Some(City),
            City => None,
        }
    }
}

impl std::fmt::Display for IntakeStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Age => "age",
            Self::Smoker => "smoker",
            Self::Family => "family",
            Self::Symptoms => "symptoms",
            Self::City => "city",
        };
        write!(f, "{s}")
    }
}

/// One user's in-progress intake.
///
/// Fields for steps not yet reached stay `None`; each is written exactly
/// once, by the step that collects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub step: IntakeStep,
    pub age: Option<i64>,
    pub smoker: Option<bool>,
    pub family_history: Option<bool>,
    /// Insertion-ordered, no duplicates.
    pub symptoms: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// A fresh session waiting for the user's age.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            step: IntakeStep::Age,
            age: None,
            smoker: None,
            family_history: None,
            symptoms: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Advance to the next step. Returns an error at the last step.
    pub fn advance(&mut self) -> Result<IntakeStep, String> {
        let next = self
            .step
            .next()
            .ok_or_else(|| "Already at final step".to_string())?;
        if !self.step.can_transition_to(next) {
            return Err(format!("Cannot transition from {} to {}", self.step, next));
        }
        self.step = next;
        self.touch();
        Ok(next)
    }

    /// Record a symptom. Returns `false` if it was empty or already present.
    pub fn add_symptom(&mut self, symptom: &str) -> bool {
        self.touch();
        if symptom.is_empty() || self.symptoms.iter().any(|s| s == symptom) {
            return false;
        }
        self.symptoms.push(symptom.to_string());
        true
    }

    /// Mark the session as active now.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Whether the session has been idle for longer than `idle_timeout`.
    pub fn is_idle_for(&self, idle_timeout: std::time::Duration, now: DateTime<Utc>) -> bool {
        match chrono::Duration::from_std(idle_timeout) {
            Ok(timeout) => now - self.updated_at > timeout,
            Err(_) => false,
        }
    }
}

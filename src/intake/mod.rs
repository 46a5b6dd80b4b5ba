//! Intake conversation: the asthma travel-risk questionnaire.
//!
//! A user starts an intake, answers age, smoking, family history,
//! symptoms and destination in that order, and receives a risk report
//! built from their answers plus the destination's live AQI. Progress is
//! held per user in the `SessionStore` and dropped once the report is sent.

pub mod fuzzy;
pub mod machine;
pub mod model;
pub mod prompts;
pub mod risk;
pub mod state;
pub mod store;

pub use machine::IntakeMachine;
pub use model::{City, QuickReply, Reply};
pub use risk::{RiskAssessment, RiskLevel, assess_risk};
pub use state::{IntakeStep, Session};
pub use store::{SessionStore, spawn_expiry_task};

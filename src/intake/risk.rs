//! Travel risk scoring.

use serde::{Deserialize, Serialize};

/// AQI above this adds to the score.
pub const AQI_UNHEALTHY: i64 = 100;

const ADVICE_LOW: &str = "เดินทางได้ตามปกติ ดูแลสุขภาพทั่วไป";
const ADVICE_MEDIUM: &str = "ระวัง พกยา inhaler, ใส่หน้ากาก, หลีกเลี่ยงฝุ่น/ควัน";
const ADVICE_HIGH: &str = "ไม่ควรเดินทาง ควรปรึกษาแพทย์ก่อน";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Classify a raw score: ≤2 low, 3–5 medium, ≥6 high.
    pub fn from_score(score: u32) -> Self {
        match score {
            0..=2 => Self::Low,
            3..=5 => Self::Medium,
            _ => Self::High,
        }
    }

    /// Fixed advisory text for this level.
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Low => ADVICE_LOW,
            Self::Medium => ADVICE_MEDIUM,
            Self::High => ADVICE_HIGH,
        }
    }

    /// User-facing label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "ต่ำ",
            Self::Medium => "ปานกลาง",
            Self::High => "สูง",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskAssessment {
    pub score: u32,
    pub level: RiskLevel,
    pub advice: &'static str,
}

/// Score a completed intake. Total over all inputs; ages are not validated.
pub fn assess_risk(
    age: i64,
    smoker: bool,
    family_history: bool,
    symptom_count: usize,
    aqi: Option<i64>,
) -> RiskAssessment {
    let mut score: u32 = 0;
    if !(12..=60).contains(&age) {
        score += 1;
    }
    if smoker {
        score += 2;
    }
    if family_history {
        score += 2;
    }
    score = score.saturating_add(u32::try_from(symptom_count).unwrap_or(u32::MAX));
    if aqi.is_some_and(|v| v > AQI_UNHEALTHY) {
        score = score.saturating_add(2);
    }

    let level = RiskLevel::from_score(score);
    RiskAssessment {
        score,
        level,
        advice: level.advice(),
    }
}

//! Fixed replies, keyword tables, quick-reply sets and the final report.
//!
//! Every keyword and marker here is lowercase NFC, matching the form
//! inbound text is normalized to before the state machine sees it.

use super::model::{City, QuickReply};
use super::risk::RiskAssessment;
use super::state::Session;

// ── Replies ─────────────────────────────────────────────────────────────

pub const RESET_DONE: &str = "🔄 รีเซ็ตข้อมูลเรียบร้อยแล้ว\nพิมพ์ 'ประเมิน' เพื่อเริ่มใหม่";
pub const ASK_AGE: &str = "กรุณาใส่อายุของคุณ (ตัวเลข):";
pub const HELP: &str = "พิมพ์ 'ประเมิน' เพื่อเริ่มทำแบบสอบถาม หรือ 'รีเซ็ต' เพื่อเริ่มใหม่";
pub const AGE_RETRY: &str = "❌ กรุณาใส่อายุเป็นตัวเลขอีกครั้ง";
pub const ASK_SMOKER: &str = "คุณสูบบุหรี่หรือไม่?";
pub const ASK_FAMILY: &str = "ครอบครัวของคุณมีประวัติหอบหืดหรือไม่?";
pub const CHOICE_RETRY: &str = "❌ กรุณาเลือกจากตัวเลือกที่ให้ไว้";
pub const ASK_SYMPTOMS: &str = "เลือกอาการของคุณ (เลือกได้หลายครั้ง กด 'ถัดไป' เมื่อเสร็จ):";
pub const SYMPTOM_RETRY: &str = "❌ กรุณาเลือกอาการจากตัวเลือก หรือกด 'ถัดไป'";
pub const ASK_CITY: &str = "เลือกเมืองที่จะไป:";
pub const CITY_RETRY: &str = "❌ กรุณาเลือกเมืองจากตัวเลือก";
pub const SESSION_LOST: &str = "⚠️ ไม่พบข้อมูลการประเมินของคุณ กรุณาพิมพ์ 'ประเมิน' เพื่อเริ่มใหม่";

/// Confirmation after a symptom button press.
pub fn symptom_added(symptom: &str) -> String {
    format!("✅ เพิ่มอาการ: {symptom}\nเลือกอาการอื่นต่อ หรือกด 'ถัดไป' เมื่อเสร็จ:")
}

// ── Keywords and markers ────────────────────────────────────────────────

pub const RESET_KEYWORDS: &[&str] = &["reset", "รีเซ็ต"];
pub const START_PREFIX: &str = "ประเมิน";
pub const START_KEYWORDS: &[&str] = &["ประเมิน", "start"];

pub const SMOKER_YES: &[&str] = &["yes", "สูบ", "สูบบุหรี่"];
pub const SMOKER_NO: &[&str] = &["no", "ไม่สูบ", "ไม่สูบบุหรี่"];
pub const FAMILY_YES: &[&str] = &["yes", "มี"];
pub const FAMILY_NO: &[&str] = &["no", "ไม่มี"];

pub const SYMPTOM_PREFIX: &str = "อาการ:";
pub const SYMPTOM_DONE_MARKERS: &[&str] = &["symptom:done", "ถัดไป"];
pub const SYMPTOM_DONE_KEYWORDS: &[&str] = &["done", "ถัดไป"];

pub const CITY_PREFIX: &str = "เมือง:";

/// Symptom button labels, in display order.
pub const SYMPTOMS: [&str; 5] = ["ไอ", "จาม", "หายใจมีเสียงวี้ด", "แน่นหน้าอก", "เหนื่อยง่าย"];

const AQI_UNAVAILABLE: &str = "ไม่สามารถดึงค่าได้";
const NONE: &str = "ไม่มี";

// ── Quick replies ───────────────────────────────────────────────────────

pub fn smoker_choices() -> Vec<QuickReply> {
    vec![
        QuickReply::new("สูบบุหรี่", "smoker:y"),
        QuickReply::new("ไม่สูบบุหรี่", "smoker:n"),
    ]
}

pub fn family_choices() -> Vec<QuickReply> {
    vec![
        QuickReply::new("มี", "family:y"),
        QuickReply::new("ไม่มี", "family:n"),
    ]
}

pub fn symptom_choices() -> Vec<QuickReply> {
    let mut choices: Vec<QuickReply> = SYMPTOMS
        .iter()
        .map(|s| QuickReply::new(s, &format!("{SYMPTOM_PREFIX}{s}")))
        .collect();
    choices.push(QuickReply::new("ถัดไป", "symptom:done"));
    choices
}

pub fn city_choices() -> Vec<QuickReply> {
    City::ALL
        .iter()
        .map(|c| QuickReply::new(c.display_name(), &city_marker(*c)))
        .collect()
}

/// The text a city button sends.
pub fn city_marker(city: City) -> String {
    format!("{CITY_PREFIX}{}", city.display_name())
}

// ── Report ──────────────────────────────────────────────────────────────

/// Render the final assessment message.
pub fn render_report(
    session: &Session,
    city: City,
    aqi: Option<i64>,
    assessment: &RiskAssessment,
) -> String {
    let age = session
        .age
        .map(|a| a.to_string())
        .unwrap_or_else(|| "-".to_string());
    let smoker = if session.smoker.unwrap_or(false) { "ใช่" } else { "ไม่ใช่" };
    let family = if session.family_history.unwrap_or(false) { "มี" } else { NONE };
    let symptoms = if session.symptoms.is_empty() {
        NONE.to_string()
    } else {
        session.symptoms.join(", ")
    };
    let aqi = aqi
        .map(|v| v.to_string())
        .unwrap_or_else(|| AQI_UNAVAILABLE.to_string());

    format!(
        "📌 แบบประเมินความเสี่ยงโรคหอบหืด\n\
         อายุ: {age}\n\
         สูบบุหรี่: {smoker}\n\
         ครอบครัว: {family}\n\
         อาการ: {symptoms}\n\
         \n\
         🌫 AQI ({city}): {aqi}\n\
         \n\
         ⚠️ ระดับความเสี่ยง: {level}\n\
         💡 คำแนะนำ: {advice}",
        level = assessment.level,
        advice = assessment.advice,
    )
}

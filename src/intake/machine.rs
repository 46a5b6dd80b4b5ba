//! Intake state machine: turns one inbound message into one reply.
//!
//! Global commands (reset, start) are checked first, in that order, then
//! the user's current step decides how the text is read. Steps only move
//! forward; invalid input leaves the session untouched and re-prompts.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::{debug, info};
use unicode_normalization::UnicodeNormalization;

use crate::aqi::AqiProvider;

use super::fuzzy::{DEFAULT_THRESHOLD, closest_match, is_close_match, is_close_match_scaled};
use super::model::{City, Reply};
use super::prompts;
use super::risk::assess_risk;
use super::state::{IntakeStep, Session};
use super::store::SessionStore;

static RESET_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:reset|รีเซ็ต)\b").expect("valid reset regex"));
static SMOKER_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^smoker\s*[:=]?\s*([yn])").expect("valid smoker regex"));
static FAMILY_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^family\s*[:=]?\s*([yn])").expect("valid family regex"));

/// Canonical form of inbound text: NFC, trimmed, lowercased.
pub fn normalize(raw: &str) -> String {
    raw.nfc().collect::<String>().trim().to_lowercase()
}

/// Parse an age: digits only (ASCII or Thai), no sign or decimal point.
pub fn parse_age(text: &str) -> Option<i64> {
    if text.is_empty() {
        return None;
    }
    text.chars().try_fold(0i64, |acc, c| {
        let digit = match c {
            '0'..='9' => c as u32 - '0' as u32,
            '\u{0E50}'..='\u{0E59}' => c as u32 - 0x0E50,
            _ => return None,
        };
        acc.checked_mul(10)?.checked_add(i64::from(digit))
    })
}

/// Match a yes/no answer.
///
/// Order: button marker, exact keyword, then fuzzy keyword. The
/// affirmative set wins whenever both would match at the same stage. The
/// fuzzy stage scales its tolerance to each keyword's length, so two-letter
/// keywords like "no" and "มี" only match exactly.
fn match_choice(text: &str, marker: &Regex, yes: &[&str], no: &[&str]) -> Option<bool> {
    if text.is_empty() {
        return None;
    }
    if let Some(caps) = marker.captures(text) {
        return Some(&caps[1] == "y");
    }
    if yes.contains(&text) {
        return Some(true);
    }
    if no.contains(&text) {
        return Some(false);
    }
    if is_close_match_scaled(text, yes, DEFAULT_THRESHOLD) {
        return Some(true);
    }
    if is_close_match_scaled(text, no, DEFAULT_THRESHOLD) {
        return Some(false);
    }
    None
}

fn is_reset(text: &str) -> bool {
    RESET_WORD.is_match(text)
        || (!text.is_empty() && is_close_match(text, prompts::RESET_KEYWORDS, DEFAULT_THRESHOLD))
}

fn is_start(text: &str) -> bool {
    text.starts_with(prompts::START_PREFIX)
        || (!text.is_empty() && is_close_match(text, prompts::START_KEYWORDS, DEFAULT_THRESHOLD))
}

fn is_symptoms_done(text: &str) -> bool {
    prompts::SYMPTOM_DONE_MARKERS.iter().any(|m| text.contains(m))
        || (!text.is_empty()
            && is_close_match(text, prompts::SYMPTOM_DONE_KEYWORDS, DEFAULT_THRESHOLD))
}

/// Resolve free text to a city: button marker, then any alias contained in
/// the text, then the single nearest alias within the fuzzy threshold.
pub fn resolve_city(text: &str) -> Option<City> {
    if let Some(name) = text.strip_prefix(prompts::CITY_PREFIX) {
        if let Some(city) = City::from_alias(name.trim()) {
            return Some(city);
        }
    }

    if let Some(city) = City::ALL
        .into_iter()
        .find(|city| city.aliases().iter().any(|alias| text.contains(alias)))
    {
        return Some(city);
    }

    if text.is_empty() {
        return None;
    }
    let aliases: Vec<&str> = City::ALL.iter().flat_map(|c| c.aliases()).collect();
    closest_match(text, &aliases, DEFAULT_THRESHOLD).and_then(City::from_alias)
}

/// Drives each user's intake through the session store.
pub struct IntakeMachine {
    store: Arc<SessionStore>,
    aqi: Arc<dyn AqiProvider>,
}

impl IntakeMachine {
    pub fn new(store: Arc<SessionStore>, aqi: Arc<dyn AqiProvider>) -> Self {
        Self { store, aqi }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Handle one raw inbound message from `user_id` and produce the reply.
    pub async fn handle(&self, user_id: &str, raw_text: &str) -> Reply {
        let text = normalize(raw_text);
        debug!(user_id = %user_id, text = ?text, "Inbound message");

        if is_reset(&text) {
            self.store.remove(user_id).await;
            info!(user_id = %user_id, "Session reset");
            return Reply::text(prompts::RESET_DONE);
        }

        if is_start(&text) {
            self.store.put(user_id, Session::new()).await;
            info!(user_id = %user_id, "Session started");
            return Reply::text(prompts::ASK_AGE);
        }

        let Some(mut session) = self.store.get(user_id).await else {
            return Reply::text(prompts::HELP);
        };

        match session.step {
            IntakeStep::Age => match parse_age(&text) {
                Some(age) => {
                    session.age = Some(age);
                    self.advance(user_id, session).await;
                    Reply::text(prompts::ASK_SMOKER).with_quick_replies(prompts::smoker_choices())
                }
                None => {
                    self.keep_alive(user_id, session).await;
                    Reply::text(prompts::AGE_RETRY)
                }
            },
            IntakeStep::Smoker => {
                match match_choice(&text, &SMOKER_MARKER, prompts::SMOKER_YES, prompts::SMOKER_NO)
                {
                    Some(smoker) => {
                        session.smoker = Some(smoker);
                        self.advance(user_id, session).await;
                        Reply::text(prompts::ASK_FAMILY)
                            .with_quick_replies(prompts::family_choices())
                    }
                    None => {
                        self.keep_alive(user_id, session).await;
                        Reply::text(prompts::CHOICE_RETRY)
                            .with_quick_replies(prompts::smoker_choices())
                    }
                }
            }
            IntakeStep::Family => {
                match match_choice(&text, &FAMILY_MARKER, prompts::FAMILY_YES, prompts::FAMILY_NO)
                {
                    Some(family) => {
                        session.family_history = Some(family);
                        self.advance(user_id, session).await;
                        Reply::text(prompts::ASK_SYMPTOMS)
                            .with_quick_replies(prompts::symptom_choices())
                    }
                    None => {
                        self.keep_alive(user_id, session).await;
                        Reply::text(prompts::CHOICE_RETRY)
                            .with_quick_replies(prompts::family_choices())
                    }
                }
            }
            IntakeStep::Symptoms => {
                if let Some(label) = text.strip_prefix(prompts::SYMPTOM_PREFIX) {
                    let symptom = label.trim();
                    if session.add_symptom(symptom) {
                        debug!(user_id = %user_id, symptom = %symptom, "Symptom recorded");
                    }
                    self.store.put(user_id, session).await;
                    Reply::text(prompts::symptom_added(symptom))
                        .with_quick_replies(prompts::symptom_choices())
                } else if is_symptoms_done(&text) {
                    self.advance(user_id, session).await;
                    Reply::text(prompts::ASK_CITY).with_quick_replies(prompts::city_choices())
                } else {
                    self.keep_alive(user_id, session).await;
                    Reply::text(prompts::SYMPTOM_RETRY)
                        .with_quick_replies(prompts::symptom_choices())
                }
            }
            IntakeStep::City => match resolve_city(&text) {
                Some(city) => self.complete(user_id, city).await,
                None => {
                    self.keep_alive(user_id, session).await;
                    Reply::text(prompts::CITY_RETRY).with_quick_replies(prompts::city_choices())
                }
            },
        }
    }

    /// Move the session to its next step and store it.
    async fn advance(&self, user_id: &str, mut session: Session) {
        let from = session.step;
        match session.advance() {
            Ok(to) => debug!(user_id = %user_id, from = %from, to = %to, "Step advanced"),
            Err(e) => tracing::warn!(user_id = %user_id, "Failed to advance intake: {}", e),
        }
        self.store.put(user_id, session).await;
    }

    /// Refresh the idle clock on a session whose step did not change.
    async fn keep_alive(&self, user_id: &str, mut session: Session) {
        session.touch();
        self.store.put(user_id, session).await;
    }

    /// Final step: look up air quality, score, report, and end the session.
    async fn complete(&self, user_id: &str, city: City) -> Reply {
        let aqi = self.aqi.current_aqi(city.feed_name()).await;

        // The session may have been reset or expired while the lookup ran.
        let Some(session) = self.store.remove(user_id).await else {
            info!(user_id = %user_id, "Session vanished before report");
            return Reply::text(prompts::SESSION_LOST);
        };
        // A restart during the lookup leaves a fresh session that must survive.
        if session.step != IntakeStep::City {
            info!(user_id = %user_id, step = %session.step, "Session restarted before report");
            self.store.put(user_id, session).await;
            return Reply::text(prompts::SESSION_LOST);
        }

        let assessment = assess_risk(
            session.age.unwrap_or_default(),
            session.smoker.unwrap_or(false),
            session.family_history.unwrap_or(false),
            session.symptoms.len(),
            aqi,
        );
        info!(
            user_id = %user_id,
            city = %city.feed_name(),
            aqi = ?aqi,
            score = assessment.score,
            level = ?assessment.level,
            "Intake completed"
        );

        Reply::text(prompts::render_report(&session, city, aqi, &assessment))
    }
}

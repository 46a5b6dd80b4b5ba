//! Outbound reply and destination city models.

use serde::{Deserialize, Serialize};

/// A tappable suggestion attached to a reply. Tapping sends `text` back
/// as an ordinary message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickReply {
    pub label: String,
    pub text: String,
}

impl QuickReply {
    pub fn new(label: &str, text: &str) -> Self {
        Self {
            label: label.to_string(),
            text: text.to_string(),
        }
    }
}

/// The single outbound message produced for one inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quick_replies: Vec<QuickReply>,
}

impl Reply {
    /// A plain text reply.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quick_replies: Vec::new(),
        }
    }

    /// Attach quick-reply suggestions.
    pub fn with_quick_replies(mut self, quick_replies: Vec<QuickReply>) -> Self {
        self.quick_replies = quick_replies;
        self
    }
}

/// The destinations the bot can report on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum City {
    Bangkok,
    ChiangMai,
    Phuket,
    KhonKaen,
}

impl City {
    pub const ALL: [City; 4] = [City::Bangkok, City::ChiangMai, City::Phuket, City::KhonKaen];

    /// Name shown to users and in the report.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Bangkok => "กรุงเทพ",
            Self::ChiangMai => "เชียงใหม่",
            Self::Phuket => "ภูเก็ต",
            Self::KhonKaen => "ขอนแก่น",
        }
    }

    /// Lowercase English name, also accepted as typed input.
    pub fn english_name(&self) -> &'static str {
        match self {
            Self::Bangkok => "bangkok",
            Self::ChiangMai => "chiang mai",
            Self::Phuket => "phuket",
            Self::KhonKaen => "khon kaen",
        }
    }

    /// Station slug for the AQI feed.
    pub fn feed_name(&self) -> &'static str {
        match self {
            Self::Bangkok => "bangkok",
            Self::ChiangMai => "chiang-mai",
            Self::Phuket => "phuket",
            Self::KhonKaen => "khon-kaen",
        }
    }

    /// Every name that resolves to this city.
    pub fn aliases(&self) -> [&'static str; 2] {
        [self.display_name(), self.english_name()]
    }

    /// Look a city up by any of its aliases.
    pub fn from_alias(alias: &str) -> Option<City> {
        Self::ALL
            .into_iter()
            .find(|city| city.aliases().contains(&alias))
    }
}

impl std::fmt::Display for City {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

//! Sentiment set and the sentiment-to-temperature mapping.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Closed sentiment set produced by the classifier.
///
/// Total by construction: classification failures are substituted with
/// [`Sentiment::Neutral`] by the caller, never left undefined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    /// Upbeat or satisfied user message.
    Positive,
    /// Neither clearly positive nor negative.
    #[default]
    Neutral,
    /// Frustrated or unhappy user message.
    Negative,
}

impl Sentiment {
    /// Sampling temperature used for the completion call.
    ///
    /// The constants are empirical tuning values carried unchanged across
    /// releases.
    #[must_use]
    pub const fn temperature(self) -> f64 {
        match self {
            Self::Positive => 0.7,
            Self::Negative => 0.5,
            Self::Neutral => 0.6,
        }
    }

    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Neutral => "neutral",
            Self::Negative => "negative",
        }
    }

    /// Parse a free-form model reply leniently; `None` when no sentiment word
    /// is present.
    #[must_use]
    pub fn from_model_reply(reply: &str) -> Option<Self> {
        let lower = reply.to_lowercase();
        if lower.contains("positive") {
            Some(Self::Positive)
        } else if lower.contains("negative") {
            Some(Self::Negative)
        } else if lower.contains("neutral") {
            Some(Self::Neutral)
        } else {
            None
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_table() {
        assert!((Sentiment::Positive.temperature() - 0.7).abs() < f64::EPSILON);
        assert!((Sentiment::Negative.temperature() - 0.5).abs() < f64::EPSILON);
        assert!((Sentiment::Neutral.temperature() - 0.6).abs() < f64::EPSILON);
    }

    #[test]
    fn default_is_neutral() {
        assert_eq!(Sentiment::default(), Sentiment::Neutral);
    }

    #[test]
    fn lenient_reply_parsing() {
        assert_eq!(
            Sentiment::from_model_reply("Positive."),
            Some(Sentiment::Positive)
        );
        assert_eq!(
            Sentiment::from_model_reply("The sentiment is NEGATIVE"),
            Some(Sentiment::Negative)
        );
        assert_eq!(
            Sentiment::from_model_reply("neutral"),
            Some(Sentiment::Neutral)
        );
        assert_eq!(Sentiment::from_model_reply("no idea"), None);
    }
}

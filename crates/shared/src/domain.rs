use std::fmt;

use serde::{Deserialize, Serialize};

/// Tone directive forwarded to the analysis service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonalityMode {
    Nice,
    Mean,
}

impl PersonalityMode {
    pub const ALL: [PersonalityMode; 2] = [PersonalityMode::Nice, PersonalityMode::Mean];

    pub fn as_str(self) -> &'static str {
        match self {
            PersonalityMode::Nice => "nice",
            PersonalityMode::Mean => "mean",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PersonalityMode::Nice => "Play nice 😇",
            PersonalityMode::Mean => "Roast me 🍗",
        }
    }
}

impl fmt::Display for PersonalityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One generated dilemma with two mutually exclusive options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub prompt_text: String,
    pub option_a: String,
    pub option_b: String,
}

impl Scenario {
    /// Builds a scenario only when the prompt and both options are non-blank.
    pub fn well_formed(
        prompt_text: impl Into<String>,
        option_a: impl Into<String>,
        option_b: impl Into<String>,
    ) -> Option<Self> {
        let scenario = Self {
            prompt_text: prompt_text.into(),
            option_a: option_a.into(),
            option_b: option_b.into(),
        };
        let blank = [&scenario.prompt_text, &scenario.option_a, &scenario.option_b]
            .iter()
            .any(|text| text.trim().is_empty());
        (!blank).then_some(scenario)
    }

    pub fn options(&self) -> [&str; 2] {
        [&self.option_a, &self.option_b]
    }

    /// Returns the option that was not picked, or `None` when `picked` is
    /// neither of the two options.
    pub fn avoided_option(&self, picked: &str) -> Option<&str> {
        if picked == self.option_a {
            Some(&self.option_b)
        } else if picked == self.option_b {
            Some(&self.option_a)
        } else {
            None
        }
    }
}

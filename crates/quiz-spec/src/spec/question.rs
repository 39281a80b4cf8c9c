use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One selectable answer of a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct OptionSpec {
    /// Token recorded in the answer set and fed to scoring.
    pub value: String,
    pub label: String,
    #[serde(default)]
    pub icon: String,
}

/// A single quiz question with its closed set of options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct QuestionSpec {
    pub id: String,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtext: Option<String>,
    pub options: Vec<OptionSpec>,
}

impl QuestionSpec {
    pub fn option(&self, value: &str) -> Option<&OptionSpec> {
        self.options.iter().find(|option| option.value == value)
    }

    pub fn accepts(&self, value: &str) -> bool {
        self.option(value).is_some()
    }

    pub fn option_values(&self) -> Vec<String> {
        self.options
            .iter()
            .map(|option| option.value.clone())
            .collect()
    }
}

use serde::{Deserialize, Serialize};

use crate::answers::AnswerSet;
use crate::events::SessionId;
use crate::score::QualificationResult;

/// Contact details captured after the result is shown.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LeadForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl LeadForm {
    pub fn new(
        name: impl Into<String>,
        phone: impl Into<String>,
        email: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            email,
        }
    }

    /// Names of required fields that are blank.
    pub fn missing_required(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push("name".to_string());
        }
        if self.phone.trim().is_empty() {
            missing.push("phone".to_string());
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing_required().is_empty()
    }

    pub fn has_email(&self) -> bool {
        self.email
            .as_deref()
            .is_some_and(|email| !email.trim().is_empty())
    }

    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or_default()
    }
}

/// Payload handed to the lead webhook once a session submits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadSubmission {
    pub session_id: SessionId,
    pub lead: LeadForm,
    pub answers: AnswerSet,
    pub qualification: QualificationResult,
}

use handlebars::{Handlebars, no_escape};
use serde_json::json;
use thiserror::Error;

use crate::lead::LeadForm;
use crate::score::QualificationResult;

const RESULT_TEMPLATE: &str = "result";
const THANK_YOU_TEMPLATE: &str = "thank_you";

const RESULT_SOURCE: &str = "{{message}} (score {{score}}/100)
Based on your answers, our team should review your case.
{{#if factors}}Positive factors: {{#each factors}}{{this}}{{#unless @last}}, {{/unless}}{{/each}}
{{/if}}";

const THANK_YOU_SOURCE: &str = "Thank You, {{first_name}}!
Your free case evaluation request has been received.
What Happens Next?
  1. Our team will review your responses
  2. An attorney will call you within 24 hours
  3. We'll discuss your options at no cost";

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template registration failed: {0}")]
    Register(#[from] Box<handlebars::TemplateError>),
    #[error("template rendering failed: {0}")]
    Render(#[from] handlebars::RenderError),
}

/// Renders the user-facing result and confirmation copy.
pub struct CopyTemplates {
    registry: Handlebars<'static>,
}

impl CopyTemplates {
    pub fn new() -> Result<Self, TemplateError> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(no_escape);
        registry
            .register_template_string(RESULT_TEMPLATE, RESULT_SOURCE)
            .map_err(Box::new)?;
        registry
            .register_template_string(THANK_YOU_TEMPLATE, THANK_YOU_SOURCE)
            .map_err(Box::new)?;
        Ok(Self { registry })
    }

    pub fn result_banner(&self, result: &QualificationResult) -> Result<String, TemplateError> {
        let data = json!({
            "message": result.message,
            "score": result.score,
            "factors": result.factors,
        });
        Ok(self.registry.render(RESULT_TEMPLATE, &data)?)
    }

    pub fn thank_you(&self, lead: &LeadForm) -> Result<String, TemplateError> {
        let data = json!({ "first_name": lead.first_name() });
        Ok(self.registry.render(THANK_YOU_TEMPLATE, &data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answers::AnswerSet;
    use crate::score::score;

    #[test]
    fn result_banner_lists_factors() {
        let templates = CopyTemplates::new().expect("templates");
        let result = score(&AnswerSet::from_pairs([
            ("condition", "yes"),
            ("duration", "yes"),
        ]));
        let text = templates.result_banner(&result).expect("render");
        assert!(text.starts_with("You May Qualify (score 55/100)"));
        assert!(text.contains("Positive factors: disabling condition, long-term condition"));
    }

    #[test]
    fn result_banner_omits_empty_factor_line() {
        let templates = CopyTemplates::new().expect("templates");
        let text = templates
            .result_banner(&score(&AnswerSet::default()))
            .expect("render");
        assert!(!text.contains("Positive factors"));
    }

    #[test]
    fn thank_you_uses_first_name() {
        let templates = CopyTemplates::new().expect("templates");
        let lead = LeadForm::new("Maria Lopez", "555-0101", None);
        let text = templates.thank_you(&lead).expect("render");
        assert!(text.starts_with("Thank You, Maria!"));
    }
}

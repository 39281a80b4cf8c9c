use serde_json::{Map, Value, json};

use crate::spec::QuizSpec;

/// JSON Schema describing a complete answer document for `spec`.
pub fn generate(spec: &QuizSpec) -> Value {
    let mut properties = Map::new();
    for question in &spec.questions {
        let mut property = Map::new();
        property.insert("type".into(), Value::String("string".into()));
        property.insert("title".into(), Value::String(question.prompt.clone()));
        if let Some(subtext) = &question.subtext {
            property.insert("description".into(), Value::String(subtext.clone()));
        }
        property.insert(
            "enum".into(),
            Value::Array(
                question
                    .option_values()
                    .into_iter()
                    .map(Value::String)
                    .collect(),
            ),
        );
        properties.insert(question.id.clone(), Value::Object(property));
    }

    let required: Vec<Value> = spec
        .questions
        .iter()
        .map(|question| Value::String(question.id.clone()))
        .collect();

    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": format!("{} answers", spec.title),
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false,
    })
}

/// JSON Schema of the quiz definition format itself.
pub fn quiz_spec_schema() -> Result<Value, serde_json::Error> {
    serde_json::to_value(schemars::schema_for!(QuizSpec))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_schema_enumerates_option_tokens() {
        let spec = QuizSpec::builtin().unwrap();
        let schema = generate(&spec);
        assert_eq!(
            schema["properties"]["work_history"]["enum"],
            json!(["yes_recent", "yes_older", "no"])
        );
        assert_eq!(schema["required"].as_array().unwrap().len(), 5);
        assert_eq!(schema["additionalProperties"], false);
    }

    #[test]
    fn quiz_spec_schema_lists_questions() {
        let schema = quiz_spec_schema().expect("schema");
        assert!(schema["properties"]["questions"].is_object());
    }
}

//! Form data validation against field specs
//!
//! Checks run in a fixed order per field: required, then the kind's
//! type check, then constraint rules. A required failure short-circuits
//! the rest; form-level validation surfaces only the first failing
//! message per field.

use crate::form::{FieldValue, FormData};
use crate::template::config::{FieldKind, FieldSpec, FormConfig};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use url::Url;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

/// Result of validating a whole form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// True iff no field produced an error
    pub is_valid: bool,
    /// First failing message per field name
    pub errors: BTreeMap<String, String>,
}

/// Validate a single value against its field spec
///
/// Returns every failing message for the field, in check order. An
/// empty optional field passes without further checks.
#[must_use]
pub fn validate_field(value: Option<&FieldValue>, spec: &FieldSpec) -> Vec<String> {
    let mut errors = Vec::new();

    let provided = value.is_some_and(|v| !v.is_empty());

    if spec.required && !provided {
        errors.push(format!("{} is required", spec.display_label()));
        return errors;
    }

    if !provided {
        return errors;
    }

    let value = match value {
        Some(v) => v,
        None => return errors,
    };

    match spec.kind {
        FieldKind::Email => {
            if !value.as_text().is_some_and(|s| EMAIL.is_match(s)) {
                errors.push("Invalid email address".to_string());
            }
        }
        FieldKind::Url => {
            if !value.as_text().is_some_and(|s| Url::parse(s).is_ok()) {
                errors.push("Invalid URL".to_string());
            }
        }
        FieldKind::Number => {
            if !numeric_value(value).is_some_and(f64::is_finite) {
                errors.push("Must be a valid number".to_string());
            }
        }
        _ => {}
    }

    if let Some(rules) = &spec.validation {
        let length = value_length(value);

        if let Some(min_length) = rules.min_length {
            if length < min_length {
                errors.push(format!("Minimum {min_length} characters required"));
            }
        }

        if let Some(max_length) = rules.max_length {
            if length > max_length {
                errors.push(format!("Maximum {max_length} characters allowed"));
            }
        }

        if let (Some(pattern), Some(text)) = (&rules.pattern, value.as_text()) {
            // an uncompilable pattern is a template-config bug; skip it
            // rather than failing every submission
            if let Ok(re) = Regex::new(pattern) {
                if !re.is_match(text) {
                    errors.push(
                        rules
                            .pattern_message
                            .clone()
                            .unwrap_or_else(|| "Invalid format".to_string()),
                    );
                }
            }
        }

        if spec.kind == FieldKind::Number {
            if let Some(num) = numeric_value(value) {
                if let Some(min) = rules.min {
                    if num < min {
                        errors.push(format!("Minimum value is {min}"));
                    }
                }
                if let Some(max) = rules.max {
                    if num > max {
                        errors.push(format!("Maximum value is {max}"));
                    }
                }
            }
        }
    }

    errors
}

/// Validate every field the form declares
///
/// Only the first failing message per field is surfaced.
#[must_use]
pub fn validate_form(data: &FormData, form: &FormConfig) -> ValidationReport {
    let mut errors = BTreeMap::new();

    for step in &form.steps {
        for field in &step.fields {
            let field_errors = validate_field(data.get(&field.name), field);
            if let Some(first) = field_errors.into_iter().next() {
                errors.entry(field.name.clone()).or_insert(first);
            }
        }
    }

    ValidationReport {
        is_valid: errors.is_empty(),
        errors,
    }
}

fn numeric_value(value: &FieldValue) -> Option<f64> {
    match value {
        FieldValue::Number(n) => Some(*n),
        FieldValue::Text(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn value_length(value: &FieldValue) -> usize {
    match value {
        FieldValue::Text(s) => s.chars().count(),
        FieldValue::List(items) => items.len(),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::config::{TemplateConfig, ValidationRules};
    use serde_json::json;

    fn spec(name: &str, kind: FieldKind, required: bool) -> FieldSpec {
        FieldSpec {
            name: name.to_string(),
            label: None,
            kind,
            required,
            default: None,
            validation: None,
            options: None,
            max_items: None,
        }
    }

    #[test]
    fn test_required_uses_label() {
        let mut field = spec("name", FieldKind::Text, true);
        field.label = Some("Full Name".to_string());

        let errors = validate_field(None, &field);
        assert_eq!(errors, vec!["Full Name is required"]);

        let errors = validate_field(Some(&"   ".into()), &field);
        assert_eq!(errors, vec!["Full Name is required"]);
    }

    #[test]
    fn test_required_short_circuits() {
        let mut field = spec("email", FieldKind::Email, true);
        field.validation = Some(ValidationRules {
            min_length: Some(5),
            ..ValidationRules::default()
        });

        let errors = validate_field(None, &field);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0], "email is required");
    }

    #[test]
    fn test_empty_optional_skips_checks() {
        let field = spec("website", FieldKind::Url, false);
        assert!(validate_field(None, &field).is_empty());
        assert!(validate_field(Some(&"".into()), &field).is_empty());
    }

    #[test]
    fn test_email_check() {
        let field = spec("email", FieldKind::Email, false);
        assert!(validate_field(Some(&"ada@example.com".into()), &field).is_empty());
        assert_eq!(
            validate_field(Some(&"not an email".into()), &field),
            vec!["Invalid email address"]
        );
        assert_eq!(
            validate_field(Some(&"a@b".into()), &field),
            vec!["Invalid email address"]
        );
    }

    #[test]
    fn test_url_check() {
        let field = spec("website", FieldKind::Url, false);
        assert!(validate_field(Some(&"https://example.com/x".into()), &field).is_empty());
        assert_eq!(
            validate_field(Some(&"example.com".into()), &field),
            vec!["Invalid URL"]
        );
    }

    #[test]
    fn test_number_check() {
        let field = spec("years", FieldKind::Number, false);
        assert!(validate_field(Some(&"42".into()), &field).is_empty());
        assert!(validate_field(Some(&FieldValue::Number(1.5)), &field).is_empty());
        assert_eq!(
            validate_field(Some(&"seven".into()), &field),
            vec!["Must be a valid number"]
        );
    }

    #[test]
    fn test_length_rules() {
        let mut field = spec("bio", FieldKind::Textarea, false);
        field.validation = Some(ValidationRules {
            min_length: Some(3),
            max_length: Some(5),
            ..ValidationRules::default()
        });

        assert_eq!(
            validate_field(Some(&"ab".into()), &field),
            vec!["Minimum 3 characters required"]
        );
        assert_eq!(
            validate_field(Some(&"abcdef".into()), &field),
            vec!["Maximum 5 characters allowed"]
        );
        assert!(validate_field(Some(&"abcd".into()), &field).is_empty());
    }

    #[test]
    fn test_pattern_rule_custom_message() {
        let mut field = spec("handle", FieldKind::Text, false);
        field.validation = Some(ValidationRules {
            pattern: Some("^@[a-z]+$".to_string()),
            pattern_message: Some("Handles start with @".to_string()),
            ..ValidationRules::default()
        });

        assert!(validate_field(Some(&"@ada".into()), &field).is_empty());
        assert_eq!(
            validate_field(Some(&"ada".into()), &field),
            vec!["Handles start with @"]
        );
    }

    #[test]
    fn test_pattern_rule_default_message() {
        let mut field = spec("handle", FieldKind::Text, false);
        field.validation = Some(ValidationRules {
            pattern: Some("^[0-9]+$".to_string()),
            ..ValidationRules::default()
        });

        assert_eq!(
            validate_field(Some(&"abc".into()), &field),
            vec!["Invalid format"]
        );
    }

    #[test]
    fn test_numeric_bounds() {
        let mut field = spec("age", FieldKind::Number, false);
        field.validation = Some(ValidationRules {
            min: Some(18.0),
            max: Some(99.0),
            ..ValidationRules::default()
        });

        assert_eq!(
            validate_field(Some(&"12".into()), &field),
            vec!["Minimum value is 18"]
        );
        assert_eq!(
            validate_field(Some(&"120".into()), &field),
            vec!["Maximum value is 99"]
        );
        assert!(validate_field(Some(&"42".into()), &field).is_empty());
    }

    #[test]
    fn test_validate_form_first_error_per_field() {
        let raw = json!({
            "formConfig": {
                "steps": [
                    {
                        "fields": [
                            { "name": "name", "label": "Name", "required": true },
                            { "name": "email", "type": "email", "required": true }
                        ]
                    }
                ]
            }
        });
        let config = TemplateConfig::parse(&raw).unwrap();

        let mut data = FormData::new();
        data.insert("email".to_string(), "nope".into());

        let report = validate_form(&data, &config.form);
        assert!(!report.is_valid);
        assert_eq!(report.errors.get("name").map(String::as_str), Some("Name is required"));
        assert_eq!(
            report.errors.get("email").map(String::as_str),
            Some("Invalid email address")
        );

        data.insert("name".to_string(), "Ada".into());
        data.insert("email".to_string(), "ada@example.com".into());
        let report = validate_form(&data, &config.form);
        assert!(report.is_valid);
        assert!(report.errors.is_empty());
    }
}

// Common validation types and traits

/// A failed rule on one field. `rule` is the translation key under
/// `validation.` (e.g. `required`, `max.string`).
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub field: String,
    pub rule: String,
    pub params: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    pub fn add_error(&mut self, field: &str, rule: &str) {
        self.add_error_with(field, rule, &[]);
    }

    pub fn add_error_with(&mut self, field: &str, rule: &str, params: &[(&str, &str)]) {
        self.is_valid = false;
        self.errors.push(ValidationError {
            field: field.to_string(),
            rule: rule.to_string(),
            params: params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        });
    }

    pub fn has_error(&self, field: &str, rule: &str) -> bool {
        self.errors
            .iter()
            .any(|e| e.field == field && e.rule == rule)
    }
}

pub trait Validator<T> {
    fn validate(&self, data: &T) -> ValidationResult;
}

use super::models::Company;
use crate::common::{ValidationResult, Validator};

pub const NAME_MAX_LENGTH: usize = 255;

impl Validator<Company> for Company {
    fn validate(&self, data: &Company) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.name.trim().is_empty() {
            result.add_error("name", "required");
        }

        if data.name.chars().count() > NAME_MAX_LENGTH {
            result.add_error_with(
                "name",
                "max.string",
                &[("max", &NAME_MAX_LENGTH.to_string())],
            );
        }

        result
    }
}

//! Validation helpers for DTOs.

use validator::ValidationError;

/// Validates that a category list is non-empty and holds no blank names.
pub fn validate_categories(categories: &Vec<String>) -> Result<(), ValidationError> {
    if categories.is_empty() {
        let mut err = ValidationError::new("categories_empty");
        err.message = Some("At least one category is required".into());
        return Err(err);
    }

    if categories.iter().any(|category| category.trim().is_empty()) {
        let mut err = ValidationError::new("categories_blank");
        err.message = Some("Category names must not be blank".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_categories_valid() {
        assert!(validate_categories(&vec!["cadetes".to_owned()]).is_ok());
        assert!(validate_categories(&vec!["cadetes".to_owned(), "juveniles".to_owned()]).is_ok());
    }

    #[test]
    fn test_validate_categories_invalid() {
        assert!(validate_categories(&vec![]).is_err()); // empty list
        assert!(validate_categories(&vec!["".to_owned()]).is_err()); // blank name
        assert!(validate_categories(&vec!["cadetes".to_owned(), "  ".to_owned()]).is_err());
    }

}

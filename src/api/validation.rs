use super::ApiError;
use crate::constants::MAX_RANKING_LIMIT;
use crate::domain::RatingValue;

pub fn validate_id(kind: &str, id: i32) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid {} ID: {}. ID must be a positive integer",
            kind, id
        )));
    }
    Ok(id)
}

pub fn validate_rating_value(value: i32, max: i32) -> Result<i32, ApiError> {
    if !RatingValue::in_range(value, max) {
        return Err(ApiError::validation(format!(
            "Invalid rating value: {}. Value must be between 0 and {}",
            value, max
        )));
    }
    Ok(value)
}

pub fn validate_limit(limit: u64) -> Result<u64, ApiError> {
    if !(1..=MAX_RANKING_LIMIT).contains(&limit) {
        return Err(ApiError::validation(format!(
            "Invalid limit: {}. Limit must be between 1 and {}",
            limit, MAX_RANKING_LIMIT
        )));
    }
    Ok(limit)
}

pub fn validate_tag_name(name: &str) -> Result<&str, ApiError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Tag name cannot be empty"));
    }
    if trimmed.len() > 100 {
        return Err(ApiError::validation(
            "Tag name must be 100 characters or less",
        ));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_id() {
        assert!(validate_id("user", 1).is_ok());
        assert!(validate_id("user", 12345).is_ok());
        assert!(validate_id("user", 0).is_err());
        assert!(validate_id("episode", -1).is_err());
    }

    #[test]
    fn test_validate_rating_value() {
        assert!(validate_rating_value(0, 20).is_ok());
        assert!(validate_rating_value(20, 20).is_ok());
        assert!(validate_rating_value(21, 20).is_err());
        assert!(validate_rating_value(-1, 20).is_err());
    }

    #[test]
    fn test_validate_limit() {
        assert!(validate_limit(1).is_ok());
        assert!(validate_limit(50).is_ok());
        assert!(validate_limit(0).is_err());
        assert!(validate_limit(51).is_err());
    }

    #[test]
    fn test_validate_tag_name() {
        assert!(validate_tag_name("drama").is_ok());
        assert!(validate_tag_name("  drama  ").is_ok());
        assert!(validate_tag_name("").is_err());
        assert!(validate_tag_name("   ").is_err());
        assert!(validate_tag_name(&"a".repeat(101)).is_err());
    }
}

//! Name and color rules for categories and tags.
//!
//! Names:
//! - Leading/trailing whitespace is ignored (callers store the trimmed form)
//! - Cannot be empty after trimming
//! - At most 64 characters
//! - No control characters
//!
//! Uniqueness is case-insensitive: "Work" and "work" are the same name.
//!
//! Colors are `#RGB`, `#RRGGBB` or `#AARRGGBB` hex strings.

pub const MAX_NAME_CHARS: usize = 64;

/// Validates a category or tag name.
///
/// # Examples
/// ```
/// use seahorse_core::taxonomy::validation::validate_name;
///
/// assert!(validate_name("Work").is_ok());
/// assert!(validate_name("  Reading list ").is_ok());
///
/// assert!(validate_name("").is_err());
/// assert!(validate_name("   ").is_err());
/// assert!(validate_name("tab\there").is_err());
/// ```
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty);
    }

    let count = trimmed.chars().count();
    if count > MAX_NAME_CHARS {
        return Err(ValidationError::TooLong(count));
    }

    if let Some(ch) = trimmed.chars().find(|c| c.is_control()) {
        return Err(ValidationError::ControlCharacter(ch));
    }

    Ok(())
}

/// Case-insensitive name equality.
pub fn names_match(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// Checks a `#`-prefixed hex color of 3, 6 or 8 digits.
pub fn validate_color(hex: &str) -> Result<(), ValidationError> {
    let digits = hex
        .strip_prefix('#')
        .ok_or_else(|| ValidationError::InvalidColor(hex.to_string()))?;
    let valid_len = matches!(digits.len(), 3 | 6 | 8);
    if !valid_len || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ValidationError::InvalidColor(hex.to_string()));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Empty,
    /// Carries the offending length in characters.
    TooLong(usize),
    ControlCharacter(char),
    InvalidColor(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Empty => write!(f, "name cannot be empty"),
            ValidationError::TooLong(count) => write!(
                f,
                "name is {} characters long (maximum is {})",
                count, MAX_NAME_CHARS
            ),
            ValidationError::ControlCharacter(ch) => {
                write!(f, "name contains control character {:?}", ch)
            }
            ValidationError::InvalidColor(value) => {
                write!(f, "'{}' is not a hex color (expected #RRGGBB)", value)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

//! Validation helpers for DTOs.

use std::collections::HashSet;

use validator::ValidationError;

use crate::dto::tournament::RingConfigurationInput;

/// Largest number of rings a tournament may configure.
pub const MAX_RINGS: usize = 10;
/// Highest ring number accepted.
pub const MAX_RING_NUMBER: u32 = 10;

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Validates a tournament ring layout.
///
/// # Examples
///
/// ```ignore
/// validate_ring_configuration(&[ring(1, "Red"), ring(2, "Blue")]) // Ok
/// validate_ring_configuration(&[])                                // Err - no rings
/// validate_ring_configuration(&[ring(1, "Red"), ring(2, "Red")])  // Err - color reused
/// ```
pub fn validate_ring_configuration(rings: &[RingConfigurationInput]) -> Result<(), ValidationError> {
    if rings.is_empty() || rings.len() > MAX_RINGS {
        return Err(invalid(
            "ring_count",
            "Tournament must have between 1 and 10 rings",
        ));
    }

    if rings.iter().any(|ring| ring.color.trim().is_empty()) {
        return Err(invalid("ring_color_blank", "Ring colors must not be blank"));
    }

    let mut colors = HashSet::new();
    if !rings.iter().all(|ring| colors.insert(ring.color.as_str())) {
        return Err(invalid("ring_color_unique", "Ring colors must be unique"));
    }

    if rings
        .iter()
        .any(|ring| ring.ring_number < 1 || ring.ring_number > MAX_RING_NUMBER)
    {
        return Err(invalid(
            "ring_number_range",
            "Ring numbers must be between 1 and 10",
        ));
    }

    let mut numbers = HashSet::new();
    if !rings.iter().all(|ring| numbers.insert(ring.ring_number)) {
        return Err(invalid("ring_number_unique", "Ring numbers must be unique"));
    }

    Ok(())
}

/// Validates that race numbers are not repeated within one tournament.
pub fn validate_unique_race_numbers(numbers: &[u32]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    if numbers.iter().all(|number| seen.insert(*number)) {
        Ok(())
    } else {
        Err(invalid("race_number_unique", "Race numbers must be unique"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(ring_number: u32, color: &str) -> RingConfigurationInput {
        RingConfigurationInput {
            ring_number,
            color: color.into(),
        }
    }

    fn code(result: Result<(), ValidationError>) -> String {
        result.unwrap_err().code.to_string()
    }

    #[test]
    fn test_valid_ring_configuration() {
        assert!(validate_ring_configuration(&[ring(1, "Red"), ring(2, "Blue")]).is_ok());
        let ten: Vec<_> = (1..=10).map(|n| ring(n, &format!("c{n}"))).collect();
        assert!(validate_ring_configuration(&ten).is_ok());
    }

    #[test]
    fn test_ring_count_bounds() {
        assert_eq!(code(validate_ring_configuration(&[])), "ring_count");
        let eleven: Vec<_> = (1..=11).map(|n| ring(n, &format!("c{n}"))).collect();
        assert_eq!(code(validate_ring_configuration(&eleven)), "ring_count");
    }

    #[test]
    fn test_ring_colors() {
        assert_eq!(
            code(validate_ring_configuration(&[ring(1, "Red"), ring(2, "Red")])),
            "ring_color_unique"
        );
        assert_eq!(
            code(validate_ring_configuration(&[ring(1, "  ")])),
            "ring_color_blank"
        );
    }

    #[test]
    fn test_ring_numbers() {
        assert_eq!(
            code(validate_ring_configuration(&[ring(0, "Red")])),
            "ring_number_range"
        );
        assert_eq!(
            code(validate_ring_configuration(&[ring(11, "Red")])),
            "ring_number_range"
        );
        assert_eq!(
            code(validate_ring_configuration(&[ring(3, "Red"), ring(3, "Blue")])),
            "ring_number_unique"
        );
    }

    #[test]
    fn test_unique_race_numbers() {
        assert!(validate_unique_race_numbers(&[1, 2, 3]).is_ok());
        assert!(validate_unique_race_numbers(&[1, 2, 1]).is_err());
    }
}

use crate::error::{AppError, AppResult};
use regex::Regex;

/// Validate an East-African mobile number in international format
/// (+254xxxxxxxxx, +255xxxxxxxxx, +256xxxxxxxxx). Mobile-money cashouts
/// carry one of these as their account details.
pub fn validate_mobile_number(phone: &str) -> AppResult<()> {
    let phone_regex = Regex::new(r"^\+25[456]\d{9}$")
        .map_err(|e| AppError::InternalError(format!("Invalid phone regex: {e}")))?;

    if !phone_regex.is_match(phone) {
        return Err(AppError::ValidationError(
            "Invalid mobile number, expected international format (+254xxxxxxxxx)".to_string(),
        ));
    }

    Ok(())
}

/// Normalize a local-format number (07xx...) to international format.
pub fn format_mobile_number(phone: &str, country_code: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    if phone.starts_with('+') {
        phone.to_string()
    } else if digits.len() == 10 && digits.starts_with('0') {
        format!("+{}{}", country_code, &digits[1..])
    } else if digits.len() == 9 {
        format!("+{country_code}{digits}")
    } else {
        phone.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_mobile_number() {
        assert!(validate_mobile_number("+254712345678").is_ok());
        assert!(validate_mobile_number("+255712345678").is_ok());
        assert!(validate_mobile_number("+256712345678").is_ok());
        assert!(validate_mobile_number("0712345678").is_err());
        assert!(validate_mobile_number("+25471234567").is_err()); // too short
        assert!(validate_mobile_number("+14155550123").is_err()); // wrong region
    }

    #[test]
    fn test_format_mobile_number() {
        assert_eq!(format_mobile_number("0712345678", "254"), "+254712345678");
        assert_eq!(format_mobile_number("712345678", "254"), "+254712345678");
        assert_eq!(format_mobile_number("+254712345678", "254"), "+254712345678");
    }
}

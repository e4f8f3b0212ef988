use chrono::Utc;
use uuid::Uuid;

/// Invoice reference stamped on an approved cashout, e.g. `INV-20260114-8F3A21C9`.
pub fn generate_invoice_reference() -> String {
    let date = Utc::now().format("%Y%m%d");
    let suffix = Uuid::new_v4().simple().to_string()[..8].to_uppercase();
    format!("INV-{date}-{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoice_reference_format() {
        let reference = generate_invoice_reference();
        let parts: Vec<&str> = reference.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "INV");
        assert_eq!(parts[1].len(), 8);
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[2].len(), 8);
        assert!(parts[2].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_invoice_references_are_unique() {
        let a = generate_invoice_reference();
        let b = generate_invoice_reference();
        assert_ne!(a, b);
    }
}

//! Defaulting policy - the sentinels substituted for absent fields

/// Placeholder for absent free-text fields
pub const NOT_AVAILABLE: &str = "N/A";

/// Placeholder for absent date fields
pub const EMPTY_DATE: &str = "";

/// Value used for every unparsable or absent numeric field
pub const ZERO: i64 = 0;

/// Sentinels that deployments may override
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultPolicy {
    pub mobile_phone: String,
    pub pan: String,
    pub bank: String,
    pub account_number: String,
}

impl Default for DefaultPolicy {
    fn default() -> Self {
        DefaultPolicy {
            mobile_phone: NOT_AVAILABLE.to_string(),
            pan: NOT_AVAILABLE.to_string(),
            bank: NOT_AVAILABLE.to_string(),
            account_number: NOT_AVAILABLE.to_string(),
        }
    }
}

impl DefaultPolicy {
    pub fn with_pan_fallback(self, pan: impl Into<String>) -> Self {
        DefaultPolicy {
            pan: pan.into(),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_uses_generic_sentinel() {
        let policy = DefaultPolicy::default();
        assert_eq!(policy.pan, NOT_AVAILABLE);
        assert_eq!(policy.mobile_phone, NOT_AVAILABLE);
    }

    #[test]
    fn test_pan_fallback_override() {
        let policy = DefaultPolicy::default().with_pan_fallback("UNVERIFIED");
        assert_eq!(policy.pan, "UNVERIFIED");
        assert_eq!(policy.bank, NOT_AVAILABLE);
    }
}

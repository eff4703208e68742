//! Account validation rules.

use chrono_tz::Tz;
use rust_decimal::Decimal;

use crate::account::error::AccountValidationError;

/// The validated subset of an account record.
///
/// Repositories build this from create/update input; uniqueness checks
/// (name, external id) need the database and stay in the repository.
#[derive(Debug, Clone)]
pub struct AccountAttributes {
    /// Display name, unique across accounts.
    pub name: String,
    /// Current balance.
    pub balance: Decimal,
    /// Lower balance bound.
    pub min_balance: Decimal,
    /// Upper balance bound.
    pub max_balance: Decimal,
    /// VAT percentage applied to customer invoices.
    pub vat: Decimal,
    /// Optional per-destination rate limit.
    pub destination_rate_limit: Option<Decimal>,
    /// Optional maximum call duration in seconds (also the invoice grace).
    pub max_call_duration: Option<i32>,
    /// Optional concurrent origination capacity.
    pub origination_capacity: Option<i16>,
    /// Optional concurrent termination capacity.
    pub termination_capacity: Option<i16>,
    /// Optional total concurrent capacity.
    pub total_capacity: Option<i16>,
    /// IANA timezone name governing invoice period boundaries.
    pub timezone: String,
    /// Reference template for customer invoices.
    pub customer_invoice_ref_template: String,
    /// Reference template for vendor invoices.
    pub vendor_invoice_ref_template: String,
}

/// Validates an account record, collecting every failure.
///
/// An empty result means the record is acceptable.
#[must_use]
pub fn validate(attrs: &AccountAttributes) -> Vec<AccountValidationError> {
    let mut errors = Vec::new();

    if attrs.name.trim().is_empty() {
        errors.push(AccountValidationError::NameRequired);
    }

    if attrs.max_balance < attrs.min_balance {
        errors.push(AccountValidationError::BalanceBoundsInverted {
            min_balance: attrs.min_balance,
            max_balance: attrs.max_balance,
        });
    }

    if attrs.vat < Decimal::ZERO || attrs.vat > Decimal::ONE_HUNDRED {
        errors.push(AccountValidationError::VatOutOfRange(attrs.vat));
    }

    for (field, value) in [
        ("origination_capacity", attrs.origination_capacity),
        ("termination_capacity", attrs.termination_capacity),
        ("total_capacity", attrs.total_capacity),
    ] {
        if let Some(value) = value
            && value <= 0
        {
            errors.push(AccountValidationError::CapacityNotPositive { field, value });
        }
    }

    if let Some(duration) = attrs.max_call_duration
        && duration <= 0
    {
        errors.push(AccountValidationError::MaxCallDurationNotPositive(duration));
    }

    if let Some(limit) = attrs.destination_rate_limit
        && limit < Decimal::ZERO
    {
        errors.push(AccountValidationError::RateLimitNegative(limit));
    }

    if attrs.timezone.parse::<Tz>().is_err() {
        errors.push(AccountValidationError::UnknownTimezone(
            attrs.timezone.clone(),
        ));
    }

    if attrs.customer_invoice_ref_template.trim().is_empty() {
        errors.push(AccountValidationError::RefTemplateRequired(
            "customer_invoice_ref_template",
        ));
    }
    if attrs.vendor_invoice_ref_template.trim().is_empty() {
        errors.push(AccountValidationError::RefTemplateRequired(
            "vendor_invoice_ref_template",
        ));
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn valid_attrs() -> AccountAttributes {
        AccountAttributes {
            name: "TELCO-US-EAST".to_string(),
            balance: dec!(0),
            min_balance: dec!(-100),
            max_balance: dec!(1000),
            vat: dec!(20),
            destination_rate_limit: None,
            max_call_duration: Some(3600),
            origination_capacity: Some(100),
            termination_capacity: Some(100),
            total_capacity: Some(200),
            timezone: "Europe/Kyiv".to_string(),
            customer_invoice_ref_template: "$id".to_string(),
            vendor_invoice_ref_template: "$id".to_string(),
        }
    }

    #[test]
    fn test_valid_account_passes() {
        assert!(validate(&valid_attrs()).is_empty());
    }

    #[test]
    fn test_inverted_balance_bounds_rejected() {
        let mut attrs = valid_attrs();
        attrs.min_balance = dec!(10);
        attrs.max_balance = dec!(5);
        assert_eq!(
            validate(&attrs),
            vec![AccountValidationError::BalanceBoundsInverted {
                min_balance: dec!(10),
                max_balance: dec!(5),
            }]
        );
    }

    #[test]
    fn test_equal_balance_bounds_accepted() {
        let mut attrs = valid_attrs();
        attrs.min_balance = dec!(0);
        attrs.max_balance = dec!(0);
        assert!(validate(&attrs).is_empty());
    }

    #[test]
    fn test_blank_name_rejected() {
        let mut attrs = valid_attrs();
        attrs.name = "  ".to_string();
        assert_eq!(validate(&attrs), vec![AccountValidationError::NameRequired]);
    }

    #[test]
    fn test_vat_bounds() {
        let mut attrs = valid_attrs();
        attrs.vat = dec!(100);
        assert!(validate(&attrs).is_empty());

        attrs.vat = dec!(100.01);
        assert_eq!(
            validate(&attrs),
            vec![AccountValidationError::VatOutOfRange(dec!(100.01))]
        );

        attrs.vat = dec!(-1);
        assert_eq!(
            validate(&attrs),
            vec![AccountValidationError::VatOutOfRange(dec!(-1))]
        );
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let mut attrs = valid_attrs();
        attrs.total_capacity = Some(0);
        assert_eq!(
            validate(&attrs),
            vec![AccountValidationError::CapacityNotPositive {
                field: "total_capacity",
                value: 0,
            }]
        );
    }

    #[test]
    fn test_unknown_timezone_rejected() {
        let mut attrs = valid_attrs();
        attrs.timezone = "Mars/Olympus_Mons".to_string();
        assert_eq!(
            validate(&attrs),
            vec![AccountValidationError::UnknownTimezone(
                "Mars/Olympus_Mons".to_string()
            )]
        );
    }

    #[test]
    fn test_multiple_failures_collected() {
        let mut attrs = valid_attrs();
        attrs.name = String::new();
        attrs.max_call_duration = Some(0);
        attrs.customer_invoice_ref_template = String::new();
        let errors = validate(&attrs);
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&AccountValidationError::NameRequired));
        assert!(errors.contains(&AccountValidationError::MaxCallDurationNotPositive(0)));
        assert!(errors.contains(&AccountValidationError::RefTemplateRequired(
            "customer_invoice_ref_template"
        )));
    }
}

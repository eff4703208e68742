//! Invoice reference rendering.
//!
//! Accounts carry a per-direction reference template; `$id` expands to the
//! invoice's public UUID. Anything else in the template passes through
//! verbatim.

use uuid::Uuid;

/// Placeholder expanded to the invoice UUID.
const ID_PLACEHOLDER: &str = "$id";

/// Renders an invoice reference from an account's template.
#[must_use]
pub fn render_reference(template: &str, invoice_uuid: Uuid) -> String {
    template.replace(ID_PLACEHOLDER, &invoice_uuid.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template_is_bare_uuid() {
        let uuid = Uuid::now_v7();
        assert_eq!(render_reference("$id", uuid), uuid.to_string());
    }

    #[test]
    fn test_template_with_prefix() {
        let uuid = Uuid::now_v7();
        assert_eq!(
            render_reference("INV-$id", uuid),
            format!("INV-{uuid}")
        );
    }

    #[test]
    fn test_template_without_placeholder_passes_through() {
        let uuid = Uuid::now_v7();
        assert_eq!(render_reference("FIXED-REF", uuid), "FIXED-REF");
    }
}

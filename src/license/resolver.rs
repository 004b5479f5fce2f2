use std::collections::HashMap;

use tracing::debug;

use crate::document::{CustomLicense, NOASSERTION};
use crate::license::aliases;

/// Sentinel the inventory service reports when no license is known.
pub const UNKNOWN_LICENSE: &str = "Unknown License";

/// Resolves reported license strings into SPDX license references.
///
/// Standard identifiers (and expressions built only from them) pass through
/// unchanged. Anything else becomes a custom license, allocated once per
/// distinct string in first-seen order.
#[derive(Debug, Default)]
pub struct LicenseResolver {
    normalize_aliases: bool,
    custom: Vec<CustomLicense>,
    by_text: HashMap<String, usize>,
}

impl LicenseResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also map well-known display names ("MIT License") to SPDX ids.
    pub fn with_aliases(mut self, normalize_aliases: bool) -> Self {
        self.normalize_aliases = normalize_aliases;
        self
    }

    /// Resolve `expression` to the reference a package should carry.
    pub fn resolve(&mut self, expression: Option<&str>) -> String {
        let raw = expression.map(str::trim).unwrap_or("");

        if is_unknown(raw) {
            return NOASSERTION.to_string();
        }

        if is_standard(raw) {
            return raw.to_string();
        }

        if self.normalize_aliases {
            if let Some(id) = aliases::normalize(raw) {
                return id.to_string();
            }
        }

        self.custom_ref(raw)
    }

    /// Custom licenses registered so far, in first-seen order.
    #[cfg(test)]
    pub fn custom_licenses(&self) -> &[CustomLicense] {
        &self.custom
    }

    pub fn into_custom_licenses(self) -> Vec<CustomLicense> {
        self.custom
    }

    fn custom_ref(&mut self, text: &str) -> String {
        if let Some(&idx) = self.by_text.get(text) {
            return self.custom[idx].license_id.clone();
        }

        let license_id = format!("LicenseRef-{}", self.custom.len() + 1);
        debug!(license = text, id = %license_id, "registered custom license");

        self.by_text.insert(text.to_string(), self.custom.len());
        self.custom.push(CustomLicense {
            license_id: license_id.clone(),
            name: text.to_string(),
            extracted_text: format!("The license text for {} is not available", text),
        });
        license_id
    }
}

fn is_unknown(raw: &str) -> bool {
    raw.is_empty()
        || raw.eq_ignore_ascii_case(UNKNOWN_LICENSE)
        || raw.eq_ignore_ascii_case("unknown")
        || raw == NOASSERTION
}

/// True for a standard SPDX id, or an expression whose every term is one.
fn is_standard(raw: &str) -> bool {
    if spdx::license_id(raw).is_some_and(|id| id.name == raw) {
        return true;
    }

    match spdx::Expression::parse(raw) {
        Ok(expr) => expr
            .requirements()
            .all(|req| matches!(req.req.license, spdx::LicenseItem::Spdx { .. })),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_id_unchanged() {
        let mut r = LicenseResolver::new();
        assert_eq!(r.resolve(Some("MIT")), "MIT");
        assert_eq!(r.resolve(Some("Apache-2.0")), "Apache-2.0");
        assert!(r.custom_licenses().is_empty());
    }

    #[test]
    fn test_standard_expression_unchanged() {
        let mut r = LicenseResolver::new();
        assert_eq!(r.resolve(Some("MIT OR Apache-2.0")), "MIT OR Apache-2.0");
        assert!(r.custom_licenses().is_empty());
    }

    #[test]
    fn test_unknown_is_noassertion() {
        let mut r = LicenseResolver::new();
        assert_eq!(r.resolve(Some("Unknown License")), NOASSERTION);
        assert_eq!(r.resolve(Some("")), NOASSERTION);
        assert_eq!(r.resolve(None), NOASSERTION);
        assert!(r.custom_licenses().is_empty());
    }

    #[test]
    fn test_custom_license_allocated_once() {
        let mut r = LicenseResolver::new();
        let first = r.resolve(Some("Proprietary-XYZ"));
        let second = r.resolve(Some("Proprietary-XYZ"));

        assert_eq!(first, "LicenseRef-1");
        assert_eq!(first, second);
        assert_eq!(r.custom_licenses().len(), 1);
        assert_eq!(r.custom_licenses()[0].name, "Proprietary-XYZ");
    }

    #[test]
    fn test_custom_licenses_keep_first_seen_order() {
        let mut r = LicenseResolver::new();
        assert_eq!(r.resolve(Some("Vendor EULA")), "LicenseRef-1");
        assert_eq!(r.resolve(Some("MIT")), "MIT");
        assert_eq!(r.resolve(Some("Internal Use Only")), "LicenseRef-2");
        assert_eq!(r.resolve(Some("Vendor EULA")), "LicenseRef-1");

        let names: Vec<_> = r.custom_licenses().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Vendor EULA", "Internal Use Only"]);
    }

    #[test]
    fn test_mixed_expression_is_custom() {
        let mut r = LicenseResolver::new();
        assert_eq!(r.resolve(Some("MIT AND Vendor-EULA")), "LicenseRef-1");
    }

    #[test]
    fn test_alias_only_when_enabled() {
        let mut plain = LicenseResolver::new();
        assert_eq!(plain.resolve(Some("MIT License")), "LicenseRef-1");

        let mut aliased = LicenseResolver::new().with_aliases(true);
        assert_eq!(aliased.resolve(Some("MIT License")), "MIT");
        assert!(aliased.custom_licenses().is_empty());
    }
}

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::document::ident::sanitize;
use crate::document::{self, ExternalRef, RelationshipType, SpdxPackage, SpdxRelationship};
use crate::error::ExportError;
use crate::license::LicenseResolver;

/// Identity a package was registered under, kept for conflict checks.
///
/// Two components are the same package when their sanitized name and
/// version match; `raw_name` is only kept for diagnostics.
#[derive(Debug, Clone)]
struct Identity {
    key: (String, String),
    raw_name: String,
    license: Option<String>,
}

impl Identity {
    fn new(name: &str, version: &str, license: Option<&str>) -> Self {
        Self {
            key: (sanitize(name), version.to_string()),
            raw_name: name.to_string(),
            license: license.map(str::to_string),
        }
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.raw_name, self.key.1)
    }
}

/// Accumulates the packages and relationships of one document build.
///
/// Packages are unique by SPDXID; relationships are recorded as given.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    packages: Vec<SpdxPackage>,
    relationships: Vec<SpdxRelationship>,
    index: HashMap<String, Identity>,
    internal: bool,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach service back-links to packages that carry one.
    pub fn with_back_links(mut self, internal: bool) -> Self {
        self.internal = internal;
        self
    }

    /// Insert the document's top package. It claims its SPDXID like any
    /// component would, but its licenses are set by the caller.
    pub fn insert_root(&mut self, package: SpdxPackage, name: &str, version: &str) {
        self.index
            .insert(package.spdx_id.clone(), Identity::new(name, version, None));
        self.packages.push(package);
    }

    /// Register a component as a package, returning its SPDXID.
    ///
    /// A component with the same (sanitized name, version) returns the
    /// existing id. A component whose key differs but still lands on a taken
    /// identifier is a [`ExportError::DuplicateIdentifier`].
    pub fn register_package(
        &mut self,
        name: &str,
        version: &str,
        license: Option<&str>,
        href: Option<&str>,
        licenses: &mut LicenseResolver,
    ) -> Result<String, ExportError> {
        let spdx_id = document::package_id(name, version);

        let incoming = Identity::new(name, version, license);

        if let Some(existing) = self.index.get(&spdx_id) {
            if existing.key != incoming.key {
                return Err(ExportError::DuplicateIdentifier {
                    spdx_id,
                    existing: existing.to_string(),
                    incoming: incoming.to_string(),
                });
            }
            if existing.license != incoming.license {
                warn!(
                    package = %existing,
                    reported_as = %incoming,
                    kept = existing.license.as_deref().unwrap_or(""),
                    ignored = license.unwrap_or(""),
                    "component reported with differing licenses; keeping the first"
                );
            }
            return Ok(spdx_id);
        }

        let license_ref = licenses.resolve(license);
        let mut package = SpdxPackage::new(spdx_id.clone(), name, version);
        package.license_concluded = license_ref.clone();
        package.license_declared = license_ref;
        if self.internal {
            if let Some(href) = href {
                package
                    .external_refs
                    .push(ExternalRef::other("BlackDuckHub-Component-Version", href));
            }
        }

        debug!(id = %spdx_id, "registered package");
        self.index.insert(spdx_id.clone(), incoming);
        self.packages.push(package);
        Ok(spdx_id)
    }

    /// Record an edge. Repeated edges are kept; each is a distinct fact.
    pub fn register_relationship(&mut self, from: &str, to: &str, kind: RelationshipType) {
        self.relationships.push(SpdxRelationship {
            spdx_element_id: from.to_string(),
            relationship_type: kind,
            related_spdx_element: to.to_string(),
        });
    }

    #[cfg(test)]
    pub fn packages(&self) -> &[SpdxPackage] {
        &self.packages
    }

    #[cfg(test)]
    pub fn relationships(&self) -> &[SpdxRelationship] {
        &self.relationships
    }

    pub fn into_parts(self) -> (Vec<SpdxPackage>, Vec<SpdxRelationship>) {
        (self.packages, self.relationships)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::NOASSERTION;

    #[test]
    fn test_same_component_registers_once() {
        let mut reg = EntityRegistry::new();
        let mut lic = LicenseResolver::new();

        let a = reg.register_package("libfoo", "2.1", Some("MIT"), None, &mut lic).unwrap();
        let b = reg.register_package("libfoo", "2.1", Some("MIT"), None, &mut lic).unwrap();

        assert_eq!(a, b);
        assert_eq!(reg.packages().len(), 1);
        assert_eq!(reg.packages()[0].license_declared, "MIT");
        assert_eq!(reg.packages()[0].license_concluded, "MIT");
    }

    #[test]
    fn test_same_sanitized_name_shares_identifier() {
        let mut reg = EntityRegistry::new();
        let mut lic = LicenseResolver::new();

        let a = reg.register_package("foo bar", "1.0", Some("MIT"), None, &mut lic).unwrap();
        let b = reg.register_package("foo/bar", "1.0", Some("MIT"), None, &mut lic).unwrap();

        assert_eq!(a, "SPDXRef-Package-foo-bar-1.0");
        assert_eq!(a, b);
        assert_eq!(reg.packages().len(), 1);
        assert_eq!(reg.packages()[0].name, "foo bar");
    }

    #[test]
    fn test_colliding_identifier_with_other_key_is_rejected() {
        let mut reg = EntityRegistry::new();
        let mut lic = LicenseResolver::new();

        reg.register_package("Demo-app", "1.0", None, None, &mut lic).unwrap();
        let err = reg
            .register_package("Demo", "app-1.0", None, None, &mut lic)
            .unwrap_err();

        assert!(matches!(err, ExportError::DuplicateIdentifier { .. }));
        assert_eq!(reg.packages().len(), 1);
    }

    #[test]
    fn test_differing_license_keeps_first() {
        let mut reg = EntityRegistry::new();
        let mut lic = LicenseResolver::new();

        reg.register_package("a", "1", Some("MIT"), None, &mut lic).unwrap();
        reg.register_package("a", "1", Some("Vendor EULA"), None, &mut lic).unwrap();

        assert_eq!(reg.packages()[0].license_declared, "MIT");
        assert!(lic.custom_licenses().is_empty());
    }

    #[test]
    fn test_unknown_license_is_noassertion() {
        let mut reg = EntityRegistry::new();
        let mut lic = LicenseResolver::new();

        reg.register_package("a", "1", Some("Unknown License"), None, &mut lic).unwrap();
        assert_eq!(reg.packages()[0].license_declared, NOASSERTION);
    }

    #[test]
    fn test_relationships_are_not_deduplicated() {
        let mut reg = EntityRegistry::new();
        reg.register_relationship("A", "B", RelationshipType::DependsOn);
        reg.register_relationship("A", "B", RelationshipType::DependsOn);
        assert_eq!(reg.relationships().len(), 2);
    }

    #[test]
    fn test_back_links_only_when_internal() {
        let mut lic = LicenseResolver::new();

        let mut plain = EntityRegistry::new();
        plain
            .register_package("a", "1", None, Some("https://bd/cv/1"), &mut lic)
            .unwrap();
        assert!(plain.packages()[0].external_refs.is_empty());

        let mut internal = EntityRegistry::new().with_back_links(true);
        internal
            .register_package("a", "1", None, Some("https://bd/cv/1"), &mut lic)
            .unwrap();
        let refs = &internal.packages()[0].external_refs;
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].reference_type, "BlackDuckHub-Component-Version");
        assert_eq!(refs[0].reference_locator, "https://bd/cv/1");
    }

    #[test]
    fn test_root_claims_identifier() {
        let mut reg = EntityRegistry::new();
        let mut lic = LicenseResolver::new();
        let root = SpdxPackage::new(document::package_id("Demo-app", "1.0"), "Demo-app", "1.0");
        reg.insert_root(root, "Demo-app", "1.0");

        let same = reg
            .register_package("Demo-app", "1.0", None, None, &mut lic)
            .unwrap();
        assert_eq!(same, "SPDXRef-Package-Demo-app-1.0");
        assert_eq!(reg.packages().len(), 1);

        let clash = reg.register_package("Demo", "app-1.0", None, None, &mut lic);
        assert!(matches!(clash, Err(ExportError::DuplicateIdentifier { .. })));
    }
}

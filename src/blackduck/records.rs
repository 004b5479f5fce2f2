//! JSON records returned by the Black Duck REST API.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::models::{Component, ProjectVersion};

/// One page of a paginated list endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default)]
    pub total_count: usize,
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Meta {
    #[serde(default)]
    pub href: String,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl Meta {
    /// Href of the first link with relation `rel`.
    pub fn link(&self, rel: &str) -> Option<&str> {
        self.links
            .iter()
            .find(|l| l.rel == rel)
            .map(|l| l.href.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Link {
    pub rel: String,
    pub href: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectRecord {
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "_meta", default)]
    pub meta: Meta,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionRecord {
    pub version_name: String,
    pub created_at: Option<DateTime<Utc>>,
    pub license: Option<LicenseRecord>,
    #[serde(rename = "_meta", default)]
    pub meta: Meta,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseRecord {
    pub license_display: Option<String>,
}

/// A BOM entry from either the flat or the hierarchical components endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentRecord {
    pub component_name: Option<String>,
    pub component_version_name: Option<String>,
    #[serde(default)]
    pub licenses: Vec<LicenseRecord>,
    pub component_version: Option<String>,
    #[serde(rename = "_meta", default)]
    pub meta: Meta,
}

impl ComponentRecord {
    /// Href listing this node's children in a hierarchical BOM.
    pub fn children_href(&self) -> Option<&str> {
        self.meta.link("children")
    }

    pub fn into_component(self, children: Option<Vec<Component>>) -> Component {
        let license = self
            .licenses
            .into_iter()
            .find_map(|l| l.license_display);
        Component {
            name: self.component_name,
            version: self.component_version_name,
            license,
            href: self.component_version,
            children,
            contains: Vec::new(),
        }
    }
}

/// Combine a project and one of its versions into the exporter's input record.
pub fn to_project_version(project: &ProjectRecord, version: VersionRecord) -> ProjectVersion {
    ProjectVersion {
        project_name: project.name.clone(),
        version_name: version.version_name,
        created_at: version.created_at,
        description: project.description.clone(),
        license: version.license.and_then(|l| l.license_display),
        project_href: project.meta.href.clone(),
        version_href: version.meta.href,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version_page() {
        let json = r#"{
            "totalCount": 1,
            "items": [{
                "versionName": "1.0",
                "createdAt": "2023-04-01T12:30:00.123Z",
                "license": { "licenseDisplay": "Unknown License" },
                "_meta": {
                    "href": "https://hub.example.com/api/projects/p/versions/v",
                    "links": [
                        { "rel": "components", "href": "https://hub.example.com/api/projects/p/versions/v/components" },
                        { "rel": "hierarchical-components", "href": "https://hub.example.com/api/projects/p/versions/v/hierarchical-components" }
                    ]
                }
            }]
        }"#;

        let page: Page<VersionRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(page.total_count, 1);
        let v = &page.items[0];
        assert_eq!(v.version_name, "1.0");
        assert!(v.created_at.is_some());
        assert!(v.meta.link("hierarchical-components").is_some());
        assert!(v.meta.link("vulnerable-components").is_none());
    }

    #[test]
    fn test_component_record_conversion() {
        let json = r#"{
            "componentName": "libfoo",
            "componentVersionName": "2.1",
            "componentVersion": "https://hub.example.com/api/components/c/versions/cv",
            "licenses": [{ "licenseDisplay": "MIT" }],
            "_meta": { "href": "x", "links": [{ "rel": "children", "href": "https://hub.example.com/children" }] }
        }"#;

        let rec: ComponentRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.children_href(), Some("https://hub.example.com/children"));

        let c = rec.into_component(Some(vec![]));
        assert_eq!(c.name.as_deref(), Some("libfoo"));
        assert_eq!(c.version.as_deref(), Some("2.1"));
        assert_eq!(c.license.as_deref(), Some("MIT"));
        assert_eq!(
            c.href.as_deref(),
            Some("https://hub.example.com/api/components/c/versions/cv")
        );
        assert!(!c.has_children());
    }

    #[test]
    fn test_incomplete_component_record() {
        let rec: ComponentRecord = serde_json::from_str(r#"{ "componentName": "x" }"#).unwrap();
        let c = rec.into_component(None);
        assert!(c.version.is_none());
        assert!(c.license.is_none());
        assert!(c.children.is_none());
    }

    #[test]
    fn test_to_project_version() {
        let project: ProjectRecord = serde_json::from_str(
            r#"{ "name": "Demo", "description": "demo", "_meta": { "href": "https://h/api/projects/p" } }"#,
        )
        .unwrap();
        let version: VersionRecord = serde_json::from_str(
            r#"{ "versionName": "1.0", "license": { "licenseDisplay": "MIT" }, "_meta": { "href": "https://h/api/projects/p/versions/v" } }"#,
        )
        .unwrap();

        let pv = to_project_version(&project, version);
        assert_eq!(pv.project_name, "Demo");
        assert_eq!(pv.version_name, "1.0");
        assert_eq!(pv.license.as_deref(), Some("MIT"));
        assert_eq!(pv.description.as_deref(), Some("demo"));
        assert_eq!(pv.project_href, "https://h/api/projects/p");
        assert_eq!(pv.version_href, "https://h/api/projects/p/versions/v");
    }
}

//! Typed SPDX 2.2 document model and JSON output.
//!
//! - [`ident`] — identifier sanitizing and free-text escaping shared by every
//!   record that ends up in the document.

pub mod ident;

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const SPDX_VERSION: &str = "SPDX-2.2";
pub const DATA_LICENSE: &str = "CC0-1.0";
pub const LICENSE_LIST_VERSION: &str = "3.9";
pub const DOCUMENT_ID: &str = "SPDXRef-DOCUMENT";
pub const NOASSERTION: &str = "NOASSERTION";

/// The SPDX document describing one project version.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpdxDocument {
    #[serde(rename = "SPDXID")]
    pub spdx_id: String,
    pub spdx_version: String,
    pub creation_info: CreationInfo,
    pub name: String,
    pub data_license: String,
    pub document_namespace: String,
    pub document_describes: Vec<String>,
    pub download_location: String,
    pub files_analyzed: bool,
    pub copyright_text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub external_refs: Vec<ExternalRef>,
    pub packages: Vec<SpdxPackage>,
    pub relationships: Vec<SpdxRelationship>,
    pub has_extracted_licensing_infos: Vec<CustomLicense>,
}

#[cfg(test)]
impl SpdxDocument {
    /// Look up a package by SPDXID.
    pub fn package(&self, spdx_id: &str) -> Option<&SpdxPackage> {
        self.packages.iter().find(|p| p.spdx_id == spdx_id)
    }

    /// Relationships whose target is `spdx_id`.
    pub fn relationships_to<'a>(
        &'a self,
        spdx_id: &'a str,
    ) -> impl Iterator<Item = &'a SpdxRelationship> + 'a {
        self.relationships
            .iter()
            .filter(move |r| r.related_spdx_element == spdx_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreationInfo {
    pub created: String,
    pub creators: Vec<String>,
    pub license_list_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// A package entry. Every BOM component becomes exactly one of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpdxPackage {
    #[serde(rename = "SPDXID")]
    pub spdx_id: String,
    pub name: String,
    pub version_info: String,
    pub license_concluded: String,
    pub license_declared: String,
    pub download_location: String,
    pub files_analyzed: bool,
    pub copyright_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_comment: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub external_refs: Vec<ExternalRef>,
}

impl SpdxPackage {
    /// A package with every optional assertion left at `NOASSERTION`.
    pub fn new(spdx_id: String, name: &str, version: &str) -> Self {
        Self {
            spdx_id,
            name: ident::quote(name),
            version_info: ident::quote(version),
            license_concluded: NOASSERTION.to_string(),
            license_declared: NOASSERTION.to_string(),
            download_location: NOASSERTION.to_string(),
            files_analyzed: false,
            copyright_text: NOASSERTION.to_string(),
            description: None,
            package_comment: None,
            external_refs: Vec::new(),
        }
    }
}

/// Derive the package SPDXID for a `(name, version)` pair.
pub fn package_id(name: &str, version: &str) -> String {
    ident::sanitize(&format!("SPDXRef-Package-{}-{}", name, version))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationshipType {
    Describes,
    DependsOn,
    Contains,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpdxRelationship {
    pub spdx_element_id: String,
    pub relationship_type: RelationshipType,
    pub related_spdx_element: String,
}

/// A non-standard license, referenced from packages by its `LicenseRef-` id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomLicense {
    pub license_id: String,
    pub name: String,
    pub extracted_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalRef {
    pub reference_category: String,
    pub reference_type: String,
    pub reference_locator: String,
}

impl ExternalRef {
    /// A back-link to a record on the inventory service.
    pub fn other(reference_type: &str, locator: &str) -> Self {
        Self {
            reference_category: "OTHER".to_string(),
            reference_type: reference_type.to_string(),
            reference_locator: locator.to_string(),
        }
    }
}

/// Write the document as pretty-printed JSON. `-` means stdout.
pub fn write_document(doc: &SpdxDocument, output: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(doc)?;
    if output == Path::new("-") {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", json)?;
        return Ok(());
    }
    std::fs::write(output, json + "\n")
        .with_context(|| format!("failed to write {}", output.display()))?;
    Ok(())
}

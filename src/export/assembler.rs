use std::collections::HashSet;

use chrono::{DateTime, Utc};
use reqwest::Url;
use tracing::{info, warn};

use crate::document::{
    self, ident, CreationInfo, ExternalRef, RelationshipType, SpdxDocument, SpdxPackage,
    DATA_LICENSE, DOCUMENT_ID, LICENSE_LIST_VERSION, NOASSERTION, SPDX_VERSION,
};
use crate::error::ExportError;
use crate::export::walker::BomWalker;
use crate::export::ExportContext;
use crate::models::{Bom, ProjectVersion};

/// Namespace host used when the service href carries no usable host.
const FALLBACK_NAMESPACE_HOST: &str = "spdx.org";

const TOP_PACKAGE_COMMENT: &str = "Generated top level package representing Black Duck project";

/// Knobs for a single document build.
#[derive(Debug, Clone)]
pub struct AssembleOptions {
    /// Creation time; also makes the namespace unique per run.
    pub created: DateTime<Utc>,
    /// `creators` entry, e.g. `Tool: bd-spdx-export-0.1.0`.
    pub creator: String,
    /// Attach external references back to the service's records.
    pub internal: bool,
    /// Map license display names to SPDX ids before treating them as custom.
    pub normalize_licenses: bool,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            created: Utc::now(),
            creator: format!("Tool: bd-spdx-export-{}", env!("CARGO_PKG_VERSION")),
            internal: false,
            normalize_licenses: false,
        }
    }
}

/// Build the SPDX document for `version` and its `bom`.
pub fn assemble(
    version: &ProjectVersion,
    bom: &Bom,
    options: &AssembleOptions,
) -> Result<SpdxDocument, ExportError> {
    let mut ctx = ExportContext::new(options.internal, options.normalize_licenses);
    let created = options.created.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string();

    let top_id = document::package_id(&version.project_name, &version.version_name);
    let top = top_package(&top_id, version, &mut ctx);
    ctx.registry
        .insert_root(top, &version.project_name, &version.version_name);
    ctx.registry
        .register_relationship(DOCUMENT_ID, &top_id, RelationshipType::Describes);

    info!(mode = %bom.mode, components = bom.components.len(), "walking BOM");
    let mut walker = BomWalker::new(bom.mode);
    walker.walk(&mut ctx, &top_id, &bom.components, RelationshipType::DependsOn)?;
    if walker.skipped() > 0 {
        warn!(skipped = walker.skipped(), "malformed BOM entries were left out");
    }

    let external_refs = if options.internal {
        vec![
            ExternalRef::other("BlackDuckHub-Project", &version.project_href),
            ExternalRef::other("BlackDuckHub-Project-Version", &version.version_href),
        ]
    } else {
        Vec::new()
    };

    let ExportContext { registry, licenses } = ctx;
    let (packages, relationships) = registry.into_parts();

    let doc = SpdxDocument {
        spdx_id: DOCUMENT_ID.to_string(),
        spdx_version: SPDX_VERSION.to_string(),
        creation_info: CreationInfo {
            created: created.clone(),
            creators: vec![options.creator.clone()],
            license_list_version: LICENSE_LIST_VERSION.to_string(),
            comment: version.description.as_deref().map(ident::quote),
        },
        name: ident::quote(&format!("{}/{}", version.project_name, version.version_name)),
        data_license: DATA_LICENSE.to_string(),
        document_namespace: namespace(version, &created),
        document_describes: vec![top_id],
        download_location: NOASSERTION.to_string(),
        files_analyzed: false,
        copyright_text: NOASSERTION.to_string(),
        external_refs,
        packages,
        relationships,
        has_extracted_licensing_infos: licenses.into_custom_licenses(),
    };

    check_references(&doc)?;
    info!(
        packages = doc.packages.len(),
        relationships = doc.relationships.len(),
        custom_licenses = doc.has_extracted_licensing_infos.len(),
        "document assembled"
    );
    Ok(doc)
}

fn top_package(id: &str, version: &ProjectVersion, ctx: &mut ExportContext) -> SpdxPackage {
    let mut pkg = SpdxPackage::new(id.to_string(), &version.project_name, &version.version_name);
    pkg.license_declared = ctx.licenses.resolve(version.license.as_deref());
    pkg.description = version.description.as_deref().map(ident::quote);
    pkg.package_comment = Some(TOP_PACKAGE_COMMENT.to_string());
    pkg
}

/// `https://<base domain>/spdx/<project>/<version>/<created>`
fn namespace(version: &ProjectVersion, created: &str) -> String {
    let host = Url::parse(&version.version_href)
        .ok()
        .and_then(|url| url.host_str().map(base_domain));
    format!(
        "https://{}/spdx/{}/{}/{}",
        host.as_deref().unwrap_or(FALLBACK_NAMESPACE_HOST),
        urlencoding::encode(&version.project_name),
        urlencoding::encode(&version.version_name),
        created
    )
}

/// Last two DNS labels of `host`, or `host` itself when it has fewer.
fn base_domain(host: &str) -> String {
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() < 2 {
        host.to_string()
    } else {
        labels[labels.len() - 2..].join(".")
    }
}

/// Every relationship endpoint must be a package; the document itself may
/// only appear as the source of the root edge.
fn check_references(doc: &SpdxDocument) -> Result<(), ExportError> {
    let ids: HashSet<&str> = doc.packages.iter().map(|p| p.spdx_id.as_str()).collect();
    for rel in &doc.relationships {
        let from_ok = ids.contains(rel.spdx_element_id.as_str())
            || (rel.spdx_element_id == DOCUMENT_ID
                && rel.relationship_type == RelationshipType::Describes);
        if !from_ok {
            return Err(ExportError::DanglingReference {
                spdx_id: rel.spdx_element_id.clone(),
            });
        }
        if !ids.contains(rel.related_spdx_element.as_str()) {
            return Err(ExportError::DanglingReference {
                spdx_id: rel.related_spdx_element.clone(),
            });
        }
    }
    Ok(())
}

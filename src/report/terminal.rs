use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::document::{RelationshipType, SpdxDocument, NOASSERTION};

/// Print a summary of the exported document to stderr.
pub fn render(doc: &SpdxDocument, output: &Path, verbose: bool, quiet: bool) -> Result<()> {
    let packages = doc.packages.len();
    let relationships = doc.relationships.len();
    let custom = doc.has_extracted_licensing_infos.len();
    let unasserted = doc
        .packages
        .iter()
        .filter(|p| p.license_declared == NOASSERTION)
        .count();

    if quiet {
        eprintln!(
            "Packages: {}  Relationships: {}  Custom licenses: {}  -> {}",
            packages,
            relationships,
            custom.to_string().yellow(),
            output.display()
        );
        return Ok(());
    }

    let by_kind = |kind: RelationshipType| {
        doc.relationships
            .iter()
            .filter(|r| r.relationship_type == kind)
            .count()
    };

    eprintln!();
    eprintln!(" ┌────────────────────────────────────────────────────┐");
    eprintln!(" │  {:<48} │", "SPDX EXPORT".bold());
    eprintln!(" │  {:<48} │", format!("Document         : {}", doc.name));
    eprintln!(" │  {:<48} │", format!("Packages         : {:>5}", packages));
    eprintln!(
        " │  {:<48} │",
        format!(
            "Relationships    : {:>5}  ({} depends, {} contains)",
            relationships,
            by_kind(RelationshipType::DependsOn),
            by_kind(RelationshipType::Contains)
        )
    );
    eprintln!(" │  {:<48} │", format!("Custom licenses  : {:>5}", custom));
    eprintln!(" │  {:<48} │", format!("No license info  : {:>5}", unasserted));
    eprintln!(" │  {:<48} │", summarize_licenses(doc));
    eprintln!(" └────────────────────────────────────────────────────┘");
    eprintln!(" {} {}\n", "Written to".green(), output.display());

    if verbose && custom > 0 {
        eprintln!(" {} Custom licenses:\n", "[INFO]".cyan().bold());
        render_custom_licenses(doc);
        eprintln!();
    }

    Ok(())
}

fn render_custom_licenses(doc: &SpdxDocument) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("License Ref").add_attribute(Attribute::Bold),
            Cell::new("Reported As").add_attribute(Attribute::Bold),
            Cell::new("Packages").add_attribute(Attribute::Bold),
        ]);

    for license in &doc.has_extracted_licensing_infos {
        let used_by = doc
            .packages
            .iter()
            .filter(|p| p.license_declared == license.license_id)
            .count();

        table.add_row(vec![
            Cell::new(&license.license_id).fg(Color::Yellow),
            Cell::new(&license.name),
            Cell::new(used_by).set_alignment(CellAlignment::Right),
        ]);
    }

    eprintln!("{}", table);
}

/// Top three declared licenses, e.g. `[MIT (12), Apache-2.0 (4), NOASSERTION (2)]`.
fn summarize_licenses(doc: &SpdxDocument) -> String {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for pkg in &doc.packages {
        *counts.entry(pkg.license_declared.as_str()).or_insert(0) += 1;
    }

    let mut pairs: Vec<(&str, usize)> = counts.into_iter().collect();
    pairs.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

    let summary: Vec<String> = pairs
        .iter()
        .take(3)
        .map(|(lic, cnt)| format!("{} ({})", lic, cnt))
        .collect();

    if summary.is_empty() {
        String::new()
    } else {
        format!("[{}]", summary.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{assemble, AssembleOptions};
    use crate::models::{Bom, Component, ProjectVersion};

    fn doc() -> SpdxDocument {
        let version = ProjectVersion {
            project_name: "Demo".into(),
            version_name: "1.0".into(),
            created_at: None,
            description: None,
            license: None,
            project_href: "https://h/p".into(),
            version_href: "https://h/p/v".into(),
        };
        let bom = Bom::flat(vec![
            Component::new("a", "1", "MIT"),
            Component::new("b", "1", "MIT"),
            Component::new("c", "1", "Apache-2.0"),
            Component::new("d", "1", "Vendor EULA"),
        ]);
        assemble(&version, &bom, &AssembleOptions::default()).unwrap()
    }

    #[test]
    fn test_summarize_licenses_orders_by_count() {
        assert_eq!(
            summarize_licenses(&doc()),
            "[MIT (2), Apache-2.0 (1), LicenseRef-1 (1)]"
        );
    }

    #[test]
    fn test_render_quiet_and_verbose() {
        let doc = doc();
        render(&doc, Path::new("out.json"), false, true).unwrap();
        render(&doc, Path::new("out.json"), true, false).unwrap();
    }
}

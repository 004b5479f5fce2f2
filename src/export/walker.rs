use std::collections::HashSet;

use tracing::{debug, warn};

use crate::document::RelationshipType;
use crate::error::ExportError;
use crate::export::ExportContext;
use crate::models::{Component, TraversalMode};

/// Depth-first walk over a BOM, registering packages and edges.
///
/// The traversal mode is fixed at construction. A component's subtree is
/// expanded at most once per walk, keyed by SPDXID, while every parent
/// occurrence still gets its own edge.
#[derive(Debug)]
pub struct BomWalker {
    mode: TraversalMode,
    expanded: HashSet<String>,
    skipped: usize,
}

impl BomWalker {
    pub fn new(mode: TraversalMode) -> Self {
        Self {
            mode,
            expanded: HashSet::new(),
            skipped: 0,
        }
    }

    /// Number of malformed entries skipped so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn walk(
        &mut self,
        ctx: &mut ExportContext,
        parent: &str,
        components: &[Component],
        kind: RelationshipType,
    ) -> Result<(), ExportError> {
        for component in components {
            let (name, version) = match identity(component) {
                Ok(pair) => pair,
                Err(err) => {
                    warn!(parent, "skipping BOM entry: {}", err);
                    self.skipped += 1;
                    continue;
                }
            };

            let id = ctx.registry.register_package(
                name,
                version,
                component.license.as_deref(),
                component.href.as_deref(),
                &mut ctx.licenses,
            )?;
            ctx.registry.register_relationship(parent, &id, kind);

            let follow_children =
                self.mode == TraversalMode::Hierarchical && component.has_children();
            let follow_contains = !component.contains.is_empty();
            if !(follow_children || follow_contains) || !self.expanded.insert(id.clone()) {
                continue;
            }

            debug!(id = %id, "expanding component");
            if follow_children {
                if let Some(children) = &component.children {
                    self.walk(ctx, &id, children, RelationshipType::DependsOn)?;
                }
            }
            if follow_contains {
                self.walk(ctx, &id, &component.contains, RelationshipType::Contains)?;
            }
        }
        Ok(())
    }
}

fn identity(component: &Component) -> Result<(&str, &str), ExportError> {
    let name = component.name.as_deref().map(str::trim).unwrap_or("");
    let version = component.version.as_deref().map(str::trim).unwrap_or("");
    if name.is_empty() {
        return Err(ExportError::MalformedComponent {
            reason: format!("missing name (version {:?})", version),
        });
    }
    if version.is_empty() {
        return Err(ExportError::MalformedComponent {
            reason: format!("component {:?} has no version", name),
        });
    }
    Ok((name, version))
}

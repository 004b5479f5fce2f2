//! BOM to SPDX transformation.
//!
//! - [`registry`] — package/relationship accumulator with identifier uniqueness.
//! - [`walker`] — recursive BOM traversal.
//! - [`assembler`] — document envelope, top package and final checks.
//!
//! All mutable state for one document build lives in an [`ExportContext`]
//! created by the assembler and dropped when the document is returned.

pub mod assembler;
pub mod registry;
pub mod walker;

pub use assembler::{assemble, AssembleOptions};

use crate::license::LicenseResolver;
use registry::EntityRegistry;

/// Per-run accumulator passed through the walk.
#[derive(Debug, Default)]
pub struct ExportContext {
    pub registry: EntityRegistry,
    pub licenses: LicenseResolver,
}

impl ExportContext {
    pub fn new(internal: bool, normalize_aliases: bool) -> Self {
        Self {
            registry: EntityRegistry::new().with_back_links(internal),
            licenses: LicenseResolver::new().with_aliases(normalize_aliases),
        }
    }
}

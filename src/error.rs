//! Error types for building an SPDX document.

/// Errors raised while turning a BOM into an SPDX document.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// A BOM entry is missing a required field. Recovered by the walker.
    #[error("malformed component: {reason}")]
    MalformedComponent {
        /// What is missing.
        reason: String,
    },

    /// Two different components map onto the same SPDX identifier.
    #[error("SPDX identifier `{spdx_id}` claimed by both {existing} and {incoming}")]
    DuplicateIdentifier {
        /// The contested identifier.
        spdx_id: String,
        /// `name@version` of the package already registered.
        existing: String,
        /// `name@version` of the component that collided with it.
        incoming: String,
    },

    /// A relationship points at an element that is not in the document.
    #[error("relationship references unknown element `{spdx_id}`")]
    DanglingReference {
        /// The missing identifier.
        spdx_id: String,
    },
}

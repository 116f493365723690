// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error type for shader generation.

use shadenet_graph::{DocumentError, ValueType};

/// Error raised by a single `generate` call
///
/// No partial shader is ever returned alongside one of these; the first
/// failure aborts the whole call.
#[derive(Debug, thiserror::Error)]
pub enum GenError {
    /// The document has not passed validation since its last mutation
    #[error("Document '{0}' has not been validated")]
    DocumentNotValidated(String),

    /// The context has no standard library loaded
    #[error("No standard library loaded for target '{0}'")]
    LibraryNotLoaded(String),

    /// The element is not a material or surface shader node
    #[error("Element '{element}' is not a renderable material or surface shader")]
    InvalidElement {
        /// Element node name
        element: String,
    },

    /// A material element has no connected surface shader
    #[error("Material '{element}' has no connected surface shader")]
    MissingSurfaceShader {
        /// Material node name
        element: String,
    },

    /// No implementation is registered for the category on the target
    #[error("No implementation for node category '{category}' (node '{node}') on target '{target}'")]
    Unresolved {
        /// Node category
        category: String,
        /// Node name
        node: String,
        /// Requested target
        target: String,
    },

    /// The authored node type disagrees with the library definition
    #[error("Node '{node}' of category '{category}' is declared {declared} but the library defines {expected}")]
    DefTypeMismatch {
        /// Node name
        node: String,
        /// Node category
        category: String,
        /// Authored output type
        declared: ValueType,
        /// Library-defined output type
        expected: ValueType,
    },

    /// An authored input is not declared by the node's category
    #[error("Input '{input}' on node '{node}' is not declared by category '{category}'")]
    UnknownInput {
        /// Node name
        node: String,
        /// Input name
        input: String,
        /// Node category
        category: String,
    },

    /// An authored input type cannot feed the library-defined input
    #[error("Input '{input}' on node '{node}' is declared {declared} but the library expects {expected}")]
    InputTypeMismatch {
        /// Node name
        node: String,
        /// Input name
        input: String,
        /// Authored input type
        declared: ValueType,
        /// Library-defined input type
        expected: ValueType,
    },

    /// An input has no value, connection, or library default
    #[error("Input '{input}' on node '{node}' has no value, connection, or default")]
    UnsetInput {
        /// Node name
        node: String,
        /// Input name
        input: String,
    },

    /// Document access failed during traversal
    #[error("Document error during generation: {0}")]
    Document(#[from] DocumentError),

    /// An engine invariant was violated; always a bug, never user input
    #[error("Shader generation internal error: {0}")]
    Internal(String),
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Standard library of node definitions and per-target implementations.
//!
//! The library is loaded from RON assets embedded in the crate: one
//! shared definition catalog, one target-agnostic implementation table,
//! and one implementation table per target family. A context loads the
//! catalog filtered for its target; loading is idempotent.

use crate::context::GenContext;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use shadenet_graph::{Value, ValueType};

const DEFS_ASSET: &str = include_str!("../assets/defs.ron");
const IMPL_COMMON_ASSET: &str = include_str!("../assets/impl_common.ron");
const IMPL_GLSL_ASSET: &str = include_str!("../assets/impl_glsl.ron");
const IMPL_MSL_ASSET: &str = include_str!("../assets/impl_msl.ron");
const IMPL_OSL_ASSET: &str = include_str!("../assets/impl_osl.ron");

/// Type of a definition slot, resolved against the authored node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TypePattern {
    /// A concrete type
    Fixed(ValueType),
    /// The authored node's declared output type
    ///
    /// This is how one `add` definition serves float, vector, and color
    /// signatures.
    Same,
}

/// Declared input slot of a node definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputDef {
    /// Input name
    pub name: String,
    /// Input type pattern
    pub pattern: TypePattern,
    /// Literal fallback used when the input is unconnected
    #[serde(default)]
    pub default: Option<Value>,
    /// Geometric source category wired in when the input is unconnected
    ///
    /// All inputs naming the same source share one emission per run.
    #[serde(default)]
    pub default_geom: Option<String>,
}

/// Reusable node definition, keyed by category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDef {
    /// Node category
    pub category: String,
    /// Output type pattern
    pub output: TypePattern,
    /// Input slots in call order
    pub inputs: Vec<InputDef>,
    /// Targets this definition is available on; `None` means all
    #[serde(default)]
    pub targets: Option<Vec<String>>,
}

impl NodeDef {
    /// Get an input slot by name
    pub fn input(&self, name: &str) -> Option<&InputDef> {
        self.inputs.iter().find(|i| i.name == name)
    }
}

/// How a category is lowered to target source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ImplKind {
    /// Expression template with `{{input}}` tokens
    Inline(String),
    /// Named function whose definition is included once per stage
    Function {
        /// Function name used at call sites
        name: String,
        /// Full function source in the target language
        source: String,
    },
    /// Expression supplied by the backend's geometric bindings
    Geometric,
}

#[derive(Debug, Deserialize)]
struct ImplDef {
    category: String,
    kind: ImplKind,
}

#[derive(Debug, Deserialize)]
struct ImplTable {
    target: String,
    impls: Vec<ImplDef>,
}

#[derive(Debug, Deserialize)]
struct DefFile {
    defs: Vec<NodeDef>,
}

#[derive(Debug, Deserialize)]
struct ImplFile {
    tables: Vec<ImplTable>,
}

/// The wildcard target of implementations shared by every backend
pub const TARGET_ANY: &str = "*";

fn family_of(target: &str) -> Option<(&'static str, &'static str)> {
    match target {
        "glsl" | "essl" | "vulkan" => Some(("glsl", "impl_glsl.ron")),
        "msl" => Some(("msl", "impl_msl.ron")),
        "osl" => Some(("osl", "impl_osl.ron")),
        _ => None,
    }
}

/// Loaded catalog of definitions and implementations for one target
#[derive(Debug)]
pub struct Library {
    target: String,
    defs: IndexMap<String, NodeDef>,
    impls: IndexMap<String, IndexMap<String, ImplKind>>,
}

impl Library {
    /// Load the standard library for a target
    pub fn load(target: &str) -> Result<Self, LibraryError> {
        let (family, family_asset_name) = family_of(target)
            .ok_or_else(|| LibraryError::UnsupportedTarget(target.to_string()))?;
        let family_asset = match family {
            "glsl" => IMPL_GLSL_ASSET,
            "msl" => IMPL_MSL_ASSET,
            _ => IMPL_OSL_ASSET,
        };

        let def_file: DefFile = ron::from_str(DEFS_ASSET).map_err(|source| {
            LibraryError::Parse {
                asset: "defs.ron",
                source,
            }
        })?;

        let mut defs = IndexMap::new();
        for def in def_file.defs {
            let available = def
                .targets
                .as_ref()
                .map_or(true, |targets| targets.iter().any(|t| t == target));
            if available {
                defs.insert(def.category.clone(), def);
            }
        }

        let mut impls: IndexMap<String, IndexMap<String, ImplKind>> = IndexMap::new();
        for (asset_name, asset) in [
            ("impl_common.ron", IMPL_COMMON_ASSET),
            (family_asset_name, family_asset),
        ] {
            let file: ImplFile = ron::from_str(asset).map_err(|source| LibraryError::Parse {
                asset: asset_name,
                source,
            })?;
            for table in file.tables {
                let entry = impls.entry(table.target).or_default();
                for impl_def in table.impls {
                    entry.insert(impl_def.category, impl_def.kind);
                }
            }
        }

        if !impls.contains_key(family) {
            return Err(LibraryError::MissingTable {
                asset: family_asset_name,
                target: family.to_string(),
            });
        }

        tracing::debug!(
            target,
            defs = defs.len(),
            "standard library loaded"
        );
        Ok(Self {
            target: target.to_string(),
            defs,
            impls,
        })
    }

    /// Get the target this library was loaded for
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Get a node definition by category
    pub fn node_def(&self, category: &str) -> Option<&NodeDef> {
        self.defs.get(category)
    }

    /// Number of definitions available on this target
    pub fn def_count(&self) -> usize {
        self.defs.len()
    }

    /// Resolve an implementation along a target fallback chain
    ///
    /// The chain is tried in order; the first table containing the
    /// category wins. Returns the matched target alongside the
    /// implementation.
    pub fn implementation<'a>(
        &'a self,
        category: &str,
        chain: &[&str],
    ) -> Option<(&'a str, &'a ImplKind)> {
        for target in chain {
            if let Some((key, table)) = self.impls.get_key_value(*target) {
                if let Some(kind) = table.get(category) {
                    return Some((key.as_str(), kind));
                }
            }
        }
        None
    }
}

/// Load the standard library into a context
///
/// Idempotent: a context that already holds a library keeps it, and the
/// second call is a no-op. A missing or corrupt library asset is fatal
/// to the context; there is no fallback.
pub fn load_standard_library(context: &mut GenContext) -> Result<(), LibraryError> {
    if context.library().is_some() {
        return Ok(());
    }
    let library = Library::load(&context.target().to_string())?;
    context.set_library(library);
    Ok(())
}

/// Error while loading the standard library
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    /// No library assets exist for this target
    #[error("No standard library for target '{0}'")]
    UnsupportedTarget(String),

    /// An embedded asset failed to parse
    #[error("Failed to parse library asset '{asset}': {source}")]
    Parse {
        /// Asset file name
        asset: &'static str,
        /// Underlying parse error
        #[source]
        source: ron::error::SpannedError,
    },

    /// An asset lacks the implementation table for its own family
    #[error("Library asset '{asset}' is missing the '{target}' implementation table")]
    MissingTable {
        /// Asset file name
        asset: &'static str,
        /// Expected table target
        target: String,
    },
}

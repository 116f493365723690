// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-generation configuration and caches.

use crate::generator::ShaderGenerator;
use crate::library::Library;
use indexmap::IndexMap;
use shadenet_graph::NodeId;
use std::collections::HashMap;
use std::sync::Arc;

/// Options applied to every `generate` call made with a context
#[derive(Debug, Clone)]
pub struct GenOptions {
    /// Decimal digits emitted for float literals
    pub float_digits: usize,
    /// Default precision qualifier for ESSL pixel stages
    pub essl_precision: String,
}

impl Default for GenOptions {
    fn default() -> Self {
        Self {
            float_digits: 6,
            essl_precision: "highp".to_string(),
        }
    }
}

/// Generation context, created fresh per backend
///
/// Owns the target configuration, the loaded standard library, and the
/// per-run caches that guarantee each shared subgraph is emitted once.
/// Contexts are never shared between generators; cached state is
/// generator-specific.
pub struct GenContext {
    target: String,
    options: GenOptions,
    library: Option<Arc<Library>>,
    // Per-run state below, cleared by `begin_run`.
    bindings: HashMap<NodeId, String>,
    functions: IndexMap<String, String>,
    geometrics: IndexMap<String, String>,
    identifiers: HashMap<String, u32>,
}

impl GenContext {
    /// Create a context for the given target
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            options: GenOptions::default(),
            library: None,
            bindings: HashMap::new(),
            functions: IndexMap::new(),
            geometrics: IndexMap::new(),
            identifiers: HashMap::new(),
        }
    }

    /// Create a context bound to a generator's target
    pub fn for_generator(generator: &dyn ShaderGenerator) -> Self {
        Self::new(generator.target())
    }

    /// Get the target this context generates for
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Get the generation options
    pub fn options(&self) -> &GenOptions {
        &self.options
    }

    /// Get the generation options for modification
    pub fn options_mut(&mut self) -> &mut GenOptions {
        &mut self.options
    }

    /// Get the loaded standard library, if any
    pub fn library(&self) -> Option<&Arc<Library>> {
        self.library.as_ref()
    }

    pub(crate) fn set_library(&mut self, library: Library) {
        self.library = Some(Arc::new(library));
    }

    /// Reset all per-run caches at the start of a `generate` call
    pub(crate) fn begin_run(&mut self) {
        self.bindings.clear();
        self.functions.clear();
        self.geometrics.clear();
        self.identifiers.clear();
    }

    /// Get the emitted binding for a node, if it was already visited
    pub(crate) fn binding(&self, node: NodeId) -> Option<&str> {
        self.bindings.get(&node).map(String::as_str)
    }

    pub(crate) fn bind_node(&mut self, node: NodeId, binding: String) {
        self.bindings.insert(node, binding);
    }

    /// Record a function definition, once per run
    pub(crate) fn include_function(&mut self, name: &str, source: &str) {
        if !self.functions.contains_key(name) {
            self.functions.insert(name.to_string(), source.to_string());
        }
    }

    /// Included function definitions in first-use order
    pub(crate) fn functions(&self) -> impl Iterator<Item = (&str, &str)> {
        self.functions.iter().map(|(n, s)| (n.as_str(), s.as_str()))
    }

    /// Get the shared expression bound to a geometric category
    pub(crate) fn geometric(&self, category: &str) -> Option<&str> {
        self.geometrics.get(category).map(String::as_str)
    }

    pub(crate) fn bind_geometric(&mut self, category: &str, expr: &str) {
        self.geometrics
            .insert(category.to_string(), expr.to_string());
    }

    /// Geometric categories referenced this run, in first-use order
    pub(crate) fn geometrics(&self) -> impl Iterator<Item = &str> {
        self.geometrics.keys().map(String::as_str)
    }

    /// Allocate a deterministic identifier derived from a node name
    ///
    /// The name is sanitized to the target identifier charset; repeated
    /// requests for the same base get numeric suffixes.
    pub(crate) fn unique_identifier(&mut self, base: &str) -> String {
        let mut ident: String = base
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
            ident.insert(0, 'n');
        }

        let count = self.identifiers.entry(ident.clone()).or_insert(0);
        *count += 1;
        if *count == 1 {
            format!("{ident}_out")
        } else {
            format!("{ident}_out{count}")
        }
    }
}

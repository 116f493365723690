// SPDX-License-Identifier: MIT OR Apache-2.0
//! Generator contract and the shared traversal driver.

use crate::context::GenContext;
use crate::error::GenError;
use crate::library::{ImplKind, Library, NodeDef, TypePattern, TARGET_ANY};
use crate::shader::{GeneratedShader, Stage};
use crate::syntax::{coerce, Syntax};
use shadenet_graph::{Document, Node, NodeId, ValueType};
use std::sync::Arc;

/// A backend strategy lowering documents to one target language
///
/// Implementations are interchangeable behind this contract; all target
/// quirks live in backend-local syntax tables and stage assembly.
pub trait ShaderGenerator {
    /// Target identifier, e.g. `glsl`
    fn target(&self) -> &'static str;

    /// Parent target consulted when resolving implementations, if any
    fn base_target(&self) -> Option<&'static str> {
        None
    }

    /// Stages this backend emits
    fn stages(&self) -> &'static [Stage];

    /// Generate shader source for a renderable element
    ///
    /// `name` becomes the artifact name. The document must be validated
    /// and the context must carry a loaded standard library; the context
    /// must belong to this generator's target and must not be shared
    /// with other generators.
    fn generate(
        &self,
        name: &str,
        element: NodeId,
        document: &Document,
        context: &mut GenContext,
    ) -> Result<GeneratedShader, GenError>;
}

/// Implementation lookup order for a generator
///
/// Exact target first, then the dialect's base target, then the
/// target-agnostic table. Resolution failure after the full chain is a
/// hard error for the `generate` call.
pub(crate) fn target_chain(generator: &dyn ShaderGenerator) -> Vec<&'static str> {
    let mut chain = vec![generator.target()];
    if let Some(base) = generator.base_target() {
        chain.push(base);
    }
    chain.push(TARGET_ANY);
    chain
}

/// Pixel-stage emission of the subgraph below one shader root
pub(crate) struct EmittedGraph {
    /// Statements of the entry-point body, in dependency order
    pub body: Vec<String>,
    /// Binding holding the root shader node's result
    pub root: String,
    /// Function definitions to include, in first-use order
    pub functions: Vec<(String, String)>,
    /// Geometric source categories referenced, in first-use order
    pub geometrics: Vec<String>,
}

/// Walk the graph below `element` and emit every node once
///
/// This is the driver shared by all backends: it gates on validation,
/// orders the reachable subgraph dependencies-first, resolves each
/// node's implementation along the fallback chain, and substitutes
/// input expressions from bindings, literals, defaults, or shared
/// geometric sources.
pub(crate) fn emit_pixel_graph(
    element: NodeId,
    document: &Document,
    context: &mut GenContext,
    syntax: &dyn Syntax,
    chain: &[&str],
) -> Result<EmittedGraph, GenError> {
    if !document.is_validated() {
        return Err(GenError::DocumentNotValidated(document.name().to_string()));
    }
    let library = context
        .library()
        .cloned()
        .ok_or_else(|| GenError::LibraryNotLoaded(context.target().to_string()))?;

    let root = shader_root(element, document)?;
    let order = document.dependencies_first(root)?;

    context.begin_run();
    let mut body = Vec::new();
    for id in &order {
        let node = document
            .node(*id)
            .ok_or(GenError::Document(shadenet_graph::DocumentError::NodeNotFound(*id)))?;
        emit_node(node, document, &library, context, syntax, chain, &mut body)?;
    }

    let root_binding = context
        .binding(root)
        .ok_or_else(|| GenError::Internal("root node was not emitted".to_string()))?
        .to_string();

    Ok(EmittedGraph {
        body,
        root: root_binding,
        functions: context
            .functions()
            .map(|(n, s)| (n.to_string(), s.to_string()))
            .collect(),
        geometrics: context.geometrics().map(str::to_string).collect(),
    })
}

/// Locate the surface shader node driving generation
fn shader_root(element: NodeId, document: &Document) -> Result<NodeId, GenError> {
    let node = document
        .node(element)
        .ok_or(GenError::Document(shadenet_graph::DocumentError::NodeNotFound(element)))?;
    match node.node_type() {
        ValueType::Surfaceshader => Ok(element),
        ValueType::Material => node
            .input("surfaceshader")
            .and_then(shadenet_graph::Input::connection)
            .ok_or_else(|| GenError::MissingSurfaceShader {
                element: node.name().to_string(),
            }),
        _ => Err(GenError::InvalidElement {
            element: node.name().to_string(),
        }),
    }
}

fn emit_node(
    node: &Node,
    document: &Document,
    library: &Arc<Library>,
    context: &mut GenContext,
    syntax: &dyn Syntax,
    chain: &[&str],
    body: &mut Vec<String>,
) -> Result<(), GenError> {
    // A node with multiple consumers is emitted exactly once.
    if context.binding(node.id()).is_some() {
        return Ok(());
    }

    let unresolved = || GenError::Unresolved {
        category: node.category().to_string(),
        node: node.name().to_string(),
        target: context.target().to_string(),
    };
    let def = library.node_def(node.category()).ok_or_else(unresolved)?;
    let (matched, kind) = library
        .implementation(node.category(), chain)
        .ok_or_else(unresolved)?;

    let out_type = match def.output {
        TypePattern::Fixed(expected) => {
            if node.node_type() != expected {
                return Err(GenError::DefTypeMismatch {
                    node: node.name().to_string(),
                    category: node.category().to_string(),
                    declared: node.node_type(),
                    expected,
                });
            }
            expected
        }
        TypePattern::Same => node.node_type(),
    };

    for input in node.inputs() {
        let slot = def
            .input(input.name())
            .ok_or_else(|| GenError::UnknownInput {
                node: node.name().to_string(),
                input: input.name().to_string(),
                category: node.category().to_string(),
            })?;
        let slot_type = slot_type(slot, out_type);
        if !input.value_type().can_coerce_to(&slot_type) {
            return Err(GenError::InputTypeMismatch {
                node: node.name().to_string(),
                input: input.name().to_string(),
                declared: input.value_type(),
                expected: slot_type,
            });
        }
    }

    let exprs = gather_inputs(node, def, out_type, document, context, syntax)?;

    match kind {
        ImplKind::Inline(template) => {
            let mut expr = template.clone();
            for (slot, bound) in def.inputs.iter().zip(&exprs) {
                expr = expr.replace(&format!("{{{{{}}}}}", slot.name), bound);
            }
            if expr.contains("{{") {
                return Err(GenError::Internal(format!(
                    "unsubstituted token in '{}' template: {expr}",
                    node.category()
                )));
            }
            let binding = context.unique_identifier(node.name());
            body.push(format!(
                "{} {} = {};",
                syntax.type_name(out_type),
                binding,
                expr
            ));
            context.bind_node(node.id(), binding);
        }
        ImplKind::Function { name, source } => {
            context.include_function(name, source);
            let binding = context.unique_identifier(node.name());
            body.push(format!(
                "{} {} = {}({});",
                syntax.type_name(out_type),
                binding,
                name,
                exprs.join(", ")
            ));
            context.bind_node(node.id(), binding);
        }
        ImplKind::Geometric => {
            let expr = geometric_binding(node.category(), node.name(), context, syntax)?;
            context.bind_node(node.id(), expr);
        }
    }

    tracing::debug!(
        node = node.name(),
        category = node.category(),
        implementation = matched,
        "node emitted"
    );
    Ok(())
}

fn slot_type(slot: &crate::library::InputDef, out_type: ValueType) -> ValueType {
    match slot.pattern {
        TypePattern::Fixed(ty) => ty,
        TypePattern::Same => out_type,
    }
}

/// Resolve one expression per definition slot, in call order
fn gather_inputs(
    node: &Node,
    def: &NodeDef,
    out_type: ValueType,
    document: &Document,
    context: &mut GenContext,
    syntax: &dyn Syntax,
) -> Result<Vec<String>, GenError> {
    let mut exprs = Vec::with_capacity(def.inputs.len());
    for slot in &def.inputs {
        let slot_type = slot_type(slot, out_type);
        let authored = node.input(&slot.name);

        let expr = if let Some(producer) = authored.and_then(shadenet_graph::Input::connection) {
            let bound = context
                .binding(producer)
                .ok_or_else(|| {
                    GenError::Internal(format!(
                        "dependency of '{}' was not emitted before use",
                        node.name()
                    ))
                })?
                .to_string();
            let produced = document
                .node(producer)
                .map(Node::node_type)
                .ok_or(GenError::Document(
                    shadenet_graph::DocumentError::NodeNotFound(producer),
                ))?;
            coerce(syntax, bound, produced, slot_type)
        } else if let Some(value) = authored.and_then(shadenet_graph::Input::value) {
            coerce(syntax, syntax.literal(value), value.value_type(), slot_type)
        } else if let Some(category) = &slot.default_geom {
            geometric_binding(category, node.name(), context, syntax)?
        } else if let Some(value) = &slot.default {
            coerce(syntax, syntax.literal(value), value.value_type(), slot_type)
        } else {
            return Err(GenError::UnsetInput {
                node: node.name().to_string(),
                input: slot.name.clone(),
            });
        };
        exprs.push(expr);
    }
    Ok(exprs)
}

/// Shared, once-per-run binding of a geometric source category
fn geometric_binding(
    category: &str,
    node: &str,
    context: &mut GenContext,
    syntax: &dyn Syntax,
) -> Result<String, GenError> {
    if let Some(expr) = context.geometric(category) {
        return Ok(expr.to_string());
    }
    let expr = syntax
        .geometric_expr(category)
        .ok_or_else(|| GenError::Unresolved {
            category: category.to_string(),
            node: node.to_string(),
            target: context.target().to_string(),
        })?;
    context.bind_geometric(category, expr);
    Ok(expr.to_string())
}

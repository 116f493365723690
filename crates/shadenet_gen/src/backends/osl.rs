// SPDX-License-Identifier: MIT OR Apache-2.0
//! Open Shading Language backend.
//!
//! Renderer-oriented target: no rasterization stages, a single pixel
//! stage holding a `surface` shader whose result is a closure.

use crate::context::GenContext;
use crate::error::GenError;
use crate::generator::{emit_pixel_graph, target_chain, EmittedGraph, ShaderGenerator};
use crate::shader::{GeneratedShader, Stage, StageBuilder};
use crate::syntax::Syntax;
use indexmap::IndexMap;
use shadenet_graph::{Document, NodeId, ValueType};

/// Shader generator for OSL-style renderers
pub struct OslShaderGenerator;

impl OslShaderGenerator {
    /// Create the OSL backend
    pub fn new() -> Self {
        Self
    }

    fn pixel_stage(&self, name: &str, graph: &EmittedGraph) -> String {
        let mut stage = StageBuilder::new();

        for (_, source) in &graph.functions {
            stage.add_block(source);
            stage.blank_line();
        }

        stage.add_line(&format!("surface {}", shader_identifier(name)));
        stage.add_line("(");
        stage.add_line("    output closure color out_result = 0");
        stage.add_line(")");
        stage.begin_scope();
        for line in &graph.body {
            stage.add_line(line);
        }
        stage.add_line(&format!("out_result = {};", graph.root));
        stage.end_scope();
        stage.into_code()
    }
}

impl Default for OslShaderGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ShaderGenerator for OslShaderGenerator {
    fn target(&self) -> &'static str {
        "osl"
    }

    fn stages(&self) -> &'static [Stage] {
        &[Stage::Pixel]
    }

    fn generate(
        &self,
        name: &str,
        element: NodeId,
        document: &Document,
        context: &mut GenContext,
    ) -> Result<GeneratedShader, GenError> {
        let syntax = OslSyntax {
            digits: context.options().float_digits,
        };
        let chain = target_chain(self);
        let graph = emit_pixel_graph(element, document, context, &syntax, &chain)?;

        let mut stages = IndexMap::new();
        stages.insert(Stage::Pixel, self.pixel_stage(name, &graph));

        tracing::info!(
            shader = name,
            target = self.target(),
            statements = graph.body.len(),
            functions = graph.functions.len(),
            "shader generated"
        );
        Ok(GeneratedShader::new(name, self.target(), stages))
    }
}

/// Sanitize an artifact name into an OSL shader identifier
fn shader_identifier(name: &str) -> String {
    let mut ident: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, 's');
    }
    ident
}

struct OslSyntax {
    digits: usize,
}

impl Syntax for OslSyntax {
    fn type_name(&self, ty: ValueType) -> &'static str {
        match ty {
            ValueType::Boolean | ValueType::Integer => "int",
            ValueType::Float => "float",
            // The language has no native two-component vector; pad to
            // its three-component one.
            ValueType::Vector2 | ValueType::Vector3 => "vector",
            ValueType::Vector4 => "vector4",
            ValueType::Color3 => "color",
            ValueType::Color4 => "color4",
            ValueType::String => "string",
            ValueType::Surfaceshader | ValueType::Material => "closure color",
            ValueType::Displacementshader => "vector",
        }
    }

    fn float_digits(&self) -> usize {
        self.digits
    }

    fn geometric_expr(&self, category: &str) -> Option<&'static str> {
        match category {
            "position" => Some("P"),
            "normal" => Some("N"),
            "texcoord" => Some("vector(u, v, 0.0)"),
            _ => None,
        }
    }
}

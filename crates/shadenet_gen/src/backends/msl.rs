// SPDX-License-Identifier: MIT OR Apache-2.0
//! Metal Shading Language backend.

use crate::context::GenContext;
use crate::error::GenError;
use crate::generator::{emit_pixel_graph, target_chain, EmittedGraph, ShaderGenerator};
use crate::shader::{GeneratedShader, Stage, StageBuilder};
use crate::syntax::Syntax;
use indexmap::IndexMap;
use shadenet_graph::{Document, NodeId, ValueType};

/// Shader generator for Metal
///
/// Each stage is emitted as a self-contained translation unit carrying
/// the shared stage-interface structs.
pub struct MslShaderGenerator;

impl MslShaderGenerator {
    /// Create the Metal backend
    pub fn new() -> Self {
        Self
    }

    fn emit_header(stage: &mut StageBuilder) {
        stage.add_line("#include <metal_stdlib>");
        stage.blank_line();
        stage.add_line("using namespace metal;");
        stage.blank_line();
        stage.add_line("struct VertexIn");
        stage.begin_scope();
        stage.add_line("float3 position [[attribute(0)]];");
        stage.add_line("float3 normal [[attribute(1)]];");
        stage.add_line("float2 texcoord [[attribute(2)]];");
        stage.end_scope_semicolon();
        stage.blank_line();
        stage.add_line("struct VertexOut");
        stage.begin_scope();
        stage.add_line("float4 position [[position]];");
        stage.add_line("float3 position_world;");
        stage.add_line("float3 normal_world;");
        stage.add_line("float2 texcoord;");
        stage.end_scope_semicolon();
        stage.blank_line();
        stage.add_line("struct FrameUniforms");
        stage.begin_scope();
        stage.add_line("float4x4 world_matrix;");
        stage.add_line("float4x4 view_projection_matrix;");
        stage.add_line("float frame_time;");
        stage.end_scope_semicolon();
    }

    fn vertex_stage(&self) -> String {
        let mut stage = StageBuilder::new();
        Self::emit_header(&mut stage);
        stage.blank_line();
        stage.add_line(
            "vertex VertexOut vertexMain(VertexIn in [[stage_in]], constant FrameUniforms& frame [[buffer(0)]])",
        );
        stage.begin_scope();
        stage.add_line("VertexOut out;");
        stage.add_line("float4 position_world = frame.world_matrix * float4(in.position, 1.0);");
        stage.add_line("out.position_world = position_world.xyz;");
        stage.add_line(
            "out.normal_world = normalize((frame.world_matrix * float4(in.normal, 0.0)).xyz);",
        );
        stage.add_line("out.texcoord = in.texcoord;");
        stage.add_line("out.position = frame.view_projection_matrix * position_world;");
        stage.add_line("return out;");
        stage.end_scope();
        stage.into_code()
    }

    fn pixel_stage(&self, graph: &EmittedGraph) -> String {
        let mut stage = StageBuilder::new();
        Self::emit_header(&mut stage);

        for (_, source) in &graph.functions {
            stage.blank_line();
            stage.add_block(source);
        }

        stage.blank_line();
        stage.add_line(
            "fragment float4 pixelMain(VertexOut in [[stage_in]], constant FrameUniforms& frame [[buffer(0)]])",
        );
        stage.begin_scope();
        for line in &graph.body {
            stage.add_line(line);
        }
        stage.add_line(&format!("return {};", graph.root));
        stage.end_scope();
        stage.into_code()
    }
}

impl Default for MslShaderGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ShaderGenerator for MslShaderGenerator {
    fn target(&self) -> &'static str {
        "msl"
    }

    fn stages(&self) -> &'static [Stage] {
        &[Stage::Vertex, Stage::Pixel]
    }

    fn generate(
        &self,
        name: &str,
        element: NodeId,
        document: &Document,
        context: &mut GenContext,
    ) -> Result<GeneratedShader, GenError> {
        let syntax = MslSyntax {
            digits: context.options().float_digits,
        };
        let chain = target_chain(self);
        let graph = emit_pixel_graph(element, document, context, &syntax, &chain)?;

        let mut stages = IndexMap::new();
        stages.insert(Stage::Vertex, self.vertex_stage());
        stages.insert(Stage::Pixel, self.pixel_stage(&graph));

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

struct MslSyntax {
    digits: usize,
}

impl Syntax for MslSyntax {
    fn type_name(&self, ty: ValueType) -> &'static str {
        match ty {
            ValueType::Boolean => "bool",
            ValueType::Integer => "int",
            ValueType::Float => "float",
            ValueType::Vector2 => "float2",
            ValueType::Vector3 | ValueType::Color3 => "float3",
            ValueType::Vector4 | ValueType::Color4 => "float4",
            ValueType::String => "string",
            ValueType::Surfaceshader | ValueType::Material => "float4",
            ValueType::Displacementshader => "float3",
        }
    }

    fn float_digits(&self) -> usize {
        self.digits
    }

    fn geometric_expr(&self, category: &str) -> Option<&'static str> {
        match category {
            "position" => Some("in.position_world"),
            "normal" => Some("in.normal_world"),
            "texcoord" => Some("in.texcoord"),
            "time" => Some("frame.frame_time"),
            _ => None,
        }
    }
}

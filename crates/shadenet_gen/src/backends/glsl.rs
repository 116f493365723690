// SPDX-License-Identifier: MIT OR Apache-2.0
//! GLSL backend covering the desktop, ES/WebGL2, and Vulkan dialects.

use crate::context::GenContext;
use crate::error::GenError;
use crate::generator::{emit_pixel_graph, target_chain, EmittedGraph, ShaderGenerator};
use crate::shader::{GeneratedShader, Stage, StageBuilder};
use crate::syntax::Syntax;
use indexmap::IndexMap;
use shadenet_graph::{Document, NodeId, ValueType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dialect {
    Core,
    Essl,
    Vulkan,
}

/// Shader generator for the GLSL family
///
/// One strategy serves three dialects; they share the implementation
/// table of the `glsl` family root and differ only in version
/// directives, precision, and resource binding syntax.
pub struct GlslShaderGenerator {
    dialect: Dialect,
}

impl GlslShaderGenerator {
    /// Desktop GLSL 4.00
    pub fn new() -> Self {
        Self {
            dialect: Dialect::Core,
        }
    }

    /// GLSL ES 3.00, as consumed by WebGL2
    pub fn essl() -> Self {
        Self {
            dialect: Dialect::Essl,
        }
    }

    /// Vulkan-flavored GLSL 4.50
    pub fn vulkan() -> Self {
        Self {
            dialect: Dialect::Vulkan,
        }
    }

    fn version_directive(&self) -> &'static str {
        match self.dialect {
            Dialect::Core => "#version 400",
            Dialect::Essl => "#version 300 es",
            Dialect::Vulkan => "#version 450",
        }
    }

    fn vertex_stage(&self) -> String {
        let mut stage = StageBuilder::new();
        stage.add_line(self.version_directive());
        stage.blank_line();

        match self.dialect {
            Dialect::Vulkan => {
                stage.add_line("layout(std140, binding = 0) uniform PrivateUniforms");
                stage.begin_scope();
                stage.add_line("mat4 u_world_matrix;");
                stage.add_line("mat4 u_view_projection_matrix;");
                // Uniform blocks close with a semicolon.
                stage.end_scope_semicolon();
                stage.blank_line();
                stage.add_line("layout(location = 0) in vec3 i_position;");
                stage.add_line("layout(location = 1) in vec3 i_normal;");
                stage.add_line("layout(location = 2) in vec2 i_texcoord;");
                stage.blank_line();
                stage.add_line("layout(location = 0) out vec3 v_position_world;");
                stage.add_line("layout(location = 1) out vec3 v_normal_world;");
                stage.add_line("layout(location = 2) out vec2 v_texcoord;");
            }
            _ => {
                stage.add_line("uniform mat4 u_world_matrix;");
                stage.add_line("uniform mat4 u_view_projection_matrix;");
                stage.blank_line();
                stage.add_line("in vec3 i_position;");
                stage.add_line("in vec3 i_normal;");
                stage.add_line("in vec2 i_texcoord;");
                stage.blank_line();
                stage.add_line("out vec3 v_position_world;");
                stage.add_line("out vec3 v_normal_world;");
                stage.add_line("out vec2 v_texcoord;");
            }
        }

        stage.blank_line();
        stage.add_line("void main()");
        stage.begin_scope();
        stage.add_line("vec4 position_world = u_world_matrix * vec4(i_position, 1.0);");
        stage.add_line("v_position_world = position_world.xyz;");
        stage.add_line("v_normal_world = normalize((u_world_matrix * vec4(i_normal, 0.0)).xyz);");
        stage.add_line("v_texcoord = i_texcoord;");
        stage.add_line("gl_Position = u_view_projection_matrix * position_world;");
        stage.end_scope();
        stage.into_code()
    }

    fn pixel_stage(&self, graph: &EmittedGraph, context: &GenContext) -> String {
        let mut stage = StageBuilder::new();
        stage.add_line(self.version_directive());
        stage.blank_line();
        if self.dialect == Dialect::Essl {
            stage.add_line(&format!(
                "precision {} float;",
                context.options().essl_precision
            ));
            stage.blank_line();
        }

        match self.dialect {
            Dialect::Vulkan => {
                stage.add_line("layout(location = 0) in vec3 v_position_world;");
                stage.add_line("layout(location = 1) in vec3 v_normal_world;");
                stage.add_line("layout(location = 2) in vec2 v_texcoord;");
                stage.blank_line();
                if graph.geometrics.iter().any(|g| g == "time") {
                    stage.add_line("layout(std140, binding = 1) uniform PixelUniforms");
                    stage.begin_scope();
                    stage.add_line("float u_frame_time;");
                    stage.end_scope_semicolon();
                    stage.blank_line();
                }
                stage.add_line("layout(location = 0) out vec4 out_color;");
            }
            _ => {
                stage.add_line("in vec3 v_position_world;");
                stage.add_line("in vec3 v_normal_world;");
                stage.add_line("in vec2 v_texcoord;");
                stage.blank_line();
                if graph.geometrics.iter().any(|g| g == "time") {
                    stage.add_line("uniform float u_frame_time;");
                    stage.blank_line();
                }
                stage.add_line("out vec4 out_color;");
            }
        }

        for (_, source) in &graph.functions {
            stage.blank_line();
            stage.add_block(source);
        }

        stage.blank_line();
        stage.add_line("void main()");
        stage.begin_scope();
        for line in &graph.body {
            stage.add_line(line);
        }
        stage.add_line(&format!("out_color = {};", graph.root));
        stage.end_scope();
        stage.into_code()
    }
}

impl Default for GlslShaderGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ShaderGenerator for GlslShaderGenerator {
    fn target(&self) -> &'static str {
        match self.dialect {
            Dialect::Core => "glsl",
            Dialect::Essl => "essl",
            Dialect::Vulkan => "vulkan",
        }
    }

    fn base_target(&self) -> Option<&'static str> {
        match self.dialect {
            Dialect::Core => None,
            Dialect::Essl | Dialect::Vulkan => Some("glsl"),
        }
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
        let syntax = GlslSyntax {
            digits: context.options().float_digits,
        };
        let chain = target_chain(self);
        let graph = emit_pixel_graph(element, document, context, &syntax, &chain)?;

        let mut stages = IndexMap::new();
        stages.insert(Stage::Vertex, self.vertex_stage());
        stages.insert(Stage::Pixel, self.pixel_stage(&graph, context));

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

struct GlslSyntax {
    digits: usize,
}

impl Syntax for GlslSyntax {
    fn type_name(&self, ty: ValueType) -> &'static str {
        match ty {
            ValueType::Boolean => "bool",
            ValueType::Integer => "int",
            ValueType::Float => "float",
            ValueType::Vector2 => "vec2",
            ValueType::Vector3 | ValueType::Color3 => "vec3",
            ValueType::Vector4 | ValueType::Color4 => "vec4",
            ValueType::String => "string",
            ValueType::Surfaceshader | ValueType::Material => "vec4",
            ValueType::Displacementshader => "vec3",
        }
    }

    fn float_digits(&self) -> usize {
        self.digits
    }

    fn geometric_expr(&self, category: &str) -> Option<&'static str> {
        match category {
            "position" => Some("v_position_world"),
            "normal" => Some("v_normal_world"),
            "texcoord" => Some("v_texcoord"),
            "time" => Some("u_frame_time"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dialect_targets() {
        assert_eq!(GlslShaderGenerator::new().target(), "glsl");
        assert_eq!(GlslShaderGenerator::essl().target(), "essl");
        assert_eq!(GlslShaderGenerator::vulkan().target(), "vulkan");
        assert_eq!(GlslShaderGenerator::new().base_target(), None);
        assert_eq!(GlslShaderGenerator::essl().base_target(), Some("glsl"));
    }

    #[test]
    fn literal_formatting() {
        let syntax = GlslSyntax { digits: 4 };
        assert_eq!(
            syntax.literal(&shadenet_graph::Value::Float(0.5)),
            "0.5000"
        );
        assert_eq!(
            syntax.literal(&shadenet_graph::Value::Color3([1.0, 0.5, 0.0])),
            "vec3(1.0000, 0.5000, 0.0000)"
        );
        assert_eq!(syntax.literal(&shadenet_graph::Value::Integer(7)), "7");
    }
}

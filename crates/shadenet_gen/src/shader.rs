// SPDX-License-Identifier: MIT OR Apache-2.0
//! Generated shader artifact and stage source assembly.

use indexmap::IndexMap;

/// A named phase of shader execution with separately emitted source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Vertex processing stage
    Vertex,
    /// Pixel/fragment shading stage
    Pixel,
}

impl Stage {
    /// Get the wire name of this stage
    pub fn name(&self) -> &'static str {
        match self {
            Self::Vertex => "vertex",
            Self::Pixel => "pixel",
        }
    }

    /// Look up a stage by its wire name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "vertex" => Some(Self::Vertex),
            "pixel" => Some(Self::Pixel),
            _ => None,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The output of one `generate` call, immutable once produced
#[derive(Debug, Clone)]
pub struct GeneratedShader {
    name: String,
    target: String,
    stages: IndexMap<Stage, String>,
}

impl GeneratedShader {
    pub(crate) fn new(
        name: impl Into<String>,
        target: impl Into<String>,
        stages: IndexMap<Stage, String>,
    ) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            stages,
        }
    }

    /// Get the shader name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the target this shader was generated for
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Stages present in this shader, in emission order
    pub fn stages(&self) -> impl Iterator<Item = Stage> + '_ {
        self.stages.keys().copied()
    }

    /// Get the source for a stage
    ///
    /// A stage this shader does not contain is an error, never an empty
    /// string.
    pub fn source_code(&self, stage: Stage) -> Result<&str, ShaderError> {
        self.stages
            .get(&stage)
            .map(String::as_str)
            .ok_or_else(|| ShaderError::MissingStage {
                shader: self.name.clone(),
                stage: stage.name().to_string(),
            })
    }

    /// Get the source for a stage by wire name
    pub fn source_code_by_name(&self, stage: &str) -> Result<&str, ShaderError> {
        let stage = Stage::from_name(stage)
            .ok_or_else(|| ShaderError::UnknownStage(stage.to_string()))?;
        self.source_code(stage)
    }
}

/// Error when looking up stage source on a generated shader
#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    /// The shader was not generated with this stage
    #[error("Shader '{shader}' has no '{stage}' stage")]
    MissingStage {
        /// Shader name
        shader: String,
        /// Requested stage
        stage: String,
    },

    /// The name does not denote a stage
    #[error("Unknown stage name '{0}'")]
    UnknownStage(String),
}

/// Incremental writer for one stage's source text
///
/// Tracks indentation and brace scopes so emitted code keeps a uniform
/// shape regardless of which backend drives it.
#[derive(Debug, Default)]
pub(crate) struct StageBuilder {
    code: String,
    indentation: usize,
}

impl StageBuilder {
    const INDENT: &'static str = "    ";

    pub fn new() -> Self {
        Self::default()
    }

    fn indent(&mut self) {
        for _ in 0..self.indentation {
            self.code.push_str(Self::INDENT);
        }
    }

    /// Add a full line at the current indentation
    pub fn add_line(&mut self, line: &str) {
        self.indent();
        self.code.push_str(line);
        self.code.push('\n');
    }

    /// Add an empty line
    pub fn blank_line(&mut self) {
        self.code.push('\n');
    }

    /// Add a multi-line block, re-indenting each line
    pub fn add_block(&mut self, block: &str) {
        for line in block.lines() {
            if line.is_empty() {
                self.blank_line();
            } else {
                self.add_line(line);
            }
        }
    }

    /// Open a brace scope and increase indentation
    pub fn begin_scope(&mut self) {
        self.add_line("{");
        self.indentation += 1;
    }

    /// Close the current brace scope
    pub fn end_scope(&mut self) {
        self.indentation = self.indentation.saturating_sub(1);
        self.add_line("}");
    }

    /// Close the current brace scope with a trailing semicolon
    pub fn end_scope_semicolon(&mut self) {
        self.indentation = self.indentation.saturating_sub(1);
        self.add_line("};");
    }

    /// Consume the builder, yielding the final source text
    pub fn into_code(self) -> String {
        self.code
    }
}

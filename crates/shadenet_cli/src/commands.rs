// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command implementations.

use crate::cli::Command;
use shadenet_gen::{
    available_targets, create_generator, load_standard_library, GenContext, GenError,
    GeneratedShader, LibraryError, ShaderError, ShaderGenerator,
};
use shadenet_graph::{Document, ValidateError};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

/// Run one parsed command
pub fn run(command: Command) -> Result<(), CliError> {
    match command {
        Command::Validate { document } => {
            let mut doc = load_document(&document)?;
            doc.validate()?;
            println!(
                "Document '{}' is valid ({} nodes)",
                doc.name(),
                doc.node_count()
            );
            Ok(())
        }
        Command::Targets => {
            for target in available_targets() {
                println!("{target}");
            }
            Ok(())
        }
        Command::Generate {
            document,
            targets,
            out,
            element,
        } => run_generate(&document, &targets, out.as_deref(), element.as_deref()),
    }
}

fn run_generate(
    document: &Path,
    targets: &[String],
    out: Option<&Path>,
    element: Option<&str>,
) -> Result<(), CliError> {
    let mut doc = load_document(document)?;
    doc.validate()?;

    let element_id = match element {
        Some(name) => doc
            .node_by_name(name)
            .ok_or_else(|| CliError::ElementNotFound(name.to_string()))?,
        None => doc
            .find_renderable_element()
            .ok_or(CliError::NoRenderableElement)?,
    };
    let name = doc
        .node(element_id)
        .map(|n| n.name().to_string())
        .ok_or(CliError::NoRenderableElement)?;

    for target in targets {
        let generator =
            create_generator(target).ok_or_else(|| CliError::UnknownTarget(target.clone()))?;
        let mut context = GenContext::for_generator(generator.as_ref());
        load_standard_library(&mut context)?;
        let shader = generator.generate(&name, element_id, &doc, &mut context)?;
        match out {
            Some(dir) => write_shader(dir, &shader)?,
            None => print_shader(&shader)?,
        }
    }
    Ok(())
}

fn load_document(path: &Path) -> Result<Document, CliError> {
    let text = fs::read_to_string(path)?;
    match path.extension().and_then(OsStr::to_str) {
        Some("ron") => Ok(ron::from_str(&text)?),
        Some("json") => Ok(serde_json::from_str(&text)?),
        _ => Err(CliError::UnknownFormat(path.to_path_buf())),
    }
}

fn stage_extension(target: &str) -> &'static str {
    match target {
        "msl" => "metal",
        "osl" => "osl",
        _ => "glsl",
    }
}

fn write_shader(dir: &Path, shader: &GeneratedShader) -> Result<(), CliError> {
    fs::create_dir_all(dir)?;
    for stage in shader.stages() {
        let source = shader.source_code(stage)?;
        let file = dir.join(format!(
            "{}.{}.{}.{}",
            shader.name(),
            shader.target(),
            stage.name(),
            stage_extension(shader.target())
        ));
        fs::write(&file, source)?;
        tracing::info!(path = %file.display(), "stage source written");
    }
    Ok(())
}

fn print_shader(shader: &GeneratedShader) -> Result<(), CliError> {
    for stage in shader.stages() {
        let source = shader.source_code(stage)?;
        println!(
            "// -------- {} [{}] {} stage --------",
            shader.name(),
            shader.target(),
            stage.name()
        );
        println!("{source}");
    }
    Ok(())
}

/// Error surfaced to the command line
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// File system failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Document path has no recognized extension
    #[error("Unrecognized document format '{0}', expected .ron or .json")]
    UnknownFormat(PathBuf),

    /// RON document failed to parse
    #[error("Failed to parse RON document: {0}")]
    Ron(#[from] ron::error::SpannedError),

    /// JSON document failed to parse
    #[error("Failed to parse JSON document: {0}")]
    Json(#[from] serde_json::Error),

    /// Document did not validate
    #[error("Document validation failed: {0}")]
    Validate(#[from] ValidateError),

    /// Document has no material or surface shader node
    #[error("Document has no renderable element")]
    NoRenderableElement,

    /// Named element does not exist
    #[error("Element not found: '{0}'")]
    ElementNotFound(String),

    /// No backend registered for the target
    #[error("Unknown target '{0}'")]
    UnknownTarget(String),

    /// Standard library failed to load
    #[error(transparent)]
    Library(#[from] LibraryError),

    /// Shader generation failed
    #[error(transparent)]
    Generate(#[from] GenError),

    /// Stage lookup failed on a generated shader
    #[error(transparent)]
    Shader(#[from] ShaderError),
}

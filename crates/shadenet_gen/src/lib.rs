// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shader generation engine for shadenet.
//!
//! This crate lowers a validated shading-network document
//! ([`shadenet_graph::Document`]) into compilable per-stage shader
//! source for several targets:
//! - `glsl` / `essl` / `vulkan` — stage-split rasterization GLSL dialects
//! - `msl` — Metal Shading Language
//! - `osl` — Open Shading Language style renderer language
//!
//! ## Architecture
//!
//! The engine is built on:
//! - A standard [`library::Library`] of node definitions and per-target
//!   implementations, loaded from embedded assets
//! - A [`context::GenContext`] owning per-run caches, one per backend
//! - Interchangeable [`generator::ShaderGenerator`] strategies sharing a
//!   traversal driver that orders, resolves, and emits nodes
//! - An immutable [`shader::GeneratedShader`] artifact keyed by stage

pub mod backends;
pub mod context;
pub mod error;
pub mod generator;
pub mod library;
pub mod shader;
mod syntax;

pub use backends::{available_targets, create_generator};
pub use backends::{GlslShaderGenerator, MslShaderGenerator, OslShaderGenerator};
pub use context::{GenContext, GenOptions};
pub use error::GenError;
pub use generator::ShaderGenerator;
pub use library::{load_standard_library, Library, LibraryError};
pub use shader::{GeneratedShader, ShaderError, Stage};

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shading-network document model for shadenet.
//!
//! This crate provides the data layer shared by all code generation
//! backends:
//! - Documents holding an arena of typed nodes
//! - Named inputs carrying literals or connections to producer nodes
//! - A small value type system with explicit coercion rules
//! - Validation (reference resolution, type checking, cycle detection)
//!
//! ## Architecture
//!
//! Nodes live in an arena addressed by stable integer handles
//! ([`NodeId`]). Connections are authored by producer *name*, as they
//! appear in the source format; [`Document::validate`] resolves every
//! name to a handle exactly once and caches it, so downstream traversal
//! never performs string lookups.

pub mod document;
pub mod node;
pub mod types;
pub mod value;

pub use document::{Document, DocumentError, ValidateError};
pub use node::{Input, Node, NodeId};
pub use types::ValueType;
pub use value::Value;

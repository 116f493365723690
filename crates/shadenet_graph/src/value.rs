// SPDX-License-Identifier: MIT OR Apache-2.0
//! Literal values carried by node inputs.

use crate::types::ValueType;
use serde::{Deserialize, Serialize};

/// A literal value assigned to an input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Boolean
    Boolean(bool),
    /// Integer
    Integer(i32),
    /// Float
    Float(f32),
    /// 2D vector
    Vector2([f32; 2]),
    /// 3D vector
    Vector3([f32; 3]),
    /// 4D vector
    Vector4([f32; 4]),
    /// RGB color
    Color3([f32; 3]),
    /// RGBA color
    Color4([f32; 4]),
    /// String
    String(String),
}

impl Value {
    /// Get the type of this value
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Boolean(_) => ValueType::Boolean,
            Self::Integer(_) => ValueType::Integer,
            Self::Float(_) => ValueType::Float,
            Self::Vector2(_) => ValueType::Vector2,
            Self::Vector3(_) => ValueType::Vector3,
            Self::Vector4(_) => ValueType::Vector4,
            Self::Color3(_) => ValueType::Color3,
            Self::Color4(_) => ValueType::Color4,
            Self::String(_) => ValueType::String,
        }
    }

    /// Get the zero value for a type, if the type has literal values
    ///
    /// Closure types have no literal representation and return `None`.
    pub fn default_for_type(value_type: ValueType) -> Option<Self> {
        match value_type {
            ValueType::Boolean => Some(Self::Boolean(false)),
            ValueType::Integer => Some(Self::Integer(0)),
            ValueType::Float => Some(Self::Float(0.0)),
            ValueType::Vector2 => Some(Self::Vector2([0.0, 0.0])),
            ValueType::Vector3 => Some(Self::Vector3([0.0, 0.0, 0.0])),
            ValueType::Vector4 => Some(Self::Vector4([0.0, 0.0, 0.0, 0.0])),
            ValueType::Color3 => Some(Self::Color3([0.0, 0.0, 0.0])),
            ValueType::Color4 => Some(Self::Color4([0.0, 0.0, 0.0, 1.0])),
            ValueType::String => Some(Self::String(String::new())),
            ValueType::Surfaceshader
            | ValueType::Displacementshader
            | ValueType::Material => None,
        }
    }

    /// Float components of a numeric value, in declaration order
    pub fn numeric_components(&self) -> Option<Vec<f32>> {
        match self {
            Self::Integer(v) => Some(vec![*v as f32]),
            Self::Float(v) => Some(vec![*v]),
            Self::Vector2(v) => Some(v.to_vec()),
            Self::Vector3(v) | Self::Color3(v) => Some(v.to_vec()),
            Self::Vector4(v) | Self::Color4(v) => Some(v.to_vec()),
            Self::Boolean(_) | Self::String(_) => None,
        }
    }
}

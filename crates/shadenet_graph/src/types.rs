// SPDX-License-Identifier: MIT OR Apache-2.0
//! Value type system for shading-network documents.

use serde::{Deserialize, Serialize};

/// Data type that can flow between nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// Boolean value
    Boolean,
    /// Integer value
    Integer,
    /// Floating point value
    Float,
    /// 2D vector
    Vector2,
    /// 3D vector
    Vector3,
    /// 4D vector
    Vector4,
    /// RGB color
    Color3,
    /// RGBA color
    Color4,
    /// String value
    String,
    /// Surface shader closure
    Surfaceshader,
    /// Displacement shader closure
    Displacementshader,
    /// Material root
    Material,
}

impl ValueType {
    /// Get the wire name of this type, as used in documents and libraries
    pub fn name(&self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Vector2 => "vector2",
            Self::Vector3 => "vector3",
            Self::Vector4 => "vector4",
            Self::Color3 => "color3",
            Self::Color4 => "color4",
            Self::String => "string",
            Self::Surfaceshader => "surfaceshader",
            Self::Displacementshader => "displacementshader",
            Self::Material => "material",
        }
    }

    /// Look up a type by its wire name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "boolean" => Some(Self::Boolean),
            "integer" => Some(Self::Integer),
            "float" => Some(Self::Float),
            "vector2" => Some(Self::Vector2),
            "vector3" => Some(Self::Vector3),
            "vector4" => Some(Self::Vector4),
            "color3" => Some(Self::Color3),
            "color4" => Some(Self::Color4),
            "string" => Some(Self::String),
            "surfaceshader" => Some(Self::Surfaceshader),
            "displacementshader" => Some(Self::Displacementshader),
            "material" => Some(Self::Material),
            _ => None,
        }
    }

    /// Number of float components, for numeric aggregate types
    pub fn components(&self) -> Option<u32> {
        match self {
            Self::Float => Some(1),
            Self::Vector2 => Some(2),
            Self::Vector3 | Self::Color3 => Some(3),
            Self::Vector4 | Self::Color4 => Some(4),
            _ => None,
        }
    }

    /// Check if this is a shader or material closure type
    ///
    /// Closure types can only be satisfied by a connection, never by a
    /// literal value.
    pub fn is_closure(&self) -> bool {
        matches!(
            self,
            Self::Surfaceshader | Self::Displacementshader | Self::Material
        )
    }

    /// Check if a value of this type can feed an input of `other`
    ///
    /// These are the only implicit conversions the engine performs;
    /// every other mismatch is a validation or generation error.
    pub fn can_coerce_to(&self, other: &ValueType) -> bool {
        if self == other {
            return true;
        }

        match (self, other) {
            // Numeric widening
            (Self::Integer, Self::Float) => true,
            // Scalar broadcast
            (Self::Float, Self::Vector2 | Self::Vector3 | Self::Vector4) => true,
            (Self::Float, Self::Color3 | Self::Color4) => true,
            // Same-arity color/vector aliasing
            (Self::Color3, Self::Vector3) | (Self::Vector3, Self::Color3) => true,
            (Self::Color4, Self::Vector4) | (Self::Vector4, Self::Color4) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

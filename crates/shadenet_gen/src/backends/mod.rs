// SPDX-License-Identifier: MIT OR Apache-2.0
//! Backend shader generators, one strategy per target.

mod glsl;
mod msl;
mod osl;

pub use glsl::GlslShaderGenerator;
pub use msl::MslShaderGenerator;
pub use osl::OslShaderGenerator;

use crate::generator::ShaderGenerator;

/// Targets with a registered backend, in presentation order
pub fn available_targets() -> &'static [&'static str] {
    &["glsl", "essl", "vulkan", "msl", "osl"]
}

/// Create the backend generator for a target, if one is registered
pub fn create_generator(target: &str) -> Option<Box<dyn ShaderGenerator>> {
    match target {
        "glsl" => Some(Box::new(GlslShaderGenerator::new())),
        "essl" => Some(Box::new(GlslShaderGenerator::essl())),
        "vulkan" => Some(Box::new(GlslShaderGenerator::vulkan())),
        "msl" => Some(Box::new(MslShaderGenerator::new())),
        "osl" => Some(Box::new(OslShaderGenerator::new())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_target_has_a_generator() {
        for target in available_targets() {
            let generator = create_generator(target).unwrap();
            assert_eq!(generator.target(), *target);
            assert!(!generator.stages().is_empty());
        }
        assert!(create_generator("hlsl").is_none());
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! End-to-end generation tests across all backends.

use shadenet_gen::{
    create_generator, load_standard_library, GenContext, GenError, GeneratedShader, ShaderError,
    ShaderGenerator, Stage,
};
use shadenet_graph::{Document, Value, ValueType};

/// One standard surface wired into one surface material, the smallest
/// renderable document.
fn surface_material_document() -> Document {
    let mut doc = Document::new("browser_material");
    let ss = doc.add_node("standard_surface", "SR_default").unwrap();
    doc.node_mut(ss)
        .unwrap()
        .set_node_type(ValueType::Surfaceshader);
    let sm = doc.add_node("surfacematerial", "Default").unwrap();
    doc.node_mut(sm).unwrap().set_node_type(ValueType::Material);
    let input = doc.add_input(sm, "surfaceshader").unwrap();
    input.set_value_type(ValueType::Surfaceshader);
    input.set_node_name("SR_default");
    doc.validate().unwrap();
    doc
}

fn generate_for(doc: &Document, target: &str) -> Result<GeneratedShader, GenError> {
    let generator = create_generator(target).unwrap();
    let mut context = GenContext::for_generator(generator.as_ref());
    load_standard_library(&mut context).unwrap();
    let element = doc.find_renderable_element().unwrap();
    let name = doc.node(element).unwrap().name().to_string();
    generator.generate(&name, element, doc, &mut context)
}

fn pixel_entry_symbol(target: &str) -> &'static str {
    match target {
        "glsl" | "essl" | "vulkan" => "void main",
        "msl" => "fragment ",
        "osl" => "surface ",
        other => panic!("unexpected target {other}"),
    }
}

#[test]
fn minimal_material_generates_on_every_target() {
    let doc = surface_material_document();
    for target in ["glsl", "essl", "vulkan", "msl", "osl"] {
        let shader = generate_for(&doc, target).unwrap();
        let pixel = shader.source_code(Stage::Pixel).unwrap();
        assert!(!pixel.is_empty(), "{target} pixel stage is empty");
        assert!(
            pixel.contains(pixel_entry_symbol(target)),
            "{target} pixel stage lacks its entry point:\n{pixel}"
        );
    }
}

#[test]
fn rasterization_targets_emit_both_stages() {
    let doc = surface_material_document();
    for target in ["glsl", "essl", "vulkan", "msl"] {
        let shader = generate_for(&doc, target).unwrap();
        let stages: Vec<Stage> = shader.stages().collect();
        assert_eq!(stages, vec![Stage::Vertex, Stage::Pixel], "{target}");
        assert!(!shader.source_code(Stage::Vertex).unwrap().is_empty());
        assert!(!shader.source_code(Stage::Pixel).unwrap().is_empty());
    }
}

#[test]
fn renderer_target_is_pixel_only() {
    let doc = surface_material_document();
    let shader = generate_for(&doc, "osl").unwrap();
    assert_eq!(shader.stages().collect::<Vec<_>>(), vec![Stage::Pixel]);
    assert!(matches!(
        shader.source_code(Stage::Vertex),
        Err(ShaderError::MissingStage { .. })
    ));
}

#[test]
fn dialect_directives_are_present() {
    let doc = surface_material_document();

    let essl = generate_for(&doc, "essl").unwrap();
    let pixel = essl.source_code(Stage::Pixel).unwrap();
    assert!(pixel.starts_with("#version 300 es"));
    assert!(pixel.contains("precision highp float;"));

    let vulkan = generate_for(&doc, "vulkan").unwrap();
    let pixel = vulkan.source_code(Stage::Pixel).unwrap();
    assert!(pixel.starts_with("#version 450"));
    assert!(pixel.contains("layout(location = 0) out vec4 out_color;"));
}

#[test]
fn generation_is_deterministic() {
    let doc = surface_material_document();
    for target in ["glsl", "essl", "vulkan", "msl", "osl"] {
        let first = generate_for(&doc, target).unwrap();
        let second = generate_for(&doc, target).unwrap();
        for stage in first.stages() {
            assert_eq!(
                first.source_code(stage).unwrap(),
                second.source_code(stage).unwrap(),
                "{target}/{stage} differs between runs"
            );
        }
    }
}

#[test]
fn reused_context_stays_deterministic() {
    let doc = surface_material_document();
    let generator = create_generator("glsl").unwrap();
    let mut context = GenContext::for_generator(generator.as_ref());
    load_standard_library(&mut context).unwrap();
    let element = doc.find_renderable_element().unwrap();

    let first = generator.generate("Default", element, &doc, &mut context).unwrap();
    let second = generator.generate("Default", element, &doc, &mut context).unwrap();
    assert_eq!(
        first.source_code(Stage::Pixel).unwrap(),
        second.source_code(Stage::Pixel).unwrap()
    );
}

/// A shared producer with several consumers is emitted exactly once,
/// and every consumer references the same binding.
#[test]
fn shared_subgraphs_are_emitted_once() {
    let mut doc = Document::new("dedup");
    let tint = doc.add_node("constant", "shared_tint").unwrap();
    doc.node_mut(tint).unwrap().set_node_type(ValueType::Color3);
    doc.add_input(tint, "value")
        .unwrap()
        .set_value_type(ValueType::Color3)
        .set_value(Value::Color3([0.2, 0.4, 0.6]));

    let sum = doc.add_node("add", "tint_sum").unwrap();
    doc.node_mut(sum).unwrap().set_node_type(ValueType::Color3);
    doc.add_input(sum, "in1")
        .unwrap()
        .set_value_type(ValueType::Color3)
        .set_node_name("shared_tint");
    doc.add_input(sum, "in2")
        .unwrap()
        .set_value_type(ValueType::Color3)
        .set_node_name("shared_tint");

    let ss = doc.add_node("standard_surface", "SR_tinted").unwrap();
    doc.node_mut(ss)
        .unwrap()
        .set_node_type(ValueType::Surfaceshader);
    doc.add_input(ss, "base_color")
        .unwrap()
        .set_value_type(ValueType::Color3)
        .set_node_name("tint_sum");

    let sm = doc.add_node("surfacematerial", "Tinted").unwrap();
    doc.node_mut(sm).unwrap().set_node_type(ValueType::Material);
    doc.add_input(sm, "surfaceshader")
        .unwrap()
        .set_value_type(ValueType::Surfaceshader)
        .set_node_name("SR_tinted");
    doc.validate().unwrap();

    let shader = generate_for(&doc, "glsl").unwrap();
    let pixel = shader.source_code(Stage::Pixel).unwrap();

    let declarations = pixel.matches("vec3 shared_tint_out = ").count();
    assert_eq!(declarations, 1, "shared node emitted more than once:\n{pixel}");
    let references = pixel.matches("shared_tint_out").count();
    assert!(references >= 3, "consumers do not share the binding:\n{pixel}");
    assert!(pixel.contains("shared_tint_out + shared_tint_out"));
}

#[test]
fn generate_rejects_unvalidated_documents() {
    let mut doc = Document::new("gate");
    let ss = doc.add_node("standard_surface", "SR_default").unwrap();
    doc.node_mut(ss)
        .unwrap()
        .set_node_type(ValueType::Surfaceshader);
    // validate() was never called
    let generator = create_generator("glsl").unwrap();
    let mut context = GenContext::for_generator(generator.as_ref());
    load_standard_library(&mut context).unwrap();
    let err = generator.generate("gate", ss, &doc, &mut context).unwrap_err();
    assert!(matches!(err, GenError::DocumentNotValidated(_)));
}

#[test]
fn mutation_after_validation_closes_the_gate() {
    let mut doc = surface_material_document();
    let ss = doc.node_by_name("SR_default").unwrap();
    let _ = doc.node_mut(ss); // any mutable access drops the validated flag
    let err = generate_for(&doc, "glsl").unwrap_err();
    assert!(matches!(err, GenError::DocumentNotValidated(_)));
}

/// A document using a category one target lacks fails only there;
/// other targets with their own contexts are unaffected.
#[test]
fn per_target_failure_is_isolated() {
    let mut doc = Document::new("clocked");
    let clock = doc.add_node("time", "frame_clock").unwrap();
    doc.node_mut(clock).unwrap().set_node_type(ValueType::Float);

    let ss = doc.add_node("standard_surface", "SR_clocked").unwrap();
    doc.node_mut(ss)
        .unwrap()
        .set_node_type(ValueType::Surfaceshader);
    doc.add_input(ss, "base")
        .unwrap()
        .set_value_type(ValueType::Float)
        .set_node_name("frame_clock");

    let sm = doc.add_node("surfacematerial", "Clocked").unwrap();
    doc.node_mut(sm).unwrap().set_node_type(ValueType::Material);
    doc.add_input(sm, "surfaceshader")
        .unwrap()
        .set_value_type(ValueType::Surfaceshader)
        .set_node_name("SR_clocked");
    doc.validate().unwrap();

    assert!(generate_for(&doc, "glsl").is_ok());

    let err = generate_for(&doc, "osl").unwrap_err();
    assert!(
        matches!(&err, GenError::Unresolved { category, target, .. }
            if category == "time" && target == "osl"),
        "unexpected error: {err}"
    );

    // The failure above must not poison a fresh context on another target.
    assert!(generate_for(&doc, "msl").is_ok());
}

#[test]
fn parallel_generation_over_a_shared_document() {
    let doc = surface_material_document();
    std::thread::scope(|scope| {
        let handles: Vec<_> = ["glsl", "essl", "vulkan", "msl", "osl"]
            .into_iter()
            .map(|target| {
                let doc = &doc;
                scope.spawn(move || generate_for(doc, target).map(|s| s.target().to_string()))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }
    });
}

/// Scalar-to-vector broadcast appears as an explicit constructor in the
/// emitted source, never as a silent conversion.
#[test]
fn coercions_are_emitted_as_constructors() {
    let mut doc = Document::new("broadcast");
    let grey = doc.add_node("constant", "grey_level").unwrap();
    doc.node_mut(grey).unwrap().set_node_type(ValueType::Float);
    doc.add_input(grey, "value")
        .unwrap()
        .set_value(Value::Float(0.25));

    let ss = doc.add_node("standard_surface", "SR_grey").unwrap();
    doc.node_mut(ss)
        .unwrap()
        .set_node_type(ValueType::Surfaceshader);
    doc.add_input(ss, "base_color")
        .unwrap()
        .set_value_type(ValueType::Color3)
        .set_node_name("grey_level");

    let sm = doc.add_node("surfacematerial", "Grey").unwrap();
    doc.node_mut(sm).unwrap().set_node_type(ValueType::Material);
    doc.add_input(sm, "surfaceshader")
        .unwrap()
        .set_value_type(ValueType::Surfaceshader)
        .set_node_name("SR_grey");
    doc.validate().unwrap();

    let pixel_glsl = generate_for(&doc, "glsl").unwrap();
    assert!(pixel_glsl
        .source_code(Stage::Pixel)
        .unwrap()
        .contains("vec3(grey_level_out)"));

    let pixel_msl = generate_for(&doc, "msl").unwrap();
    assert!(pixel_msl
        .source_code(Stage::Pixel)
        .unwrap()
        .contains("float3(grey_level_out)"));
}

/// The surface shader's unconnected normal input is wired to the shared
/// geometric source of each backend.
#[test]
fn default_geometry_is_bound_per_target() {
    let doc = surface_material_document();
    let cases = [
        ("glsl", "v_normal_world"),
        ("msl", "in.normal_world"),
        ("osl", ", N)"),
    ];
    for (target, expr) in cases {
        let shader = generate_for(&doc, target).unwrap();
        let pixel = shader.source_code(Stage::Pixel).unwrap();
        assert!(
            pixel.contains(expr),
            "{target} pixel stage does not read {expr}:\n{pixel}"
        );
    }
}

#[test]
fn authored_input_unknown_to_the_library_fails() {
    let mut doc = Document::new("unknown_input");
    let ss = doc.add_node("standard_surface", "SR_bad").unwrap();
    doc.node_mut(ss)
        .unwrap()
        .set_node_type(ValueType::Surfaceshader);
    doc.add_input(ss, "sheen_tintedness")
        .unwrap()
        .set_value(Value::Float(1.0));
    doc.validate().unwrap();

    let err = generate_for(&doc, "glsl").unwrap_err();
    assert!(matches!(err, GenError::UnknownInput { .. }));
}

#[test]
fn material_without_surface_shader_input_fails() {
    let mut doc = Document::new("empty_material");
    let sm = doc.add_node("surfacematerial", "Hollow").unwrap();
    doc.node_mut(sm).unwrap().set_node_type(ValueType::Material);
    doc.validate().unwrap();

    let err = generate_for(&doc, "glsl").unwrap_err();
    assert!(matches!(err, GenError::MissingSurfaceShader { .. }));
}

#[test]
fn non_renderable_element_is_rejected() {
    let mut doc = Document::new("scalar_only");
    let c = doc.add_node("constant", "lone").unwrap();
    doc.node_mut(c).unwrap().set_node_type(ValueType::Float);
    doc.add_input(c, "value").unwrap().set_value(Value::Float(1.0));
    doc.validate().unwrap();

    let generator = create_generator("glsl").unwrap();
    let mut context = GenContext::for_generator(generator.as_ref());
    load_standard_library(&mut context).unwrap();
    let err = generator.generate("lone", c, &doc, &mut context).unwrap_err();
    assert!(matches!(err, GenError::InvalidElement { .. }));
}

#[test]
fn generate_without_library_fails() {
    let doc = surface_material_document();
    let generator = create_generator("glsl").unwrap();
    let mut context = GenContext::for_generator(generator.as_ref());
    let element = doc.find_renderable_element().unwrap();
    let err = generator
        .generate("Default", element, &doc, &mut context)
        .unwrap_err();
    assert!(matches!(err, GenError::LibraryNotLoaded(_)));
}

#[test]
fn included_function_definition_appears_once() {
    let doc = surface_material_document();
    let shader = generate_for(&doc, "glsl").unwrap();
    let pixel = shader.source_code(Stage::Pixel).unwrap();
    assert_eq!(
        pixel.matches("vec4 sx_standard_surface(").count(),
        1,
        "function definition duplicated:\n{pixel}"
    );
    assert!(pixel.contains("SR_default_out = sx_standard_surface("));
}

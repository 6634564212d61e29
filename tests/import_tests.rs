//! Bundle Import Tests
//!
//! Tests for:
//! - GLB and textual glTF parsing into a scene + clips
//! - Wrapper root naming and hierarchy
//! - Track naming and keyframe decoding
//! - Pass-through of uninterpreted node data
//! - Malformed input rejection

mod common;

use glam::Vec3;

use clipmerge::animation::{InterpolationMode, TargetPath, TrackName};
use clipmerge::assets::GltfLoader;
use clipmerge::config::ImportOptions;

use common::{BundleBuilder, QUARTER_ROLL, approx_slice, channel, fixture};

// ============================================================================
// Structure
// ============================================================================

#[test]
fn glb_import_lists_clips_in_order() {
    common::init_logger();
    let bundle = GltfLoader::parse(&fixture().to_glb(), &ImportOptions::default()).unwrap();
    assert_eq!(bundle.animation_names(), vec!["Walk", "Wave", "Hop"]);
}

#[test]
fn text_import_matches_glb_import() {
    let options = ImportOptions::default();
    let glb = GltfLoader::parse(&fixture().to_glb(), &options).unwrap();
    let text = GltfLoader::parse(&fixture().to_gltf(), &options).unwrap();

    assert_eq!(glb.animations, text.animations);
    assert_eq!(glb.scene.node_count(), text.scene.node_count());
}

#[test]
fn scene_hangs_below_wrapper_root() {
    let bundle = GltfLoader::parse(&fixture().to_glb(), &ImportOptions::default()).unwrap();
    let scene = &bundle.scene;

    let root = scene.get_node(scene.root()).unwrap();
    assert_eq!(root.name, "myModel");
    assert!(root.rest.is_identity());
    // three imported nodes + wrapper
    assert_eq!(scene.node_count(), 4);

    // The wrapper shadows the imported node of the same name.
    assert_eq!(scene.find_node_by_name("myModel"), Some(scene.root()));

    let body = scene.find_node_by_name("Body").unwrap();
    let body_node = scene.get_node(body).unwrap();
    assert_eq!(body_node.rest.position, Vec3::new(0.0, 1.0, 0.0));
    assert_eq!(body_node.transform, body_node.rest);

    let arm = scene.find_node_by_name("Arm").unwrap();
    assert_eq!(scene.get_node(arm).unwrap().parent(), Some(body));
}

#[test]
fn custom_root_name() {
    let options = ImportOptions {
        root_node_name: "Wrapper".to_string(),
    };
    let bundle = GltfLoader::parse(&fixture().to_glb(), &options).unwrap();
    assert_eq!(bundle.scene.get_node(bundle.scene.root()).unwrap().name, "Wrapper");
}

#[test]
fn node_extras_pass_through() {
    let bundle = GltfLoader::parse(&fixture().to_glb(), &ImportOptions::default()).unwrap();
    let body = bundle.scene.find_node_by_name("Body").unwrap();
    let props = &bundle.scene.get_node(body).unwrap().properties;

    assert_eq!(props["extras"]["tag"], "body");
    assert!(!props.contains_key("translation"));
    assert!(!props.contains_key("children"));
}

#[test]
fn document_resources_are_kept() {
    let bundle = GltfLoader::parse(&fixture().to_glb(), &ImportOptions::default()).unwrap();
    let resources = &bundle.scene.resources;

    assert!(resources.document.contains_key("asset"));
    assert!(resources.document.contains_key("accessors"));
    assert!(!resources.document.contains_key("animations"));
    assert!(!resources.document.contains_key("nodes"));
    assert_eq!(resources.buffers.len(), 1);
}

// ============================================================================
// Tracks
// ============================================================================

#[test]
fn tracks_are_named_by_node_and_property() {
    let bundle = GltfLoader::parse(&fixture().to_glb(), &ImportOptions::default()).unwrap();

    let walk = bundle.animation("Walk").unwrap();
    let names: Vec<String> = walk.tracks.names().map(ToString::to_string).collect();
    assert_eq!(names, vec!["myModel.position", "myModel.quaternion"]);

    let wave = bundle.animation("Wave").unwrap();
    assert!(wave.track(&TrackName::new("Arm", TargetPath::Rotation)).is_some());
}

#[test]
fn keyframes_are_decoded() {
    let bundle = GltfLoader::parse(&fixture().to_gltf(), &ImportOptions::default()).unwrap();
    let walk = bundle.animation("Walk").unwrap();

    let rot = walk.track(&"myModel.quaternion".parse().unwrap()).unwrap();
    assert_eq!(rot.times, vec![0.0, 1.0]);
    assert!(approx_slice(rot.value_at(1), &QUARTER_ROLL));

    let hop = bundle.animation("Hop").unwrap();
    let pos = hop.track(&"Body.position".parse().unwrap()).unwrap();
    assert_eq!(pos.interpolation, InterpolationMode::Step);
    assert_eq!(pos.values, vec![0.0, 1.0, 0.0, 0.0, 2.0, 0.0]);
    assert!((hop.resolved_duration() - 0.5).abs() < common::EPSILON);
}

#[test]
fn repeated_node_names_are_made_unique() {
    let bytes = BundleBuilder::default()
        .with_nodes(serde_json::json!([
            { "name": "Rig", "children": [1, 2] },
            { "name": "Bone" },
            { "name": "Bone" },
        ]))
        .animation(
            "Dup",
            vec![
                channel(1, "translation", &[0.0, 1.0], &[0.0, 0.0, 0.0, 0.0, 2.0, 0.0], "LINEAR"),
                channel(2, "translation", &[0.0, 1.0], &[0.0, 0.0, 0.0, 0.0, 9.0, 0.0], "LINEAR"),
            ],
        )
        .to_glb();
    let bundle = GltfLoader::parse(&bytes, &ImportOptions::default()).unwrap();

    let dup = bundle.animation("Dup").unwrap();
    let names: Vec<String> = dup.tracks.names().map(ToString::to_string).collect();
    assert_eq!(names, vec!["Bone.position", "Bone_1.position"]);

    let second = dup.track(&"Bone_1.position".parse().unwrap()).unwrap();
    assert_eq!(second.value_at(1), &[0.0, 9.0, 0.0]);

    let first = bundle.scene.find_node_by_name("Bone").unwrap();
    let renamed = bundle.scene.find_node_by_name("Bone_1").unwrap();
    assert_ne!(first, renamed);
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn garbage_bytes_are_a_parse_failure() {
    let err = GltfLoader::parse(b"definitely not a model", &ImportOptions::default()).unwrap_err();
    assert!(err.is_parse_failure(), "{err}");
}

#[test]
fn truncated_glb_is_a_parse_failure() {
    let bytes = fixture().to_glb();
    let err = GltfLoader::parse(&bytes[..bytes.len() / 2], &ImportOptions::default()).unwrap_err();
    assert!(err.is_parse_failure(), "{err}");
}

#[test]
fn external_buffer_is_a_parse_failure() {
    let mut doc = common::document_json(&fixture().to_gltf());
    doc["buffers"][0]["uri"] = serde_json::json!("scene.bin");
    let bytes = serde_json::to_vec(&doc).unwrap();

    let err = GltfLoader::parse(&bytes, &ImportOptions::default()).unwrap_err();
    assert!(err.is_parse_failure(), "{err}");
}

#[tokio::test]
async fn async_import() {
    let bundle = GltfLoader::parse_async(fixture().to_glb(), ImportOptions::default())
        .await
        .unwrap();
    assert_eq!(bundle.animations.len(), 3);
}

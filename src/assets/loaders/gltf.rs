//! glTF 2.0 import.
//!
//! Builds a [`Scene`] below a wrapper root plus one [`AnimationClip`] per
//! glTF animation. Node names are made unique at load time so every track
//! name resolves to exactly one node.
//!
//! Cubic-spline samplers are flattened to linear (tangents dropped), so a
//! bundle with cubic-spline animation does not survive an import/export round
//! trip unchanged: the exported keyframes are the same, the curve between them
//! is not.

use std::borrow::Cow;

use base64::Engine;
use glam::{Quat, Vec3};
use rustc_hash::FxHashSet;
use serde_json::{Map, Value};

use crate::animation::binding::{TargetPath, TrackName};
use crate::animation::clip::{AnimationClip, ClipDuration, TrackMap};
use crate::animation::tracks::{InterpolationMode, Track};
use crate::config::ImportOptions;
use crate::errors::{Error, Result};
use crate::scene::{Node, NodeHandle, Scene, SceneResources, Transform};

/// Node members interpreted by the loader; every other member passes through.
const NODE_MANAGED_KEYS: [&str; 6] = ["name", "children", "translation", "rotation", "scale", "matrix"];

/// Top-level members rebuilt by the exporter.
const DOCUMENT_MANAGED_KEYS: [&str; 5] = ["nodes", "scenes", "scene", "animations", "buffers"];

/// Result of a successful import.
#[derive(Debug, Clone)]
pub struct ImportedBundle {
    pub scene: Scene,
    /// Native clips, in bundle order. Read-only to the merge pipeline.
    pub animations: Vec<AnimationClip>,
}

impl ImportedBundle {
    /// Names of the native clips, for populating a selection list.
    #[must_use]
    pub fn animation_names(&self) -> Vec<String> {
        self.animations.iter().map(|clip| clip.name.clone()).collect()
    }

    #[must_use]
    pub fn animation(&self, name: &str) -> Option<&AnimationClip> {
        self.animations.iter().find(|clip| clip.name == name)
    }
}

/// Parses binary (`.glb`) or textual (`.gltf`) bundles from memory.
pub struct GltfLoader<'a> {
    gltf: &'a gltf::Gltf,
    buffers: Vec<Vec<u8>>,
    node_names: Vec<String>,
}

impl<'a> GltfLoader<'a> {
    /// Entry point.
    ///
    /// Buffers must be embedded (GLB binary chunk or base64 `data:` URI);
    /// there is no base path to resolve external files against.
    pub fn parse(bytes: &[u8], options: &ImportOptions) -> Result<ImportedBundle> {
        let gltf = gltf::Gltf::from_slice(bytes)
            .map_err(|e| Error::parse_with("not a valid glTF document", e))?;

        let mut document = Self::raw_document(bytes)?;
        let buffers = Self::load_buffers(&gltf)?;

        let node_names = unique_node_names(&gltf);

        let loader = GltfLoader {
            gltf: &gltf,
            buffers,
            node_names,
        };

        let raw_nodes = match document.remove("nodes") {
            Some(Value::Array(nodes)) => nodes,
            _ => Vec::new(),
        };
        let mut scene = loader.load_scene(&raw_nodes, &options.root_node_name);
        let animations = loader.load_animations()?;

        for key in DOCUMENT_MANAGED_KEYS {
            document.remove(key);
        }
        scene.resources = SceneResources {
            document,
            buffers: loader.buffers,
        };

        log::info!(
            "Imported bundle: {} nodes, {} animations",
            scene.node_count() - 1,
            animations.len()
        );

        Ok(ImportedBundle { scene, animations })
    }

    /// Parses on the blocking thread pool.
    pub async fn parse_async(bytes: Vec<u8>, options: ImportOptions) -> Result<ImportedBundle> {
        tokio::task::spawn_blocking(move || GltfLoader::parse(&bytes, &options)).await?
    }

    /// The document JSON exactly as stored, for pass-through of members the
    /// typed parser does not model.
    fn raw_document(bytes: &[u8]) -> Result<Map<String, Value>> {
        let json: Cow<'_, [u8]> = if bytes.starts_with(b"glTF") {
            gltf::binary::Glb::from_slice(bytes)
                .map_err(|e| Error::parse_with("malformed GLB container", e))?
                .json
        } else {
            Cow::Borrowed(bytes)
        };
        serde_json::from_slice(&json).map_err(|e| Error::parse_with("malformed glTF JSON", e))
    }

    fn load_buffers(gltf: &gltf::Gltf) -> Result<Vec<Vec<u8>>> {
        let mut buffer_data = Vec::new();
        for buffer in gltf.buffers() {
            let data = match buffer.source() {
                gltf::buffer::Source::Bin => gltf
                    .blob
                    .as_deref()
                    .ok_or_else(|| Error::parse("missing GLB binary chunk"))?
                    .to_vec(),
                gltf::buffer::Source::Uri(uri) => decode_data_uri(uri)?,
            };
            if data.len() < buffer.length() {
                return Err(Error::parse(format!(
                    "buffer {} holds {} bytes, {} declared",
                    buffer.index(),
                    data.len(),
                    buffer.length()
                )));
            }
            buffer_data.push(data);
        }
        Ok(buffer_data)
    }

    fn load_scene(&self, raw_nodes: &[Value], root_name: &str) -> Scene {
        let mut scene = Scene::new(root_name);

        // Step 1: create every node (glTF index == position in `mapping`)
        let mapping: Vec<NodeHandle> = self
            .gltf
            .nodes()
            .map(|node| {
                let (t, r, s) = node.transform().decomposed();
                let rest = Transform::from_trs(
                    Vec3::from_array(t),
                    Quat::from_array(r),
                    Vec3::from_array(s),
                );
                let mut engine_node = Node::with_rest(self.node_names[node.index()].clone(), rest);
                if let Some(Value::Object(raw)) = raw_nodes.get(node.index()) {
                    engine_node.properties = raw
                        .iter()
                        .filter(|(key, _)| !NODE_MANAGED_KEYS.contains(&key.as_str()))
                        .map(|(key, value)| (key.clone(), value.clone()))
                        .collect();
                }
                scene.add_node(engine_node)
            })
            .collect();

        // Step 2: hierarchy
        for node in self.gltf.nodes() {
            let parent = mapping[node.index()];
            for child in node.children() {
                scene.attach(mapping[child.index()], parent);
            }
        }

        // Step 3: hang the scene roots below the animated root
        let root = scene.root();
        match self.gltf.default_scene().or_else(|| self.gltf.scenes().next()) {
            Some(default_scene) => {
                for node in default_scene.nodes() {
                    scene.attach(mapping[node.index()], root);
                }
            }
            None => {
                for &handle in &mapping {
                    if scene.get_node(handle).is_some_and(|n| n.parent().is_none()) {
                        scene.attach(handle, root);
                    }
                }
            }
        }

        scene
    }

    fn load_animations(&self) -> Result<Vec<AnimationClip>> {
        let mut animations = Vec::new();

        for anim in self.gltf.animations() {
            let clip_name = anim
                .name()
                .map_or_else(|| format!("animation_{}", anim.index()), str::to_string);
            let mut tracks = TrackMap::new();

            for channel in anim.channels() {
                let reader = channel.reader(|buffer| self.buffers.get(buffer.index()).map(Vec::as_slice));
                let node_name = &self.node_names[channel.target().node().index()];

                let times: Vec<f32> = reader
                    .read_inputs()
                    .ok_or_else(|| {
                        Error::parse(format!("animation `{clip_name}`: unreadable keyframe times"))
                    })?
                    .collect();

                let outputs = reader.read_outputs().ok_or_else(|| {
                    Error::parse(format!("animation `{clip_name}`: unreadable keyframe values"))
                })?;
                let (target, mut values): (TargetPath, Vec<f32>) = match outputs {
                    gltf::animation::util::ReadOutputs::Translations(iter) => {
                        (TargetPath::Translation, iter.flatten().collect())
                    }
                    gltf::animation::util::ReadOutputs::Rotations(iter) => {
                        (TargetPath::Rotation, iter.into_f32().flatten().collect())
                    }
                    gltf::animation::util::ReadOutputs::Scales(iter) => {
                        (TargetPath::Scale, iter.flatten().collect())
                    }
                    gltf::animation::util::ReadOutputs::MorphTargetWeights(iter) => {
                        (TargetPath::Weights, iter.into_f32().collect())
                    }
                };

                let interpolation = match channel.sampler().interpolation() {
                    gltf::animation::Interpolation::Step => InterpolationMode::Step,
                    gltf::animation::Interpolation::Linear => InterpolationMode::Linear,
                    gltf::animation::Interpolation::CubicSpline => {
                        log::warn!(
                            "animation `{clip_name}`: cubic-spline channel on `{node_name}` flattened to linear"
                        );
                        values = flatten_cubic_spline(&values, times.len());
                        InterpolationMode::Linear
                    }
                };

                let track = Track::new(TrackName::new(node_name.as_str(), target), times, values, interpolation)
                    .map_err(|e| Error::parse_with(format!("animation `{clip_name}`"), e))?;
                if let Some(previous) = tracks.insert(track) {
                    log::warn!(
                        "animation `{clip_name}`: duplicate channel for `{}`, keeping the last one",
                        previous.name
                    );
                }
            }

            animations.push(AnimationClip::new(clip_name, ClipDuration::Auto, tracks));
        }

        Ok(animations)
    }
}

/// One distinct name per node, indexed like `gltf.nodes()`.
///
/// Nodes are visited depth-first from the default scene roots, then the rest
/// by index. The first node to claim a name keeps it; later ones get `_1`,
/// `_2`, ... appended. Unnamed nodes start from `Node_<index>`.
fn unique_node_names(gltf: &gltf::Gltf) -> Vec<String> {
    let nodes: Vec<gltf::Node<'_>> = gltf.nodes().collect();
    let roots: Vec<usize> = gltf
        .default_scene()
        .or_else(|| gltf.scenes().next())
        .map(|scene| scene.nodes().map(|n| n.index()).collect())
        .unwrap_or_default();

    let mut visited = vec![false; nodes.len()];
    let mut order = Vec::with_capacity(nodes.len());
    for start in roots.into_iter().chain(0..nodes.len()) {
        let mut stack = vec![start];
        while let Some(index) = stack.pop() {
            if std::mem::replace(&mut visited[index], true) {
                continue;
            }
            order.push(index);
            let children: Vec<usize> = nodes[index].children().map(|c| c.index()).collect();
            stack.extend(children.into_iter().rev());
        }
    }

    let mut used = FxHashSet::default();
    let mut names = vec![String::new(); nodes.len()];
    for index in order {
        let base = nodes[index]
            .name()
            .map_or_else(|| format!("Node_{index}"), str::to_string);
        let mut name = base.clone();
        let mut suffix = 0;
        while used.contains(&name) {
            suffix += 1;
            name = format!("{base}_{suffix}");
        }
        if suffix > 0 {
            log::debug!("Node {index} `{base}` renamed to `{name}`");
        }
        used.insert(name.clone());
        names[index] = name;
    }
    names
}

/// Decodes a base64 `data:` URI.
fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    let Some(rest) = uri.strip_prefix("data:") else {
        return Err(Error::parse(format!(
            "external buffer `{uri}` cannot be resolved from an in-memory bundle"
        )));
    };
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| Error::parse("data URI without payload"))?;
    if !header.ends_with(";base64") {
        return Err(Error::parse(format!("unsupported data URI encoding `{header}`")));
    }
    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| Error::parse_with("invalid base64 in data URI", e))
}

/// Keeps the keyframe values of a cubic-spline output, dropping tangents.
///
/// Cubic output holds `[in_tangent, value, out_tangent]` per keyframe.
fn flatten_cubic_spline(values: &[f32], keyframes: usize) -> Vec<f32> {
    if keyframes == 0 || values.len() % (keyframes * 3) != 0 {
        return values.to_vec();
    }
    let n = values.len() / (keyframes * 3);
    (0..keyframes)
        .flat_map(|i| {
            let start = (i * 3 + 1) * n;
            values[start..start + n].iter().copied()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cubic_spline_keeps_middle_values() {
        // two keyframes, vec3
        let values = [
            9.0, 9.0, 9.0, 1.0, 2.0, 3.0, 8.0, 8.0, 8.0, //
            7.0, 7.0, 7.0, 4.0, 5.0, 6.0, 6.0, 6.0, 6.0,
        ];
        assert_eq!(flatten_cubic_spline(&values, 2), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn data_uri_decoding() {
        assert_eq!(
            decode_data_uri("data:application/octet-stream;base64,AAEC").unwrap(),
            vec![0, 1, 2]
        );
        assert!(decode_data_uri("buffer.bin").unwrap_err().is_parse_failure());
        assert!(decode_data_uri("data:text/plain,abc").is_err());
    }
}

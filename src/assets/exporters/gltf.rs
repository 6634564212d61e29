use std::borrow::Cow;

use base64::Engine;
use glam::{Quat, Vec3};
use rustc_hash::FxHashMap;
use serde_json::{Map, Value, json};

use crate::animation::binder::Binder;
use crate::animation::binding::TargetPath;
use crate::animation::clip::AnimationClip;
use crate::config::{ExportFormat, ExportOptions};
use crate::errors::{Error, Result};
use crate::scene::{NodeHandle, Scene};

const COMPONENT_TYPE_F32: u32 = 5126;
const GLB_MAGIC: [u8; 4] = *b"glTF";
const GLB_VERSION: u32 = 2;
const GLB_HEADER_LEN: usize = 12;
const GLB_CHUNK_HEADER_LEN: usize = 8;

/// Serialized bundle, ready for a save/download sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPayload {
    pub bytes: Vec<u8>,
    /// Suggested file name, e.g. `Exported.glb`.
    pub file_name: String,
    /// `application/octet-stream` (binary) or `text/plain` (textual).
    pub mime_type: &'static str,
    pub format: ExportFormat,
}

/// Writes a scene plus one animation clip as a glTF bundle.
pub struct GltfExporter;

impl GltfExporter {
    /// Serializes `scene` in its rest pose together with `clip`.
    ///
    /// The live pose of `scene` is never read: a rest-pose snapshot is taken
    /// first, so whatever playback did to the nodes does not leak into the file.
    pub fn export(scene: &Scene, clip: &AnimationClip, options: &ExportOptions) -> Result<ExportPayload> {
        let snapshot = scene.rest_pose_snapshot();
        let (document, body) = Self::build_document(&snapshot, clip, options)?;

        let bytes = match options.format {
            ExportFormat::Binary => Self::write_glb(document, body)?,
            ExportFormat::Text => Self::write_text(document, body)?,
        };

        let payload = ExportPayload {
            bytes,
            file_name: options.file_name(),
            mime_type: options.format.mime_type(),
            format: options.format,
        };
        log::info!(
            "Exported `{}` ({} tracks) as {} ({} bytes)",
            options.clip_name,
            clip.tracks.len(),
            payload.file_name,
            payload.bytes.len()
        );
        Ok(payload)
    }

    /// Exports on the blocking thread pool.
    pub async fn export_async(scene: Scene, clip: AnimationClip, options: ExportOptions) -> Result<ExportPayload> {
        tokio::task::spawn_blocking(move || Self::export(&scene, &clip, &options)).await?
    }

    /// Builds the document minus `buffers`, plus the consolidated binary body.
    fn build_document(scene: &Scene, clip: &AnimationClip, options: &ExportOptions) -> Result<(Map<String, Value>, Vec<u8>)> {
        let bindings = Binder::bind_all(scene, clip)?;

        let mut document = scene.resources.document.clone();
        let mut body = BinaryBody::default();

        // 1. Consolidate every source buffer into buffer 0
        let bases: Vec<usize> = scene
            .resources
            .buffers
            .iter()
            .map(|data| body.append_raw(data))
            .collect();

        if let Some(views) = document.remove("bufferViews") {
            let Value::Array(views) = views else {
                return Err(Error::export("`bufferViews` is not an array"));
            };
            for (i, mut view) in views.into_iter().enumerate() {
                let obj = view
                    .as_object_mut()
                    .ok_or_else(|| Error::export(format!("bufferView {i} is not an object")))?;
                let buffer = obj.get("buffer").and_then(Value::as_u64).unwrap_or(0) as usize;
                let base = *bases.get(buffer).ok_or_else(|| {
                    Error::export(format!("bufferView {i} references missing buffer {buffer}"))
                })?;
                let offset = obj.get("byteOffset").and_then(Value::as_u64).unwrap_or(0) as usize;
                obj.insert("buffer".into(), json!(0));
                obj.insert("byteOffset".into(), json!(base + offset));
                body.views.push(view);
            }
        }
        if let Some(accessors) = document.remove("accessors") {
            let Value::Array(accessors) = accessors else {
                return Err(Error::export("`accessors` is not an array"));
            };
            body.accessors = accessors;
        }

        // 2. Nodes, in export order
        let index_of: FxHashMap<NodeHandle, usize> = scene
            .export_order()
            .enumerate()
            .map(|(index, handle)| (handle, index))
            .collect();
        let nodes = scene
            .export_order()
            .map(|handle| Self::node_json(scene, handle, &index_of))
            .collect::<Result<Vec<_>>>()?;
        let root_index = index_of[&scene.root()];

        // 3. Animation
        let mut samplers = Vec::new();
        let mut channels = Vec::new();
        for binding in &bindings {
            let track = &clip.tracks.as_slice()[binding.track_index];
            track
                .validate()
                .map_err(|e| Error::export_with(format!("track `{}` cannot be written", track.name), e))?;
            if track.is_empty() {
                log::warn!("Skipping `{}`: no keyframes", track.name);
                continue;
            }

            let first = track.times[0];
            let last = track.times[track.len() - 1];
            let input = body.push_floats(&track.times, "SCALAR", track.len(), Some((first, last)));
            let output = match binding.target {
                TargetPath::Translation | TargetPath::Scale => {
                    body.push_floats(&track.values, "VEC3", track.len(), None)
                }
                TargetPath::Rotation => body.push_floats(&track.values, "VEC4", track.len(), None),
                TargetPath::Weights => body.push_floats(&track.values, "SCALAR", track.values.len(), None),
            };

            samplers.push(json!({
                "input": input,
                "output": output,
                "interpolation": track.interpolation.gltf_name(),
            }));
            channels.push(json!({
                "sampler": samplers.len() - 1,
                "target": {
                    "node": index_of[&binding.node_handle],
                    "path": binding.target.gltf_path(),
                },
            }));
        }

        // 4. Reassemble
        let asset = document
            .entry("asset")
            .or_insert_with(|| json!({ "version": "2.0" }));
        if let Some(asset) = asset.as_object_mut() {
            asset.insert("generator".into(), json!(options.generator));
        }

        document.insert("nodes".into(), Value::Array(nodes));
        document.insert("scenes".into(), json!([{ "nodes": [root_index] }]));
        document.insert("scene".into(), json!(0));

        if channels.is_empty() {
            log::debug!("`{}` has no animated tracks; writing scene only", clip.name);
        } else {
            document.insert(
                "animations".into(),
                json!([{
                    "name": options.clip_name,
                    "channels": channels,
                    "samplers": samplers,
                }]),
            );
        }

        if !body.views.is_empty() {
            document.insert("bufferViews".into(), Value::Array(body.views));
        }
        if !body.accessors.is_empty() {
            document.insert("accessors".into(), Value::Array(body.accessors));
        }

        if u32::try_from(body.data.len()).is_err() {
            return Err(Error::export(format!(
                "binary body of {} bytes exceeds the 4 GiB container limit",
                body.data.len()
            )));
        }

        Ok((document, body.data))
    }

    fn node_json(scene: &Scene, handle: NodeHandle, index_of: &FxHashMap<NodeHandle, usize>) -> Result<Value> {
        let node = scene
            .get_node(handle)
            .ok_or_else(|| Error::export("scene order references a removed node"))?;

        let mut obj = node.properties.clone();
        obj.insert("name".into(), json!(node.name));

        let children: Vec<usize> = node
            .children()
            .iter()
            .filter_map(|child| index_of.get(child).copied())
            .collect();
        if !children.is_empty() {
            obj.insert("children".into(), json!(children));
        }

        let t = node.transform;
        if t.position != Vec3::ZERO {
            obj.insert("translation".into(), json!(t.position.to_array()));
        }
        if t.rotation != Quat::IDENTITY {
            obj.insert("rotation".into(), json!(t.rotation.to_array()));
        }
        if t.scale != Vec3::ONE {
            obj.insert("scale".into(), json!(t.scale.to_array()));
        }

        Ok(Value::Object(obj))
    }

    fn write_text(mut document: Map<String, Value>, data: Vec<u8>) -> Result<Vec<u8>> {
        if !data.is_empty() {
            let uri = format!(
                "data:application/octet-stream;base64,{}",
                base64::engine::general_purpose::STANDARD.encode(&data)
            );
            document.insert("buffers".into(), json!([{ "byteLength": data.len(), "uri": uri }]));
        }
        serde_json::to_vec_pretty(&Value::Object(document))
            .map_err(|e| Error::export_with("failed to serialize glTF JSON", e))
    }

    fn write_glb(mut document: Map<String, Value>, data: Vec<u8>) -> Result<Vec<u8>> {
        if !data.is_empty() {
            document.insert("buffers".into(), json!([{ "byteLength": data.len() }]));
        }
        let mut json = serde_json::to_vec(&Value::Object(document))
            .map_err(|e| Error::export_with("failed to serialize glTF JSON", e))?;
        pad_to_four(&mut json, b' ');

        let mut length = GLB_HEADER_LEN + GLB_CHUNK_HEADER_LEN + json.len();
        if !data.is_empty() {
            length += GLB_CHUNK_HEADER_LEN + data.len();
        }
        let length = u32::try_from(length)
            .map_err(|_| Error::export(format!("GLB of {length} bytes exceeds the 4 GiB container limit")))?;

        let glb = gltf::binary::Glb {
            header: gltf::binary::Header {
                magic: GLB_MAGIC,
                version: GLB_VERSION,
                length,
            },
            json: Cow::Owned(json),
            bin: (!data.is_empty()).then_some(Cow::Owned(data)),
        };

        let mut out = Vec::with_capacity(length as usize);
        glb.to_writer(&mut out)
            .map_err(|e| Error::export_with("failed to write GLB container", e))?;
        Ok(out)
    }
}

/// The consolidated binary buffer plus the views and accessors into it.
#[derive(Default)]
struct BinaryBody {
    data: Vec<u8>,
    views: Vec<Value>,
    accessors: Vec<Value>,
}

impl BinaryBody {
    /// Appends raw bytes at a 4-byte aligned offset and returns that offset.
    fn append_raw(&mut self, bytes: &[u8]) -> usize {
        pad_to_four(&mut self.data, 0);
        let offset = self.data.len();
        self.data.extend_from_slice(bytes);
        pad_to_four(&mut self.data, 0);
        offset
    }

    /// Appends `floats` as a new view + float accessor and returns the accessor index.
    fn push_floats(&mut self, floats: &[f32], accessor_type: &str, count: usize, min_max: Option<(f32, f32)>) -> usize {
        let bytes: &[u8] = bytemuck::cast_slice(floats);
        let offset = self.append_raw(bytes);

        self.views.push(json!({
            "buffer": 0,
            "byteOffset": offset,
            "byteLength": bytes.len(),
        }));

        let mut accessor = json!({
            "bufferView": self.views.len() - 1,
            "componentType": COMPONENT_TYPE_F32,
            "count": count,
            "type": accessor_type,
        });
        if let Some((min, max)) = min_max {
            accessor["min"] = json!([min]);
            accessor["max"] = json!([max]);
        }
        self.accessors.push(accessor);
        self.accessors.len() - 1
    }
}

fn pad_to_four(bytes: &mut Vec<u8>, fill: u8) {
    while bytes.len() % 4 != 0 {
        bytes.push(fill);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn views_are_four_byte_aligned() {
        let mut body = BinaryBody::default();
        assert_eq!(body.append_raw(&[1, 2, 3]), 0);

        let accessor = body.push_floats(&[0.0, 1.0], "SCALAR", 2, Some((0.0, 1.0)));
        assert_eq!(accessor, 0);
        assert_eq!(body.views[0]["byteOffset"], 4);
        assert_eq!(body.accessors[0]["max"], json!([1.0]));
        assert_eq!(body.data.len(), 12);
    }
}

//! Shared fixtures: a small in-memory bundle with three clips.
//!
//! ```text
//! myModel ── Body (t = [0, 1, 0]) ── Arm
//!
//! Walk  myModel.position   [0, 1]    linear
//!       myModel.quaternion [0, 1]    linear
//! Wave  Arm.quaternion     [0, 2]    linear
//! Hop   Body.position      [0, 0.5]  step
//! ```

#![allow(dead_code)]

use std::borrow::Cow;

use base64::Engine;
use serde_json::{Value, json};

pub const EPSILON: f32 = 1e-5;

pub const FRAC_1_SQRT_2: f32 = std::f32::consts::FRAC_1_SQRT_2;

/// 45 degrees about +Z.
pub const QUARTER_ROLL: [f32; 4] = [0.0, 0.0, 0.382_683_43, 0.923_879_5];

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

pub fn approx_slice(a: &[f32], b: &[f32]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| approx(*x, *y))
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub struct Channel {
    node: usize,
    path: &'static str,
    times: Vec<f32>,
    values: Vec<f32>,
    interpolation: &'static str,
}

pub fn channel(node: usize, path: &'static str, times: &[f32], values: &[f32], interpolation: &'static str) -> Channel {
    Channel {
        node,
        path,
        times: times.to_vec(),
        values: values.to_vec(),
        interpolation,
    }
}

/// Accumulates float buffer views, accessors and animation channels.
#[derive(Default)]
pub struct BundleBuilder {
    data: Vec<u8>,
    views: Vec<Value>,
    accessors: Vec<Value>,
    animations: Vec<Value>,
    nodes: Option<Value>,
}

impl BundleBuilder {
    fn push_floats(&mut self, floats: &[f32], accessor_type: &str, count: usize) -> usize {
        let offset = self.data.len();
        for f in floats {
            self.data.extend_from_slice(&f.to_le_bytes());
        }
        self.views.push(json!({
            "buffer": 0,
            "byteOffset": offset,
            "byteLength": floats.len() * 4,
        }));
        let mut accessor = json!({
            "bufferView": self.views.len() - 1,
            "componentType": 5126,
            "count": count,
            "type": accessor_type,
        });
        if accessor_type == "SCALAR" && count > 0 {
            accessor["min"] = json!([floats[0]]);
            accessor["max"] = json!([floats[count - 1]]);
        }
        self.accessors.push(accessor);
        self.accessors.len() - 1
    }

    /// Replaces the default three-node hierarchy. Node 0 stays the scene root.
    pub fn with_nodes(mut self, nodes: Value) -> Self {
        self.nodes = Some(nodes);
        self
    }

    /// Adds a clip made of `channels`.
    pub fn animation(mut self, name: &str, channels: Vec<Channel>) -> Self {
        let mut samplers = Vec::new();
        let mut out_channels = Vec::new();
        for channel in channels {
            let count = channel.times.len();
            let input = self.push_floats(&channel.times, "SCALAR", count);
            let output = match channel.path {
                "translation" | "scale" => self.push_floats(&channel.values, "VEC3", count),
                "rotation" => self.push_floats(&channel.values, "VEC4", count),
                _ => self.push_floats(&channel.values, "SCALAR", channel.values.len()),
            };
            samplers.push(json!({
                "input": input,
                "output": output,
                "interpolation": channel.interpolation,
            }));
            out_channels.push(json!({
                "sampler": samplers.len() - 1,
                "target": { "node": channel.node, "path": channel.path },
            }));
        }
        self.animations.push(json!({
            "name": name,
            "channels": out_channels,
            "samplers": samplers,
        }));
        self
    }

    fn document(&self, uri: Option<String>) -> Value {
        let mut buffer = json!({ "byteLength": self.data.len() });
        if let Some(uri) = uri {
            buffer["uri"] = json!(uri);
        }
        let nodes = self.nodes.clone().unwrap_or_else(|| {
            json!([
                { "name": "myModel", "children": [1] },
                { "name": "Body", "translation": [0.0, 1.0, 0.0], "children": [2], "extras": { "tag": "body" } },
                { "name": "Arm" },
            ])
        });
        json!({
            "asset": { "version": "2.0", "generator": "fixture" },
            "scene": 0,
            "scenes": [{ "nodes": [0] }],
            "nodes": nodes,
            "animations": self.animations,
            "bufferViews": self.views,
            "accessors": self.accessors,
            "buffers": [buffer],
        })
    }

    /// Textual bundle with the buffer embedded as a data URI.
    pub fn to_gltf(&self) -> Vec<u8> {
        let uri = format!(
            "data:application/octet-stream;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&self.data)
        );
        serde_json::to_vec_pretty(&self.document(Some(uri))).unwrap()
    }

    /// Binary bundle.
    pub fn to_glb(&self) -> Vec<u8> {
        let mut json = serde_json::to_vec(&self.document(None)).unwrap();
        while json.len() % 4 != 0 {
            json.push(b' ');
        }
        let mut bin = self.data.clone();
        while bin.len() % 4 != 0 {
            bin.push(0);
        }
        let length = 12 + 8 + json.len() + 8 + bin.len();
        let glb = gltf::binary::Glb {
            header: gltf::binary::Header {
                magic: *b"glTF",
                version: 2,
                length: length as u32,
            },
            json: Cow::Owned(json),
            bin: Some(Cow::Owned(bin)),
        };
        let mut out = Vec::new();
        glb.to_writer(&mut out).unwrap();
        out
    }
}

/// The standard three-clip fixture described in the module docs.
pub fn fixture() -> BundleBuilder {
    let [x, y, z, w] = QUARTER_ROLL;
    BundleBuilder::default()
        .animation(
            "Walk",
            vec![
                channel(0, "translation", &[0.0, 1.0], &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0], "LINEAR"),
                channel(0, "rotation", &[0.0, 1.0], &[0.0, 0.0, 0.0, 1.0, x, y, z, w], "LINEAR"),
            ],
        )
        .animation(
            "Wave",
            vec![channel(
                2,
                "rotation",
                &[0.0, 2.0],
                &[0.0, 0.0, 0.0, 1.0, FRAC_1_SQRT_2, 0.0, 0.0, FRAC_1_SQRT_2],
                "LINEAR",
            )],
        )
        .animation(
            "Hop",
            vec![channel(1, "translation", &[0.0, 0.5], &[0.0, 1.0, 0.0, 0.0, 2.0, 0.0], "STEP")],
        )
}

/// Decodes the JSON chunk of a GLB, or the whole file for `.gltf`.
pub fn document_json(bytes: &[u8]) -> Value {
    if bytes.starts_with(b"glTF") {
        let glb = gltf::binary::Glb::from_slice(bytes).unwrap();
        serde_json::from_slice(&glb.json).unwrap()
    } else {
        serde_json::from_slice(bytes).unwrap()
    }
}

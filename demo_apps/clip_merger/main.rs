//! Merge animation clips of a glTF bundle from the command line.
//!
//! ```text
//! clip_merger <input> <output-dir> [--anim NAME]... [--duration S]
//!             [--position X Y Z] [--scale X Y Z] [--rotation X Y Z] [--text]
//! ```
//!
//! Any of `--duration`, `--position`, `--scale` or `--rotation` appends the
//! synthetic clip after the selected ones. The output file is named
//! `Exported.glb` (or `Exported.gltf` with `--text`) inside `<output-dir>`.

use std::path::PathBuf;

use anyhow::{Context, bail};
use clipmerge::{ExportFormat, SyntheticParams, Workspace};

struct Args {
    input: PathBuf,
    output_dir: PathBuf,
    animations: Vec<String>,
    params: SyntheticParams,
    synthetic: bool,
    format: ExportFormat,
}

fn parse_vec3(args: &mut impl Iterator<Item = String>, flag: &str) -> anyhow::Result<[f32; 3]> {
    let mut out = [0.0; 3];
    for v in &mut out {
        let raw = args.next().with_context(|| format!("{flag} expects three numbers"))?;
        *v = raw
            .parse()
            .with_context(|| format!("{flag}: `{raw}` is not a number"))?;
    }
    Ok(out)
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = std::env::args().skip(1);
    let mut positional = Vec::new();
    let mut parsed = Args {
        input: PathBuf::new(),
        output_dir: PathBuf::new(),
        animations: Vec::new(),
        params: SyntheticParams::default(),
        synthetic: false,
        format: ExportFormat::Binary,
    };

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--anim" => parsed
                .animations
                .push(args.next().context("--anim expects a clip name")?),
            "--duration" => {
                let raw = args.next().context("--duration expects seconds")?;
                parsed.params.duration = raw
                    .parse()
                    .with_context(|| format!("--duration: `{raw}` is not a number"))?;
                parsed.synthetic = true;
            }
            "--position" => {
                parsed.params.final_position = parse_vec3(&mut args, "--position")?;
                parsed.synthetic = true;
            }
            "--scale" => {
                parsed.params.final_scale = parse_vec3(&mut args, "--scale")?;
                parsed.synthetic = true;
            }
            "--rotation" => {
                parsed.params.final_rotation_degrees = parse_vec3(&mut args, "--rotation")?;
                parsed.synthetic = true;
            }
            "--text" => parsed.format = ExportFormat::Text,
            flag if flag.starts_with("--") => bail!("unknown option `{flag}`"),
            other => positional.push(other.to_string()),
        }
    }

    let [input, output_dir] = <[String; 2]>::try_from(positional)
        .map_err(|_| anyhow::anyhow!("usage: clip_merger <input> <output-dir> [options]"))?;
    parsed.input = input.into();
    parsed.output_dir = output_dir.into();
    Ok(parsed)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = parse_args()?;

    let bytes = tokio::fs::read(&args.input)
        .await
        .with_context(|| format!("reading {}", args.input.display()))?;

    let mut workspace = Workspace::new()?;
    let bundle = workspace.import_async(bytes).await?;
    println!(
        "Loaded {} ({} nodes), animations: {:?}",
        args.input.display(),
        bundle.scene.node_count() - 1,
        bundle.animation_names()
    );

    for name in &args.animations {
        workspace.toggle_animation(name);
    }
    if args.synthetic {
        workspace.set_params(args.params)?;
        workspace.set_include_synthetic(true);
    }
    workspace.set_export_format(args.format);

    let report = workspace.merge_selected();
    if !report.missing.is_empty() {
        log::warn!("Not in the bundle: {:?}", report.missing);
    }
    println!(
        "Merging {:?} into {} tracks",
        report.contributors,
        report.tracks.len()
    );

    let payload = workspace.export_async().await?;
    let path = args.output_dir.join(&payload.file_name);
    tokio::fs::write(&path, &payload.bytes)
        .await
        .with_context(|| format!("writing {}", path.display()))?;
    println!("Wrote {} ({} bytes)", path.display(), payload.bytes.len());

    Ok(())
}

//! CLI command implementations

pub mod ops;
pub mod replay;
pub mod run;
pub mod validate;

use anyhow::{Context, Result, bail};
use imgpipe_core::{Image, ParamMap, ParameterSpec, RuntimeValue};
use imgpipe_history::SessionConfig;
use imgpipe_ops::OperationRegistry;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
#[allow(unused_imports)]
use tracing::{debug, trace};

/// Load a PNG as 8-bit RGB
///
/// Palette, low bit depth and 16-bit files are normalized to 8 bits; gray
/// is expanded and alpha dropped, so every session starts from RGB.
pub fn load_image(path: &Path) -> Result<Image> {
    trace!(path = %path.display(), "load_image");
    let file = File::open(path).with_context(|| format!("Failed to load: {}", path.display()))?;
    let mut decoder = png::Decoder::new(BufReader::new(file));
    decoder.set_transformations(png::Transformations::normalize_to_color8());
    let mut reader = decoder
        .read_info()
        .with_context(|| format!("Failed to decode: {}", path.display()))?;
    let buf_size = reader
        .output_buffer_size()
        .context("Cannot determine PNG output buffer size")?;
    let mut buf = vec![0u8; buf_size];
    let info = reader
        .next_frame(&mut buf)
        .with_context(|| format!("Failed to decode: {}", path.display()))?;
    buf.truncate(info.buffer_size());

    let rgb: Vec<u8> = match info.color_type {
        png::ColorType::Rgb => buf,
        png::ColorType::Rgba => buf.chunks_exact(4).flat_map(|p| [p[0], p[1], p[2]]).collect(),
        png::ColorType::Grayscale => buf.iter().flat_map(|&g| [g, g, g]).collect(),
        png::ColorType::GrayscaleAlpha => buf.chunks_exact(2).flat_map(|p| [p[0], p[0], p[0]]).collect(),
        other => bail!("Unsupported PNG color type {:?}: {}", other, path.display()),
    };
    let image = Image::from_data(info.width, info.height, 3, rgb)?;
    debug!(path = %path.display(), %image, "Loaded image");
    Ok(image)
}

/// Save image to a PNG
pub fn save_image(path: &Path, image: &Image) -> Result<()> {
    trace!(path = %path.display(), %image, "save_image");
    let color = match image.channels() {
        1 => png::ColorType::Grayscale,
        3 => png::ColorType::Rgb,
        4 => png::ColorType::Rgba,
        n => bail!("Cannot save {n}-channel image as PNG"),
    };
    let file = File::create(path).with_context(|| format!("Failed to save: {}", path.display()))?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), image.width(), image.height());
    encoder.set_color(color);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder
        .write_header()
        .with_context(|| format!("Failed to save: {}", path.display()))?;
    writer
        .write_image_data(image.data())
        .with_context(|| format!("Failed to save: {}", path.display()))?;
    Ok(())
}

/// Session config from `--config`, or defaults
pub fn load_config(path: Option<&Path>) -> Result<SessionConfig> {
    match path {
        Some(p) => SessionConfig::load(p)
            .with_context(|| format!("Failed to load config: {}", p.display())),
        None => Ok(SessionConfig::default()),
    }
}

/// Parse a `--step` argument: `Name` or `Name:key=value,key=value`
///
/// Values are read according to the parameter's declared type. Pairs are
/// written `3x5`; second images as a PNG path (`@` prefix optional).
pub fn parse_step(registry: &OperationRegistry, spec: &str) -> Result<(String, ParamMap)> {
    let (name, rest) = match spec.split_once(':') {
        Some((name, rest)) => (name.trim(), rest),
        None => (spec.trim(), ""),
    };
    let Some(op) = registry.get(name) else {
        let known: Vec<_> = registry.names().collect();
        bail!("Unknown operation '{}'. Known: {}", name, known.join(", "));
    };

    let mut params = ParamMap::new();
    for pair in rest.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let Some((key, raw)) = pair.split_once('=') else {
            bail!("Expected key=value in step '{}', got '{}'", spec, pair);
        };
        let key = key.trim();
        let Some(param) = op.schema().get(key) else {
            let known: Vec<_> = op.schema().iter().map(|(n, _)| n).collect();
            bail!("{} has no parameter '{}'. Known: {}", name, key, known.join(", "));
        };
        let value = parse_value(raw.trim(), param)
            .with_context(|| format!("Invalid value for {}.{}", name, key))?;
        params.insert(key.to_string(), value);
    }
    Ok((name.to_string(), params))
}

fn parse_value(raw: &str, spec: &ParameterSpec) -> Result<RuntimeValue> {
    Ok(match spec {
        ParameterSpec::IntRange { .. } => RuntimeValue::Int(raw.parse()?),
        ParameterSpec::FloatRange { .. } => RuntimeValue::Float(raw.parse()?),
        ParameterSpec::Bool { .. } => match raw {
            "true" | "1" | "yes" | "on" => RuntimeValue::Bool(true),
            "false" | "0" | "no" | "off" => RuntimeValue::Bool(false),
            _ => bail!("expected a boolean, got '{}'", raw),
        },
        ParameterSpec::Enum { ty } => match ty.member(raw) {
            Some(member) => RuntimeValue::Enum(member),
            None => {
                let names: Vec<_> = ty.members().map(|m| m.name()).collect();
                bail!("expected one of {}, got '{}'", names.join(", "), raw);
            }
        },
        ParameterSpec::SecondImage => {
            RuntimeValue::Image(load_image(Path::new(raw.strip_prefix('@').unwrap_or(raw)))?)
        }
        ParameterSpec::Choice { .. } => parse_untyped(raw),
    })
}

fn parse_untyped(raw: &str) -> RuntimeValue {
    if let Some((a, b)) = raw.split_once('x') {
        if let (Ok(a), Ok(b)) = (a.parse::<i64>(), b.parse::<i64>()) {
            return RuntimeValue::from((a, b));
        }
    }
    if let Ok(v) = raw.parse::<i64>() {
        return RuntimeValue::Int(v);
    }
    if let Ok(v) = raw.parse::<f64>() {
        return RuntimeValue::Float(v);
    }
    RuntimeValue::Text(raw.to_string())
}

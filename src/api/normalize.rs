//! Defensive coercion of service responses.
//!
//! The service is a moving target: fields come and go between deployments.
//! The contract here is "never crash the renderer on a malformed payload" —
//! missing strings become empty, missing lists become empty, unusable hex
//! values are demoted so the renderer can substitute its fallback. The one
//! strict check is a generation response without a palette array: there is
//! nothing sensible to render, so it is an error rather than a blank result.

use anyhow::{bail, Result};
use serde_json::Value;

use crate::color::Color;
use crate::model::{IslaTurn, Luma, Swatch};

/// The service's application-level error field, if present.
pub fn error_field(body: &Value) -> Option<String> {
    body.get("error").and_then(Value::as_str).map(str::to_owned)
}

/// Coerce a generation response into a well-formed `Luma`.
pub fn luma(body: &Value) -> Result<Luma> {
    let palette = match body.get("palette") {
        Some(Value::Array(entries)) => entries.iter().map(swatch).collect(),
        _ => bail!("service response carried no palette array"),
    };
    Ok(Luma {
        label: string_or_empty(body.get("label")),
        palette,
        tags: string_list(body.get("tags")),
        narrative: string_or_empty(body.get("narrative")),
        original_palette: swatch_list_opt(body.get("original_palette")),
        fixed_palette: swatch_list_opt(body.get("fixed_palette")),
    })
}

/// Coerce a chat response into an `IslaTurn`.
///
/// Chat replies have no required fields; everything missing falls back to
/// its empty form. The submitted prompt is carried into the turn so the
/// transcript can replay both sides.
pub fn isla_turn(prompt: &str, body: &Value) -> IslaTurn {
    IslaTurn {
        prompt: prompt.to_owned(),
        reply: string_or_empty(body.get("reply")),
        palette_name: string_opt(body.get("paletteName")),
        mood: string_opt(body.get("mood")),
        ideal_use: string_list(body.get("idealUse")),
        colors: swatch_list(body.get("colors")),
    }
}

/// Extract the remediated palette from a `/make-ada-compliant` response.
pub fn fixed_palette(body: &Value) -> Result<Vec<Swatch>> {
    match body.get("fixed_palette") {
        Some(Value::Array(entries)) => Ok(entries.iter().map(swatch).collect()),
        _ => bail!("service response carried no fixed_palette array"),
    }
}

fn swatch(value: &Value) -> Swatch {
    Swatch {
        // Anything that does not parse as #rrggbb is demoted to None so the
        // renderer shows the neutral fallback.
        hex: string_opt(value.get("hex"))
            .and_then(|h| Color::from_hex(&h).ok())
            .map(Color::to_hex),
        chromakey: string_opt(value.get("chromakey")),
        reason: string_or_empty(value.get("reason")),
        tags: string_list(value.get("tags")),
        ada: value
            .get("ada")
            .and_then(|v| serde_json::from_value(v.clone()).ok()),
    }
}

fn string_or_empty(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned()
}

fn string_opt(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).map(str::to_owned)
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

fn swatch_list(value: Option<&Value>) -> Vec<Swatch> {
    value
        .and_then(Value::as_array)
        .map(|entries| entries.iter().map(swatch).collect())
        .unwrap_or_default()
}

fn swatch_list_opt(value: Option<&Value>) -> Option<Vec<Swatch>> {
    value
        .and_then(Value::as_array)
        .map(|entries| entries.iter().map(swatch).collect())
}

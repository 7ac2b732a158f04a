use serde::{Deserialize, Serialize};

use crate::color::{self, Color};

/// Smallest palette the service will be asked for.
pub const MIN_PALETTE_LENGTH: u8 = 3;
/// Largest palette the service will be asked for.
pub const MAX_PALETTE_LENGTH: u8 = 10;

/// One palette entry as returned by the service.
///
/// `hex` is `None` when the service sent nothing usable; the render layer
/// substitutes the neutral fallback instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Swatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chromakey: Option<String>,
    #[serde(default)]
    pub reason: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ada: Option<AdaReport>,
}

impl Swatch {
    /// The renderable color, falling back to neutral gray when the hex is
    /// missing or unparseable.
    pub fn color(&self) -> Color {
        self.hex
            .as_deref()
            .and_then(|h| Color::from_hex(h).ok())
            .unwrap_or(color::FALLBACK)
    }

    /// Display label, `CK-UNKNOWN` when the service named nothing.
    pub fn chromakey_label(&self) -> &str {
        self.chromakey.as_deref().unwrap_or("CK-UNKNOWN")
    }
}

/// Accessibility findings for one color. Produced only by the remote
/// service; this client never computes contrast.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdaReport {
    #[serde(default)]
    pub contrast_white: f64,
    #[serde(default)]
    pub contrast_black: f64,
    #[serde(default)]
    pub grade_white: String,
    #[serde(default)]
    pub grade_black: String,
    #[serde(default)]
    pub colorblind_flag: bool,
    #[serde(default)]
    pub notes: String,
}

/// Per-index outcome of an accessibility remediation round-trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffMark {
    Changed,
    Unchanged,
}

/// A generated palette result ("luma" in service terms).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Luma {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub palette: Vec<Swatch>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub narrative: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_palette: Option<Vec<Swatch>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_palette: Option<Vec<Swatch>>,
}

impl Luma {
    /// Positional pre/post comparison of a remediation round-trip, keyed by
    /// hex. `None` until a fix has populated both sides. The comparison
    /// trusts the service to keep the palettes index-aligned, but truncates
    /// to the shorter side rather than assuming equal lengths.
    pub fn compliance_diff(&self) -> Option<Vec<DiffMark>> {
        let original = self.original_palette.as_deref()?;
        let fixed = self.fixed_palette.as_deref()?;
        Some(
            original
                .iter()
                .zip(fixed)
                .map(|(before, after)| {
                    if before.hex == after.hex {
                        DiffMark::Unchanged
                    } else {
                        DiffMark::Changed
                    }
                })
                .collect(),
        )
    }

    /// Fold a remediated palette into this result: the displayed palette
    /// becomes the fixed one, and both sides of the diff are retained.
    pub fn apply_fix(&mut self, fixed: Vec<Swatch>) {
        self.original_palette = Some(std::mem::take(&mut self.palette));
        self.palette = fixed.clone();
        self.fixed_palette = Some(fixed);
    }

    /// Swap the displayed palette between the original and remediated sides
    /// of a fix round-trip. No-op until both sides exist.
    pub fn toggle_fixed_view(&mut self) {
        let (Some(original), Some(fixed)) = (&self.original_palette, &self.fixed_palette) else {
            return;
        };
        if self.palette == *fixed {
            self.palette = original.clone();
        } else {
            self.palette = fixed.clone();
        }
    }
}

/// One exchange with the Isla assistant persona.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IslaTurn {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub reply: String,
    #[serde(
        rename = "paletteName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub palette_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    #[serde(rename = "idealUse", default, skip_serializing_if = "Vec::is_empty")]
    pub ideal_use: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub colors: Vec<Swatch>,
}

/// Generation preferences captured from the user. Pure input configuration,
/// no derived state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub palette_length: u8,
    pub strict_ada: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone_preset: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            palette_length: 5,
            strict_ada: false,
            tone_preset: None,
        }
    }
}

impl Settings {
    /// Clamp the palette length into the representable range.
    pub fn clamped(mut self) -> Self {
        self.palette_length = self
            .palette_length
            .clamp(MIN_PALETTE_LENGTH, MAX_PALETTE_LENGTH);
        self
    }
}

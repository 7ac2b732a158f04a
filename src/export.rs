use std::path::Path;

use anyhow::{Context, Result};

use crate::model::Luma;

/// Default filename for exported palettes.
pub const DEFAULT_EXPORT_FILE: &str = "chromos_palette.json";

/// Serialize a result to pretty-printed JSON. A direct structural dump of
/// client state; no schema versioning.
pub fn to_json(luma: &Luma) -> Result<String> {
    serde_json::to_string_pretty(luma).context("failed to serialize palette")
}

/// Write a result to `path` as pretty-printed JSON.
pub fn write_to(luma: &Luma, path: &Path) -> Result<()> {
    let json = to_json(luma)?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write palette to {}", path.display()))?;
    Ok(())
}

/// Read a previously exported result back from disk.
pub fn read_from(path: &Path) -> Result<Luma> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read palette from {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("{} is not a palette export", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Swatch;

    fn sample() -> Luma {
        Luma {
            label: "Highland Dawn".into(),
            palette: vec![
                Swatch {
                    hex: Some("#ab4512".into()),
                    chromakey: Some("CK-EMBER".into()),
                    reason: "earth under first light".into(),
                    tags: vec!["earthy".into()],
                    ada: None,
                },
                Swatch::default(),
            ],
            tags: vec!["sacred".into(), "solar".into()],
            narrative: "A slow sunrise.".into(),
            original_palette: None,
            fixed_palette: None,
        }
    }

    #[test]
    fn round_trip_reproduces_the_result() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_EXPORT_FILE);

        let original = sample();
        write_to(&original, &path).unwrap();
        let restored = read_from(&path).unwrap();

        assert_eq!(restored, original);
    }

    #[test]
    fn export_is_pretty_printed() {
        let json = to_json(&sample()).unwrap();
        assert!(json.contains('\n'), "export should be human-readable");
        assert!(json.contains("\"label\": \"Highland Dawn\""));
    }

    #[test]
    fn read_missing_file_names_the_path() {
        let err = read_from(Path::new("/nonexistent/chromos_palette.json"))
            .unwrap_err()
            .to_string();
        assert!(err.contains("/nonexistent/chromos_palette.json"));
    }

    #[test]
    fn read_non_palette_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.json");
        std::fs::write(&path, "not json at all").unwrap();
        assert!(read_from(&path).is_err());
    }
}

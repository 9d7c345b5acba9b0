use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::ExtractionConfigBuilder;

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub extraction: Option<ExtractionSection>,
    pub server: Option<ServerSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionSection {
    pub page_acceptance_ratio: Option<f64>,
    pub scanned_ratio: Option<f64>,
    pub fast_page_cap: Option<usize>,
    pub layout_page_cap: Option<usize>,
    pub stream_page_cap: Option<usize>,
    pub text_encodings: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerSection {
    pub bind: Option<String>,
    pub max_upload_mb: Option<u64>,
}

/// Platform config directory path: `<config_dir>/paperlens/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("paperlens").join("config.toml"))
}

/// Load config by cascading CWD `.paperlens.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".paperlens.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparseable config file");
            None
        }
    }
}

fn pick<S, T: Clone>(
    overlay: Option<&S>,
    base: Option<&S>,
    field: impl Fn(&S) -> Option<T>,
) -> Option<T> {
    overlay.and_then(&field).or_else(|| base.and_then(&field))
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let (be, oe) = (base.extraction.as_ref(), overlay.extraction.as_ref());
    let (bs, os) = (base.server.as_ref(), overlay.server.as_ref());

    ConfigFile {
        extraction: Some(ExtractionSection {
            page_acceptance_ratio: pick(oe, be, |e| e.page_acceptance_ratio),
            scanned_ratio: pick(oe, be, |e| e.scanned_ratio),
            fast_page_cap: pick(oe, be, |e| e.fast_page_cap),
            layout_page_cap: pick(oe, be, |e| e.layout_page_cap),
            stream_page_cap: pick(oe, be, |e| e.stream_page_cap),
            text_encodings: pick(oe, be, |e| e.text_encodings.clone()),
        }),
        server: Some(ServerSection {
            bind: pick(os, bs, |s| s.bind.clone()),
            max_upload_mb: pick(os, bs, |s| s.max_upload_mb),
        }),
    }
}

impl ConfigFile {
    /// Seed an [`ExtractionConfigBuilder`] with the values set in this file.
    pub fn extraction_builder(&self) -> ExtractionConfigBuilder {
        let mut builder = ExtractionConfigBuilder::new();
        let Some(e) = &self.extraction else {
            return builder;
        };
        if let Some(v) = e.page_acceptance_ratio {
            builder = builder.page_acceptance_ratio(v);
        }
        if let Some(v) = e.scanned_ratio {
            builder = builder.scanned_ratio(v);
        }
        if let Some(v) = e.fast_page_cap {
            builder = builder.fast_page_cap(v);
        }
        if let Some(v) = e.layout_page_cap {
            builder = builder.layout_page_cap(v);
        }
        if let Some(v) = e.stream_page_cap {
            builder = builder.stream_page_cap(v);
        }
        if let Some(v) = &e.text_encodings {
            builder = builder.text_encodings(v.clone());
        }
        builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_section_deserializes() {
        let toml_str = "[extraction]\nfast_page_cap = 5\n";
        let parsed: ConfigFile = toml::from_str(toml_str).unwrap();
        let extraction = parsed.extraction.unwrap();
        assert_eq!(extraction.fast_page_cap, Some(5));
        assert!(extraction.scanned_ratio.is_none());
        assert!(parsed.server.is_none());
    }

    #[test]
    fn round_trip_toml() {
        let config = ConfigFile {
            server: Some(ServerSection {
                bind: Some("127.0.0.1:8080".to_string()),
                max_upload_mb: Some(32),
            }),
            ..Default::default()
        };
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: ConfigFile = toml::from_str(&toml_str).unwrap();
        let server = parsed.server.unwrap();
        assert_eq!(server.bind.as_deref(), Some("127.0.0.1:8080"));
        assert_eq!(server.max_upload_mb, Some(32));
    }

    #[test]
    fn merge_overlay_wins() {
        let base = ConfigFile {
            extraction: Some(ExtractionSection {
                fast_page_cap: Some(8),
                scanned_ratio: Some(0.2),
                ..Default::default()
            }),
            ..Default::default()
        };
        let overlay = ConfigFile {
            extraction: Some(ExtractionSection {
                fast_page_cap: Some(12),
                ..Default::default()
            }),
            ..Default::default()
        };
        let merged = merge(base, overlay).extraction.unwrap();
        assert_eq!(merged.fast_page_cap, Some(12));
        assert_eq!(merged.scanned_ratio, Some(0.2));
    }

    #[test]
    fn merge_base_preserved_when_overlay_absent() {
        let base = ConfigFile {
            server: Some(ServerSection {
                max_upload_mb: Some(16),
                ..Default::default()
            }),
            ..Default::default()
        };
        let merged = merge(base, ConfigFile::default());
        assert_eq!(merged.server.unwrap().max_upload_mb, Some(16));
    }

    #[test]
    fn builder_picks_up_file_values() {
        let file: ConfigFile = toml::from_str(
            "[extraction]\nlayout_page_cap = 25\ntext_encodings = [\"utf-8\", \"gb18030\"]\n",
        )
        .unwrap();
        let config = file.extraction_builder().build().unwrap();
        assert_eq!(config.layout_page_cap(), 25);
        assert_eq!(config.fast_page_cap(), 10);
        assert_eq!(config.text_encodings()[1].name(), "gb18030");
    }

    #[test]
    fn unparseable_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[extraction\nfast_page_cap = ").unwrap();
        assert!(load_from_path(&path).is_none());
        assert!(load_from_path(&dir.path().join("missing.toml")).is_none());
    }
}

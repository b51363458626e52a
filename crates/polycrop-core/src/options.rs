//! Options controlling the selection and extraction phases.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// All options for one crop run.
///
/// Both phases receive the same value. In particular `dpi` feeds the
/// selection preview and the batch extraction alike; rendering the two
/// phases at different resolutions would put the collected coordinates on
/// the wrong pixels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CropOptions {
    // -- General --
    pub verbose: u8,

    // -- Rendering --
    /// Rasterization resolution for PDF pages.
    pub dpi: u16,

    // -- Selection --
    /// Preview fit target. The rendered page is shrunk (never enlarged)
    /// to fit inside this box before display.
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Force a specific 1-based page for the selection preview.
    /// Unset picks a random page.
    pub preview_page: Option<u32>,

    // -- Output --
    /// Directory the per-page crops are written into.
    pub output_dir: PathBuf,
}

impl Default for CropOptions {
    fn default() -> Self {
        Self {
            verbose: 0,
            dpi: 200,
            viewport_width: 1600,
            viewport_height: 900,
            preview_page: None,
            output_dir: PathBuf::from("extracted_images"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_round_trip_full() {
        let mut opts = CropOptions::default();
        opts.verbose = 2;
        opts.dpi = 300;
        opts.viewport_width = 1280;
        opts.viewport_height = 720;
        opts.preview_page = Some(4);
        opts.output_dir = PathBuf::from("crops");

        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed: CropOptions = toml::from_str(&toml_str).unwrap();

        assert_eq!(parsed.verbose, 2);
        assert_eq!(parsed.dpi, 300);
        assert_eq!(parsed.viewport_width, 1280);
        assert_eq!(parsed.viewport_height, 720);
        assert_eq!(parsed.preview_page, Some(4));
        assert_eq!(parsed.output_dir, PathBuf::from("crops"));
    }

    #[test]
    fn test_toml_partial_config() {
        let toml_str = r#"
dpi = 150
preview_page = 2
"#;
        let opts: CropOptions = toml::from_str(toml_str).unwrap();
        assert_eq!(opts.dpi, 150);
        assert_eq!(opts.preview_page, Some(2));
        // Defaults filled in
        assert_eq!(opts.viewport_width, 1600);
        assert_eq!(opts.viewport_height, 900);
        assert_eq!(opts.output_dir, PathBuf::from("extracted_images"));
    }

    #[test]
    fn test_defaults() {
        let opts = CropOptions::default();
        assert_eq!(opts.dpi, 200);
        assert_eq!(opts.output_dir, PathBuf::from("extracted_images"));
        assert_eq!(opts.preview_page, None);
        assert_eq!(opts.verbose, 0);
    }

    #[test]
    fn test_example_config() {
        let config = r#"
verbose = 1
dpi = 300
viewport_width = 1920
viewport_height = 1080
output_dir = "out/crops"
"#;
        let opts: CropOptions = toml::from_str(config).unwrap();
        assert_eq!(opts.verbose, 1);
        assert_eq!(opts.dpi, 300);
        assert_eq!(opts.viewport_width, 1920);
        assert_eq!(opts.viewport_height, 1080);
        assert_eq!(opts.output_dir, PathBuf::from("out/crops"));
        assert_eq!(opts.preview_page, None);
    }
}

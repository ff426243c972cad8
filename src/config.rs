use crate::error::{Error, Result};
use crate::geometry::Point;
use crate::layout::SizeFunction;
use crate::theme::{Rgba, Theme};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Upper bound on the total number of precomputed ring points per session.
pub const MAX_RING_CANDIDATES: usize = 1 << 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlacementMode {
    /// Nearest free position on rings around the focal point.
    #[default]
    Ring,
    /// Uniform random sampling with a bounded number of trials.
    Random,
}

impl FromStr for PlacementMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ring" | "rings" | "circle" => Ok(PlacementMode::Ring),
            "random" => Ok(PlacementMode::Random),
            _ => Err(Error::UnknownPlacementMode(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    /// Ring center; the canvas center when unset.
    pub focus: Option<Point>,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 2048,
            height: 2048,
            focus: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontConfig {
    pub max_size: f32,
    pub min_size: f32,
    /// Font file; when unset the system font for `family` is used.
    pub file: Option<PathBuf>,
    pub family: String,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            max_size: 500.0,
            min_size: 10.0,
            file: None,
            family: "sans-serif".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementConfig {
    pub size_function: SizeFunction,
    pub mode: PlacementMode,
    /// Added to the measured width and height of every word.
    pub padding: f32,
    /// Cells per axis of the occupancy grid; `height / 10` when unset.
    pub grid_size: Option<usize>,
    pub ring_points: usize,
    pub radius_start: f32,
    pub radius_step: f32,
    /// Ring search workers; host parallelism when unset.
    pub workers: Option<usize>,
    pub random_trials: usize,
    /// Consecutive failures tolerated before the loop gives up.
    pub max_failures: usize,
    /// Boxes taller than this are tightened to rendered ink.
    pub precise_threshold: f32,
    pub tile_size: u32,
    pub tile_margin: f32,
    /// Fraction of the height added below the anchor box for descenders.
    pub descender_slack: f32,
    pub seed: Option<u64>,
    /// Stroke every occupied rectangle onto the canvas.
    pub debug: bool,
}

impl PlacementConfig {
    pub fn grid_size_for(&self, canvas_height: u32) -> usize {
        self.grid_size
            .unwrap_or((canvas_height / 10) as usize)
            .max(1)
    }

    /// Reject ring parameters that cannot produce a usable ring set, or whose
    /// ring set on a `width` x `height` canvas would exceed
    /// `MAX_RING_CANDIDATES` points.
    pub fn validate(&self, width: u32, height: u32) -> Result<()> {
        if self.ring_points == 0 {
            return Err(Error::Config("ring_points must be at least 1".to_string()));
        }
        if !(self.radius_step.is_finite() && self.radius_step > 0.0) {
            return Err(Error::Config(format!(
                "radius_step must be positive, got {}",
                self.radius_step
            )));
        }
        if !(self.radius_start.is_finite() && self.radius_start >= 0.0) {
            return Err(Error::Config(format!(
                "radius_start must be non-negative, got {}",
                self.radius_start
            )));
        }
        if self.tile_size == 0 {
            return Err(Error::Config("tile_size must be at least 1".to_string()));
        }
        let diagonal = (width as f64).hypot(height as f64);
        let rings = ((diagonal - self.radius_start as f64) / self.radius_step as f64).ceil().max(0.0);
        let candidates = rings * self.ring_points as f64;
        if candidates > MAX_RING_CANDIDATES as f64 {
            return Err(Error::Config(format!(
                "{} rings of {} points exceed the limit of {} ring candidates; raise radius_step or lower ring_points",
                rings, self.ring_points, MAX_RING_CANDIDATES
            )));
        }
        Ok(())
    }
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            size_function: SizeFunction::Linear,
            mode: PlacementMode::Ring,
            padding: 5.0,
            grid_size: None,
            ring_points: 512,
            radius_start: 1.0,
            radius_step: 5.0,
            workers: None,
            random_trials: 500_000,
            max_failures: 10,
            precise_threshold: 40.0,
            tile_size: 5,
            tile_margin: 5.0,
            descender_slack: 0.3,
            seed: None,
            debug: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaskConfig {
    pub file: PathBuf,
    /// Mask pixels of exactly this color are forbidden.
    pub color: Rgba,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub canvas: CanvasConfig,
    pub font: FontConfig,
    pub placement: PlacementConfig,
    pub theme: Theme,
    pub mask: Option<MaskConfig>,
}

/// Colors in config files are either hex strings or channel objects.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ColorSpec {
    Hex(String),
    Channels {
        #[serde(alias = "R")]
        r: u8,
        #[serde(alias = "G")]
        g: u8,
        #[serde(alias = "B")]
        b: u8,
        #[serde(alias = "A", default = "opaque")]
        a: u8,
    },
}

fn opaque() -> u8 {
    0xff
}

impl ColorSpec {
    fn resolve(self) -> Result<Rgba> {
        match self {
            ColorSpec::Hex(raw) => raw.parse(),
            ColorSpec::Channels { r, g, b, a } => Ok(Rgba::new(r, g, b, a)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MaskConfigFile {
    file: Option<PathBuf>,
    color: Option<ColorSpec>,
}

#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    width: Option<u32>,
    height: Option<u32>,
    focus: Option<Point>,
    font_max_size: Option<f32>,
    font_min_size: Option<f32>,
    font_file: Option<PathBuf>,
    font_family: Option<String>,
    random_placement: Option<bool>,
    placement: Option<String>,
    size_function: Option<String>,
    padding: Option<f32>,
    grid_size: Option<usize>,
    ring_points: Option<usize>,
    radius_start: Option<f32>,
    radius_step: Option<f32>,
    workers: Option<usize>,
    random_trials: Option<usize>,
    max_failures: Option<usize>,
    precise_threshold: Option<f32>,
    tile_size: Option<u32>,
    tile_margin: Option<f32>,
    descender_slack: Option<f32>,
    seed: Option<u64>,
    debug: Option<bool>,
    colors: Option<Vec<ColorSpec>>,
    background_color: Option<ColorSpec>,
    mask: Option<MaskConfigFile>,
}

/// Load a JSON5 config file and merge it over the defaults. Relative font and
/// mask paths are resolved against the config file's directory.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
    parse_config(&contents, base_dir)
}

pub fn parse_config(contents: &str, base_dir: &Path) -> Result<Config> {
    let parsed: ConfigFile = json5::from_str(contents)?;
    let mut config = Config::default();

    if let Some(v) = parsed.width {
        config.canvas.width = v;
    }
    if let Some(v) = parsed.height {
        config.canvas.height = v;
    }
    if parsed.focus.is_some() {
        config.canvas.focus = parsed.focus;
    }

    if let Some(v) = parsed.font_max_size {
        config.font.max_size = v;
    }
    if let Some(v) = parsed.font_min_size {
        config.font.min_size = v;
    }
    if let Some(v) = parsed.font_file {
        config.font.file = Some(resolve_relative(base_dir, v));
    }
    if let Some(v) = parsed.font_family {
        config.font.family = v;
    }

    if let Some(random) = parsed.random_placement {
        config.placement.mode = if random {
            PlacementMode::Random
        } else {
            PlacementMode::Ring
        };
    }
    if let Some(v) = parsed.placement {
        config.placement.mode = v.parse()?;
    }
    if let Some(v) = parsed.size_function {
        config.placement.size_function = v.parse()?;
    }
    if let Some(v) = parsed.padding {
        config.placement.padding = v;
    }
    if parsed.grid_size.is_some() {
        config.placement.grid_size = parsed.grid_size;
    }
    if let Some(v) = parsed.ring_points {
        config.placement.ring_points = v;
    }
    if let Some(v) = parsed.radius_start {
        config.placement.radius_start = v;
    }
    if let Some(v) = parsed.radius_step {
        config.placement.radius_step = v;
    }
    if parsed.workers.is_some() {
        config.placement.workers = parsed.workers;
    }
    if let Some(v) = parsed.random_trials {
        config.placement.random_trials = v;
    }
    if let Some(v) = parsed.max_failures {
        config.placement.max_failures = v;
    }
    if let Some(v) = parsed.precise_threshold {
        config.placement.precise_threshold = v;
    }
    if let Some(v) = parsed.tile_size {
        config.placement.tile_size = v;
    }
    if let Some(v) = parsed.tile_margin {
        config.placement.tile_margin = v;
    }
    if let Some(v) = parsed.descender_slack {
        config.placement.descender_slack = v;
    }
    if parsed.seed.is_some() {
        config.placement.seed = parsed.seed;
    }
    if let Some(v) = parsed.debug {
        config.placement.debug = v;
    }

    if let Some(colors) = parsed.colors {
        let colors = colors
            .into_iter()
            .map(ColorSpec::resolve)
            .collect::<Result<Vec<_>>>()?;
        if colors.is_empty() {
            return Err(Error::EmptyPalette);
        }
        config.theme.colors = colors;
    }
    if let Some(v) = parsed.background_color {
        config.theme.background = v.resolve()?;
    }

    if let Some(mask) = parsed.mask
        && let Some(file) = mask.file.filter(|f| !f.as_os_str().is_empty())
    {
        let color = match mask.color {
            Some(spec) => spec.resolve()?,
            None => Rgba::TRANSPARENT,
        };
        config.mask = Some(MaskConfig {
            file: resolve_relative(base_dir, file),
            color,
        });
    }

    config
        .placement
        .validate(config.canvas.width, config.canvas.height)?;
    Ok(config)
}

fn resolve_relative(base_dir: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base_dir.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.canvas.width, 2048);
        assert_eq!(config.font.max_size, 500.0);
        assert_eq!(config.font.min_size, 10.0);
        assert_eq!(config.placement.mode, PlacementMode::Ring);
        assert_eq!(config.placement.max_failures, 10);
        assert_eq!(config.placement.grid_size_for(config.canvas.height), 204);
        assert!(config.canvas.focus.is_none());
        assert!(config.mask.is_none());
    }

    #[test]
    fn merges_flat_keys_over_defaults() {
        let config = parse_config(
            r##"{
                // comments are fine in JSON5
                font_max_size: 300,
                font_min_size: 30,
                random_placement: true,
                width: 800,
                height: 600,
                size_function: "sqrt",
                colors: ["#1b1b1b", {"R": 89, "G": 58, "B": 238, "A": 255}],
                mask: {file: "mask.png", color: {"R": 0, "G": 0, "B": 0, "A": 0}},
            }"##,
            Path::new("/data"),
        )
        .unwrap();
        assert_eq!(config.font.max_size, 300.0);
        assert_eq!(config.font.min_size, 30.0);
        assert_eq!(config.placement.mode, PlacementMode::Random);
        assert_eq!(config.placement.size_function, SizeFunction::Sqrt);
        assert_eq!(config.canvas.width, 800);
        assert_eq!(config.placement.grid_size_for(config.canvas.height), 60);
        assert_eq!(
            config.theme.colors,
            vec![Rgba::rgb(0x1b, 0x1b, 0x1b), Rgba::rgb(0x59, 0x3a, 0xee)]
        );
        let mask = config.mask.unwrap();
        assert_eq!(mask.file, PathBuf::from("/data/mask.png"));
        assert_eq!(mask.color, Rgba::TRANSPARENT);
    }

    #[test]
    fn unknown_size_function_is_a_config_error() {
        let err = parse_config(r#"{size_function: "cubic"}"#, Path::new("")).unwrap_err();
        assert!(matches!(err, Error::UnknownSizeFunction(_)));
    }

    #[test]
    fn empty_palette_is_rejected() {
        let err = parse_config(r#"{colors: []}"#, Path::new("")).unwrap_err();
        assert!(matches!(err, Error::EmptyPalette));
    }

    #[test]
    fn empty_mask_file_means_no_mask() {
        let config = parse_config(r#"{mask: {file: ""}}"#, Path::new("")).unwrap();
        assert!(config.mask.is_none());
    }

    #[test]
    fn loads_from_disk_and_resolves_font_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, r#"{{"font_file": "fonts/Roboto-Regular.ttf", "seed": 42}}"#).unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(
            config.font.file,
            Some(dir.path().join("fonts/Roboto-Regular.ttf"))
        );
        assert_eq!(config.placement.seed, Some(42));
    }

    #[test]
    fn merges_ring_and_tile_keys() {
        let config = parse_config(
            "{descender_slack: 0, tile_size: 12, radius_start: 7, radius_step: 2.5, ring_points: 64}",
            Path::new(""),
        )
        .unwrap();
        assert_eq!(config.placement.descender_slack, 0.0);
        assert_eq!(config.placement.tile_size, 12);
        assert_eq!(config.placement.radius_start, 7.0);
        assert_eq!(config.placement.radius_step, 2.5);
        assert_eq!(config.placement.ring_points, 64);
    }

    #[test]
    fn degenerate_ring_parameters_are_rejected() {
        for contents in [
            "{radius_step: 0}",
            "{radius_step: -5}",
            "{ring_points: 0}",
            "{radius_start: -1}",
            "{tile_size: 0}",
            // 2048x2048 default canvas: ~2.9M rings of 512 points.
            "{radius_step: 0.001}",
        ] {
            let err = parse_config(contents, Path::new("")).unwrap_err();
            assert!(matches!(err, Error::Config(_)), "{contents}: {err}");
        }
    }

    #[test]
    fn fine_rings_are_fine_on_small_canvases() {
        let config = parse_config("{width: 100, height: 100, radius_step: 0.05}", Path::new("")).unwrap();
        assert_eq!(config.placement.radius_step, 0.05);
    }

    #[test]
    fn default_placement_validates() {
        let config = Config::default();
        assert!(
            config
                .placement
                .validate(config.canvas.width, config.canvas.height)
                .is_ok()
        );
    }

    #[test]
    fn missing_path_yields_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.canvas.height, 2048);
    }
}

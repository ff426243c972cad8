pub mod canvas;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod fonts;
pub mod geometry;
pub mod layout;
#[cfg(feature = "png")]
pub mod mask;
#[cfg(feature = "png")]
pub mod raster;
pub mod theme;
pub mod words;

pub use canvas::Canvas;
#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, PlacementMode, load_config};
pub use error::{Error, Result};
pub use geometry::{Point, Rect};
pub use layout::{PlacementReport, PlacedWord, Rendered, SizeFunction, WeightedWord, WordCloud};
pub use theme::{Rgba, Theme};

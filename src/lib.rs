pub mod commands;
pub mod config;
pub mod distance;
pub mod error;
pub mod geometry;
pub mod pipeline;
pub mod treasure;
pub mod water;
pub mod world;

pub use commands::{AccessLevel, AdminCommand, CommandReport, SeaTreasureService};
pub use config::{SeaTreasureParams, SyntheticWorldSettings};
pub use distance::DistanceField;
pub use error::SeaTreasureError;
pub use geometry::{Point2D, Rect2D};
pub use pipeline::{GenerationOptions, GenerationReport, generate_map_points};
pub use treasure::catalog::TreasureMapCatalog;
pub use treasure::{LevelData, PinChain};
pub use world::{SeaHost, TileMatrix, TileSource};

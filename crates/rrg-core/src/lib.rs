//! RRG Core
//!
//! Pure computations behind the Relative Rotation Graph view: symmetric axis
//! ranges, quadrant layout, trailing tails and the renderable scene.

pub mod constituents;
pub mod error;
pub mod export;
pub mod layout;
pub mod palette;
pub mod quadrant;
pub mod range;
pub mod scene;
pub mod table;
pub mod tail;
pub mod types;

pub use constituents::{change_color, sort_constituents, Constituent, ConstituentReport, ConstituentSort, SectorInfo};
pub use error::{RotationError, RotationResult};
pub use export::{export_file_name, export_records, to_csv, to_json, ExportFormat, ExportRecord};
pub use layout::{compute_quadrant_regions, LabelAnchor, QuadrantLayout, Region};
pub use palette::ColorMode;
pub use quadrant::Quadrant;
pub use range::{compute_display_range, DisplayRange, RangeConfig};
pub use scene::{build_scene, build_scene_with_range, PlotSeries, Scene, SceneOptions, Visibility};
pub use table::{candidates, project_table, Candidates, NameCollator, TableRow};
pub use tail::{clamp_tail_length, compute_tail, Tail, DEFAULT_TAIL_LENGTH, MAX_TAIL_LENGTH};
pub use types::*;

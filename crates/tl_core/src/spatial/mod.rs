//! Spatial aggregation for heatmaps.

pub mod density;

pub use density::{
    aggregate_density, cell_counts, CellCount, DensityCache, DensityParams, DensityPoint,
    HeatPoint, PointSet, SpatialPoint, DEFAULT_CELL_SIZE,
};

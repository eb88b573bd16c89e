//! Grid density aggregation for heatmaps.
//!
//! Points are bucketed into square cells, counted, and every point receives
//! `cellCount / maxCellCount` of the currently filtered set. The memo in
//! [`DensityCache`] is keyed by the point set identity and the filter
//! parameters, so scrubbing back and forth never rescans a set twice.

use fxhash::FxHashMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::models::ParticipantId;

pub const DEFAULT_CELL_SIZE: f64 = 500.0;

/// Anything with map coordinates and a timestamp.
pub trait SpatialPoint {
    fn x(&self) -> f64;
    fn y(&self) -> f64;
    /// Milliseconds from match start.
    fn timestamp_ms(&self) -> i64;

    fn minute_floor(&self) -> i64 {
        self.timestamp_ms().div_euclid(60_000)
    }
}

/// Heatmap input point.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
pub struct HeatPoint {
    pub x: f64,
    pub y: f64,
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub champion_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub killer_id: Option<ParticipantId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub victim_id: Option<ParticipantId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monster_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building_type: Option<String>,
}

impl HeatPoint {
    pub fn at(x: f64, y: f64, timestamp: i64) -> Self {
        Self { x, y, timestamp, ..Default::default() }
    }
}

impl SpatialPoint for HeatPoint {
    fn x(&self) -> f64 {
        self.x
    }

    fn y(&self) -> f64 {
        self.y
    }

    fn timestamp_ms(&self) -> i64 {
        self.timestamp
    }
}

/// Original point plus its normalized density.
#[derive(Serialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct DensityPoint<P = HeatPoint> {
    #[serde(flatten)]
    pub point: P,
    /// `(0, 1]`; `1` for points in the busiest cell.
    pub density: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DensityParams {
    pub cell_size: f64,
    /// Inclusive; keeps points with `floor(timestamp / 60000) <= cutoff`.
    pub cutoff_minute: Option<u32>,
}

impl Default for DensityParams {
    fn default() -> Self {
        Self { cell_size: DEFAULT_CELL_SIZE, cutoff_minute: None }
    }
}

impl DensityParams {
    pub fn new(cell_size: f64, cutoff_minute: Option<u32>) -> Self {
        Self { cell_size, cutoff_minute }
    }

    /// Cell size actually used; invalid sizes fall back to [`DEFAULT_CELL_SIZE`].
    pub fn effective_cell_size(&self) -> f64 {
        if self.cell_size.is_finite() && self.cell_size > 0.0 {
            self.cell_size
        } else {
            DEFAULT_CELL_SIZE
        }
    }

    fn admits<P: SpatialPoint>(&self, point: &P) -> bool {
        match self.cutoff_minute {
            Some(cutoff) => point.minute_floor() <= i64::from(cutoff),
            None => true,
        }
    }
}

fn cell_of<P: SpatialPoint>(point: &P, cell_size: f64) -> (i64, i64) {
    // `as` saturates; NaN coordinates land in cell 0.
    ((point.x() / cell_size).floor() as i64, (point.y() / cell_size).floor() as i64)
}

fn count_cells<'a, P: SpatialPoint + 'a>(
    points: impl Iterator<Item = &'a P>,
    cell_size: f64,
) -> FxHashMap<(i64, i64), u32> {
    let mut counts: FxHashMap<(i64, i64), u32> = FxHashMap::default();
    for point in points {
        *counts.entry(cell_of(point, cell_size)).or_insert(0) += 1;
    }
    counts
}

/// Cutoff filter, bucket, count and normalize.
///
/// Output preserves the input order of the points that pass the cutoff; an
/// empty filtered set yields an empty vector.
pub fn aggregate_density<P>(points: &[P], params: DensityParams) -> Vec<DensityPoint<P>>
where
    P: SpatialPoint + Clone,
{
    let cell_size = params.effective_cell_size();
    let filtered: Vec<&P> = points.iter().filter(|p| params.admits(*p)).collect();
    if filtered.is_empty() {
        return Vec::new();
    }

    let counts = count_cells(filtered.iter().copied(), cell_size);
    let max_count = counts.values().copied().max().unwrap_or(1).max(1);

    filtered
        .into_iter()
        .map(|point| {
            let count = counts.get(&cell_of(point, cell_size)).copied().unwrap_or(0);
            DensityPoint { point: point.clone(), density: f64::from(count) / f64::from(max_count) }
        })
        .collect()
}

/// Occupied grid cell.
#[derive(Serialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CellCount {
    pub cell_x: i64,
    pub cell_y: i64,
    pub count: u32,
    pub density: f64,
}

/// Occupied cells sorted by `(cell_x, cell_y)`.
pub fn cell_counts<P: SpatialPoint>(points: &[P], params: DensityParams) -> Vec<CellCount> {
    let cell_size = params.effective_cell_size();
    let counts = count_cells(points.iter().filter(|p| params.admits(*p)), cell_size);
    let max_count = counts.values().copied().max().unwrap_or(1).max(1);

    let mut cells: Vec<CellCount> = counts
        .into_iter()
        .map(|((cell_x, cell_y), count)| CellCount {
            cell_x,
            cell_y,
            count,
            density: f64::from(count) / f64::from(max_count),
        })
        .collect();
    cells.sort_by_key(|c| (c.cell_x, c.cell_y));
    cells
}

static NEXT_SET_ID: AtomicU64 = AtomicU64::new(1);

/// Immutable point list with an identity issued at construction.
///
/// Clones share the identity; two sets built separately never do, even when
/// their points are equal.
#[derive(Debug, Clone)]
pub struct PointSet<P = HeatPoint> {
    points: Vec<P>,
    id: u64,
}

impl<P: SpatialPoint> PointSet<P> {
    pub fn new(points: Vec<P>) -> Self {
        Self { points, id: NEXT_SET_ID.fetch_add(1, Ordering::Relaxed) }
    }

    pub fn points(&self) -> &[P] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

impl<P: SpatialPoint> FromIterator<P> for PointSet<P> {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct DensityKey {
    set_id: u64,
    cutoff_minute: Option<u32>,
    cell_bits: u64,
}

/// Memo for [`aggregate_density`] results.
///
/// Single-threaded by construction. When `capacity` entries are held the memo
/// is flushed before the next insert.
#[derive(Debug)]
pub struct DensityCache<P = HeatPoint> {
    capacity: usize,
    entries: RefCell<FxHashMap<DensityKey, Rc<[DensityPoint<P>]>>>,
    hits: Cell<u64>,
    misses: Cell<u64>,
}

impl<P: SpatialPoint + Clone> DensityCache<P> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: RefCell::new(FxHashMap::default()),
            hits: Cell::new(0),
            misses: Cell::new(0),
        }
    }

    pub fn get_or_compute(&self, set: &PointSet<P>, params: DensityParams) -> Rc<[DensityPoint<P>]> {
        let key = DensityKey {
            set_id: set.id(),
            cutoff_minute: params.cutoff_minute,
            cell_bits: params.effective_cell_size().to_bits(),
        };

        if let Some(hit) = self.entries.borrow().get(&key) {
            self.hits.set(self.hits.get() + 1);
            return Rc::clone(hit);
        }

        self.misses.set(self.misses.get() + 1);
        let computed: Rc<[DensityPoint<P>]> = aggregate_density(set.points(), params).into();
        tracing::trace!(
            points = set.len(),
            visible = computed.len(),
            cutoff = ?params.cutoff_minute,
            "density computed"
        );

        let mut entries = self.entries.borrow_mut();
        if entries.len() >= self.capacity {
            entries.clear();
        }
        entries.insert(key, Rc::clone(&computed));
        computed
    }

    /// `(hits, misses)` since construction.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits.get(), self.misses.get())
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

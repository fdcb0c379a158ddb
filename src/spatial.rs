//! Uniform-grid spatial index for bounded-radius neighbor queries.
//!
//! Agents are binned into cubic cells of side `cell_size` (by default equal to
//! the interaction radius) covering the environment box. Construction is a
//! counting sort: one pass counts agents per cell, a prefix sum turns counts
//! into offsets, and a second pass scatters agents into a single contiguous
//! buffer ordered by cell. A query scans only the cells overlapping the
//! search box around the query point and filters candidates by
//! [`pseudo_distance`].
//!
//! The index is rebuilt from scratch every step. It never supports incremental
//! insert or delete.

use glam::DVec3;

use crate::error::ConfigurationError;

/// Upper bound on the number of grid cells an index may allocate.
pub const MAX_CELLS: u64 = 1 << 24;

/// Cube root of the squared length of `delta`.
///
/// This is the model's separation metric, used in place of Euclidean distance
/// for both neighbor selection and drift. It is not a true metric: for
/// separations above 1 it grows slower than the Euclidean distance.
#[inline]
pub fn pseudo_distance(delta: DVec3) -> f64 {
    (delta.x * delta.x + delta.y * delta.y + delta.z * delta.z).cbrt()
}

/// Axis-aligned environment box `[min, max)` on every axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: DVec3,
    pub max: DVec3,
}

impl Bounds {
    pub fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    /// A cube spanning `[min, max)` on all three axes.
    pub fn cube(min: f64, max: f64) -> Self {
        Self::new(DVec3::splat(min), DVec3::splat(max))
    }

    /// Whether `p` lies inside the half-open box.
    pub fn contains(&self, p: DVec3) -> bool {
        p.cmpge(self.min).all() && p.cmplt(self.max).all()
    }

    pub fn size(&self) -> DVec3 {
        self.max - self.min
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        for (axis, min, max) in [
            ('x', self.min.x, self.max.x),
            ('y', self.min.y, self.max.y),
            ('z', self.min.z, self.max.z),
        ] {
            if !(min.is_finite() && max.is_finite() && min < max) {
                return Err(ConfigurationError::InvalidBounds { axis, min, max });
            }
        }
        Ok(())
    }
}

/// Radius and cell size of a spatial index.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpatialConfig {
    /// Queries return points whose pseudo-distance is strictly below this.
    pub radius: f64,
    /// Edge length of each grid cell in world units.
    pub cell_size: f64,
}

impl SpatialConfig {
    /// Cells sized to the interaction radius.
    pub fn new(radius: f64) -> Self {
        Self { radius, cell_size: radius }
    }

    /// Use a cell size different from the radius.
    ///
    /// Smaller cells mean tighter candidate sets but more cells scanned per
    /// query.
    pub fn with_cell_size(mut self, cell_size: f64) -> Self {
        self.cell_size = cell_size;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(ConfigurationError::InvalidRadius(self.radius));
        }
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(ConfigurationError::InvalidCellSize(self.cell_size));
        }
        Ok(())
    }

    /// Cells per axis of a grid over `bounds`.
    ///
    /// Validates both the config and the bounds, and rejects grids above
    /// [`MAX_CELLS`].
    pub fn grid_dims(&self, bounds: &Bounds) -> Result<[usize; 3], ConfigurationError> {
        self.validate()?;
        bounds.validate()?;

        let dims = (bounds.size() / self.cell_size).ceil().max(DVec3::ONE);
        let total = dims.x * dims.y * dims.z;
        if total > MAX_CELLS as f64 {
            return Err(ConfigurationError::GridTooLarge {
                cells: total as u64,
                limit: MAX_CELLS,
            });
        }
        Ok([dims.x as usize, dims.y as usize, dims.z as usize])
    }

    /// Euclidean half-width of the box that must be scanned to find every
    /// point with pseudo-distance below `radius`.
    ///
    /// `cbrt(d^2) < r` holds exactly when `d < r^1.5`, which exceeds `r` once
    /// `r > 1`. Padded so rounding at cell borders never drops a candidate.
    pub fn search_reach(&self) -> f64 {
        let r = self.radius;
        r.max(r * r.sqrt()) * (1.0 + 4.0 * f64::EPSILON)
    }
}

/// A point stored in the index.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct IndexedPoint {
    /// Agent id, passed through untouched.
    pub id: u64,
    /// Position of the point in the sequence the index was built from.
    pub index: usize,
    pub position: DVec3,
}

/// Uniform grid over a bounded box, rebuilt wholesale from a point set.
#[derive(Clone, Debug, Default)]
pub struct SpatialIndex {
    config: Option<SpatialConfig>,
    bounds: Option<Bounds>,
    dims: [usize; 3],
    /// `cell_start[c]..cell_start[c + 1]` is the range of `points` in cell `c`.
    cell_start: Vec<usize>,
    points: Vec<IndexedPoint>,
    /// Scratch: linear cell of each input point, kept to reuse the allocation.
    cell_of: Vec<usize>,
    clamped: usize,
}

impl SpatialIndex {
    /// An empty index. Queries return nothing until [`build`](Self::build).
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a fresh index over `points`.
    pub fn from_points<I>(
        points: I,
        config: SpatialConfig,
        bounds: Bounds,
    ) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = (u64, DVec3)>,
    {
        let mut index = Self::new();
        index.build(points, config, bounds)?;
        Ok(index)
    }

    /// Discard all prior state and bin every point.
    ///
    /// Points outside `bounds` are clamped into the nearest boundary cell; they
    /// keep their real position for distance tests. On error the index is
    /// left empty.
    pub fn build<I>(
        &mut self,
        points: I,
        config: SpatialConfig,
        bounds: Bounds,
    ) -> Result<(), ConfigurationError>
    where
        I: IntoIterator<Item = (u64, DVec3)>,
    {
        self.clear();
        self.dims = config.grid_dims(&bounds)?;
        self.config = Some(config);
        self.bounds = Some(bounds);
        let total = self.dims[0] * self.dims[1] * self.dims[2];

        // Pass 1: count points per cell (shifted by one for the prefix sum).
        self.cell_start.resize(total + 1, 0);
        let mut staged = Vec::new();
        for (index, (id, position)) in points.into_iter().enumerate() {
            if !bounds.contains(position) {
                self.clamped += 1;
            }
            let cell = self.linear_cell(self.cell_coords(position));
            self.cell_of.push(cell);
            self.cell_start[cell + 1] += 1;
            staged.push(IndexedPoint { id, index, position });
        }

        for c in 1..=total {
            self.cell_start[c] += self.cell_start[c - 1];
        }

        // Pass 2: scatter into cell order, stable within a cell.
        let mut cursor = self.cell_start[..total].to_vec();
        self.points.resize(staged.len(), IndexedPoint::default());
        for (point, &cell) in staged.into_iter().zip(&self.cell_of) {
            self.points[cursor[cell]] = point;
            cursor[cell] += 1;
        }

        Ok(())
    }

    fn clear(&mut self) {
        self.config = None;
        self.bounds = None;
        self.dims = [0; 3];
        self.cell_start.clear();
        self.points.clear();
        self.cell_of.clear();
        self.clamped = 0;
    }

    /// Visit every indexed point whose pseudo-distance to `point` is below the
    /// radius.
    ///
    /// Visit order follows cell layout and must be treated as arbitrary. The
    /// index knows nothing about the caller's identity, so a point at the
    /// query location is visited too.
    pub fn for_each_neighbor<F>(&self, point: DVec3, mut f: F)
    where
        F: FnMut(&IndexedPoint),
    {
        let Some(config) = self.config else {
            return;
        };
        let reach = DVec3::splat(config.search_reach());
        let lo = self.cell_coords(point - reach);
        let hi = self.cell_coords(point + reach);

        for z in lo[2]..=hi[2] {
            for y in lo[1]..=hi[1] {
                for x in lo[0]..=hi[0] {
                    let cell = self.linear_cell([x, y, z]);
                    let range = self.cell_start[cell]..self.cell_start[cell + 1];
                    for candidate in &self.points[range] {
                        if pseudo_distance(candidate.position - point) < config.radius {
                            f(candidate);
                        }
                    }
                }
            }
        }
    }

    /// Collect the neighbors of `point`. See [`for_each_neighbor`](Self::for_each_neighbor).
    pub fn query_neighbors(&self, point: DVec3) -> Vec<IndexedPoint> {
        let mut out = Vec::new();
        self.for_each_neighbor(point, |p| out.push(*p));
        out
    }

    /// Grid coordinates of the cell holding `p`, clamped into the grid.
    pub fn cell_coords(&self, p: DVec3) -> [usize; 3] {
        let (Some(config), Some(bounds)) = (self.config, self.bounds) else {
            return [0; 3];
        };
        let rel = (p - bounds.min) / config.cell_size;
        [
            clamp_axis(rel.x, self.dims[0]),
            clamp_axis(rel.y, self.dims[1]),
            clamp_axis(rel.z, self.dims[2]),
        ]
    }

    #[inline]
    fn linear_cell(&self, [x, y, z]: [usize; 3]) -> usize {
        x + self.dims[0] * (y + self.dims[1] * z)
    }

    /// Number of indexed points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Cells per axis.
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Number of cells holding at least one point.
    pub fn occupied_cells(&self) -> usize {
        self.cell_start.windows(2).filter(|w| w[1] > w[0]).count()
    }

    /// Points from the last build that lay outside the bounds.
    pub fn clamped_count(&self) -> usize {
        self.clamped
    }

    pub fn config(&self) -> Option<SpatialConfig> {
        self.config
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }
}

#[inline]
fn clamp_axis(scaled: f64, dim: usize) -> usize {
    let c = scaled.floor();
    // NaN lands in cell 0
    if !(c >= 0.0) {
        0
    } else if c >= dim as f64 {
        dim - 1
    } else {
        c as usize
    }
}

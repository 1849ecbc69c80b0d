//! Structure-of-arrays node and edge stores.
//!
//! Every force stage reads and writes node state through [`NodeStore`], a flat
//! `f32` buffer striped at [`NODE_STRIDE`] fields per node. Keeping the data
//! in one contiguous buffer is what makes the worker handoff cheap: the whole
//! store moves through a channel as a plain `Vec<f32>` and is re-adopted on
//! the other side without copying per node.
//!
//! Accessors are addressed by record index and trust it: the only validation
//! is the construction-time stride check. These are hot-path primitives
//! exercised millions of times per pass; an out-of-range index panics via
//! slice indexing and is a caller bug.

use crate::error::{LayoutError, Result};

/// Fields per node record:
/// `x, y, dx, dy, old_dx, old_dy, mass, convergence, size, fixed`.
pub const NODE_STRIDE: usize = 10;

/// Fields per edge record: `source, target, weight`.
pub const EDGE_STRIDE: usize = 3;

const X: usize = 0;
const Y: usize = 1;
const DX: usize = 2;
const DY: usize = 3;
const OLD_DX: usize = 4;
const OLD_DY: usize = 5;
const MASS: usize = 6;
const CONVERGENCE: usize = 7;
const SIZE: usize = 8;
const FIXED: usize = 9;

const SOURCE: usize = 0;
const TARGET: usize = 1;
const WEIGHT: usize = 2;

/// Axis-aligned extent of the layout, as `(x1, y1)`..`(x2, y2)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl Rect {
    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    /// Center point of the rectangle.
    pub fn center(&self) -> (f32, f32) {
        ((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }
}

/// Node state for the whole graph in one flat buffer.
#[derive(Debug, Clone)]
pub struct NodeStore {
    buf: Vec<f32>,
}

impl NodeStore {
    /// Adopt a packed buffer. Fails when the length is not an exact multiple
    /// of [`NODE_STRIDE`].
    pub fn new(buf: Vec<f32>) -> Result<Self> {
        if buf.len() % NODE_STRIDE != 0 {
            return Err(LayoutError::InvalidNodeBuffer {
                len: buf.len(),
                stride: NODE_STRIDE,
            });
        }
        Ok(Self { buf })
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.buf.len() / NODE_STRIDE
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    pub fn x(&self, i: usize) -> f32 {
        self.buf[i * NODE_STRIDE + X]
    }

    #[inline]
    pub fn y(&self, i: usize) -> f32 {
        self.buf[i * NODE_STRIDE + Y]
    }

    #[inline]
    pub fn dx(&self, i: usize) -> f32 {
        self.buf[i * NODE_STRIDE + DX]
    }

    #[inline]
    pub fn dy(&self, i: usize) -> f32 {
        self.buf[i * NODE_STRIDE + DY]
    }

    #[inline]
    pub fn old_dx(&self, i: usize) -> f32 {
        self.buf[i * NODE_STRIDE + OLD_DX]
    }

    #[inline]
    pub fn old_dy(&self, i: usize) -> f32 {
        self.buf[i * NODE_STRIDE + OLD_DY]
    }

    #[inline]
    pub fn mass(&self, i: usize) -> f32 {
        self.buf[i * NODE_STRIDE + MASS]
    }

    #[inline]
    pub fn convergence(&self, i: usize) -> f32 {
        self.buf[i * NODE_STRIDE + CONVERGENCE]
    }

    #[inline]
    pub fn size(&self, i: usize) -> f32 {
        self.buf[i * NODE_STRIDE + SIZE]
    }

    #[inline]
    pub fn fixed(&self, i: usize) -> bool {
        self.buf[i * NODE_STRIDE + FIXED] != 0.0
    }

    #[inline]
    pub fn set_x(&mut self, i: usize, v: f32) {
        self.buf[i * NODE_STRIDE + X] = v;
    }

    #[inline]
    pub fn set_y(&mut self, i: usize, v: f32) {
        self.buf[i * NODE_STRIDE + Y] = v;
    }

    #[inline]
    pub fn set_dx(&mut self, i: usize, v: f32) {
        self.buf[i * NODE_STRIDE + DX] = v;
    }

    #[inline]
    pub fn set_dy(&mut self, i: usize, v: f32) {
        self.buf[i * NODE_STRIDE + DY] = v;
    }

    #[inline]
    pub fn set_mass(&mut self, i: usize, v: f32) {
        self.buf[i * NODE_STRIDE + MASS] = v;
    }

    #[inline]
    pub fn set_convergence(&mut self, i: usize, v: f32) {
        self.buf[i * NODE_STRIDE + CONVERGENCE] = v;
    }

    #[inline]
    pub fn set_size(&mut self, i: usize, v: f32) {
        self.buf[i * NODE_STRIDE + SIZE] = v;
    }

    #[inline]
    pub fn set_fixed(&mut self, i: usize, fixed: bool) {
        self.buf[i * NODE_STRIDE + FIXED] = if fixed { 1.0 } else { 0.0 };
    }

    #[inline]
    pub fn add_dx(&mut self, i: usize, v: f32) {
        self.buf[i * NODE_STRIDE + DX] += v;
    }

    #[inline]
    pub fn add_dy(&mut self, i: usize, v: f32) {
        self.buf[i * NODE_STRIDE + DY] += v;
    }

    #[inline]
    pub fn sub_dx(&mut self, i: usize, v: f32) {
        self.buf[i * NODE_STRIDE + DX] -= v;
    }

    #[inline]
    pub fn sub_dy(&mut self, i: usize, v: f32) {
        self.buf[i * NODE_STRIDE + DY] -= v;
    }

    /// Oscillation of the accumulated force against the previous pass,
    /// weighted by mass.
    #[inline]
    pub fn swing(&self, i: usize) -> f32 {
        let dx = self.dx(i) - self.old_dx(i);
        let dy = self.dy(i) - self.old_dy(i);
        self.mass(i) * (dx * dx + dy * dy).sqrt()
    }

    /// Sustained directional force across the previous and current pass.
    #[inline]
    pub fn traction(&self, i: usize) -> f32 {
        let dx = self.dx(i) + self.old_dx(i);
        let dy = self.dy(i) + self.old_dy(i);
        (dx * dx + dy * dy).sqrt() / 2.0
    }

    /// Rotate the force accumulators: current becomes previous, current is
    /// zeroed. Called exactly once at the start of every pass.
    pub fn reset_deltas(&mut self) {
        for i in 0..self.len() {
            let base = i * NODE_STRIDE;
            self.buf[base + OLD_DX] = self.buf[base + DX];
            self.buf[base + OLD_DY] = self.buf[base + DY];
            self.buf[base + DX] = 0.0;
            self.buf[base + DY] = 0.0;
        }
    }

    /// Bounding rectangle over all node positions in one scan. When
    /// `include_delta`, each node contributes its predicted position
    /// `(x + dx, y + dy)` instead — used by collision detection, which runs
    /// against positions as they will be after integration.
    ///
    /// An empty store yields an inverted infinite rectangle; callers are
    /// expected to refuse empty graphs before running layout.
    pub fn bounds(&self, include_delta: bool) -> Rect {
        let mut min_x = f32::INFINITY;
        let mut max_x = f32::NEG_INFINITY;
        let mut min_y = f32::INFINITY;
        let mut max_y = f32::NEG_INFINITY;
        for i in 0..self.len() {
            let (x, y) = if include_delta {
                (self.x(i) + self.dx(i), self.y(i) + self.dy(i))
            } else {
                (self.x(i), self.y(i))
            };
            min_x = min_x.min(x);
            max_x = max_x.max(x);
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
        Rect {
            x1: min_x,
            y1: min_y,
            x2: max_x,
            y2: max_y,
        }
    }

    /// Read view of the raw buffer.
    pub fn as_slice(&self) -> &[f32] {
        &self.buf
    }

    /// Move the buffer out for a channel handoff, leaving the store empty.
    pub fn take_buffer(&mut self) -> Vec<f32> {
        std::mem::take(&mut self.buf)
    }

    /// Re-adopt a buffer after a handoff.
    pub fn restore_buffer(&mut self, buf: Vec<f32>) -> Result<()> {
        if buf.len() % NODE_STRIDE != 0 {
            return Err(LayoutError::InvalidNodeBuffer {
                len: buf.len(),
                stride: NODE_STRIDE,
            });
        }
        self.buf = buf;
        Ok(())
    }
}

/// Edge endpoints and weights in one flat buffer. Immutable during
/// simulation; only read to accumulate attraction onto the two endpoints.
#[derive(Debug, Clone)]
pub struct EdgeStore {
    buf: Vec<f32>,
}

impl EdgeStore {
    /// Adopt a packed buffer. Fails when the length is not an exact multiple
    /// of [`EDGE_STRIDE`].
    pub fn new(buf: Vec<f32>) -> Result<Self> {
        if buf.len() % EDGE_STRIDE != 0 {
            return Err(LayoutError::InvalidEdgeBuffer {
                len: buf.len(),
                stride: EDGE_STRIDE,
            });
        }
        Ok(Self { buf })
    }

    /// Number of edges.
    pub fn len(&self) -> usize {
        self.buf.len() / EDGE_STRIDE
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    pub fn source(&self, i: usize) -> usize {
        self.buf[i * EDGE_STRIDE + SOURCE] as usize
    }

    #[inline]
    pub fn target(&self, i: usize) -> usize {
        self.buf[i * EDGE_STRIDE + TARGET] as usize
    }

    #[inline]
    pub fn weight(&self, i: usize) -> f32 {
        self.buf[i * EDGE_STRIDE + WEIGHT]
    }
}

//! Barnes-Hut quadtree over node positions.
//!
//! The tree groups distant clusters into single pseudo-bodies so repulsion
//! drops from O(n²) pairwise work to roughly O(n log n). Regions live in a
//! flat arena indexed by `u32` handles rather than boxed child pointers;
//! the arena is rebuilt from scratch every pass because positions moved.
//!
//! Mass and center-of-mass aggregates are folded in incrementally during
//! insertion — they are the quantities read at query time and are never
//! recomputed lazily.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::store::NodeStore;

/// Jiggle scale used to break exact coordinate ties during insertion.
const TIE_BREAK: f32 = 1e-1;

/// Fixed seed so tie-breaking is reproducible run to run.
const JIGGLE_SEED: u64 = 0x5EED;

/// One square cell of the spatial index: a leaf holding a single occupant,
/// or an internal region with four children and aggregated mass.
#[derive(Debug, Clone)]
pub struct Region {
    center_x: f32,
    center_y: f32,
    size: f32,
    mass: f32,
    mass_center_x: f32,
    mass_center_y: f32,
    max_radius: f32,
    node: Option<u32>,
    children: Option<[u32; 4]>,
}

impl Region {
    fn new(center_x: f32, center_y: f32, size: f32) -> Self {
        Self {
            center_x,
            center_y,
            size,
            mass: 0.0,
            mass_center_x: 0.0,
            mass_center_y: 0.0,
            max_radius: 0.0,
            node: None,
            children: None,
        }
    }

    /// Geometric center of the cell.
    pub fn center(&self) -> (f32, f32) {
        (self.center_x, self.center_y)
    }

    /// Full side length of the cell.
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Aggregated mass of every body folded into this cell.
    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Mass-weighted average position of every body in this cell.
    pub fn mass_center(&self) -> (f32, f32) {
        (self.mass_center_x, self.mass_center_y)
    }

    /// Largest body radius anywhere in this cell. Bounds how far past the
    /// cell border an overlap partner below it can reach.
    pub fn max_radius(&self) -> f32 {
        self.max_radius
    }

    /// Occupant node index when this cell is a non-empty leaf.
    pub fn node(&self) -> Option<u32> {
        self.node
    }

    /// Child handles when this cell is internal.
    pub fn children(&self) -> Option<[u32; 4]> {
        self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    fn x1(&self) -> f32 {
        self.center_x - self.size / 2.0
    }

    fn x2(&self) -> f32 {
        self.center_x + self.size / 2.0
    }

    fn y1(&self) -> f32 {
        self.center_y - self.size / 2.0
    }

    fn y2(&self) -> f32 {
        self.center_y + self.size / 2.0
    }

    /// Whether a circle at `(x, y)` with radius `r` can intersect this cell.
    /// Used by the collision search to prune whole regions.
    pub fn intersects_circle(&self, x: f32, y: f32, r: f32) -> bool {
        !(self.x1() > x + r || self.x2() < x - r || self.y1() > y + r || self.y2() < y - r)
    }
}

/// Quadrant index: bit 0 set for the high-x half, bit 1 for the high-y half.
/// Coordinate ties consistently select the low half.
#[inline]
fn quadrant(center_x: f32, center_y: f32, x: f32, y: f32) -> usize {
    ((x > center_x) as usize) | (((y > center_y) as usize) << 1)
}

#[inline]
fn child_center(center_x: f32, center_y: f32, quarter: f32, q: usize) -> (f32, f32) {
    let x = if q & 1 == 0 {
        center_x - quarter
    } else {
        center_x + quarter
    };
    let y = if q & 2 == 0 {
        center_y - quarter
    } else {
        center_y + quarter
    };
    (x, y)
}

/// Small symmetric random offset around zero.
pub(crate) fn jiggle(rng: &mut SmallRng, magnitude: f32) -> f32 {
    (rng.gen::<f32>() - 0.5) * magnitude
}

/// Arena quadtree rebuilt every pass over the current (or predicted) node
/// positions.
#[derive(Debug)]
pub struct QuadTree {
    regions: Vec<Region>,
}

impl QuadTree {
    /// Build over current node positions.
    ///
    /// The node set must be non-empty: an empty store has NaN bounds, and the
    /// layers above refuse empty graphs before any tree is built.
    pub fn build(nodes: &NodeStore) -> Self {
        Self::build_from(nodes, false)
    }

    /// Build over predicted positions `(x + dx, y + dy)`, the positions the
    /// pending deltas will produce. Collision detection runs against these.
    pub fn build_predicted(nodes: &NodeStore) -> Self {
        Self::build_from(nodes, true)
    }

    fn build_from(nodes: &NodeStore, include_delta: bool) -> Self {
        let rect = nodes.bounds(include_delta);
        // Pad so a zero-extent (fully coincident) graph still gets a real
        // cell to subdivide, and square the root to keep quadrant math
        // uniform at every depth.
        let padding = (rect.width().max(rect.height()) * 0.1).max(1.0);
        let size = rect.width().max(rect.height()) + 2.0 * padding;
        let (center_x, center_y) = rect.center();

        let mut tree = Self {
            regions: vec![Region::new(center_x, center_y, size)],
        };
        let mut rng = SmallRng::seed_from_u64(JIGGLE_SEED);
        for i in 0..nodes.len() {
            let (x, y) = if include_delta {
                (nodes.x(i) + nodes.dx(i), nodes.y(i) + nodes.dy(i))
            } else {
                (nodes.x(i), nodes.y(i))
            };
            tree.insert(0, i as u32, x, y, nodes.mass(i), nodes.size(i), &mut rng);
        }
        tree
    }

    /// Root region handle is always 0.
    pub fn root(&self) -> &Region {
        &self.regions[0]
    }

    pub fn region(&self, id: u32) -> &Region {
        &self.regions[id as usize]
    }

    /// Number of regions in the arena.
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Walk regions from the root. The callback returns `true` to prune:
    /// the region's children are then not visited.
    pub fn visit<F>(&self, mut f: F)
    where
        F: FnMut(&Region) -> bool,
    {
        let mut stack = vec![0u32];
        while let Some(id) = stack.pop() {
            let region = &self.regions[id as usize];
            if f(region) {
                continue;
            }
            if let Some(children) = region.children {
                stack.extend_from_slice(&children);
            }
        }
    }

    fn push_region(&mut self, center_x: f32, center_y: f32, size: f32) -> u32 {
        let id = self.regions.len() as u32;
        self.regions.push(Region::new(center_x, center_y, size));
        id
    }

    /// Fold one body into a region's running aggregates.
    fn fold(&mut self, r: usize, x: f32, y: f32, mass: f32, radius: f32) {
        let region = &mut self.regions[r];
        let total = region.mass + mass;
        region.mass_center_x = (region.mass_center_x * region.mass + x * mass) / total;
        region.mass_center_y = (region.mass_center_y * region.mass + y * mass) / total;
        region.mass = total;
        region.max_radius = region.max_radius.max(radius);
    }

    /// Descend from `region`, placing the body in the leaf it belongs to and
    /// folding its mass into every internal region along the way.
    ///
    /// The jiggled coordinates used to separate exact ties are tree-local:
    /// the store's positions are never touched, so two truly coincident
    /// nodes end up in distinct leaves here while the force formulas still
    /// see their zero distance (and skip it via their own guards).
    fn insert(
        &mut self,
        region: u32,
        index: u32,
        x: f32,
        y: f32,
        mass: f32,
        radius: f32,
        rng: &mut SmallRng,
    ) {
        let r = region as usize;
        match (self.regions[r].children, self.regions[r].node) {
            // Empty leaf: occupy it.
            (None, None) => {
                let cell = &mut self.regions[r];
                cell.node = Some(index);
                cell.mass = mass;
                cell.mass_center_x = x;
                cell.mass_center_y = y;
                cell.max_radius = radius;
            }
            // Occupied leaf: subdivide, push the occupant down, then descend
            // with the newcomer.
            (None, Some(occupant)) => {
                let (center_x, center_y) = self.regions[r].center();
                let size = self.regions[r].size();
                let occupant_x = self.regions[r].mass_center_x;
                let occupant_y = self.regions[r].mass_center_y;
                let occupant_mass = self.regions[r].mass;
                let occupant_radius = self.regions[r].max_radius;

                let (mut x, mut y) = (x, y);
                if x == occupant_x && y == occupant_y {
                    x += jiggle(rng, TIE_BREAK);
                    y += jiggle(rng, TIE_BREAK);
                }

                let quarter = size / 4.0;
                let half = size / 2.0;
                let mut kids = [0u32; 4];
                for (q, kid) in kids.iter_mut().enumerate() {
                    let (kx, ky) = child_center(center_x, center_y, quarter, q);
                    *kid = self.push_region(kx, ky, half);
                }
                self.regions[r].children = Some(kids);
                self.regions[r].node = None;

                let oq = quadrant(center_x, center_y, occupant_x, occupant_y);
                self.insert(
                    kids[oq],
                    occupant,
                    occupant_x,
                    occupant_y,
                    occupant_mass,
                    occupant_radius,
                    rng,
                );

                self.fold(r, x, y, mass, radius);
                let nq = quadrant(center_x, center_y, x, y);
                self.insert(kids[nq], index, x, y, mass, radius, rng);
            }
            // Internal: fold the newcomer into the aggregates and descend.
            (Some(kids), _) => {
                self.fold(r, x, y, mass, radius);
                let (center_x, center_y) = self.regions[r].center();
                let q = quadrant(center_x, center_y, x, y);
                self.insert(kids[q], index, x, y, mass, radius, rng);
            }
        }
    }
}

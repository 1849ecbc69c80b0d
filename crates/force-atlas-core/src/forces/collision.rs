//! Circle-overlap resolution against predicted positions.
//!
//! Runs after the main forces have accumulated their deltas: a quadtree is
//! built over `(x + dx, y + dy)` — where integration is about to put every
//! node — and overlapping circle pairs get a corrective push weighted so the
//! heavier node moves less.

use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::config::LayoutConfig;
use crate::quadtree::{jiggle, QuadTree};
use crate::store::NodeStore;

/// Jiggle scale for coincident predicted positions, just enough to give the
/// correction a direction.
const CONTACT_JIGGLE: f32 = 1e-6;

const JIGGLE_SEED: u64 = 0xC011;

pub fn apply(nodes: &mut NodeStore, config: &LayoutConfig) {
    let tree = QuadTree::build_predicted(nodes);
    let strength = config.collision_strength;
    let mut rng = SmallRng::seed_from_u64(JIGGLE_SEED);

    for i in 0..nodes.len() {
        let xi = nodes.x(i) + nodes.dx(i);
        let yi = nodes.y(i) + nodes.dy(i);
        let ri = nodes.size(i);

        tree.visit(|region| {
            let occupant = match region.node() {
                Some(occupant) => occupant as usize,
                None => {
                    // A body below reaches at most max_radius past the cell
                    // border; prune regions that cannot hold an overlap
                    // partner.
                    return !region.intersects_circle(xi, yi, ri + region.max_radius());
                }
            };
            // Each unordered pair is corrected exactly once.
            if occupant > i {
                let j = occupant;
                let rj = nodes.size(j);
                let r = ri + rj;
                let xj = nodes.x(j) + nodes.dx(j);
                let yj = nodes.y(j) + nodes.dy(j);
                let mut x = xi - xj;
                let mut y = yi - yj;
                let mut l = x * x + y * y;

                if l < r * r {
                    if x == 0.0 {
                        x = jiggle(&mut rng, CONTACT_JIGGLE);
                        l += x * x;
                    }
                    if y == 0.0 {
                        y = jiggle(&mut rng, CONTACT_JIGGLE);
                        l += y * y;
                    }
                    l = l.sqrt();
                    let correction = (r - l) / l * strength;
                    x *= correction;
                    y *= correction;

                    // Split the correction by mass: the heavier node takes
                    // the smaller share.
                    let share = nodes.mass(j) / (nodes.mass(i) + nodes.mass(j));
                    nodes.add_dx(i, x * share);
                    nodes.add_dy(i, y * share);
                    nodes.sub_dx(j, x * (1.0 - share));
                    nodes.sub_dy(j, y * (1.0 - share));
                }
            }
            false
        });
    }
}

//! Layout configuration.
//!
//! A flat record of named tunables consumed by every force stage. The engine
//! owns one `LayoutConfig` and replaces it wholesale on reconfigure — it is
//! never partially mutated mid-iteration. Partial updates are expressed with
//! struct-update syntax, or as partial JSON documents: every field carries a
//! serde default, so absent keys deserialize to their documented default.

use serde::{Deserialize, Serialize};

/// Tunables for the ForceAtlas2 force pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Subtract node radii from distances in repulsion/attraction and switch
    /// integration to the clamped fixed-coefficient branch (anti-overlap).
    #[serde(default)]
    pub adjust_sizes: bool,

    /// Logarithmic attraction (`ln(1+d)/d`). Reduces hub dominance.
    #[serde(default)]
    pub lin_log_mode: bool,

    /// Divide each edge's attraction by its source mass and scale by the mean
    /// node mass, so high-degree nodes spread their pull over their edges.
    #[serde(default)]
    pub outbound_attraction_distribution: bool,

    /// Exponent applied to edge weights before attraction. 0 ignores weights.
    #[serde(default = "default_edge_weight_influence")]
    pub edge_weight_influence: f32,

    /// Global repulsion scale.
    #[serde(default = "default_scaling_ratio")]
    pub scaling_ratio: f32,

    /// Gravity independent of distance from the origin.
    #[serde(default)]
    pub strong_gravity_mode: bool,

    /// Pull toward the origin keeping disconnected components on screen.
    #[serde(default = "default_gravity")]
    pub gravity: f32,

    /// Global speed divisor. Larger values cool the simulation.
    #[serde(default = "default_slow_down")]
    pub slow_down: f32,

    /// Approximate repulsion through the Barnes-Hut quadtree instead of
    /// exact pairwise computation.
    #[serde(default = "default_barnes_hut_optimize")]
    pub barnes_hut_optimize: bool,

    /// Barnes-Hut opening angle. A region whose `size / distance` is below
    /// this threshold is treated as a single pseudo-body. Smaller is more
    /// accurate and more expensive.
    #[serde(default = "default_barnes_hut_theta")]
    pub barnes_hut_theta: f32,

    /// Passes executed by the worker on the initial `start` exchange.
    #[serde(default = "default_starting_iterations")]
    pub starting_iterations: u32,

    /// Passes executed by the worker per `loop` exchange.
    #[serde(default = "default_iterations_per_render")]
    pub iterations_per_render: u32,

    /// Force magnitude clamp used by the `adjust_sizes` integration branch.
    #[serde(default = "default_max_force")]
    pub max_force: f32,

    /// Resolve circle overlaps against predicted positions each pass.
    #[serde(default)]
    pub collision_detection: bool,

    /// Fraction of the overlap corrected per pass when collision detection
    /// is on.
    #[serde(default = "default_collision_strength")]
    pub collision_strength: f32,
}

fn default_edge_weight_influence() -> f32 {
    0.0
}

fn default_scaling_ratio() -> f32 {
    1.0
}

fn default_gravity() -> f32 {
    1.0
}

fn default_slow_down() -> f32 {
    1.0
}

fn default_barnes_hut_optimize() -> bool {
    true
}

fn default_barnes_hut_theta() -> f32 {
    1.2
}

fn default_starting_iterations() -> u32 {
    1
}

fn default_iterations_per_render() -> u32 {
    1
}

fn default_max_force() -> f32 {
    10.0
}

fn default_collision_strength() -> f32 {
    0.7
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            adjust_sizes: false,
            lin_log_mode: false,
            outbound_attraction_distribution: false,
            edge_weight_influence: default_edge_weight_influence(),
            scaling_ratio: default_scaling_ratio(),
            strong_gravity_mode: false,
            gravity: default_gravity(),
            slow_down: default_slow_down(),
            barnes_hut_optimize: default_barnes_hut_optimize(),
            barnes_hut_theta: default_barnes_hut_theta(),
            starting_iterations: default_starting_iterations(),
            iterations_per_render: default_iterations_per_render(),
            max_force: default_max_force(),
            collision_detection: false,
            collision_strength: default_collision_strength(),
        }
    }
}

impl LayoutConfig {
    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON. Absent keys take their defaults, so a partial
    /// document acts as an update over `LayoutConfig::default()`.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values_match_documentation() {
        let config = LayoutConfig::default();
        assert_eq!(config.scaling_ratio, 1.0);
        assert_eq!(config.gravity, 1.0);
        assert_eq!(config.slow_down, 1.0);
        assert!(config.barnes_hut_optimize);
        assert_eq!(config.barnes_hut_theta, 1.2);
        assert_eq!(config.starting_iterations, 1);
        assert_eq!(config.iterations_per_render, 1);
        assert_eq!(config.max_force, 10.0);
        assert_eq!(config.edge_weight_influence, 0.0);
        assert_eq!(config.collision_strength, 0.7);
        assert!(!config.adjust_sizes);
        assert!(!config.lin_log_mode);
        assert!(!config.outbound_attraction_distribution);
        assert!(!config.strong_gravity_mode);
        assert!(!config.collision_detection);
    }

    #[test]
    fn partial_json_fills_remaining_fields_with_defaults() {
        let config = LayoutConfig::from_json(r#"{"gravity": 5.0, "lin_log_mode": true}"#).unwrap();
        assert_eq!(config.gravity, 5.0);
        assert!(config.lin_log_mode);
        assert_eq!(config.scaling_ratio, 1.0);
        assert!(config.barnes_hut_optimize);
    }

    #[test]
    fn json_round_trip_preserves_every_field() {
        let config = LayoutConfig {
            adjust_sizes: true,
            edge_weight_influence: 1.5,
            barnes_hut_theta: 0.5,
            collision_detection: true,
            ..LayoutConfig::default()
        };
        let json = config.to_json().unwrap();
        let parsed = LayoutConfig::from_json(&json).unwrap();
        assert_eq!(parsed, config);
    }
}

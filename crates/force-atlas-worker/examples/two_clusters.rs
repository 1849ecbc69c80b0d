//! Two-cluster layout driven through the supervisor/worker protocol.
//!
//! Run with: cargo run --example two_clusters

use std::time::{Duration, Instant};

use force_atlas_worker::{GraphEdge, GraphNode, LayoutConfig, LayoutGraph, Supervisor};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cluster_size = 50;
    let mut graph = LayoutGraph::new();

    // Two rings of nodes, seeded on small circles left and right of the
    // origin, each ring closed by edges to its neighbor.
    for cluster in 0..2u64 {
        let center_x = if cluster == 0 { -100.0 } else { 100.0 };
        for i in 0..cluster_size {
            let id = cluster * 1000 + i;
            let angle = i as f32 * std::f32::consts::TAU / cluster_size as f32;
            graph.add_node(GraphNode::new(
                id,
                center_x + 10.0 * angle.cos(),
                10.0 * angle.sin(),
            ));
        }
        for i in 0..cluster_size {
            graph.add_edge(GraphEdge::new(
                cluster * 1000 + i,
                cluster * 1000 + (i + 1) % cluster_size,
            ));
        }
    }
    // one bridge keeps the clusters from drifting apart forever
    graph.add_edge(GraphEdge::new(0, 1000).with_weight(0.5));

    println!(
        "Laying out {} nodes and {} edges...",
        graph.node_count(),
        graph.edge_count()
    );

    let config = LayoutConfig {
        iterations_per_render: 5,
        ..LayoutConfig::default()
    };
    let mut supervisor = Supervisor::new(graph, config)?;
    supervisor.start()?;

    let batches = 40;
    let start = Instant::now();
    for batch in 0..batches {
        if !supervisor.poll_timeout(Duration::from_secs(5))? {
            println!("no reply within timeout, giving up");
            break;
        }
        if batch % 10 == 0 {
            let rect = supervisor.layout_rect();
            println!(
                "Batch {:>3} (iteration {:>3}): bounds = ({:.1}, {:.1}) to ({:.1}, {:.1})",
                batch,
                supervisor.iterations(),
                rect.x1,
                rect.y1,
                rect.x2,
                rect.y2
            );
        }
    }
    supervisor.stop();
    let elapsed = start.elapsed();

    println!(
        "\nCompleted {} iterations in {:.2?}",
        supervisor.iterations(),
        elapsed
    );

    println!("\nFinal positions (first 5 nodes):");
    for node in supervisor.nodes().iter().take(5) {
        println!("  Node {}: ({:.2}, {:.2})", node.id, node.x, node.y);
    }

    supervisor.kill();
    Ok(())
}

use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use clap::{Args, ValueEnum};
use fll_gen::artifacts::write_degree_csv;
use fll_graph::{degree_stats, hyperedge_size_histogram, read_edge_list, read_hyperedge_list};
use serde_json::json;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum InputKind {
    /// Weighted edge list.
    Graph,
    /// Hyperedge list.
    Hypergraph,
}

#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Edge list or hyperedge list written by `generate`.
    #[arg(long)]
    pub input: PathBuf,
    /// Format of `--input`.
    #[arg(long, value_enum, default_value_t = InputKind::Graph)]
    pub kind: InputKind,
    /// Destination of the `degree,count` CSV.
    #[arg(long)]
    pub out: PathBuf,
    /// Optional JSON file receiving the summary printed to stdout.
    #[arg(long)]
    pub summary: Option<PathBuf>,
}

pub fn run(args: &StatsArgs) -> Result<(), Box<dyn Error>> {
    let reader = BufReader::new(File::open(&args.input)?);
    let summary = match args.kind {
        InputKind::Graph => {
            let graph = read_edge_list(reader)?;
            write_degree_csv(&args.out, &graph)?;
            json!({
                "nodes": graph.node_count(),
                "edges": graph.edge_count(),
                "total_weight": graph.total_weight(),
                "degrees": degree_stats(&graph),
            })
        }
        InputKind::Hypergraph => {
            let hypergraph = read_hyperedge_list(reader)?;
            write_degree_csv(&args.out, &hypergraph)?;
            let sizes: Vec<(usize, u64)> =
                hyperedge_size_histogram(&hypergraph).into_iter().collect();
            json!({
                "nodes": hypergraph.node_count(),
                "hyperedges": hypergraph.edge_count(),
                "degrees": degree_stats(&hypergraph),
                "hyperedge_sizes": sizes,
            })
        }
    };
    tracing::info!(
        input = %args.input.display(),
        kind = ?args.kind,
        out = %args.out.display(),
        "degree distribution written"
    );
    if let Some(path) = &args.summary {
        crate::write_json(path, &summary)?;
    }
    println!("{summary}");
    Ok(())
}

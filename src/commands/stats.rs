use anyhow::Result;

use graphrag::service::GraphRagService;

use crate::cli::OutputFormat;

/// Runs the stats command
pub fn run(service: &GraphRagService, format: OutputFormat) -> Result<()> {
    let stats = service.get_stats()?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
        OutputFormat::Text => {
            println!("Nodes: {}", stats.total_nodes);
            let mut node_types: Vec<_> = stats.node_counts.iter().collect();
            node_types.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
            for (entity_type, count) in node_types {
                println!("  {:<16} {}", entity_type, count);
            }

            println!("Relationships: {}", stats.total_relationships);
            let mut rel_types: Vec<_> = stats.relationship_counts.iter().collect();
            rel_types.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
            for (rel_type, count) in rel_types {
                println!("  {:<18} {}", rel_type, count);
            }

            println!("Provenance edges: {}", stats.total_provenance);
            println!("Density: {:.6}", stats.graph_density);
            println!("Last updated: {}", stats.last_updated);
        }
    }

    Ok(())
}

use anyhow::Result;

use graphrag::error::RetrieveError;
use graphrag::service::GraphRagService;

use crate::cli::OutputFormat;

/// Runs the query command and prints the ranked documents
pub async fn run(
    service: &GraphRagService,
    query: &str,
    max_depth: Option<usize>,
    top_k: Option<usize>,
    format: OutputFormat,
) -> Result<()> {
    tracing::info!("querying knowledge graph: {}", query);

    let outcome = match service.query_graph(query, max_depth, top_k).await {
        Ok(outcome) => outcome,
        Err(RetrieveError::Unavailable) => {
            eprintln!("Graph retrieval unavailable; fall back to vector search.");
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
        OutputFormat::Text => {
            if outcome.mentions.is_empty() {
                println!("No entities resolved from the query.");
                eprintln!("Tip: mention a visa type or document type by name.");
                return Ok(());
            }

            println!("Mentions: {}", outcome.mentions.join(", "));
            if !outcome.degraded.is_empty() {
                eprintln!("Degraded strategies: {}", outcome.degraded.join(", "));
            }
            if outcome.documents.is_empty() {
                println!("No documents found.");
                return Ok(());
            }

            for (rank, doc) in outcome.documents.iter().enumerate() {
                println!(
                    "{}. {} (score {:.2}, {} hops)",
                    rank + 1,
                    doc.doc_id,
                    doc.score,
                    doc.min_hop
                );
                println!("   via: {}", doc.explanation.strategies.join(", "));
                for expansion in &doc.explanation.expansions {
                    println!("   {}", expansion);
                }
                for path in &doc.explanation.paths {
                    println!("   {}", path);
                }
            }
            println!(
                "({} documents in {}ms)",
                outcome.documents.len(),
                outcome.took_ms
            );
        }
    }

    Ok(())
}

use anyhow::{bail, Context, Result};
use std::path::Path;

use graphrag::graph::SourceDocument;
use graphrag::service::GraphRagService;

/// Runs the extract command over a file or a directory of documents
pub async fn run(service: &GraphRagService, input: &str) -> Result<()> {
    let documents = load_documents(Path::new(input))?;
    if documents.is_empty() {
        bail!("no .txt or .md documents found at {}", input);
    }

    tracing::info!("extracting {} documents from {}", documents.len(), input);
    let report = service.extract(documents).await?;

    println!("Extraction run {}", report.run_id);
    println!("  documents:     {}", report.documents);
    println!("  entities:      {}", report.entities);
    println!("  relationships: {}", report.relationships);
    println!("  provenance:    {}", report.provenance);
    println!("  alias edges:   {}", report.alias_edges);
    if !report.failed_documents.is_empty() {
        eprintln!("  failed documents: {:?}", report.failed_documents);
    }

    Ok(())
}

/// Load documents from a file or a flat directory; document ids come from
/// file stems so re-extraction converges on the same graph nodes
fn load_documents(path: &Path) -> Result<Vec<SourceDocument>> {
    let mut documents = Vec::new();

    if path.is_file() {
        documents.push(load_file(path)?);
        return Ok(documents);
    }

    let entries =
        std::fs::read_dir(path).with_context(|| format!("reading directory {}", path.display()))?;
    let mut paths: Vec<_> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && matches!(
                    p.extension().and_then(|e| e.to_str()),
                    Some("txt") | Some("md")
                )
        })
        .collect();
    paths.sort();

    for file in paths {
        documents.push(load_file(&file)?);
    }
    Ok(documents)
}

fn load_file(path: &Path) -> Result<SourceDocument> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let id = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document")
        .to_string();
    Ok(SourceDocument::new(&id, &text))
}

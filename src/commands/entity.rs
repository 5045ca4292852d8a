use anyhow::Result;

use graphrag::service::GraphRagService;

/// Runs the entity command, printing one entity with its relationships
pub fn run(service: &GraphRagService, id: &str) -> Result<()> {
    let Some(details) = service.get_entity(id)? else {
        eprintln!("No entity with id {}", id);
        std::process::exit(1);
    };

    let entity = &details.entity;
    println!("{} ({})", entity.text, entity.entity_type);
    println!("  id:         {}", entity.id);
    println!("  confidence: {:.2}", entity.confidence);
    println!("  source:     {}", entity.source);
    if !entity.attributes.is_empty() {
        let mut attributes: Vec<_> = entity.attributes.iter().collect();
        attributes.sort();
        for (key, value) in attributes {
            println!("  {}: {}", key, value);
        }
    }

    let docs: Vec<&str> = entity.provenance.iter().map(|d| d.as_str()).collect();
    println!("  documents:  {}", docs.join(", "));

    if !details.outgoing.is_empty() {
        println!("Outgoing:");
        for rel in &details.outgoing {
            println!("  -[{}]-> {}", rel.rel_type, rel.target_id);
        }
    }
    if !details.incoming.is_empty() {
        println!("Incoming:");
        for rel in &details.incoming {
            println!("  {} -[{}]->", rel.source_id, rel.rel_type);
        }
    }

    Ok(())
}

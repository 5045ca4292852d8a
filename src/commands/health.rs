use anyhow::Result;

use graphrag::db::HealthStatus;
use graphrag::service::GraphRagService;

/// Runs the health command; a non-healthy graph exits non-zero
pub fn run(service: &GraphRagService) -> Result<()> {
    let report = service.health_check();

    println!("Status: {}", report.status);
    println!("  orphaned nodes:    {}", report.orphaned_nodes);
    println!("  broken references: {}", report.broken_references);
    for warning in &report.warnings {
        eprintln!("  warning: {}", warning);
    }
    for error in &report.errors {
        eprintln!("  error: {}", error);
    }

    if report.status != HealthStatus::Healthy {
        std::process::exit(1);
    }
    Ok(())
}

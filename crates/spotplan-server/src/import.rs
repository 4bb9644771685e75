//! Bulk import from a JSON file: seeds the store without going through HTTP.

use std::path::Path;
use std::sync::Arc;

use tracing::{error, info};

use spotplan_core::PlanGeneratorConfig;
use spotplan_planner::WebhookPlanGenerator;
use spotplan_runtime::{BulkRejection, Orchestrator};
use spotplan_store::SqliteStore;

/// Result of an import run.
#[derive(Debug, Default)]
pub struct ImportReport {
    pub submitted: usize,
    pub inserted: usize,
    pub rejected: Vec<BulkRejection>,
    pub errors: Vec<String>,
}

/// Read a JSON array of spots from `file` and bulk-create them in `data_dir`.
pub fn run_import(file: &Path, data_dir: &Path) -> ImportReport {
    let mut report = ImportReport::default();

    let payload: serde_json::Value = match std::fs::read_to_string(file)
        .map_err(|e| e.to_string())
        .and_then(|raw| serde_json::from_str(&raw).map_err(|e| e.to_string()))
    {
        Ok(v) => v,
        Err(e) => {
            report
                .errors
                .push(format!("Failed to read {}: {}", file.display(), e));
            return report;
        }
    };
    report.submitted = payload.as_array().map(|a| a.len()).unwrap_or(0);

    let store = match SqliteStore::open(data_dir) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            report.errors.push(format!("Failed to open store: {}", e));
            return report;
        }
    };
    // Bulk inserts never request plans.
    let planner = match WebhookPlanGenerator::new(&PlanGeneratorConfig::default()) {
        Ok(p) => Arc::new(p),
        Err(e) => {
            report.errors.push(e.to_string());
            return report;
        }
    };

    let orchestrator = Orchestrator::new(store, planner);
    match orchestrator.bulk_create(&payload) {
        Ok(bulk) => {
            info!(
                "Imported {} of {} spots from {}",
                bulk.inserted,
                report.submitted,
                file.display()
            );
            report.inserted = bulk.inserted;
            report.rejected = bulk.rejected;
        }
        Err(e) => {
            error!("Import failed: {}", e);
            report.errors.push(e.to_string());
        }
    }
    report
}

/// Print a human-readable import report.
pub fn print_report(report: &ImportReport) {
    println!("=== SpotPlan Import Report ===");
    println!();
    println!("Submitted:  {}", report.submitted);
    println!("Inserted:   {}", report.inserted);
    println!("Rejected:   {}", report.rejected.len());

    if !report.rejected.is_empty() {
        println!();
        println!("Rejected elements:");
        for r in &report.rejected {
            println!("  - [{}] {}", r.index, r.error);
        }
    }

    if !report.errors.is_empty() {
        println!();
        println!("Errors:");
        for e in &report.errors {
            println!("  - {}", e);
        }
    }

    println!();
    if report.errors.is_empty() {
        println!("Status: IMPORT COMPLETE");
    } else {
        println!("Status: IMPORT FAILED");
    }
}

use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;

use crate::core::error::Result;
use crate::features::reports::services::{ReportService, RoutingService};

/// Delay between sweep passes
const SWEEP_INTERVAL_SECS: u64 = 60;

/// Batch size per pass
const BATCH_SIZE: i64 = 20;

/// Background worker that re-attempts routing for categorized reports that
/// are still unassigned, so reports that were unroutable at creation get
/// picked up once the department directory changes. Runs on its own timer
/// and never blocks request handling.
pub struct RoutingSweeper {
    report_service: Arc<ReportService>,
    routing_service: Arc<RoutingService>,
}

impl RoutingSweeper {
    pub fn new(report_service: Arc<ReportService>, routing_service: Arc<RoutingService>) -> Self {
        Self {
            report_service,
            routing_service,
        }
    }

    /// Run the sweeper in a background loop
    pub async fn run(&self) {
        tracing::info!("Starting routing sweeper worker");

        let mut interval = interval(Duration::from_secs(SWEEP_INTERVAL_SECS));

        loop {
            interval.tick().await;

            if let Err(e) = self.sweep().await {
                tracing::error!("Error sweeping unrouted reports: {:?}", e);
            }
        }
    }

    async fn sweep(&self) -> Result<()> {
        let unrouted = self.report_service.list_unrouted(BATCH_SIZE).await?;

        if unrouted.is_empty() {
            return Ok(());
        }

        tracing::info!("Re-attempting routing for {} unrouted reports", unrouted.len());

        for report in unrouted {
            let id = report.id;
            let routed = self.routing_service.route_report(report, None).await;
            if routed.assigned_department.is_none() {
                tracing::debug!("Report {} still unroutable", id);
            }
        }

        Ok(())
    }
}

//! One batch run: load companies, process them, deliver the reports.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use growthwatch_core::{load_companies, AppConfig};
use growthwatch_pipeline::{
    select_companies, BatchOrchestrator, BatchRunOutcome, CompanyCoordinator,
    CoordinatorSettings, CrmSink, JsonRecordSink, ReportSink,
};

use crate::wiring::build_wiring;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RunOptions {
    /// Process only the company with this name.
    pub company: Option<String>,
    pub no_pacing: bool,
    pub skip_crm: bool,
}

/// Run the whole pipeline once and deliver its reports.
///
/// # Errors
///
/// Returns an error if the companies file cannot be loaded, the company
/// filter matches nothing, the HTTP client cannot be built, or the JSON
/// record directory is unusable. Per-company failures never surface here.
pub(crate) async fn run_batch(
    config: &AppConfig,
    options: &RunOptions,
) -> anyhow::Result<BatchRunOutcome> {
    let file = load_companies(&config.companies_path).with_context(|| {
        format!(
            "failed to load companies from {}",
            config.companies_path.display()
        )
    })?;

    let companies = select_companies(&file.companies, options.company.as_deref());
    if let Some(name) = &options.company {
        if companies.is_empty() {
            anyhow::bail!(
                "company '{name}' not found in {}",
                config.companies_path.display()
            );
        }
    }

    let wiring = build_wiring(config)?;
    let coordinator = CompanyCoordinator::new(
        wiring.tiers,
        wiring.analyzer,
        CoordinatorSettings::from_config(config),
    );
    let pacing = if options.no_pacing {
        Duration::ZERO
    } else {
        Duration::from_secs(config.inter_company_delay_secs)
    };

    let outcome = BatchOrchestrator::new(coordinator, pacing)
        .run(&companies)
        .await;

    let json = JsonRecordSink::new(&config.output_dir);
    let written = json
        .deliver(&outcome)
        .await
        .context("failed to write JSON records")?;
    tracing::info!(
        sink = json.name(),
        delivered = written.delivered,
        failed = written.failed,
        dir = %config.output_dir.display(),
        "reports written"
    );

    match (wiring.crm, options.skip_crm) {
        (Some(client), false) => deliver_crm(client, &outcome).await,
        (Some(_), true) => tracing::info!("CRM push skipped by --skip-crm"),
        (None, _) => {}
    }

    Ok(outcome)
}

async fn deliver_crm(client: Arc<growthwatch_sources::SalesforceClient>, outcome: &BatchRunOutcome) {
    let sink = CrmSink::new(client);
    match sink.deliver(outcome).await {
        Ok(summary) => tracing::info!(
            sink = sink.name(),
            delivered = summary.delivered,
            failed = summary.failed,
            "CRM push finished"
        ),
        Err(e) => tracing::error!(sink = sink.name(), error = %e, "CRM push aborted"),
    }
}

//! Tiered acquisition, per-company coordination, batch orchestration and
//! report delivery.

pub mod coordinator;
pub mod delivery;
pub mod error;
pub mod merge;
pub mod orchestrator;
pub mod resolver;
pub mod retry;

pub use coordinator::{
    CapabilityTiers, CompanyCoordinator, CompanyOutcome, CompanyStage, Completeness,
    CoordinatorSettings,
};
pub use delivery::{CrmSink, DeliverySummary, JsonRecordSink, ReportSink};
pub use error::DeliveryError;
pub use merge::{merge, ContactActivity};
pub use orchestrator::{select_companies, BatchOrchestrator, BatchRunOutcome};
pub use resolver::{resolve, AcquisitionResult, AttemptSummary, Resolution, Tier};
pub use retry::{backoff_delay, TierPolicy};

//! Scripted adapters shared by the pipeline integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use growthwatch_core::AnalysisOutput;
use growthwatch_pipeline::{Tier, TierPolicy};
use growthwatch_sources::{AnalysisInput, GrowthAnalyzer, Payload, SourceAdapter, SourceError};

#[derive(Clone)]
pub enum Script<T> {
    Succeed(T),
    NoMatch,
    Hard,
    Transient,
    /// Fail transiently for the first `failures` calls, then succeed.
    FlakyThen { failures: u32, payload: T },
    /// Hang past any sensible timeout on the first call, then succeed.
    HangOnceThen(T),
}

/// Adapter that follows a fixed script and counts its calls.
pub struct Scripted<T> {
    pub id: &'static str,
    pub calls: Arc<AtomicU32>,
    script: Script<T>,
}

impl<T> Scripted<T> {
    pub fn new(id: &'static str, script: Script<T>) -> Self {
        Self {
            id,
            calls: Arc::new(AtomicU32::new(0)),
            script,
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<Req, T> SourceAdapter<Req, T> for Scripted<T>
where
    Req: Sync + ?Sized,
    T: Payload + Clone + Send + Sync + 'static,
{
    fn tier_id(&self) -> &'static str {
        self.id
    }

    fn method(&self) -> &'static str {
        "scripted"
    }

    fn fetch<'a>(&'a self, _req: &'a Req) -> BoxFuture<'a, Result<T, SourceError>> {
        Box::pin(async move {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            match &self.script {
                Script::Succeed(payload) => Ok(payload.clone()),
                Script::NoMatch => Err(SourceError::NoMatch(format!("{} found nothing", self.id))),
                Script::Hard => Err(SourceError::Unauthorized { service: self.id }),
                Script::Transient => Err(transient(self.id)),
                Script::FlakyThen { failures, payload } => {
                    if n <= *failures {
                        Err(transient(self.id))
                    } else {
                        Ok(payload.clone())
                    }
                }
                Script::HangOnceThen(payload) => {
                    if n == 1 {
                        tokio::time::sleep(Duration::from_secs(30)).await;
                    }
                    Ok(payload.clone())
                }
            }
        })
    }
}

fn transient(service: &'static str) -> SourceError {
    SourceError::UnexpectedStatus {
        service,
        status: 503,
    }
}

pub enum AnalyzerScript {
    Output(AnalysisOutput),
    Fail,
    Hang,
}

pub struct ScriptedAnalyzer {
    pub calls: Arc<AtomicU32>,
    script: AnalyzerScript,
}

impl ScriptedAnalyzer {
    pub fn new(script: AnalyzerScript) -> Self {
        Self {
            calls: Arc::new(AtomicU32::new(0)),
            script,
        }
    }
}

impl GrowthAnalyzer for ScriptedAnalyzer {
    fn name(&self) -> &'static str {
        "scripted_analyzer"
    }

    fn analyze<'a>(
        &'a self,
        _input: &'a AnalysisInput,
    ) -> BoxFuture<'a, Result<AnalysisOutput, SourceError>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.script {
                AnalyzerScript::Output(output) => Ok(output.clone()),
                AnalyzerScript::Fail => Err(SourceError::UnexpectedStatus {
                    service: "openai",
                    status: 500,
                }),
                AnalyzerScript::Hang => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok(AnalysisOutput::default())
                }
            }
        })
    }
}

/// Short timeout, one retry, no back-off.
pub fn fast_policy() -> TierPolicy {
    TierPolicy {
        tier_timeout: Duration::from_millis(200),
        max_retries: 1,
        backoff_base_ms: 0,
    }
}

/// Enabled tier owning `adapter`.
pub fn tier<Req, T, A>(adapter: A) -> Tier<Req, T>
where
    Req: Sync + ?Sized,
    T: Payload + Send + 'static,
    A: SourceAdapter<Req, T> + 'static,
{
    Tier::<Req, T>::enabled(Arc::new(adapter))
}

/// Enabled tier sharing `adapter` with the test, so its calls can be counted.
pub fn shared<Req, T, A>(adapter: &Arc<A>) -> Tier<Req, T>
where
    Req: Sync + ?Sized,
    T: Payload + Send + 'static,
    A: SourceAdapter<Req, T> + 'static,
{
    Tier::enabled(Arc::clone(adapter) as Arc<dyn SourceAdapter<Req, T>>)
}

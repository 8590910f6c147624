// file: src/utils/telemetry.rs
// description: service health for the verify command and stage timing for uploads and summaries
// reference: https://docs.rs/tracing

use crate::error::Result;
use chrono::{DateTime, Utc};
use std::fmt::Write as _;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    fn icon(self) -> &'static str {
        match self {
            HealthStatus::Healthy => "✓",
            HealthStatus::Degraded => "⚠",
            HealthStatus::Unhealthy => "✗",
        }
    }
}

/// Outcome of probing one external service.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceCheck {
    pub status: HealthStatus,
    pub detail: Option<String>,
    pub latency: Duration,
}

impl ServiceCheck {
    /// Awaits `probe` and classifies it: an error is unhealthy, and a value
    /// for which `problem` returns a reason is degraded.
    pub async fn probe<T, Fut>(probe: Fut, problem: impl FnOnce(&T) -> Option<String>) -> Self
    where
        Fut: Future<Output = Result<T>>,
    {
        let start = Instant::now();
        let result = probe.await;
        let latency = start.elapsed();

        let (status, detail) = match result {
            Ok(value) => match problem(&value) {
                None => (HealthStatus::Healthy, None),
                Some(reason) => (HealthStatus::Degraded, Some(reason)),
            },
            Err(e) => (HealthStatus::Unhealthy, Some(e.to_string())),
        };

        Self {
            status,
            detail,
            latency,
        }
    }
}

/// Health of the services a search depends on.
#[derive(Debug, Clone)]
pub struct HealthReport {
    pub collection_name: String,
    /// Present only when collection creation was requested.
    pub collection: Option<ServiceCheck>,
    pub vector_store: ServiceCheck,
    pub embeddings: ServiceCheck,
    pub checked_at: DateTime<Utc>,
}

impl HealthReport {
    pub fn checks(&self) -> impl Iterator<Item = (&'static str, &ServiceCheck)> {
        self.collection
            .iter()
            .map(|check| ("collection", check))
            .chain([
                ("vector store", &self.vector_store),
                ("embeddings", &self.embeddings),
            ])
    }

    /// The worst status among the checks.
    pub fn overall_status(&self) -> HealthStatus {
        self.checks()
            .map(|(_, check)| check.status)
            .max()
            .unwrap_or(HealthStatus::Healthy)
    }

    pub fn format(&self) -> String {
        let overall = self.overall_status();
        let mut output = format!(
            "{} {:?} for collection {} at {}\n\n",
            overall.icon(),
            overall,
            self.collection_name,
            self.checked_at.format("%Y-%m-%d %H:%M:%S UTC")
        );

        for (name, check) in self.checks() {
            let _ = write!(
                output,
                "{} {} ({}ms)",
                check.status.icon(),
                name,
                check.latency.as_millis()
            );
            if let Some(detail) = &check.detail {
                let _ = write!(output, "\n  {}", detail);
            }
            output.push('\n');
        }

        output
    }
}

/// Wall-clock time of one upload or summary, split into named stages.
pub struct StageTimer {
    label: String,
    started: Instant,
    stage_started: Instant,
    stages: Vec<(&'static str, Duration)>,
}

impl StageTimer {
    pub fn start(label: impl Into<String>) -> Self {
        let now = Instant::now();
        Self {
            label: label.into(),
            started: now,
            stage_started: now,
            stages: Vec::new(),
        }
    }

    /// Closes the running stage under `name` and starts the next one.
    pub fn stage(&mut self, name: &'static str) {
        let now = Instant::now();
        self.stages.push((name, now - self.stage_started));
        self.stage_started = now;
    }

    pub fn warn_if_over(&self, limit: Duration) {
        let elapsed = self.started.elapsed();
        if elapsed > limit {
            warn!(
                "{} took {:.1}s, over the {:.0}s budget",
                self.label,
                elapsed.as_secs_f64(),
                limit.as_secs_f64()
            );
        }
    }

    /// Closes the last stage and logs the breakdown.
    pub fn finish(mut self, last_stage: &'static str) -> Duration {
        self.stage(last_stage);
        let total = self.started.elapsed();
        info!(
            "{} finished in {:.2}s ({})",
            self.label,
            total.as_secs_f64(),
            self.breakdown()
        );
        total
    }

    fn breakdown(&self) -> String {
        self.stages
            .iter()
            .map(|(name, took)| format!("{} {:.2}s", name, took.as_secs_f64()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;

    fn check(status: HealthStatus) -> ServiceCheck {
        ServiceCheck {
            status,
            detail: None,
            latency: Duration::from_millis(5),
        }
    }

    fn report(
        collection: Option<ServiceCheck>,
        store: HealthStatus,
        embeddings: HealthStatus,
    ) -> HealthReport {
        HealthReport {
            collection_name: "hiring_assistant".to_string(),
            collection,
            vector_store: check(store),
            embeddings: check(embeddings),
            checked_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_probe_classifies_results() {
        let ok = ServiceCheck::probe(async { Ok::<_, PipelineError>(3usize) }, |_| None).await;
        assert_eq!(ok.status, HealthStatus::Healthy);

        let empty = ServiceCheck::probe(
            async { Ok::<_, PipelineError>(Vec::<f32>::new()) },
            |v: &Vec<f32>| v.is_empty().then(|| "empty embedding".to_string()),
        )
        .await;
        assert_eq!(empty.status, HealthStatus::Degraded);

        let failed = ServiceCheck::probe(
            async { Err::<(), _>(PipelineError::vector_store("401 Unauthorized", false)) },
            |_| None,
        )
        .await;
        assert_eq!(failed.status, HealthStatus::Unhealthy);
        assert!(failed.detail.unwrap().contains("401 Unauthorized"));
    }

    #[test]
    fn test_worst_check_decides_overall_status() {
        assert_eq!(
            report(None, HealthStatus::Healthy, HealthStatus::Healthy).overall_status(),
            HealthStatus::Healthy
        );
        assert_eq!(
            report(None, HealthStatus::Healthy, HealthStatus::Degraded).overall_status(),
            HealthStatus::Degraded
        );
        assert_eq!(
            report(
                Some(check(HealthStatus::Unhealthy)),
                HealthStatus::Degraded,
                HealthStatus::Healthy
            )
            .overall_status(),
            HealthStatus::Unhealthy
        );
    }

    #[test]
    fn test_format_lists_collection_only_when_checked() {
        let without = report(None, HealthStatus::Healthy, HealthStatus::Healthy);
        assert_eq!(without.checks().count(), 2);
        assert!(!without.format().contains("collection ("));

        let with = report(
            Some(check(HealthStatus::Healthy)),
            HealthStatus::Healthy,
            HealthStatus::Healthy,
        );
        let text = with.format();
        assert!(text.contains("hiring_assistant"));
        assert!(text.contains("✓ collection ("));
        assert!(text.contains("✓ embeddings ("));
    }

    #[test]
    fn test_stage_timer_records_stages() {
        let mut timer = StageTimer::start("upload");
        std::thread::sleep(Duration::from_millis(10));
        timer.stage("extract");

        let breakdown = timer.breakdown();
        assert!(breakdown.starts_with("extract "));

        let total = timer.finish("store");
        assert!(total >= Duration::from_millis(10));
    }
}

use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::core::config::Settings;

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub(crate) fn init(settings: &Settings) -> anyhow::Result<()> {
    if !settings.telemetry().prometheus_enabled || PROM_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = PROM_HANDLE.set(handle);
    Ok(())
}

pub(crate) fn render() -> Option<String> {
    PROM_HANDLE.get().map(|handle| handle.render())
}

pub(crate) fn record_answer_graded(question_type: &'static str, outcome: &'static str) {
    metrics::counter!(
        "answers_graded_total",
        "question_type" => question_type,
        "outcome" => outcome
    )
    .increment(1);
}

pub(crate) fn record_submission_created() {
    metrics::counter!("submissions_created_total").increment(1);
}

pub(crate) fn record_submission_completed(duration_minutes: f64) {
    metrics::counter!("submissions_completed_total").increment(1);
    metrics::histogram!("submission_duration_minutes").record(duration_minutes);
}

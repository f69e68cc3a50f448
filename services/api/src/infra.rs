use metrics_exporter_prometheus::PrometheusHandle;
use risk_engine::config::PipelineConfig;
use risk_engine::workflows::underwriting::{
    AuditError, JsonLinesAuditLog, RiskPipeline, RiskScorer, TracingAuditSink,
};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Rejections go to the log stream and, when configured, to the audit file.
pub(crate) type ServiceAudit = (TracingAuditSink, Option<JsonLinesAuditLog>);

pub(crate) fn audit_sink(config: &PipelineConfig) -> Result<ServiceAudit, AuditError> {
    let file_log = config
        .audit_log
        .as_ref()
        .map(JsonLinesAuditLog::open)
        .transpose()?;
    Ok((TracingAuditSink, file_log))
}

pub(crate) fn build_pipeline(
    config: &PipelineConfig,
) -> Result<RiskPipeline<ServiceAudit>, AuditError> {
    let audit = Arc::new(audit_sink(config)?);
    Ok(RiskPipeline::new(
        RiskScorer::for_table(config.rule_table),
        audit,
    ))
}

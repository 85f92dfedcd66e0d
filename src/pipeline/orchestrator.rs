//! Pipeline Orchestrator - composite entry point over the nine stages
//!
//! Every stage is CPU-bound, so each one runs on tokio's blocking pool behind
//! a semaphore sized by `pipeline.worker_threads`. A slow entropy pass on one
//! request therefore never stalls the async workers serving other requests.
//!
//! The initiator, slope and stability branches share no data and are joined
//! before fusion; all three results are required.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::config::{self, PipelineConfig};
use crate::processing::{clamp01, derive_magnitudes, round_to, spectra_window};
use crate::rules::{RuleBook, RuleProvider};
use crate::stages::{
    data_guard, fusion, health_stage, initiator_rules, maintenance_plan, reliability,
    slope_intel, stability_lens, trend_engine, Stage,
};
use crate::types::{
    BlockInput, DataGuardRequest, FullAnalysisRequest, FullAnalysisResponse, FusionRequest,
    HealthRequest, HealthStage, InitiatorRequest, MaintenanceRequest, PipelineTrace,
    ReliabilityRequest, SeverityLevel, SlopeRequest, StabilityRequest,
    TrendRequest,
};

/// Caller-visible pipeline failures. Everything else degrades to stage
/// defaults inside the run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Worker pool unavailable: {0}")]
    Worker(String),
}

/// Runs the full decision pipeline for one request at a time per call;
/// concurrent calls share only the read-only rule book and the permit pool.
#[derive(Clone)]
pub struct PipelineOrchestrator {
    rules: Arc<dyn RuleProvider>,
    permits: Arc<Semaphore>,
    spectrum_window: usize,
}

impl PipelineOrchestrator {
    pub fn new(rules: Arc<dyn RuleProvider>, pipeline: &PipelineConfig) -> Self {
        Self {
            rules,
            permits: Arc::new(Semaphore::new(pipeline.worker_threads.max(1))),
            spectrum_window: pipeline.spectrum_window,
        }
    }

    /// Orchestrator over the global rule book and pipeline settings.
    pub fn from_global() -> Self {
        let rules: Arc<dyn RuleProvider> = RuleBook::global();
        Self::new(rules, &config::get().pipeline)
    }

    /// Reject out-of-domain scalars before any stage runs.
    pub fn validate(request: &FullAnalysisRequest) -> Result<(), PipelineError> {
        if request.failure_threshold <= 0.0 || !request.failure_threshold.is_finite() {
            return Err(PipelineError::InvalidInput(
                "failure_threshold must be positive".to_string(),
            ));
        }
        if request.signal.values.is_empty() {
            return Err(PipelineError::InvalidInput(
                "signal.values cannot be empty".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&request.criticality) {
            return Err(PipelineError::InvalidInput(
                "criticality must be between 0 and 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Run one stage on the blocking pool under a permit.
    ///
    /// A panicking stage is replaced by `fallback`. The stage endpoints use
    /// this too, so single-stage calls share the same permit pool.
    pub async fn offload<T, F, D>(&self, stage: Stage, job: F, fallback: D) -> Result<T, PipelineError>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
        D: FnOnce() -> T,
    {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| PipelineError::Worker(e.to_string()))?;

        match tokio::task::spawn_blocking(job).await {
            Ok(response) => Ok(response),
            Err(e) => {
                warn!(stage = %stage, error = %e, "Stage worker failed, returning safe default");
                Ok(fallback())
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn close_workers(&self) {
        self.permits.close();
    }

    pub async fn evaluate(
        &self,
        request: FullAnalysisRequest,
    ) -> Result<FullAnalysisResponse, PipelineError> {
        let started = Instant::now();
        Self::validate(&request)?;

        let trace_id = request
            .trace_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        info!(
            trace_id = %trace_id,
            asset_id = %request.asset_id,
            component = %request.component,
            samples = request.signal.values.len(),
            "Pipeline started"
        );

        let mut trace = PipelineTrace::default();

        // ====================================================================
        // STAGE 0: Data Guard
        // ====================================================================
        let guard_request = Arc::new(DataGuardRequest {
            schema_version: request.schema_version.clone(),
            trace_id: Some(trace_id.clone()),
            asset_id: request.asset_id.clone(),
            timestamp_utc: request.timestamp_utc.clone(),
            signal: request.signal.clone(),
            context: request.context.clone(),
        });
        let job_request = Arc::clone(&guard_request);
        let quality_report = self
            .offload(
                Stage::DataGuard,
                move || data_guard::run(&job_request),
                || data_guard::uncomputed(&guard_request),
            )
            .await?;

        if quality_report.block {
            info!(
                trace_id = %trace_id,
                reasons = ?quality_report.reasons,
                "Pipeline aborted by data guard"
            );
            trace.data_guard = Some(quality_report);
            return Ok(FullAnalysisResponse {
                schema_version: request.schema_version.clone(),
                trace_id,
                asset_id: request.asset_id.clone(),
                final_severity_level: SeverityLevel::Normal,
                final_severity_score: 0.0,
                confidence: 0.0,
                health_stage: HealthStage::Blocked,
                rul_days: None,
                risk_index: 0.0,
                recommended_action: "Fix data quality issues".to_string(),
                recommended_window: "N/A".to_string(),
                reliability_metrics: None,
                module_trace: trace,
                execution_time_ms: elapsed_ms(started),
            });
        }
        let quality = quality_report.quality_score;
        trace.data_guard = Some(quality_report);

        // ====================================================================
        // STAGE A: Trend Engine (no baseline)
        // ====================================================================
        let trend_request = TrendRequest {
            asset_id: request.asset_id.clone(),
            machine_type: request.machine_type.clone(),
            signal_type: request.signal.signal_type,
            direction: request.signal.direction,
            sampling_rate_hz: request.signal.sampling_rate_hz,
            values: request.signal.values.clone(),
            baseline: None,
            context: request.context.clone(),
        };
        let trend = self
            .offload(Stage::Trend, move || trend_engine::run(&trend_request), Default::default)
            .await?;

        // ====================================================================
        // STAGES B / B+ / B++: concurrent branches
        // ====================================================================
        let axes = derive_magnitudes(trend.overall_rms, request.secondary_axes.as_ref());
        let temperature = request
            .context
            .as_ref()
            .and_then(|c| c.temperature_c)
            .unwrap_or(0.0);
        let metrics: BTreeMap<String, f64> = [
            ("H", axes.h),
            ("V", axes.v),
            ("A", axes.a),
            ("kurtosis", trend.kurtosis),
            ("crest_factor", trend.crest_factor),
            ("temperature", temperature),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        let initiator_request = InitiatorRequest {
            asset_id: request.asset_id.clone(),
            component: request.component.clone(),
            metrics,
        };
        let slope_request = SlopeRequest {
            asset_id: request.asset_id.clone(),
            timestamps: request.historical_timestamps.clone().unwrap_or_default(),
            values: request.historical_values.clone().unwrap_or_default(),
            context: request.context.clone(),
            ..SlopeRequest::default()
        };
        let stability_request = StabilityRequest {
            asset_id: request.asset_id.clone(),
            spectra: Some(spectra_window(
                &request.signal.values,
                request.secondary_axes.as_ref(),
                self.spectrum_window,
            )),
            ..StabilityRequest::default()
        };

        debug!(
            trace_id = %trace_id,
            h = axes.h,
            v = axes.v,
            a = axes.a,
            v_measured = axes.v_measured,
            a_measured = axes.a_measured,
            "Branch inputs prepared"
        );

        let rules = Arc::clone(&self.rules);
        let component = request.component.clone();
        let (initiators, slope, stability) = tokio::join!(
            self.offload(
                Stage::Initiators,
                move || initiator_rules::run_with_outcome(&initiator_request, rules.as_ref()).response,
                || crate::types::InitiatorReport {
                    component,
                    ..Default::default()
                },
            ),
            self.offload(Stage::Slope, move || slope_intel::run(&slope_request), Default::default),
            self.offload(
                Stage::Stability,
                move || stability_lens::run(&stability_request),
                Default::default,
            ),
        );
        let (initiators, slope, stability) = (initiators?, slope?, stability?);

        // ====================================================================
        // STAGE C: Fusion
        // ====================================================================
        let block = BlockInput {
            match_score: initiators.confidence,
            trend_class: slope.trend_class,
            trend_confidence: slope.severity_score,
            process_correlation: 0.0,
        };
        let fusion_request = FusionRequest {
            system_type: request.system_type.clone(),
            profile_id: None,
            blocks: BTreeMap::from([(request.component.clone(), block)]),
            stability_state: Some(stability.stability_state),
        };
        let rules = Arc::clone(&self.rules);
        let system_type = request.system_type.clone();
        let fused = self
            .offload(
                Stage::Fusion,
                move || fusion::run_with_outcome(&fusion_request, rules.as_ref()).response,
                || crate::types::FusionResult {
                    system_type,
                    ..Default::default()
                },
            )
            .await?;

        // ====================================================================
        // STAGE D: Health Stage
        // ====================================================================
        let health_request = HealthRequest {
            ssi: fused.ssi,
            ssi_slope: slope.slope,
            system_state: None,
        };
        let health = self
            .offload(Stage::Health, move || health_stage::run(&health_request), Default::default)
            .await?;

        // ====================================================================
        // Effective severity and confidence
        // ====================================================================
        let severity = trend.severity_score * quality;
        let miss: f64 = [slope.severity_score, stability.si, initiators.confidence]
            .iter()
            .map(|c| 1.0 - clamp01(*c))
            .product();
        let confidence = quality * (1.0 - miss);

        // ====================================================================
        // STAGE E: Maintenance Plan
        // ====================================================================
        let maintenance_request = MaintenanceRequest {
            asset_id: request.asset_id.clone(),
            severity_score: severity,
            confidence,
            criticality: request.criticality,
            urgency: severity,
            safety_flag: health.degradation_stage == HealthStage::Critical,
            diagnosis: initiators.matched_rules.first().map(|m| m.diagnosis.clone()),
            component: Some(request.component.clone()),
            ..MaintenanceRequest::default()
        };
        let rules = Arc::clone(&self.rules);
        let plan = self
            .offload(
                Stage::Maintenance,
                move || maintenance_plan::run_with_outcome(&maintenance_request, rules.as_ref()).response,
                Default::default,
            )
            .await?;

        // ====================================================================
        // STAGE F: Reliability Projection
        // ====================================================================
        let reliability_request = ReliabilityRequest {
            asset_id: request.asset_id.clone(),
            severity_score: severity,
            confidence,
            slope_log: slope.slope,
            slope_change: slope.slope_change,
            instability_index: slope.instability_index,
            criticality: request.criticality,
            current_value: trend.overall_rms,
            failure_threshold: request.failure_threshold,
            component_type: request.component.clone(),
            operating_hours: request.operating_hours.unwrap_or(0.0),
            ssi: fused.ssi,
            baseline_value: None,
        };
        let projection = self
            .offload(
                Stage::Reliability,
                move || reliability::run(&reliability_request),
                Default::default,
            )
            .await?;

        let recommended_action = plan
            .plan_items
            .first()
            .map(|item| item.action_title.clone())
            .unwrap_or_else(|| health.recommended_action.clone());

        let response = FullAnalysisResponse {
            schema_version: request.schema_version.clone(),
            trace_id,
            asset_id: request.asset_id.clone(),
            final_severity_level: SeverityLevel::from_score(severity),
            final_severity_score: round_to(severity, 4),
            confidence: round_to(confidence, 4),
            health_stage: health.degradation_stage,
            rul_days: Some(projection.rul_days),
            risk_index: projection.risk_index,
            recommended_action,
            recommended_window: projection.recommended_window.clone(),
            reliability_metrics: projection.reliability_metrics.clone(),
            module_trace: PipelineTrace {
                data_guard: trace.data_guard,
                trend: Some(trend),
                initiators: Some(initiators),
                slope: Some(slope),
                stability: Some(stability),
                fusion: Some(fused),
                health: Some(health),
                maintenance: Some(plan),
                reliability: Some(projection),
            },
            execution_time_ms: elapsed_ms(started),
        };

        info!(
            trace_id = %response.trace_id,
            severity = response.final_severity_score,
            level = %response.final_severity_level,
            health_stage = %response.health_stage,
            rul_days = ?response.rul_days,
            elapsed_ms = response.execution_time_ms,
            "Pipeline complete"
        );

        Ok(response)
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    round_to(started.elapsed().as_secs_f64() * 1000.0, 2)
}

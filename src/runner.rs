//! Replays a parsed script against one engine and collects a report.
//!
//! A failing operation does not stop the run: it becomes a failed step and
//! the next line is applied to the unchanged engine.

use log::{info, warn};
use serde::Serialize;
use serde_json::Value;

use crate::config::MemoryConfig;
use crate::error::{ScriptError, SimError};
use crate::history::Record;
use crate::io::{PagingCommand, ScriptLine, SegmentCommand, VmCommand};
use crate::paging::{PagingEngine, PagingMetrics, PagingSnapshot};
use crate::segmentation::{Region, SegmentationEngine, SegmentationMetrics};
use crate::virtual_memory::{VirtualMemoryEngine, VmMetrics, VmSnapshot};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    pub line: usize,
    pub command: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Step {
    fn new<C, T: Serialize>(
        line: &ScriptLine<C>,
        result: Result<T, SimError>,
    ) -> Result<Self, ScriptError> {
        Ok(match result {
            Ok(outcome) => Step {
                line: line.line,
                command: line.text.clone(),
                ok: true,
                outcome: Some(serde_json::to_value(outcome)?),
                error: None,
            },
            Err(err) => {
                warn!("line {}: {}: {}", line.line, line.text, err);
                Step {
                    line: line.line,
                    command: line.text.clone(),
                    ok: false,
                    outcome: None,
                    error: Some(err.to_string()),
                }
            }
        })
    }
}

/// Final state of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report<M, S> {
    pub engine: &'static str,
    pub config: MemoryConfig,
    pub metrics: M,
    pub snapshot: S,
    pub steps: Vec<Step>,
    pub history: Vec<Record>,
}

impl<M, S> Report<M, S> {
    pub fn failed_steps(&self) -> usize {
        self.steps.iter().filter(|step| !step.ok).count()
    }
}

pub type PagingReport = Report<PagingMetrics, PagingSnapshot>;
pub type SegmentationReport = Report<SegmentationMetrics, Vec<Region>>;
pub type VmReport = Report<VmMetrics, VmSnapshot>;

/// The script line number doubles as the paging engine's logical clock.
pub fn run_paging(
    config: &MemoryConfig,
    script: &[ScriptLine<PagingCommand>],
) -> Result<PagingReport, ScriptError> {
    let mut engine = PagingEngine::from_config(config)?;
    let mut steps = Vec::with_capacity(script.len());

    for line in script {
        let tick = line.line as u64;
        let step = match &line.command {
            PagingCommand::Alloc {
                process_id,
                size,
                policy,
            } => Step::new(line, engine.allocate_process(process_id, *size, *policy, tick))?,
            PagingCommand::Access {
                process_id,
                page,
                policy,
            } => Step::new(line, engine.access_page(process_id, *page, *policy, tick))?,
            PagingCommand::Free { process_id } => {
                Step::new(line, engine.deallocate_process(process_id))?
            }
            PagingCommand::Victim { policy } => Step::new(line, engine.next_victim(policy))?,
        };
        steps.push(step);
    }

    let report = Report {
        engine: "paging",
        config: *config,
        metrics: engine.metrics(),
        snapshot: engine.snapshot(),
        steps,
        history: engine.history().records().to_vec(),
    };
    info!(
        "paging: {} steps, {} failed, {} page faults",
        report.steps.len(),
        report.failed_steps(),
        report.metrics.page_faults
    );
    Ok(report)
}

pub fn run_segmentation(
    config: &MemoryConfig,
    script: &[ScriptLine<SegmentCommand>],
) -> Result<SegmentationReport, ScriptError> {
    let mut engine = SegmentationEngine::new(config.total_memory)?;
    let mut steps = Vec::with_capacity(script.len());

    for line in script {
        let step = match &line.command {
            SegmentCommand::Alloc {
                process_id,
                name,
                size,
                strategy,
            } => Step::new(
                line,
                engine.allocate_segment(process_id, name, *size, *strategy),
            )?,
            SegmentCommand::Access {
                process_id,
                name,
                offset,
            } => Step::new(line, engine.access_segment(process_id, name, *offset))?,
            SegmentCommand::Free { process_id, name } => Step::new(
                line,
                engine.deallocate_segment(process_id, name.as_deref()),
            )?,
        };
        steps.push(step);
    }

    let report = Report {
        engine: "segmentation",
        config: *config,
        metrics: engine.metrics(),
        snapshot: engine.memory_map(),
        steps,
        history: engine.history().records().to_vec(),
    };
    info!(
        "segmentation: {} steps, {} failed, {} segmentation faults",
        report.steps.len(),
        report.failed_steps(),
        report.metrics.segmentation_faults
    );
    Ok(report)
}

pub fn run_virtual(
    config: &MemoryConfig,
    script: &[ScriptLine<VmCommand>],
) -> Result<VmReport, ScriptError> {
    let mut engine = VirtualMemoryEngine::from_config(config)?;
    let mut steps = Vec::with_capacity(script.len());

    for line in script {
        let step = match &line.command {
            VmCommand::Alloc { process_id, size } => {
                Step::new(line, engine.allocate_process(process_id, *size))?
            }
            VmCommand::Access {
                process_id,
                address,
                write,
                policy,
            } => Step::new(
                line,
                engine.access_address(process_id, *address, *write, *policy),
            )?,
            VmCommand::Free { process_id } => {
                Step::new(line, engine.deallocate_process(process_id))?
            }
            VmCommand::Victim { policy } => Step::new(line, engine.next_victim(policy))?,
        };
        steps.push(step);
    }

    let report = Report {
        engine: "virtual",
        config: *config,
        metrics: engine.metrics(),
        snapshot: engine.snapshot(),
        steps,
        history: engine.history().records().to_vec(),
    };
    info!(
        "virtual: {} steps, {} failed, {} disk reads, {} disk writes",
        report.steps.len(),
        report.failed_steps(),
        report.metrics.disk_reads,
        report.metrics.disk_writes
    );
    Ok(report)
}

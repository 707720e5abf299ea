use crate::document::{RunDocument, StepDetail};
use serde::{Deserialize, Serialize};

/// Name of the baseline column in a metric table.
pub const BASELINE_COLUMN: &str = "Baseline";
/// Name of the step identifier column in a metric table.
pub const STEP_ID_COLUMN: &str = "StepId";

/// The numeric columns of a [MetricRecord], in table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    BytesPerObject,
    BytesInUse,
    MaxBytesInUse,
    BytesFromOS,
    BytesForRollbackInUse,
    OSBytesForRollback,
    NumFullyLoadedParts,
    NumPartiallyLoadedParts,
    NumMinimallyLoadedParts,
    OperationTime,
    NumSoaCalls,
    NumPdiCalls,
    NumFccCalls,
}

impl Metric {
    pub const ALL: [Metric; 13] = [
        Metric::BytesPerObject,
        Metric::BytesInUse,
        Metric::MaxBytesInUse,
        Metric::BytesFromOS,
        Metric::BytesForRollbackInUse,
        Metric::OSBytesForRollback,
        Metric::NumFullyLoadedParts,
        Metric::NumPartiallyLoadedParts,
        Metric::NumMinimallyLoadedParts,
        Metric::OperationTime,
        Metric::NumSoaCalls,
        Metric::NumPdiCalls,
        Metric::NumFccCalls,
    ];

    /// The column name used for this metric in tables and chart legends.
    pub fn column(&self) -> &'static str {
        match self {
            Metric::BytesPerObject => "BytesPerObject",
            Metric::BytesInUse => "BytesInUse",
            Metric::MaxBytesInUse => "MaxBytesInUse",
            Metric::BytesFromOS => "BytesFromOS",
            Metric::BytesForRollbackInUse => "BytesForRollbackInUse",
            Metric::OSBytesForRollback => "OSBytesForRollback",
            Metric::NumFullyLoadedParts => "NumFullyLoadedParts",
            Metric::NumPartiallyLoadedParts => "NumPartiallyLoadedParts",
            Metric::NumMinimallyLoadedParts => "NumMinimallyLoadedParts",
            Metric::OperationTime => "OperationTime",
            Metric::NumSoaCalls => "NumSoaCalls",
            Metric::NumPdiCalls => "NumPdiCalls",
            Metric::NumFccCalls => "NumFccCalls",
        }
    }

    /// Whether the metric is measured in bytes.
    pub fn is_bytes(&self) -> bool {
        matches!(
            self,
            Metric::BytesPerObject
                | Metric::BytesInUse
                | Metric::MaxBytesInUse
                | Metric::BytesFromOS
                | Metric::BytesForRollbackInUse
                | Metric::OSBytesForRollback
        )
    }
}

/// One flattened `(run, step)` row.
///
/// All fields are always populated, values that were missing from the source document are zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetricRecord {
    pub baseline: String,
    pub step_id: String,
    pub bytes_per_object: f64,
    pub bytes_in_use: f64,
    pub max_bytes_in_use: f64,
    #[serde(rename = "BytesFromOS")]
    pub bytes_from_os: f64,
    pub bytes_for_rollback_in_use: f64,
    #[serde(rename = "OSBytesForRollback")]
    pub os_bytes_for_rollback: f64,
    pub num_fully_loaded_parts: f64,
    pub num_partially_loaded_parts: f64,
    pub num_minimally_loaded_parts: f64,
    pub operation_time: f64,
    pub num_soa_calls: f64,
    pub num_pdi_calls: f64,
    pub num_fcc_calls: f64,
}

impl MetricRecord {
    pub fn from_step(baseline: &str, step: &StepDetail) -> Self {
        let memory = &step.memory_state;
        let assembly = &step.assembly_state.structure_details;
        let network = &step.network_state.network_count;

        Self {
            baseline: baseline.to_string(),
            step_id: step.step_id.clone(),
            bytes_per_object: memory.bytes_per_object,
            bytes_in_use: memory.bytes_in_use,
            max_bytes_in_use: memory.max_bytes_in_use,
            bytes_from_os: memory.bytes_from_os,
            bytes_for_rollback_in_use: memory.bytes_for_rollback_in_use,
            os_bytes_for_rollback: memory.os_bytes_for_rollback,
            num_fully_loaded_parts: assembly.fully_loaded_parts,
            num_partially_loaded_parts: assembly.partially_loaded_parts,
            num_minimally_loaded_parts: assembly.minimally_loaded_parts,
            operation_time: step.timer_state.timer_stats.operation_time,
            num_soa_calls: network.num_soa_calls,
            num_pdi_calls: network.num_pdi_calls,
            num_fcc_calls: network.num_fcc_calls,
        }
    }

    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::BytesPerObject => self.bytes_per_object,
            Metric::BytesInUse => self.bytes_in_use,
            Metric::MaxBytesInUse => self.max_bytes_in_use,
            Metric::BytesFromOS => self.bytes_from_os,
            Metric::BytesForRollbackInUse => self.bytes_for_rollback_in_use,
            Metric::OSBytesForRollback => self.os_bytes_for_rollback,
            Metric::NumFullyLoadedParts => self.num_fully_loaded_parts,
            Metric::NumPartiallyLoadedParts => self.num_partially_loaded_parts,
            Metric::NumMinimallyLoadedParts => self.num_minimally_loaded_parts,
            Metric::OperationTime => self.operation_time,
            Metric::NumSoaCalls => self.num_soa_calls,
            Metric::NumPdiCalls => self.num_pdi_calls,
            Metric::NumFccCalls => self.num_fcc_calls,
        }
    }

    pub fn set_value(&mut self, metric: Metric, value: f64) {
        let field = match metric {
            Metric::BytesPerObject => &mut self.bytes_per_object,
            Metric::BytesInUse => &mut self.bytes_in_use,
            Metric::MaxBytesInUse => &mut self.max_bytes_in_use,
            Metric::BytesFromOS => &mut self.bytes_from_os,
            Metric::BytesForRollbackInUse => &mut self.bytes_for_rollback_in_use,
            Metric::OSBytesForRollback => &mut self.os_bytes_for_rollback,
            Metric::NumFullyLoadedParts => &mut self.num_fully_loaded_parts,
            Metric::NumPartiallyLoadedParts => &mut self.num_partially_loaded_parts,
            Metric::NumMinimallyLoadedParts => &mut self.num_minimally_loaded_parts,
            Metric::OperationTime => &mut self.operation_time,
            Metric::NumSoaCalls => &mut self.num_soa_calls,
            Metric::NumPdiCalls => &mut self.num_pdi_calls,
            Metric::NumFccCalls => &mut self.num_fcc_calls,
        };
        *field = value;
    }
}

/// Flatten a run document into one [MetricRecord] per step.
///
/// The records are produced lazily in step order. A document without steps yields nothing.
pub fn extract_records(document: RunDocument) -> impl Iterator<Item = MetricRecord> {
    let baseline = document.baseline().to_string();
    document
        .step_details
        .into_iter()
        .map(move |step| MetricRecord::from_step(&baseline, &step))
}

use serde::{Deserialize, Deserializer};

/// Baseline label used when a run document does not name its environment group.
pub const UNKNOWN_BASELINE: &str = "Unknown";

/// One experiment run, as written by the benchmark harness.
///
/// Every section is optional in the source file. Missing sections and `null` values resolve to
/// their defaults so that extraction never has to deal with absent data.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RunDocument {
    #[serde(rename = "Environment", deserialize_with = "null_as_default")]
    pub environment: EnvironmentSection,
    #[serde(rename = "StepDetails", deserialize_with = "null_as_default")]
    pub step_details: Vec<StepDetail>,
}

impl RunDocument {
    /// The baseline this run belongs to, `"Unknown"` if the document does not say.
    pub fn baseline(&self) -> &str {
        self.environment
            .environment
            .group
            .as_deref()
            .unwrap_or(UNKNOWN_BASELINE)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EnvironmentSection {
    #[serde(rename = "Environment", deserialize_with = "null_as_default")]
    pub environment: EnvironmentDetails,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EnvironmentDetails {
    #[serde(rename = "Group", deserialize_with = "optional_label")]
    pub group: Option<String>,
}

/// A single execution phase of a run and the measurements taken at the end of it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StepDetail {
    #[serde(rename = "StepId", deserialize_with = "label_or_empty")]
    pub step_id: String,
    #[serde(rename = "MemoryState", deserialize_with = "null_as_default")]
    pub memory_state: MemoryState,
    #[serde(rename = "AssemblyState", deserialize_with = "null_as_default")]
    pub assembly_state: AssemblyState,
    #[serde(rename = "TimerState", deserialize_with = "null_as_default")]
    pub timer_state: TimerState,
    #[serde(rename = "NetworkState", deserialize_with = "null_as_default")]
    pub network_state: NetworkState,
}

/// Allocator statistics, all values in bytes.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MemoryState {
    #[serde(rename = "Bytes per Object", deserialize_with = "null_as_default")]
    pub bytes_per_object: f64,
    #[serde(rename = "Bytes in use", deserialize_with = "null_as_default")]
    pub bytes_in_use: f64,
    #[serde(rename = "Max bytes in use", deserialize_with = "null_as_default")]
    pub max_bytes_in_use: f64,
    #[serde(rename = "Bytes from OS", deserialize_with = "null_as_default")]
    pub bytes_from_os: f64,
    #[serde(rename = "Bytes for Rollback in use", deserialize_with = "null_as_default")]
    pub bytes_for_rollback_in_use: f64,
    #[serde(rename = "OS Bytes for Rollback", deserialize_with = "null_as_default")]
    pub os_bytes_for_rollback: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AssemblyState {
    #[serde(
        rename = "Assembly Structure Details",
        deserialize_with = "null_as_default"
    )]
    pub structure_details: AssemblyStructureDetails,
}

/// Part loading counts for the assembly open at the end of a step.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AssemblyStructureDetails {
    #[serde(
        rename = "Number of Fully Loaded Parts",
        deserialize_with = "null_as_default"
    )]
    pub fully_loaded_parts: f64,
    #[serde(
        rename = "Number of Partially Loaded Parts",
        deserialize_with = "null_as_default"
    )]
    pub partially_loaded_parts: f64,
    #[serde(
        rename = "Number of Minimally Loaded Parts",
        deserialize_with = "null_as_default"
    )]
    pub minimally_loaded_parts: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TimerState {
    #[serde(rename = "Timer Stats", deserialize_with = "null_as_default")]
    pub timer_stats: TimerStats,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TimerStats {
    /// Seconds
    #[serde(
        rename = "Time required to perform an operation",
        deserialize_with = "null_as_default"
    )]
    pub operation_time: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct NetworkState {
    #[serde(rename = "NetworkCount", deserialize_with = "null_as_default")]
    pub network_count: NetworkCount,
}

/// Remote call counters.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct NetworkCount {
    #[serde(rename = "NumSoaCalls", deserialize_with = "null_as_default")]
    pub num_soa_calls: f64,
    #[serde(rename = "NumPdiCalls", deserialize_with = "null_as_default")]
    pub num_pdi_calls: f64,
    #[serde(rename = "NumFccCalls", deserialize_with = "null_as_default")]
    pub num_fcc_calls: f64,
}

/// Treat an explicit `null` the same way as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Identifiers are usually strings, but harnesses also write bare numbers and flags.
#[derive(Deserialize)]
#[serde(untagged)]
enum Label {
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
}

impl From<Label> for String {
    fn from(label: Label) -> Self {
        match label {
            Label::Text(text) => text,
            Label::Number(number) => number.to_string(),
            Label::Flag(flag) => flag.to_string(),
        }
    }
}

fn optional_label<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Label>::deserialize(deserializer)?.map(String::from))
}

fn label_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_label(deserializer)?.unwrap_or_default())
}

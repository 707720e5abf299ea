use bench_run_model::Metric;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

/// A named set of metric columns that share one chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricColumnGroup {
    pub name: &'static str,
    /// Used in chart titles
    pub label: &'static str,
    pub axis_label: &'static str,
    /// Axis label once byte columns have been converted to megabytes
    pub megabyte_axis_label: &'static str,
    /// Stacking and legend order
    pub columns: &'static [Metric],
}

impl MetricColumnGroup {
    /// The byte-valued columns of this group.
    pub fn byte_columns(&self) -> Vec<Metric> {
        self.columns.iter().copied().filter(Metric::is_bytes).collect()
    }
}

pub const MEMORY: MetricColumnGroup = MetricColumnGroup {
    name: "memory",
    label: "Memory Usage",
    axis_label: "Memory Usage (bytes)",
    megabyte_axis_label: "Memory Usage (MB)",
    columns: &[
        Metric::BytesPerObject,
        Metric::BytesInUse,
        Metric::MaxBytesInUse,
        Metric::BytesFromOS,
        Metric::BytesForRollbackInUse,
        Metric::OSBytesForRollback,
    ],
};

pub const ASSEMBLY: MetricColumnGroup = MetricColumnGroup {
    name: "assembly",
    label: "Assembly State",
    axis_label: "Number of Parts",
    megabyte_axis_label: "Number of Parts",
    columns: &[
        Metric::NumFullyLoadedParts,
        Metric::NumPartiallyLoadedParts,
        Metric::NumMinimallyLoadedParts,
    ],
};

pub const TIMER: MetricColumnGroup = MetricColumnGroup {
    name: "timer",
    label: "Timer State",
    axis_label: "Time (seconds)",
    megabyte_axis_label: "Time (seconds)",
    columns: &[Metric::OperationTime],
};

pub const NETWORK: MetricColumnGroup = MetricColumnGroup {
    name: "network",
    label: "Network State",
    axis_label: "Number of Calls",
    megabyte_axis_label: "Number of Calls",
    columns: &[Metric::NumSoaCalls, Metric::NumPdiCalls, Metric::NumFccCalls],
};

/// Every group, in page order.
pub const ALL_GROUPS: [MetricColumnGroup; 4] = [MEMORY, ASSEMBLY, TIMER, NETWORK];

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Unknown plot type: {0}")]
pub struct UnknownPlotType(pub String);

/// The summary charts that can be requested by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlotType {
    MemoryUsage,
    AssemblyState,
    TimerState,
    NetworkState,
}

impl PlotType {
    pub const ALL: [PlotType; 4] = [
        PlotType::MemoryUsage,
        PlotType::AssemblyState,
        PlotType::TimerState,
        PlotType::NetworkState,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlotType::MemoryUsage => "memory_usage",
            PlotType::AssemblyState => "assembly_state",
            PlotType::TimerState => "timer_state",
            PlotType::NetworkState => "network_state",
        }
    }

    pub fn group(&self) -> MetricColumnGroup {
        match self {
            PlotType::MemoryUsage => MEMORY,
            PlotType::AssemblyState => ASSEMBLY,
            PlotType::TimerState => TIMER,
            PlotType::NetworkState => NETWORK,
        }
    }
}

impl FromStr for PlotType {
    type Err = UnknownPlotType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PlotType::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownPlotType(s.to_string()))
    }
}

impl Display for PlotType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

use core::fmt;
use serde::{Deserialize, Serialize};

/// Value standing in for a result that could not be read. Dominates any real solution value.
pub const SENTINEL_VALUE: i64 = 9_999_999;

/// Shop topology of a generated instance.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(rename_all = "snake_case")]
pub enum ShopType {
    /// Flow shop where every machine processes the jobs in the same order.
    PermutationFlowShop,
    /// Every job visits the machines in the same order.
    FlowShop,
    /// Flow shop with parallel machines per stage.
    FlexibleFlowShop,
    /// Every job has its own machine order.
    JobShop,
    /// Job shop with parallel machines per stage.
    FlexibleJobShop,
    /// Operations of a job may run in any order.
    OpenShop,
    /// Open shop with parallel machines per stage.
    FlexibleOpenShop,
}

impl ShopType {
    /// Every shop type, in enumeration order.
    pub const ALL: [ShopType; 7] = [
        ShopType::PermutationFlowShop,
        ShopType::FlowShop,
        ShopType::FlexibleFlowShop,
        ShopType::JobShop,
        ShopType::FlexibleJobShop,
        ShopType::OpenShop,
        ShopType::FlexibleOpenShop,
    ];

    /// Snake case name, used for instance directories.
    pub fn name(&self) -> &'static str {
        match self {
            ShopType::PermutationFlowShop => "permutation_flow_shop",
            ShopType::FlowShop => "flow_shop",
            ShopType::FlexibleFlowShop => "flexible_flow_shop",
            ShopType::JobShop => "job_shop",
            ShopType::FlexibleJobShop => "flexible_job_shop",
            ShopType::OpenShop => "open_shop",
            ShopType::FlexibleOpenShop => "flexible_open_shop",
        }
    }

    /// Abbreviation used in file names.
    pub fn short_name(&self) -> &'static str {
        match self {
            ShopType::PermutationFlowShop => "pfss",
            ShopType::FlowShop => "fss",
            ShopType::FlexibleFlowShop => "ffss",
            ShopType::JobShop => "jss",
            ShopType::FlexibleJobShop => "fjss",
            ShopType::OpenShop => "oss",
            ShopType::FlexibleOpenShop => "foss",
        }
    }

    /// Only flexible shops may have more than one machine per group.
    pub fn is_flexible(&self) -> bool {
        matches!(
            self,
            ShopType::FlexibleFlowShop
                | ShopType::FlexibleJobShop
                | ShopType::FlexibleOpenShop
        )
    }

    /// Open shops leave the operation order to the solver.
    pub fn is_open_shop(&self) -> bool {
        matches!(self, ShopType::OpenShop | ShopType::FlexibleOpenShop)
    }
}

impl fmt::Display for ShopType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Scheduling objective of a generated instance.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    /// Completion time of the last job.
    Makespan,
    /// Sum of completion times.
    TotalFlowTime,
    /// Weighted sum of completion times.
    TotalWeightedFlowTime,
    /// Sum of tardiness over all jobs.
    TotalTardiness,
    /// Weighted sum of tardiness.
    TotalWeightedTardiness,
    /// Weight of the jobs finished by their due date.
    Throughput,
}

impl Objective {
    /// Every objective, in enumeration order.
    pub const ALL: [Objective; 6] = [
        Objective::Makespan,
        Objective::TotalFlowTime,
        Objective::TotalWeightedFlowTime,
        Objective::TotalTardiness,
        Objective::TotalWeightedTardiness,
        Objective::Throughput,
    ];

    /// Snake case name, used for instance directories.
    pub fn name(&self) -> &'static str {
        match self {
            Objective::Makespan => "makespan",
            Objective::TotalFlowTime => "total_flow_time",
            Objective::TotalWeightedFlowTime => "total_weighted_flow_time",
            Objective::TotalTardiness => "total_tardiness",
            Objective::TotalWeightedTardiness => "total_weighted_tardiness",
            Objective::Throughput => "throughput",
        }
    }

    /// Abbreviation used in file names.
    pub fn short_name(&self) -> &'static str {
        match self {
            Objective::Makespan => "makespan",
            Objective::TotalFlowTime => "tft",
            Objective::TotalWeightedFlowTime => "twft",
            Objective::TotalTardiness => "tt",
            Objective::TotalWeightedTardiness => "twt",
            Objective::Throughput => "throughput",
        }
    }

    /// Objectives whose generated jobs carry non-unit weights.
    pub fn is_weighted(&self) -> bool {
        matches!(
            self,
            Objective::TotalWeightedFlowTime
                | Objective::TotalWeightedTardiness
                | Objective::Throughput
        )
    }

    /// Name understood by the generator: weights are implied by the weight range.
    pub fn generator_name(&self) -> String {
        self.name().replace("_weighted", "").replace('_', "-")
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Additional structural constraint, mutually exclusive.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    /// No additional constraint.
    None,
    /// Operations of a job follow each other without waiting.
    NoWait,
    /// Machines run without idle time once started.
    NoIdle,
    /// A finished job blocks its machine until the next one is free.
    Blocking,
}

impl Property {
    /// Every property, in enumeration order.
    pub const ALL: [Property; 4] = [
        Property::None,
        Property::NoWait,
        Property::NoIdle,
        Property::Blocking,
    ];

    /// Snake case name, `None` for [`Property::None`].
    pub fn name(&self) -> Option<&'static str> {
        match self {
            Property::None => None,
            Property::NoWait => Some("no_wait"),
            Property::NoIdle => Some("no_idle"),
            Property::Blocking => Some("blocking"),
        }
    }

    /// `_<name>` for a real property, empty otherwise.
    pub fn suffix(&self) -> String {
        self.name().map(|n| format!("_{n}")).unwrap_or_default()
    }

    /// Generator flag switching the property on.
    pub fn generator_flag(&self) -> Option<&'static str> {
        match self {
            Property::None => None,
            Property::NoWait => Some("--no-wait"),
            Property::NoIdle => Some("--no-idle"),
            Property::Blocking => Some("--blocking"),
        }
    }
}

/// Manifest group of an instance.
pub type GroupKey = (ShopType, Objective, Property);

/// One point of the generation space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShopConfiguration {
    /// Shop topology.
    pub shop_type: ShopType,
    /// Objective the instance is generated for.
    pub objective: Objective,
    /// Structural constraint, if any.
    pub property: Property,
    /// Number of jobs.
    pub number_of_jobs: u32,
    /// Also the number of operations per job.
    pub number_of_machine_groups: u32,
    /// Greater than one only for flexible shops.
    pub number_of_machines_per_group: u32,
    /// Seed passed through to the generator.
    pub seed: u64,
}

impl ShopConfiguration {
    /// The manifest this configuration is listed in.
    pub fn group_key(&self) -> GroupKey {
        (self.shop_type, self.objective, self.property)
    }
}

/// Field of the solver's json output holding the objective value.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultField {
    /// `Makespan`
    Makespan,
    /// `TotalFlowTime`, also for the weighted variant.
    TotalFlowTime,
    /// `TotalTardiness`, also for the weighted variant.
    TotalTardiness,
    /// `Throughput`
    Throughput,
}

impl ResultField {
    /// Maps an objective as written in a benchmark table.
    pub fn from_objective(objective: &str) -> Option<ResultField> {
        match objective.trim().to_lowercase().replace('_', "-").as_str() {
            "makespan" => Some(ResultField::Makespan),
            "total-flow-time"
            | "total-weighted-flow-time"
            | "total-completion-time"
            | "tft"
            | "twft"
            | "tct" => Some(ResultField::TotalFlowTime),
            "total-tardiness" | "total-weighted-tardiness" | "tt" | "twt" => {
                Some(ResultField::TotalTardiness)
            }
            "throughput" => Some(ResultField::Throughput),
            _ => None,
        }
    }

    /// Json pointer to the value in a result file.
    pub fn pointer(&self) -> &'static str {
        match self {
            ResultField::Makespan => "/Output/Solution/Makespan",
            ResultField::TotalFlowTime => "/Output/Solution/TotalFlowTime",
            ResultField::TotalTardiness => "/Output/Solution/TotalTardiness",
            ResultField::Throughput => "/Output/Solution/Throughput",
        }
    }
}

/// Outcome of reading one result for one benchmark row.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutput {
    /// The objective value the solver reported.
    Solution(i64),
    /// No readable result.
    Missing,
}

impl RunOutput {
    /// The numeric value, [`SENTINEL_VALUE`] when missing.
    pub fn value(&self) -> i64 {
        match self {
            RunOutput::Solution(value) => *value,
            RunOutput::Missing => SENTINEL_VALUE,
        }
    }

    /// True when no result could be read.
    pub fn is_missing(&self) -> bool {
        matches!(self, RunOutput::Missing)
    }
}

impl From<Option<i64>> for RunOutput {
    fn from(value: Option<i64>) -> Self {
        value.map_or(RunOutput::Missing, RunOutput::Solution)
    }
}

/// One declared test case of a benchmark table.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkRow {
    /// Instance path, relative to the benchmark's instance directory.
    pub path: String,
    /// Subset of the table the row belongs to.
    pub dataset: Option<String>,
    /// Objective as written in the table.
    pub objective: String,
    /// Where the solver reports the value for `objective`.
    pub result_field: ResultField,
    /// Seconds the solver gets for this instance.
    pub time_limit: f64,
    /// Instance file format passed to the solver.
    pub format: String,
    /// Reference all gaps are computed against.
    pub best_known_value: i64,
    /// Needed for size buckets.
    pub number_of_jobs: Option<i64>,
    /// Needed for size buckets.
    pub number_of_machines: Option<i64>,
    /// Results published alongside the table, keyed by column header.
    pub reference_results: Vec<(String, RunOutput)>,
    /// Every cell of the table row in header order, as written.
    pub fields: Vec<(String, Option<String>)>,
}

impl BenchmarkRow {
    /// A row without dataset, sizes or reference results. `None` for an unknown objective.
    pub fn new(
        path: &str,
        objective: &str,
        time_limit: f64,
        format: &str,
        best_known_value: i64,
    ) -> Option<Self> {
        Some(Self {
            path: path.to_string(),
            dataset: None,
            objective: objective.to_string(),
            result_field: ResultField::from_objective(objective)?,
            time_limit,
            format: format.to_string(),
            best_known_value,
            number_of_jobs: None,
            number_of_machines: None,
            reference_results: vec![],
            fields: vec![],
        })
    }

    /// The published result of `column`, missing if the row has none.
    pub fn reference_result(&self, column: &str) -> RunOutput {
        self.reference_results
            .iter()
            .find(|(name, _)| name == column)
            .map_or(RunOutput::Missing, |(_, output)| *output)
    }

    /// The cell of `column` as written in the table.
    pub fn field(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .and_then(|(_, cell)| cell.as_deref())
    }
}

/// Job count x machine count grid used for sub-totals.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SizeBins {
    /// Job counts, outer order of the bins.
    pub jobs: Vec<i64>,
    /// Machine counts, inner order of the bins.
    pub machines: Vec<i64>,
}

impl SizeBins {
    /// Number of bins.
    pub fn len(&self) -> usize {
        self.jobs.len() * self.machines.len()
    }

    /// True when there are no bins.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Position of the bin holding an instance of this size.
    pub fn index(&self, jobs: i64, machines: i64) -> Option<usize> {
        let j = self.jobs.iter().position(|&n| n == jobs)?;
        let m = self.machines.iter().position(|&n| n == machines)?;
        Some(j * self.machines.len() + m)
    }

    /// Labels in index order, `<jobs>_<machines>`.
    pub fn labels(&self) -> Vec<String> {
        self.jobs
            .iter()
            .flat_map(|n| self.machines.iter().map(move |m| format!("{n}_{m}")))
            .collect()
    }
}

impl fmt::Display for BenchmarkRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {}s, bksv {})",
            self.path, self.objective, self.time_limit, self.best_known_value
        )
    }
}

use std::path::{Path, PathBuf};

use itertools::iproduct;
use serde::{Deserialize, Serialize};

use crate::datastructures::*;
use crate::invoker::CommandLine;

/// The tables spanning the generated test suite.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ConfigurationSpace {
    /// Outermost table of the enumeration.
    pub shop_types: Vec<ShopType>,
    /// Objectives to generate for every shop type.
    pub objectives: Vec<Objective>,
    /// Properties to generate for every objective.
    pub properties: Vec<Property>,
    /// Job counts.
    pub numbers_of_jobs: Vec<u32>,
    /// Machine group counts, equal to the operations per job.
    pub numbers_of_machine_groups: Vec<u32>,
    /// Values above one are skipped for non-flexible shops.
    pub numbers_of_machines_per_group: Vec<u32>,
    /// Innermost table of the enumeration.
    pub seeds: Vec<u64>,
    /// Upper bound of the generated processing times.
    pub processing_times_range: u64,
    /// Used for weighted objectives and throughput, other objectives get unit weights.
    pub weights_range: u64,
    /// Scales how close due dates are to the release of a job.
    pub due_date_tightness_factor: f64,
}

impl Default for ConfigurationSpace {
    fn default() -> Self {
        Self {
            shop_types: ShopType::ALL.to_vec(),
            objectives: Objective::ALL.to_vec(),
            properties: Property::ALL.to_vec(),
            numbers_of_jobs: (1..=8).collect(),
            numbers_of_machine_groups: (1..=3).collect(),
            numbers_of_machines_per_group: vec![1, 2],
            seeds: vec![0, 1],
            processing_times_range: 100,
            weights_range: 100,
            due_date_tightness_factor: 3.0,
        }
    }
}

impl ConfigurationSpace {
    /// All valid configurations, lazily and in a stable order. Can be called again to restart.
    pub fn iter(&self) -> impl Iterator<Item = ShopConfiguration> + '_ {
        iproduct!(
            self.shop_types.iter(),
            self.objectives.iter(),
            self.properties.iter(),
            self.numbers_of_jobs.iter(),
            self.numbers_of_machine_groups.iter(),
            self.numbers_of_machines_per_group.iter(),
            self.seeds.iter()
        )
        .map(
            |(
                &shop_type,
                &objective,
                &property,
                &number_of_jobs,
                &number_of_machine_groups,
                &number_of_machines_per_group,
                &seed,
            )| ShopConfiguration {
                shop_type,
                objective,
                property,
                number_of_jobs,
                number_of_machine_groups,
                number_of_machines_per_group,
                seed,
            },
        )
        .filter(|config| {
            config.number_of_machines_per_group == 1
                || config.shop_type.is_flexible()
        })
    }

    /// Every manifest group of the space, in enumeration order.
    pub fn groups(&self) -> impl Iterator<Item = GroupKey> + '_ {
        iproduct!(
            self.shop_types.iter().copied(),
            self.objectives.iter().copied(),
            self.properties.iter().copied()
        )
    }

    /// Weight range passed to the generator, 1 for unweighted objectives.
    pub fn weights_range_for(&self, objective: Objective) -> u64 {
        if objective.is_weighted() {
            self.weights_range
        } else {
            1
        }
    }

    /// Generator invocation writing `config` to `output`.
    pub fn generator_command(
        &self,
        generator: &Path,
        config: &ShopConfiguration,
        output: &Path,
    ) -> CommandLine {
        let mut command = CommandLine::new(generator);
        if config.shop_type.is_open_shop() {
            command = command.option("operations-arbitrary-order", 1);
        }
        command = command.option("objective", config.objective.generator_name());
        if config.shop_type == ShopType::PermutationFlowShop {
            command = command.option("permutation", 1);
        }
        if let Some(flag) = config.property.generator_flag() {
            command = command.arg(flag).arg(1);
        }
        command
            .option("number-of-jobs", config.number_of_jobs)
            .option("number-of-machine-groups", config.number_of_machine_groups)
            .option(
                "number-of-machines-per-group",
                config.number_of_machines_per_group,
            )
            .option("number-of-operations-per-job", config.number_of_machine_groups)
            .option("processing-times-range", self.processing_times_range)
            .option("weights-range", self.weights_range_for(config.objective))
            .option("due-date-tightness-factor", self.due_date_tightness_factor)
            .option("seed", config.seed)
            .option("output", output.display())
    }
}

impl ShopConfiguration {
    /// `<shop>_<objective>[_<property>]_n<jobs>_m<groups>x<machines>_s<seed>`
    pub fn short_name(&self) -> String {
        format!(
            "{}_{}{}_n{}_m{}x{}_s{}",
            self.shop_type.short_name(),
            self.objective.short_name(),
            self.property.suffix(),
            self.number_of_jobs,
            self.number_of_machine_groups,
            self.number_of_machines_per_group,
            self.seed
        )
    }

    /// Instance path relative to the data directory.
    pub fn instance_path(&self) -> PathBuf {
        PathBuf::from("tests")
            .join(self.shop_type.name())
            .join(format!("{}{}", self.objective.name(), self.property.suffix()))
            .join(format!("{}.json", self.short_name()))
    }
}

/// Manifest file of a group, relative to the data directory.
pub fn manifest_path(group: &GroupKey) -> PathBuf {
    let (shop_type, objective, property) = group;
    PathBuf::from(format!(
        "test_{}_{}{}.txt",
        shop_type.short_name(),
        objective.short_name(),
        property.suffix()
    ))
}

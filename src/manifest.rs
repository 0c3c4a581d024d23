use std::{
    collections::HashMap,
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use log::{debug, info};

use crate::datastructures::*;
use crate::enumerator::{manifest_path, ConfigurationSpace};
use crate::invoker::Invoker;

/// Owns one open manifest per group for the whole generation run.
///
/// Streams are flushed by [`ManifestWriter::finish`]; on an early return they are
/// closed when the writer is dropped.
pub struct ManifestWriter {
    streams: HashMap<GroupKey, BufWriter<File>>,
}

impl ManifestWriter {
    pub fn create(
        data_dir: &Path,
        groups: impl IntoIterator<Item = GroupKey>,
    ) -> Result<Self> {
        let mut streams = HashMap::new();
        for group in groups {
            if streams.contains_key(&group) {
                continue;
            }
            let path = data_dir.join(manifest_path(&group));
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let file = File::create(&path)
                .with_context(|| format!("cannot create manifest {path:?}"))?;
            streams.insert(group, BufWriter::new(file));
        }
        Ok(Self { streams })
    }

    pub fn append(&mut self, config: &ShopConfiguration) -> Result<()> {
        let stream = self
            .streams
            .get_mut(&config.group_key())
            .context("no manifest opened for this configuration")?;
        writeln!(stream, "{}", config.instance_path().display())?;
        Ok(())
    }

    pub fn finish(self) -> Result<()> {
        for (_, mut stream) in self.streams {
            stream.flush()?;
        }
        Ok(())
    }
}

/// Generates every instance of `space` below `data_dir` and records it in its manifest.
///
/// Stops at the first failing generator call.
pub fn generate_suite<I: Invoker>(
    space: &ConfigurationSpace,
    generator: &Path,
    data_dir: &Path,
    invoker: &mut I,
) -> Result<usize> {
    let mut manifests = ManifestWriter::create(data_dir, space.groups())?;
    let mut count = 0;
    for config in space.iter() {
        let instance_path: PathBuf = data_dir.join(config.instance_path());
        if let Some(parent) = instance_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let command = space.generator_command(generator, &config, &instance_path);
        invoker.invoke(&command)?;
        debug!("generated {}", config.short_name());
        manifests.append(&config)?;
        count += 1;
    }
    manifests.finish()?;
    info!("Generated {count} instances in {data_dir:?}");
    Ok(count)
}

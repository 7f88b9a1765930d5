use anyhow::{Context, Result, ensure};

use itertools::Itertools;
use std::path::Path;

use crate::args::Args;
use crate::config::Settings;
use crate::core::{DemographicModel, LeafDeme};
use crate::readwrite::{DemeTable, DemesGraph, SplitScheduleWriter};

pub struct Runner {
    args: Args,
    settings: Settings,
    leaves: Vec<LeafDeme>,
    base_time: f64,
}

impl Runner {
    pub fn new(args: Args) -> Result<Runner> {
        Self::setup_logger(&args)?;
        Self::prepare(args)
    }

    fn prepare(args: Args) -> Result<Runner> {
        let settings = Self::load_settings(&args.settings)?;
        let leaves = Self::load_leaves(&args, &settings)?;
        let base_time = args.base_time.unwrap_or(settings.base_time);

        Ok(Self {
            args,
            settings,
            leaves,
            base_time,
        })
    }

    pub fn start(&self) -> Result<DemographicModel> {
        let model = self.run()?;
        self.finish(&model)?;
        Ok(model)
    }

    fn run(&self) -> Result<DemographicModel> {
        println!(
            "Planning merge of {} demes into one ancestor at time {}...",
            self.leaves.len(),
            self.base_time
        );
        let model = self.settings.planner().plan(&self.leaves, self.base_time)?;
        self.check_root_size(&model)?;

        for level in 0..model.levels() {
            let sizes = model
                .level_events(level)
                .map(|event| event.derived().len())
                .counts();
            log::info!(
                r###"
        level={level}
        group_sizes={:?}"###,
                sizes.into_iter().sorted().collect_vec()
            );
        }

        Ok(model)
    }

    /// The root of a grid has to carry the whole effective size of the grid
    fn check_root_size(&self, model: &DemographicModel) -> Result<()> {
        if self.args.demes.is_some() {
            return Ok(());
        }
        if let Some(total_size) = self.settings.leaves.total_size() {
            let root_size = model.root_deme().initial_size();
            ensure!(
                root_size == total_size,
                "Root size {root_size} differs from total effective size {total_size}"
            );
            log::debug!("Root size matches total effective size {total_size}");
        }
        Ok(())
    }

    fn finish(&self, model: &DemographicModel) -> Result<()> {
        log::info!("Storing demographic model...");
        let graph = DemesGraph::from_model(model, &self.description())?;
        graph
            .write_to_file(self.args.output.as_str())
            .with_context(|| format!("Unable to write model to {}", self.args.output))?;
        log::info!("Finished storing demographic model.");

        if let Some(schedule_file) = &self.args.schedule {
            log::info!("Storing split schedule...");
            let mut writer = SplitScheduleWriter::create(Path::new(schedule_file))?;
            model.apply(&mut writer)?;
            writer.finish()?;
            log::info!("Finished storing split schedule.");
        }

        println!(
            "Planned {} merge events over {} levels.",
            model.events().len(),
            model.levels()
        );
        Ok(())
    }

    fn description(&self) -> String {
        format!(
            "Merge of {} demes coalescing at time {} with at most {} demes per merge",
            self.leaves.len(),
            self.base_time,
            self.settings.fan_in_limit
        )
    }

    /// Setup logging level and file
    fn setup_logger(args: &Args) -> Result<()> {
        let log_level = match args.verbose {
            0 => log::LevelFilter::Info,
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };
        simple_logging::log_to_file(args.log_file.as_str(), log_level)
            .with_context(|| format!("Unable to open log file {}", args.log_file))
    }

    /// Load settings from file
    fn load_settings(path: &str) -> Result<Settings> {
        let settings: Settings = Settings::read_from_file(path)
            .with_context(|| format!("Unable to load settings from {path}"))?;
        log::info!("Loaded settings\n{}", settings);
        Ok(settings)
    }

    /// Load leaf demes, a deme table given on the command line takes precedence
    fn load_leaves(args: &Args, settings: &Settings) -> Result<Vec<LeafDeme>> {
        let leaves = match &args.demes {
            Some(path) => DemeTable::read(Path::new(path))
                .with_context(|| format!("Unable to load demes from {path}"))?
                .into_leaves(),
            None => settings
                .leaves
                .load(Path::new(&args.settings).parent())
                .context("Unable to load demes")?,
        };
        log::info!("Loaded {} demes", leaves.len());
        Ok(leaves)
    }
}

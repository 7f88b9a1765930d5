use clap::Parser;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None, name = "demerge")]
pub struct Args {
    /// Path to planner settings (yaml file)
    #[clap(long)]
    pub settings: String,

    /// Time at which the forward simulation roots coalesce. Overrides the settings.
    #[clap(long)]
    pub base_time: Option<f64>,

    /// Path to a deme table (csv file). Overrides the leaves in the settings.
    #[clap(long)]
    pub demes: Option<String>,

    /// Path to output demographic model (demes yaml file)
    #[clap(long, short)]
    pub output: String,

    /// Path to output split schedule (csv file)
    #[clap(long)]
    pub schedule: Option<String>,

    /// Path to log file.
    #[clap(long, default_value = "demerge.log")]
    pub log_file: String,

    /// Increase logging verbosity.
    #[clap(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

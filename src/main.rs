use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use member_census::{
    eligible_file, merge_files, normalize_file, report, statistics_file, CensusConfig, Gender,
    GenderScheme,
};
use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "census")]
#[command(about = "Clean, validate, merge and report on member-registry files")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    options: Options,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct Options {
    /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Reporting year (defaults to the current year)
    #[arg(long, global = true, env = "CENSUS_REPORTING_YEAR")]
    year: Option<i32>,

    /// Gender vocabulary preset
    #[arg(long, global = true, value_enum)]
    gender_scheme: Option<SchemeArg>,

    /// Where "vill ej uppge" answers are counted
    #[arg(long, global = true, value_enum)]
    declined_as: Option<GenderArg>,

    /// Directory for merge output files
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Print outcomes as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Split each file into <file>.ok and <file>.invalid
    Normalize {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Count grant-eligible members per file
    Eligible {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print region, gender and age distribution per file
    Stats {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Merge all files into unique, duplicate and possible-duplicate sets
    Merge {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SchemeArg {
    Standard,
    Legacy,
}

impl From<SchemeArg> for GenderScheme {
    fn from(arg: SchemeArg) -> Self {
        match arg {
            SchemeArg::Standard => GenderScheme::Standard,
            SchemeArg::Legacy => GenderScheme::Legacy,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum GenderArg {
    Female,
    Male,
    Other,
    Unknown,
}

impl From<GenderArg> for Gender {
    fn from(arg: GenderArg) -> Self {
        match arg {
            GenderArg::Female => Gender::Female,
            GenderArg::Male => Gender::Male,
            GenderArg::Other => Gender::Other,
            GenderArg::Unknown => Gender::Unknown,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.options.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = resolve_config(&cli.options)?;
    log::debug!("Reporting year {}", config.reporting_year);

    let json = cli.options.json;
    let mut out = io::stdout().lock();

    match &cli.command {
        Command::Normalize { files } => process_all(
            files,
            json,
            &mut out,
            |path| normalize_file(path, &config),
            |outcome| format!("{}\n", report::normalize_summary(outcome)),
        ),
        Command::Eligible { files } => process_all(
            files,
            json,
            &mut out,
            |path| eligible_file(path, &config),
            |count| format!("{}\n", report::eligible_line(count)),
        ),
        Command::Stats { files } => process_all(
            files,
            json,
            &mut out,
            |path| statistics_file(path, &config),
            |stats| format!("{}\n", report::demographic_summary(stats)),
        ),
        Command::Merge { files } => {
            let outcome = merge_files(files, &config)?;
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&outcome)?)?;
            } else {
                write!(out, "{}", report::merge_summary(&outcome))?;
            }
            Ok(())
        }
    }
}

/// Config file first, then flags on top
fn resolve_config(options: &Options) -> Result<CensusConfig> {
    let mut config = match &options.config {
        Some(path) => CensusConfig::from_file(path)?,
        None => CensusConfig::default(),
    };

    if let Some(year) = options.year {
        config.reporting_year = year;
    }
    if let Some(scheme) = options.gender_scheme {
        config.gender.scheme = scheme.into();
    }
    if let Some(gender) = options.declined_as {
        config.gender.declined_as = Some(gender.into());
    }
    if let Some(dir) = &options.output_dir {
        config.output_dir = dir.clone();
    }

    Ok(config)
}

/// Run one operation per file. Progress goes to the log; stdout carries
/// either the text reports or a single JSON array of outcomes.
fn process_all<T, W, F, R>(
    files: &[PathBuf],
    json: bool,
    out: &mut W,
    mut process: F,
    render: R,
) -> Result<()>
where
    T: Serialize,
    W: Write,
    F: FnMut(&Path) -> Result<T>,
    R: Fn(&T) -> String,
{
    let mut outcomes = Vec::with_capacity(files.len());

    for path in files {
        let name = path.file_name().unwrap_or(path.as_os_str());
        log::info!("Processing {:?}...", name);

        let outcome = process(path.as_path())?;
        if !json {
            write!(out, "{}", render(&outcome))?;
        }
        outcomes.push(outcome);
    }

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&outcomes)?)?;
    }
    Ok(())
}

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use covmap::config::{MapFormat, ReportConfig};
use covmap::ingest::{self, ShapeKey};
use covmap::report::{self, ReportInputs};
use covmap::storage::{self, RegionSummary};
use covmap::{ColorScale, legend, stats};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "covmap",
    version,
    about = "Derive daily case/death statistics and render choropleth maps"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read count feeds and boundaries, write maps, legend and summaries.
    Report(ReportArgs),
    /// Write the gradient legend bitmap.
    Legend(LegendArgs),
    /// Print states ranked by cases this week.
    Stats(StatsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OutFormat {
    Svg,
    Png,
}

#[derive(Args, Debug)]
struct ReportArgs {
    /// National series CSV (date,cases,deaths)
    #[arg(long)]
    national: PathBuf,
    /// State series CSV (date,state,fips,cases,deaths)
    #[arg(long)]
    states: PathBuf,
    /// County series CSV (date,county,state,fips,cases,deaths)
    #[arg(long)]
    counties: PathBuf,
    /// ZIP series CSV (date,fips,zip,cases)
    #[arg(long)]
    zips: Option<PathBuf>,
    /// State boundaries GeoJSON, keyed by the NAME property
    #[arg(long)]
    state_shapes: PathBuf,
    /// County boundaries GeoJSON, keyed by STATE + COUNTY
    #[arg(long)]
    county_shapes: PathBuf,
    /// ZIP boundaries GeoJSON, keyed by the ZIP property
    #[arg(long)]
    zip_shapes: Option<PathBuf>,
    /// Property of a ZIP boundary naming its county (county code or county name)
    #[arg(long, default_value = "COUNTYNAME")]
    zip_county_property: String,
    /// Latest county totals CSV (date,fips,cases,deaths) folded into --latest-state
    #[arg(long, requires = "latest_state")]
    latest_totals: Option<PathBuf>,
    /// State receiving --latest-totals (e.g. Florida)
    #[arg(long)]
    latest_state: Option<String>,
    /// JSON file overriding report settings
    #[arg(long)]
    config: Option<PathBuf>,
    /// Map output format (overrides the config file).
    #[arg(long, value_enum)]
    format: Option<OutFormat>,
    /// Output directory.
    #[arg(short, long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct LegendArgs {
    /// Output PNG path.
    #[arg(short, long)]
    out: PathBuf,
    #[arg(long, default_value_t = legend::LEGEND_WIDTH)]
    width: u32,
    #[arg(long, default_value_t = legend::LEGEND_HEIGHT)]
    height: u32,
}

#[derive(Args, Debug)]
struct StatsArgs {
    /// State series CSV (date,state,fips,cases,deaths)
    #[arg(long)]
    states: PathBuf,
    /// Show only the first N states.
    #[arg(long)]
    top: Option<usize>,
    /// Print summaries as JSON instead of text.
    #[arg(long, default_value_t = false)]
    json: bool,
    /// Also save the summaries as a JSON file.
    #[arg(long)]
    save: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Report(args) => cmd_report(args),
        Command::Legend(args) => cmd_legend(args),
        Command::Stats(args) => cmd_stats(args),
    }
}

fn cmd_report(args: ReportArgs) -> Result<()> {
    let mut config = match args.config.as_ref() {
        Some(path) => ReportConfig::load(path)?,
        None => ReportConfig::default(),
    };
    if let Some(fmt) = args.format {
        config.map_format = match fmt {
            OutFormat::Svg => MapFormat::Svg,
            OutFormat::Png => MapFormat::Png,
        };
    }

    let mut inputs = ReportInputs {
        national: ingest::read_national(&args.national)?,
        states: ingest::read_states(&args.states)?,
        counties: ingest::read_counties(&args.counties)?,
        state_shapes: ingest::read_shapes(&args.state_shapes, &ShapeKey::Property("NAME".into()))?,
        county_shapes: ingest::read_shapes(&args.county_shapes, &ShapeKey::StateCounty)?,
        ..ReportInputs::default()
    };
    if let Some(path) = args.zips.as_ref() {
        inputs.zips = ingest::read_zip_cases(path)?;
    }
    if let Some(path) = args.zip_shapes.as_ref() {
        inputs.zip_shapes = ingest::read_zip_shapes(
            path,
            &ShapeKey::Property("ZIP".into()),
            &args.zip_county_property,
        )?;
    }
    if let (Some(path), Some(state)) = (args.latest_totals.as_ref(), args.latest_state.as_ref()) {
        let latest = ingest::read_latest_totals(path)?;
        report::apply_latest_totals(&mut inputs.states, &mut inputs.counties, state, &latest);
    }

    let outcome = report::build_report(&inputs, &config, &args.out)?;
    for map in &outcome.maps {
        eprintln!("{}: {} regions, 0 … {}", map.file, map.regions, map.max_value);
    }
    eprintln!("Wrote {} files to {}", outcome.files.len(), args.out.display());
    Ok(())
}

fn cmd_legend(args: LegendArgs) -> Result<()> {
    legend::save_legend_png(&args.out, &ColorScale::default(), args.width, args.height)?;
    eprintln!("Wrote legend to {}", args.out.display());
    Ok(())
}

fn cmd_stats(args: StatsArgs) -> Result<()> {
    let table = ingest::read_states(&args.states)?;
    let ranking = stats::rank_regions(table.data.iter());
    let take = args.top.unwrap_or(ranking.len());
    let rows: Vec<RegionSummary> = ranking
        .iter()
        .take(take)
        .filter_map(|name| {
            let data = table.data.get(name)?;
            let key = table.fips.get(name).cloned().unwrap_or_default();
            Some(RegionSummary::new(key, name.as_str(), data))
        })
        .collect();

    if let Some(path) = args.save.as_ref() {
        storage::save_summaries_json(&rows, path)?;
        eprintln!("Saved {} summaries to {}", rows.len(), path.display());
    }
    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }
    for r in rows {
        println!("{} • {}", r.name, r.case_description);
        println!("{}   {}", " ".repeat(r.name.chars().count()), r.death_description);
    }
    Ok(())
}

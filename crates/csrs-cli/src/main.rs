mod commands;
mod config;
mod error;
mod output;
mod telemetry;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use config::CliConfig;
use error::CliError;

#[derive(Parser)]
#[command(
    name = "csrs",
    version,
    about = "Court statistics: classify case spreadsheets and fill the monthly criminal return"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Count case spreadsheets into the return and export the filled workbook
    Fill {
        /// Case spreadsheets (.xlsx, .xls, .ods or .csv)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Which side of the return to fill: new or disposed
        #[arg(short, long)]
        mode: String,

        /// Reporting year
        #[arg(short, long)]
        year: i32,

        /// Reporting month (1-12)
        #[arg(long, required_unless_present = "full_year", conflicts_with = "full_year")]
        month: Option<u32>,

        /// Report the whole year instead of one month
        #[arg(long)]
        full_year: bool,

        /// Pre-filled return to add counts to (default: a fresh return)
        #[arg(short, long, value_name = "FILE")]
        template: Option<PathBuf>,

        /// Where to write the filled workbook
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: PathBuf,

        /// Custom taxonomy JSON (default: CSRS_TAXONOMY or the built-in preset)
        #[arg(long, value_name = "FILE")]
        taxonomy: Option<PathBuf>,

        /// Custom report layout JSON (default: CSRS_LAYOUT or the built-in preset)
        #[arg(long, value_name = "FILE")]
        layout: Option<PathBuf>,

        /// Worksheet to read from spreadsheet inputs (default: the first one)
        #[arg(long)]
        sheet: Option<String>,

        /// Also add a category x status pivot sheet
        #[arg(long)]
        pivot: bool,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Classify a single charge and show which rule decided it
    Classify {
        /// Charge description
        #[arg(short, long)]
        charge: String,

        /// Complainant / victim
        #[arg(long, default_value = "")]
        complainant: String,

        /// Custom taxonomy JSON
        #[arg(long, value_name = "FILE")]
        taxonomy: Option<PathBuf>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Show the normalized rows of an input, including unparseable dates
    Preview {
        input: PathBuf,

        /// Worksheet to read (default: the first one)
        #[arg(long)]
        sheet: Option<String>,

        /// Number of rows to show
        #[arg(short, long, default_value_t = 20)]
        limit: usize,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Pivot case rows by category and status
    Summary {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Restrict to a reporting year (all rows otherwise)
        #[arg(short, long)]
        year: Option<i32>,

        /// Restrict to a month of --year
        #[arg(long, requires = "year", conflicts_with = "full_year")]
        month: Option<u32>,

        /// Use the whole of --year
        #[arg(long, requires = "year")]
        full_year: bool,

        /// Date the period applies to: new (arraignment) or disposed
        #[arg(short, long, default_value = "new")]
        mode: String,

        /// Worksheet to read from spreadsheet inputs
        #[arg(long)]
        sheet: Option<String>,

        /// Custom taxonomy JSON
        #[arg(long, value_name = "FILE")]
        taxonomy: Option<PathBuf>,

        /// Also export the pivot as a workbook
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Inspect and validate taxonomies and layouts
    Rules {
        #[command(subcommand)]
        action: RulesAction,
    },
}

#[derive(Subcommand)]
enum RulesAction {
    /// List predefined taxonomies and layouts
    List,
    /// Explain a taxonomy preset rule by rule
    Explain {
        /// Preset name (e.g., "monthly-return")
        preset: String,
    },
    /// Print the taxonomy JSON schema with an example
    Schema,
    /// Validate a custom taxonomy (or, with --layout, a layout) file
    Validate {
        /// Path to JSON file
        file: PathBuf,

        /// The file is a report layout, not a taxonomy
        #[arg(long)]
        layout: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    let config = CliConfig::load();

    let result = telemetry::init(&config.log_level)
        .map_err(CliError::from)
        .and_then(|()| run(cli.command, &config));

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(command: Commands, config: &CliConfig) -> Result<(), CliError> {
    match command {
        Commands::Fill {
            inputs,
            mode,
            year,
            month,
            full_year,
            template,
            out,
            taxonomy,
            layout,
            sheet,
            pivot,
            output,
        } => commands::fill::run(
            commands::fill::FillArgs {
                inputs,
                mode,
                year,
                month,
                full_year,
                template,
                out,
                taxonomy,
                layout,
                sheet,
                pivot,
            },
            config,
            &output,
        ),
        Commands::Classify {
            charge,
            complainant,
            taxonomy,
            output,
        } => commands::classify::run(&charge, &complainant, taxonomy, config, &output),
        Commands::Preview {
            input,
            sheet,
            limit,
            output,
        } => commands::preview::run(&input, sheet.as_deref(), limit, &output),
        Commands::Summary {
            inputs,
            year,
            month,
            full_year,
            mode,
            sheet,
            taxonomy,
            out,
            output,
        } => commands::summary::run(
            commands::summary::SummaryArgs {
                inputs,
                year,
                month,
                full_year,
                mode,
                sheet,
                taxonomy,
                out,
            },
            config,
            &output,
        ),
        Commands::Rules { action } => match action {
            RulesAction::List => commands::rules::list(),
            RulesAction::Explain { preset } => commands::rules::explain(&preset),
            RulesAction::Schema => commands::rules::schema(),
            RulesAction::Validate { file, layout } => commands::rules::validate(&file, layout),
        },
    }
}

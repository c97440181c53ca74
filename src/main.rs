//! scoperem - viewport-scaled CSS units

use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use scoperem::config::{Config, FlexibleConfig};
use scoperem::flexible::unit_value;
use scoperem::rewrite::{Exclude, SelectorPattern};
use scoperem::util::{decode_css, format_number};
use scoperem::{LengthUnit, RewriteOptions, Rewriter};

#[derive(Parser)]
#[command(name = "scoperem")]
#[command(version, about = "Rewrite px/rem to a viewport-scaled CSS variable", long_about = None)]
#[command(after_help = "EXAMPLES:
    scoperem px app.css -o dist/app.css          Convert px with default options
    scoperem px --prop font-size --prop 'margin*' app.css
    scoperem rem < theme.css > theme.out.css     Convert rem from stdin
    scoperem scale --width 375 --layouts 375,1920")]
struct Cli {
    /// JSON config file (px, rem and flexible sections)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log more (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert px literals
    Px(RewriteArgs),
    /// Convert rem literals
    Rem(RewriteArgs),
    /// Print the unit value for a viewport width
    Scale(ScaleArgs),
}

#[derive(Args)]
struct RewriteArgs {
    /// Input style sheet (stdin if omitted)
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Output file (stdout if omitted)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Pixels per unit of the variable
    #[arg(long)]
    root_value: Option<f64>,

    /// Decimal places kept in coefficients
    #[arg(long)]
    precision: Option<u32>,

    /// Property to convert (repeatable; supports `*`, `prefix*`, `!prop`)
    #[arg(long = "prop", value_name = "PROP")]
    props: Vec<String>,

    /// Selector to skip (repeatable; `/regex/` for patterns)
    #[arg(long = "selector-black-list", value_name = "SELECTOR")]
    selector_black_list: Vec<String>,

    /// Append converted declarations instead of replacing values
    #[arg(long)]
    no_replace: bool,

    /// Also convert px in @media params
    #[arg(long)]
    media_query: bool,

    /// Leave px values at or below this magnitude alone
    #[arg(long)]
    min_value: Option<f64>,

    /// Skip the input when its path matches this regex
    #[arg(long, value_name = "REGEX")]
    exclude: Option<String>,

    /// Custom property to scale by
    #[arg(long)]
    var_name: Option<String>,
}

#[derive(Args)]
struct ScaleArgs {
    /// Viewport width in CSS pixels
    #[arg(long)]
    width: f64,

    /// Ascending breakpoints, comma separated
    #[arg(long, value_delimiter = ',')]
    breakpoints: Option<Vec<f64>>,

    /// Reference layout widths, one more than breakpoints
    #[arg(long, value_delimiter = ',')]
    layouts: Option<Vec<f64>>,

    /// Reference width to scale to (defaults to the last layout)
    #[arg(long)]
    basic_layout: Option<f64>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> scoperem::Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    match cli.command {
        Command::Px(args) => rewrite(&config, LengthUnit::Px, args),
        Command::Rem(args) => rewrite(&config, LengthUnit::Rem, args),
        Command::Scale(args) => scale(&config, args),
    }
}

fn rewrite(config: &Config, unit: LengthUnit, args: RewriteArgs) -> scoperem::Result<()> {
    let options = apply_overrides(config.rewrite_options(unit), &args);
    let rewriter = Rewriter::new(options)?;

    let bytes = match &args.input {
        Some(path) => std::fs::read(path)?,
        None => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf)?;
            buf
        }
    };
    let css = decode_css(&bytes);
    let source = args.input.as_ref().map(|p| p.to_string_lossy());
    let output = rewriter.process(&css, source.as_deref());

    match &args.output {
        Some(path) => std::fs::write(path, output)?,
        None => std::io::stdout().write_all(output.as_bytes())?,
    }
    Ok(())
}

/// Command-line flags win over the config file.
fn apply_overrides(mut options: RewriteOptions, args: &RewriteArgs) -> RewriteOptions {
    if let Some(root_value) = args.root_value {
        options.root_value = root_value;
    }
    if let Some(precision) = args.precision {
        options.unit_precision = precision;
    }
    if !args.props.is_empty() {
        options.prop_list = args.props.clone();
    }
    if !args.selector_black_list.is_empty() {
        options.selector_black_list = args
            .selector_black_list
            .iter()
            .filter_map(|entry| SelectorPattern::parse(entry))
            .collect();
    }
    if args.no_replace {
        options.replace = false;
    }
    if args.media_query {
        options.media_query = true;
    }
    if let Some(min_value) = args.min_value {
        options.min_value = min_value;
    }
    if let Some(exclude) = &args.exclude {
        options.exclude = Exclude::parse(exclude);
    }
    if let Some(var_name) = &args.var_name {
        options.var_name = var_name.clone();
    }
    options
}

fn scale(config: &Config, args: ScaleArgs) -> scoperem::Result<()> {
    let mut section = config.flexible.clone().unwrap_or_default();
    let FlexibleConfig {
        breakpoints,
        layouts,
        basic_layout,
    } = &mut section;
    if args.breakpoints.is_some() {
        *breakpoints = args.breakpoints;
    }
    if args.layouts.is_some() {
        *layouts = args.layouts;
    }
    if args.basic_layout.is_some() {
        *basic_layout = args.basic_layout;
    }

    let table = section.table()?;
    let value = unit_value(args.width, table.scale(args.width));
    println!("{}px", format_number(value));
    Ok(())
}

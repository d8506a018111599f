use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use env_logger::Env;
use log::{LevelFilter, info};

use rs_desc_core::model::ngram_model::NGramModel;
use rs_desc_core::model::trainer::ModelStatistics;
use rs_desc_core::pipeline;
use rs_desc_core::resources::Resources;
use rs_desc_core::{ComposerConfig, DescriptionComposer, DirectoryStore, ModelStore};

#[derive(Parser, Debug)]
#[command(author, version, about = "Fictional game store page toolkit", long_about = None)]
struct Cli {
	/// Increase verbosity (-v, -vv)
	#[arg(short = 'v', long, global = true, action = ArgAction::Count)]
	verbose: u8,

	/// Decrease verbosity (-q, -qq)
	#[arg(short = 'q', long, global = true, action = ArgAction::Count)]
	quiet: u8,

	#[command(flatten)]
	folders: Folders,

	#[command(subcommand)]
	command: Commands,
}

#[derive(Args, Debug)]
struct Folders {
	/// Folder of trained models
	#[arg(long, global = true, env = "RS_DESC_MODELS", value_name = "DIR", default_value = "./models")]
	models_dir: PathBuf,

	/// Folder of training corpora and composer resources
	#[arg(long, global = true, env = "RS_DESC_DATA", value_name = "DIR", default_value = "./data")]
	data_dir: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Commands {
	/// Train every model from the data folder
	Train,
	/// Generate one store page and print it as JSON
	Demo(DemoArgs),
	/// Print the statistics of a stored model
	Stats(StatsArgs),
}

#[derive(Args, Debug)]
struct DemoArgs {
	/// Seed for reproducible output
	#[arg(long)]
	seed: Option<u64>,

	/// Bias description words toward the genre and section headers
	#[arg(long)]
	semantic_context: bool,
}

#[derive(Args, Debug)]
struct StatsArgs {
	/// Model name, e.g. `description` or `requirements_OS`
	#[arg(long)]
	name: String,
}

fn main() -> Result<()> {
	let cli = Cli::parse();
	init_logging(cli.verbose, cli.quiet);

	let store = DirectoryStore::new(&cli.folders.models_dir);
	match cli.command {
		Commands::Train => run_train(&cli.folders, &store),
		Commands::Demo(args) => run_demo(&cli.folders, &store, args),
		Commands::Stats(args) => run_stats(&store, args),
	}
}

fn init_logging(verbose: u8, quiet: u8) {
	let level = match (quiet, verbose) {
		(0, 0) => LevelFilter::Info,
		(0, 1) => LevelFilter::Debug,
		(0, _) => LevelFilter::Trace,
		(1, _) => LevelFilter::Warn,
		_ => LevelFilter::Error,
	};

	let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
	if verbose > 0 || quiet > 0 {
		builder.filter_level(level);
	}
	let _ = builder.try_init();
}

fn run_train(folders: &Folders, store: &DirectoryStore) -> Result<()> {
	let report = pipeline::run(&folders.data_dir, store)
		.with_context(|| format!("training from {} failed", folders.data_dir.display()))?;
	print!("{report}");
	Ok(())
}

fn run_demo(folders: &Folders, store: &DirectoryStore, args: DemoArgs) -> Result<()> {
	let resources = Resources::load(&folders.data_dir)
		.with_context(|| format!("unable to load resources from {}", folders.data_dir.display()))?;
	let config = ComposerConfig { semantic_context: args.semantic_context, seed: args.seed };
	let mut composer = DescriptionComposer::load(store, resources, config)
		.context("unable to load models, run `train` first")?;

	let description = composer.compose()?;
	println!("{}", serde_json::to_string_pretty(&description)?);
	Ok(())
}

fn run_stats(store: &DirectoryStore, args: StatsArgs) -> Result<()> {
	let bytes = store.load(&args.name).with_context(|| format!("unable to load model `{}`", args.name))?;
	let model = NGramModel::from_bytes(&bytes)?;
	info!("Model {} has order {}", args.name, model.n());

	let statistics = ModelStatistics::compute(&model, bytes.len());
	println!("{}: n = {}, {}", args.name, model.n(), statistics);
	Ok(())
}

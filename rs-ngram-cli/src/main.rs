use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::{LevelFilter, info};
use rand::SeedableRng;
use rand::rngs::StdRng;

use rs_ngram_core::io::{build_output_path, read_lines};
use rs_ngram_core::model::builder::DEFAULT_ORDER;
use rs_ngram_core::model::generation_input::{DEFAULT_PARAGRAPH_SENTENCES, DEFAULT_TARGET_SIZE};
use rs_ngram_core::{GenerationInput, LanguageModel, ModelBuilder, TextGenerator};

/// Build an n-gram language model from a corpus, or generate text from one.
#[derive(Parser, Debug)]
#[command(name = "rs-ngram", version)]
struct Cli {
	/// Turn debugging information on (-v, -vv)
	#[arg(short, long, action = clap::ArgAction::Count, global = true)]
	verbose: u8,

	/// Only log errors.
	#[arg(short, long, global = true)]
	quiet: bool,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Build a model from a corpus (one sentence per line).
	Build(BuildArgs),
	/// Generate text from a saved model.
	Generate(GenerateArgs),
}

#[derive(Args, Debug)]
struct BuildArgs {
	/// Path to the input corpus.
	#[arg(short, long)]
	input: PathBuf,

	/// Where to store the model (defaults to the corpus path with a `.bin` extension).
	#[arg(short, long)]
	output: Option<PathBuf>,

	/// Language model order.
	#[arg(long, default_value_t = DEFAULT_ORDER)]
	order: usize,

	/// Build shards of the corpus on every core.
	#[arg(long)]
	parallel: bool,
}

#[derive(Args, Debug)]
struct GenerateArgs {
	/// Path to a model written by `build`.
	#[arg(short, long)]
	input: PathBuf,

	/// Generated corpus size, in tokens.
	#[arg(short, long, default_value_t = DEFAULT_TARGET_SIZE)]
	size: usize,

	/// Seed for reproducible output.
	#[arg(long)]
	seed: Option<u64>,

	/// Fewest sentences per paragraph.
	#[arg(long, default_value_t = *DEFAULT_PARAGRAPH_SENTENCES.start())]
	paragraph_min: usize,

	/// Most sentences per paragraph.
	#[arg(long, default_value_t = *DEFAULT_PARAGRAPH_SENTENCES.end())]
	paragraph_max: usize,
}

/// Level forced by `-q` or `-v`; `None` leaves `RUST_LOG` in charge.
fn flag_level(verbose: u8, quiet: bool) -> Option<LevelFilter> {
	match (quiet, verbose) {
		(true, _) => Some(LevelFilter::Error),
		(false, 0) => None,
		(false, 1) => Some(LevelFilter::Debug),
		(false, _) => Some(LevelFilter::Trace),
	}
}

fn init_logging(verbose: u8, quiet: bool) {
	let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
	if let Some(level) = flag_level(verbose, quiet) {
		builder.filter_level(level);
	}
	let _ = builder.try_init();
}

fn run_build(args: BuildArgs, show_progress: bool) -> Result<(), Box<dyn std::error::Error>> {
	let output = match args.output {
		Some(path) => path,
		None => build_output_path(&args.input, "bin")?,
	};

	let builder = ModelBuilder::new(args.order)?;
	let lines = read_lines(&args.input)?;
	info!("read {} lines from {}", lines.len(), args.input.display());

	let model = if args.parallel {
		builder.build_parallel(&lines)?
	} else {
		let bar = if show_progress {
			ProgressBar::new(lines.len() as u64)
		} else {
			ProgressBar::hidden()
		};
		bar.set_style(ProgressStyle::with_template("[{bar:60}] {percent}% {pos}/{len} lines")?.progress_chars("=>-"));
		let model = builder.build_with_progress(&lines, |done, _| bar.set_position(done as u64));
		bar.finish_and_clear();
		model
	};

	model.save_to_file(&output)?;
	Ok(())
}

fn run_generate(args: GenerateArgs) -> Result<(), Box<dyn std::error::Error>> {
	let model = LanguageModel::load_from_file(&args.input)?;

	let mut input = GenerationInput::new(args.size)?;
	input.set_paragraph_sentences(args.paragraph_min, args.paragraph_max)?;

	let mut rng = match args.seed {
		Some(seed) => StdRng::seed_from_u64(seed),
		None => StdRng::from_os_rng(),
	};

	let text = TextGenerator::new(&model)?.generate(&input, &mut rng)?;
	println!("{text}");
	Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
	let cli = Cli::parse();
	init_logging(cli.verbose, cli.quiet);

	match cli.command {
		Command::Build(args) => run_build(args, !cli.quiet),
		Command::Generate(args) => run_generate(args),
	}
}

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use codeswitch::lexicon::load_lexicon_entries;
use codeswitch::serialization;
use codeswitch::{
    DecodeMode, Decoder, DecoderConfig, LanguageModel, LanguagePair, Lexicon, NgramModel,
    Slot, TrainingConfig,
};
use env_logger::Env;
use log::info;
use rayon::ThreadPoolBuilder;
use serde_json::json;

#[derive(Parser, Debug)]
#[command(author, version, about = "Word-level language identification toolkit", long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Decrease verbosity (-q, -qq)
    #[arg(short = 'q', long, global = true, action = ArgAction::Count)]
    quiet: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Train a character n-gram model from a frequency lexicon
    Train(TrainArgs),
    /// Label pre-tokenized sentences with per-token languages
    Identify(IdentifyArgs),
    /// Print per-language combined scores for a single token
    Score(ScoreArgs),
    /// Inspect model metadata
    Info(InfoArgs),
}

#[derive(Args, Debug)]
struct TrainArgs {
    /// Frequency lexicon file (one "word frequency" pair per line)
    lexicon: PathBuf,

    /// Language identifier for the trained model
    #[arg(short, long, value_name = "LANG")]
    language: String,

    /// N-gram order
    #[arg(long, value_name = "N", default_value_t = 2)]
    order: usize,

    /// Additive smoothing constant
    #[arg(long, value_name = "LAMBDA")]
    smoothing: Option<f64>,

    /// Output path for the model JSON (defaults to <LANG>.model)
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Emit pretty JSON
    #[arg(long)]
    pretty: bool,

    /// Disable training summaries
    #[arg(long)]
    no_progress: bool,
}

#[derive(Args, Debug)]
struct ModelPairArgs {
    /// Trained model JSON for language A
    #[arg(long, value_name = "PATH")]
    model_a: PathBuf,

    /// Frequency lexicon for language A
    #[arg(long, value_name = "PATH")]
    lexicon_a: PathBuf,

    /// Trained model JSON for language B
    #[arg(long, value_name = "PATH")]
    model_b: PathBuf,

    /// Frequency lexicon for language B
    #[arg(long, value_name = "PATH")]
    lexicon_b: PathBuf,

    /// Weight of lexicon evidence versus the character model
    #[arg(long, value_name = "W", default_value_t = 1.0)]
    lex_weight: f64,
}

#[derive(Args, Debug)]
struct IdentifyArgs {
    /// Pre-tokenized input file, one whitespace-separated sentence per line
    /// (stdin if omitted)
    input: Option<PathBuf>,

    #[command(flatten)]
    models: ModelPairArgs,

    /// Decoding strategy
    #[arg(long, value_enum, default_value_t = Mode::Viterbi)]
    mode: Mode,

    /// Probability that the next token stays in the same language
    #[arg(long, value_name = "P")]
    transition_probability: Option<f64>,

    /// Probability that the first token belongs to language A
    #[arg(long, value_name = "P")]
    start_probability: Option<f64>,

    /// Token excluded from language assignment, e.g. for punctuation
    #[arg(long, value_name = "TOKEN")]
    ignore_token: Option<String>,

    /// One-word affirmative particle decoded as language A
    #[arg(long, value_name = "WORD")]
    affirmative: Option<String>,

    /// Emit JSON lines instead of token/label pairs
    #[arg(long)]
    json: bool,

    /// Limit Rayon worker threads
    #[arg(long, value_name = "N")]
    threads: Option<usize>,
}

#[derive(Args, Debug)]
struct ScoreArgs {
    /// Token to score
    token: String,

    #[command(flatten)]
    models: ModelPairArgs,

    /// Emit JSON instead of human-readable output
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct InfoArgs {
    /// Trained model JSON to inspect
    #[arg(short = 'm', long, value_name = "PATH")]
    model: PathBuf,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Mode {
    Independent,
    Viterbi,
}

impl From<Mode> for DecodeMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Independent => DecodeMode::Independent,
            Mode::Viterbi => DecodeMode::Viterbi,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Mode::Independent => "independent",
            Mode::Viterbi => "viterbi",
        };
        f.write_str(label)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Train(args) => run_train(args),
        Commands::Identify(args) => run_identify(args),
        Commands::Score(args) => run_score(args),
        Commands::Info(args) => run_info(args),
    }
}

fn init_logging(verbose: u8, quiet: u8) {
    use log::LevelFilter;

    let level = if quiet > 1 {
        LevelFilter::Error
    } else if quiet == 1 {
        LevelFilter::Warn
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    builder.format_timestamp_millis();
    builder.filter_level(level);
    let _ = builder.try_init();
}

fn run_train(args: TrainArgs) -> Result<()> {
    let mut cfg = TrainingConfig::builder().order(args.order);
    if let Some(smoothing) = args.smoothing {
        cfg = cfg.smoothing(smoothing);
    }
    cfg = cfg.show_progress(!args.no_progress);
    let cfg = cfg.build()?;

    let entries = load_lexicon_entries(&args.lexicon)
        .with_context(|| format!("failed to load lexicon from {}", args.lexicon.display()))?;
    info!("loaded {} lexicon entries", entries.len());

    let model = NgramModel::train(&args.language, &entries, &cfg)?;
    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(format!("{}.model", args.language)));
    serialization::save_model(&model, &output, args.pretty)
        .with_context(|| format!("failed to save model to {}", output.display()))?;

    println!(
        "wrote {}-gram model for {} ({} start ngrams, {} transition sources) to {}",
        model.order(),
        model.language(),
        model.start_table().len(),
        model.transitions().len(),
        output.display()
    );
    Ok(())
}

fn run_identify(args: IdentifyArgs) -> Result<()> {
    if let Some(threads) = args.threads {
        ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("unable to configure Rayon thread pool")?;
    }

    let mut pair = load_pair(&args.models)?;
    if let Some(token) = args.ignore_token {
        pair = pair.with_ignore_token(token);
    }
    if let Some(word) = args.affirmative {
        pair = pair.with_affirmative(word);
    }

    let mut cfg = DecoderConfig::builder().mode(args.mode.into());
    if let Some(p) = args.transition_probability {
        cfg = cfg.transition_probability(p);
    }
    if let Some(p) = args.start_probability {
        cfg = cfg.start_probability(p);
    }
    let decoder = Decoder::new(cfg.build()?);

    let lines: Vec<String> = match &args.input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open input {}", path.display()))?;
            BufReader::new(file)
                .lines()
                .collect::<io::Result<_>>()
                .context("failed to read input lines")?
        }
        None => io::stdin()
            .lock()
            .lines()
            .collect::<io::Result<_>>()
            .context("failed to read stdin")?,
    };
    let sequences: Vec<Vec<String>> = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.split_whitespace().map(str::to_string).collect())
        .collect();
    info!("identifying {} sentences", sequences.len());

    let labeled = decoder.decode_batch(&pair, &sequences)?;

    let mut stdout = io::stdout().lock();
    for (tokens, languages) in sequences.iter().zip(&labeled) {
        if args.json {
            writeln!(
                stdout,
                "{}",
                json!({ "tokens": tokens, "languages": languages })
            )?;
        } else {
            let rendered: Vec<String> = tokens
                .iter()
                .zip(languages)
                .map(|(token, language)| format!("{token}/{language}"))
                .collect();
            writeln!(stdout, "{}", rendered.join(" "))?;
        }
    }
    Ok(())
}

fn run_score(args: ScoreArgs) -> Result<()> {
    let pair = load_pair(&args.models)?;
    let scores = codeswitch::score(&pair, &args.token);

    if args.json {
        println!(
            "{}",
            json!({
                "token": args.token,
                "scores": {
                    (pair.language(Slot::A)): scores.a,
                    (pair.language(Slot::B)): scores.b,
                }
            })
        );
    } else {
        println!("{}: {}", pair.language(Slot::A), scores.a);
        println!("{}: {}", pair.language(Slot::B), scores.b);
    }
    Ok(())
}

fn run_info(args: InfoArgs) -> Result<()> {
    let model = serialization::load_model(&args.model)
        .with_context(|| format!("failed to load model from {}", args.model.display()))?;
    println!("Language: {}", model.language());
    println!("Order: {}", model.order());
    println!("Start ngrams: {}", model.start_table().len());
    println!("Transition sources: {}", model.transitions().len());
    Ok(())
}

fn load_language_model(
    model_path: &Path,
    lexicon_path: &Path,
    lex_weight: f64,
) -> Result<LanguageModel> {
    let ngram = serialization::load_model(model_path)
        .with_context(|| format!("failed to load model from {}", model_path.display()))?;
    let lexicon = Lexicon::from_path(lexicon_path)
        .with_context(|| format!("failed to load lexicon from {}", lexicon_path.display()))?;
    let language = ngram.language().to_string();
    Ok(LanguageModel::new(language, lexicon, ngram, lex_weight)?)
}

fn load_pair(args: &ModelPairArgs) -> Result<LanguagePair> {
    let a = load_language_model(&args.model_a, &args.lexicon_a, args.lex_weight)?;
    let b = load_language_model(&args.model_b, &args.lexicon_b, args.lex_weight)?;
    Ok(LanguagePair::new(a, b)?)
}

use clap::Parser;
use log::info;

use symrex::dot::DotConfig;
use symrex::types::Encoding;
use symrex::{RexEngine, RexOptions};

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Patterns to generate members of.
    #[arg(value_name = "PATTERN", required = true)]
    patterns: Vec<String>,

    /// Number of members per pattern.
    #[arg(short = 'n', long, value_name = "INT", default_value = "10")]
    count: usize,

    /// Alphabet: ascii, latin1 or utf16.
    #[arg(long, value_name = "ENCODING", default_value = "utf16")]
    encoding: Encoding,

    /// Case-insensitive matching.
    #[arg(short = 'i', long)]
    ignore_case: bool,

    /// `^` and `$` match at line boundaries.
    #[arg(short = 'm', long)]
    multi_line: bool,

    /// `.` also matches a newline.
    #[arg(short = 's', long)]
    dot_all: bool,

    /// Generate members of the intersection of all patterns.
    #[arg(long)]
    intersect: bool,

    /// Random seed.
    #[arg(long, value_name = "INT")]
    seed: Option<u64>,

    /// Print the automaton of each pattern in Graphviz format instead.
    #[arg(long)]
    dot: bool,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;

    let time_total = std::time::Instant::now();

    let args = Cli::parse();
    info!("args = {:?}", args);

    let mut options = RexOptions::default()
        .with_encoding(args.encoding)
        .with_ignore_case(args.ignore_case)
        .with_multi_line(args.multi_line)
        .with_dot_all(args.dot_all)
        .with_intersect(args.intersect);
    if let Some(seed) = args.seed {
        options = options.with_seed(seed);
    }

    let mut engine = RexEngine::new(options);
    info!("seed = {}", engine.seed());

    if args.dot {
        let config = DotConfig::default();
        for pattern in &args.patterns {
            let automaton = engine.create_automaton(pattern)?;
            println!("{}", automaton.to_dot(engine.solver(), &config)?);
        }
        return Ok(());
    }

    let generated = engine.generate_from_patterns(&args.patterns, args.count);
    for member in &generated.members {
        println!("{:?}", member);
    }
    for error in &generated.errors {
        eprintln!("error: {}", error);
    }

    info!("All done in {:.3} s", time_total.elapsed().as_secs_f64());
    Ok(())
}

//! Command-line front end for the FFT specializer.
//!
//! ```text
//! fftgen --size 8                      # print Rust source
//! fftgen --size 8 --emit dot           # print the Graphviz graph
//! fftgen --size 4 --run 1,0,2,0,3,0,4,0
//! ```

use std::process;

use clap::{Parser, ValueEnum};
use fftgen::backend::Interpreter;
use fftgen::driver::{specialize_transform_with, BindingMode, SpecializeOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Emit {
    Rust,
    Dot,
}

#[derive(Debug, Parser)]
#[command(name = "fftgen", about = "Specialize a power-of-two FFT into straight-line code")]
struct Args {
    /// Number of complex points; must be a power of two.
    #[arg(short = 'n', long)]
    size: usize,

    #[arg(long, value_enum, default_value_t = Emit::Rust)]
    emit: Emit,

    /// Disable hash-consing of pure nodes.
    #[arg(long)]
    no_intern: bool,

    /// Keep every constructed node in the schedule.
    #[arg(long)]
    no_dce: bool,

    /// Disable the algebraic rewrite rules.
    #[arg(long)]
    no_simplify: bool,

    /// Return outputs in a fresh buffer instead of writing back in place.
    #[arg(long)]
    results: bool,

    /// Print session statistics to stderr.
    #[arg(long)]
    stats: bool,

    /// Run the transform on comma-separated interleaved input and print the output.
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    run: Option<Vec<f64>>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn options(&self) -> SpecializeOptions {
        let binding = if self.results { BindingMode::Results } else { BindingMode::InPlace };
        SpecializeOptions::default()
            .with_interning(!self.no_intern)
            .with_simplify(!self.no_simplify)
            .with_dce(!self.no_dce)
            .with_binding(binding)
    }
}

fn main() {
    let args = Args::parse();

    let level = match args.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new().filter_level(level).parse_default_env().init();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let artifact = specialize_transform_with(args.size, &args.options())?;
    if args.stats {
        eprintln!("Schedule length: {}", artifact.schedule_len);
        eprint!("{}", artifact.stats);
    }

    match &args.run {
        Some(input) => {
            let transform = artifact.compile(&Interpreter::new())?;
            let output = transform.call(input)?;
            let rendered: Vec<String> = output.iter().map(|v| v.to_string()).collect();
            println!("{}", rendered.join(","));
        }
        None => match args.emit {
            Emit::Rust => print!("{}", artifact.source),
            Emit::Dot => print!("{}", artifact.graph),
        },
    }
    Ok(())
}

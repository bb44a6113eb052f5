//! Command-line interface for the `gllex` parser generator.
//!
//! Builds the GLL tables for a grammar (plain or Markdown) and, for each
//! input file given, parses it, applies the disambiguation rules and
//! prints the resulting tree.

#[cfg(feature = "cli")]
mod real {
    use anyhow::{Context, bail};
    use clap::Parser;
    use gllex::{Disambiguator, ParseOptions, RESERVED_WORDS, build_tree};
    use gllex_gen::{GenConfig, generate, report};
    use std::io::Write;
    use std::path::PathBuf;

    #[derive(Parser)]
    #[command(about = "Generate GLL parser tables from a grammar and parse inputs with them")]
    struct Args {
        /// Path to the grammar file (`.md` files are read as Markdown).
        #[arg(short = 'g', long)]
        grammar: PathBuf,

        /// Directory for reports; defaults to the grammar's directory.
        #[arg(short = 'o', long)]
        output_dir: Option<PathBuf>,

        /// Write FIRST/FOLLOW, slot, lexer and BSR reports.
        #[arg(short = 'v', long)]
        verbose: bool,

        /// Input file to parse; may be repeated.
        #[arg(short = 'i', long = "input")]
        inputs: Vec<PathBuf>,

        /// Non-terminal that must not derive a grammar keyword; may be repeated.
        #[arg(short = 'r', long = "reserved", value_name = "NT")]
        reserved: Vec<String>,

        /// Abort a parse after this many descriptors.
        #[arg(long)]
        max_descriptors: Option<usize>,

        /// Enable debug logging (off by default).
        #[arg(short = 'd', long)]
        debug: bool,
    }

    pub fn main() -> anyhow::Result<()> {
        let args = Args::parse();
        let level = if args.debug {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        };
        env_logger::Builder::from_default_env()
            .filter_level(level)
            .init();

        let config = GenConfig {
            grammar: args.grammar.clone(),
            output_dir: args.output_dir.clone(),
            verbose: args.verbose,
        };
        let generated = generate(&config)?;

        let mut heads = Vec::with_capacity(args.reserved.len());
        for name in &args.reserved {
            match generated.parser.nt_by_name(name) {
                Some(nt) => heads.push(nt),
                None => bail!("--reserved {name}: no such non-terminal"),
            }
        }
        let disambiguator = Disambiguator::new().reserved(heads, RESERVED_WORDS.iter().copied());
        let options = ParseOptions {
            max_descriptors: args.max_descriptors,
        };

        let mut bsr_report = Vec::new();
        let mut failure = None;
        for path in &args.inputs {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("cannot read input {}", path.display()))?;
            let input = generated.input(&text);
            let mut result = generated
                .parse(&input, &options)
                .with_context(|| format!("in input {}", path.display()))?;
            let stats = disambiguator.run(&mut result.bsr, &input);
            log::info!(
                "{}: {} descriptors, {} GSS nodes, {} BSR entries, {} ignored",
                path.display(),
                result.stats.descriptors,
                result.stats.gss_nodes,
                result.stats.bsr_entries,
                stats.reserved + stats.orphans
            );
            if args.verbose {
                writeln!(bsr_report, "== {}", path.display())?;
                result.bsr.write_report(&mut bsr_report, &input)?;
                result.bsr.dump(&mut bsr_report)?;
            }
            match build_tree(&result.bsr, &input) {
                Ok(tree) => println!("{tree}"),
                Err(e) => {
                    eprint!("{}", result.bsr.ambiguity_report(&input));
                    failure = Some(
                        anyhow::Error::new(e).context(format!("in input {}", path.display())),
                    );
                    break;
                }
            }
        }
        if args.verbose && !bsr_report.is_empty() {
            report(&config.output_dir().join("bsr_report.txt"), |out| {
                out.write_all(&bsr_report)
            })?;
        }
        if let Some(e) = failure {
            return Err(e);
        }
        Ok(())
    }
}

#[cfg(feature = "cli")]
fn main() -> anyhow::Result<()> {
    real::main()
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("gllex disabled (compiled without `cli` feature)");
}

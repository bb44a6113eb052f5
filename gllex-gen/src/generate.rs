use crate::first_follow::{FirstFollow, write_first_follow};
use crate::grammar::{Grammar, Mode, markdown, parse_source};
use crate::lexfsa::{ItemSets, write_item_sets};
use crate::slots::{SlotTable, write_slots};
use crate::tables::{lexer_tables, parser_tables};
use anyhow::{Context, Result};
use gllex::{GllError, LexerTables, ParseOptions, ParseResult, ParserTables, SourceInput, parse};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// What to generate and where.
#[derive(Debug, Clone, Default)]
pub struct GenConfig {
    /// Grammar source; `.md` files are read as Markdown.
    pub grammar: PathBuf,
    /// Directory for reports; defaults to the grammar's directory.
    pub output_dir: Option<PathBuf>,
    /// Write the FIRST/FOLLOW, slot and lexer reports.
    pub verbose: bool,
}

impl GenConfig {
    /// Non-verbose settings for `grammar`, with reports next to it.
    pub fn new(grammar: impl Into<PathBuf>) -> Self {
        Self {
            grammar: grammar.into(),
            ..Self::default()
        }
    }

    /// The directory reports are written to.
    pub fn output_dir(&self) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.clone(),
            None => self
                .grammar
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        }
    }
}

/// Everything generated from one grammar.
#[derive(Debug)]
pub struct Generated {
    pub grammar: Grammar,
    pub first_follow: FirstFollow,
    /// Lexer item sets; token grammars only.
    pub item_sets: Option<ItemSets>,
    pub parser: ParserTables,
    /// Lexer DFA; token grammars only.
    pub lexer: Option<LexerTables>,
}

impl Generated {
    /// Builds all tables for a grammar source.
    pub fn build(source: &str) -> Result<Self> {
        let grammar = parse_source(source)?;
        let first_follow = FirstFollow::new(&grammar)?;
        let slots = SlotTable::new(&grammar, &first_follow);
        let parser = parser_tables(&grammar, &first_follow, slots);
        let (item_sets, lexer) = match grammar.mode {
            Mode::Chars => (None, None),
            Mode::Tokens => {
                let sets = ItemSets::build(&grammar)?;
                let lexer = lexer_tables(&grammar, &sets);
                (Some(sets), Some(lexer))
            }
        };
        log::info!(
            "grammar {}: {} non-terminals, {} slots, {} lexer states",
            grammar.package.as_deref().unwrap_or("<unnamed>"),
            parser.nt_names.len(),
            parser.slots.len(),
            lexer.as_ref().map_or(0, |l| l.states.len())
        );
        Ok(Generated {
            grammar,
            first_follow,
            item_sets,
            parser,
            lexer,
        })
    }

    /// Wraps `text` for the parser, lexing it first in token mode.
    pub fn input<'a>(&self, text: &'a str) -> SourceInput<'a> {
        match &self.lexer {
            Some(lexer) => SourceInput::tokens(text, lexer),
            None => SourceInput::chars(text),
        }
    }

    /// Parses `text` with the generated tables.
    pub fn parse<'t>(
        &'t self,
        input: &SourceInput<'_>,
        options: &ParseOptions,
    ) -> Result<ParseResult<'t>, GllError> {
        parse(&self.parser, input, options)
    }

    /// Writes `first_follow.txt`, `grammar_slots.txt` and, for token
    /// grammars, `lexer_fsa.txt` into `dir`.
    pub fn write_reports(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("cannot create {}", dir.display()))?;
        report(&dir.join("first_follow.txt"), |out| {
            write_first_follow(out, &self.grammar, &self.first_follow)
        })?;
        report(&dir.join("grammar_slots.txt"), |out| {
            write_slots(out, &self.parser)
        })?;
        if let Some(sets) = &self.item_sets {
            report(&dir.join("lexer_fsa.txt"), |out| {
                write_item_sets(out, sets, &self.grammar.token_names)
            })?;
        }
        Ok(())
    }
}

/// Creates `path` and fills it with `write`.
pub fn report<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
{
    let file = File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    write(&mut out)
        .and_then(|()| out.flush())
        .with_context(|| format!("cannot write {}", path.display()))?;
    log::info!("wrote {}", path.display());
    Ok(())
}

/// Reads a grammar source, keeping only the code blocks of Markdown files.
pub fn load<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read grammar {}", path.display()))?;
    Ok(if markdown::is_markdown(path) {
        markdown::extract(&text)
    } else {
        text
    })
}

/// Loads the configured grammar, builds its tables and, in verbose mode,
/// writes the reports.
pub fn generate(config: &GenConfig) -> Result<Generated> {
    let source = load(&config.grammar)?;
    let generated = Generated::build(&source)
        .with_context(|| format!("in grammar {}", config.grammar.display()))?;
    if config.verbose {
        generated.write_reports(&config.output_dir())?;
    }
    Ok(generated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_grammars::*;
    use gllex::{CharClass, Disambiguator, Input, Terminal, TreeError, build_tree};
    use std::collections::BTreeSet;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn tree(generated: &Generated, text: &str) -> String {
        let input = generated.input(text);
        let result = generated.parse(&input, &ParseOptions::default()).unwrap();
        build_tree(&result.bsr, &input).unwrap().to_string()
    }

    #[test]
    fn epsilon_prefix_derivations() {
        init_logger();
        let g = Generated::build(EPSILON_PREFIX).unwrap();
        assert!(g.lexer.is_none());
        assert_eq!(tree(&g, "b"), "(S (A) \"b\")");
        assert_eq!(tree(&g, "ab"), "(S (A \"a\") \"b\")");

        let input = g.input("c");
        match g.parse(&input, &ParseOptions::default()) {
            Err(GllError::Parse(e)) => {
                assert_eq!(e.pos, 0);
                assert_eq!(
                    e.expected,
                    BTreeSet::from([
                        Terminal::Class(CharClass::Char('a')),
                        Terminal::Class(CharClass::Char('b'))
                    ])
                );
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn ambiguity_is_reported_then_resolved() {
        init_logger();
        let g = Generated::build(AMBIGUOUS).unwrap();
        let input = g.input("a");
        let mut result = g.parse(&input, &ParseOptions::default()).unwrap();
        assert_eq!(result.bsr.roots().len(), 2);
        assert!(result.bsr.is_ambiguous());
        assert!(result.bsr.ambiguity_report(&input).contains("ambiguous"));
        assert_eq!(
            build_tree(&result.bsr, &input),
            Err(TreeError::AmbiguousRoot { count: 2 })
        );

        let b = g.parser.nt_by_name("B").unwrap();
        let stats = Disambiguator::new()
            .reserved([b], ["a"])
            .run(&mut result.bsr, &input);
        assert_eq!(stats.reserved, 1);
        assert_eq!(
            build_tree(&result.bsr, &input).unwrap().to_string(),
            "(S (A \"a\") (S))"
        );
    }

    #[test]
    fn left_recursion_shares_stack_nodes() {
        let g = Generated::build(GSS_CYCLE).unwrap();
        let text = "acbacbacba";
        let input = g.input(text);
        let result = g.parse(&input, &ParseOptions::default()).unwrap();
        assert_eq!(result.bsr.roots().len(), 1);
        assert!(result.gss.len() <= g.parser.nt_names.len() * (input.len() + 1));
        assert_eq!(result.stats.gss_nodes, result.gss.len());
    }

    #[test]
    fn expressions_associate_left() {
        let g = Generated::build(EXPR).unwrap();
        assert_eq!(
            tree(&g, "1+2*3"),
            "(E (E (T (F \"1\"))) \"+\" (T (T (F \"2\")) \"*\" (F \"3\")))"
        );
        assert_eq!(tree(&g, "(1)"), "(E (T (F \"(\" (E (T (F \"1\"))) \")\")))");
    }

    #[test]
    fn token_grammar_end_to_end() {
        init_logger();
        let g = Generated::build(KEYWORDS).unwrap();
        assert!(g.lexer.is_some());
        assert_eq!(
            tree(&g, "if x then y = 42; // done\n"),
            "(Stmts (Stmt \"if\" (Expr \"x\") \"then\" (Stmt \"y\" \"=\" (Expr \"42\") \";\")) (Stmts))"
        );

        let input = g.input("if then");
        let err = g.parse(&input, &ParseOptions::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "parse error at 1:4: unexpected \"then\" \"then\", expected one of id, num"
        );
    }

    #[test]
    fn chain_is_pruned_by_reserved_words() {
        let g = Generated::build(CHAIN).unwrap();
        let input = g.input("x");
        let mut result = g.parse(&input, &ParseOptions::default()).unwrap();
        assert_eq!(result.bsr.roots().len(), 2);
        let d = g.parser.nt_by_name("D").unwrap();
        let stats = Disambiguator::new().reserved([d], ["x"]).run(&mut result.bsr, &input);
        assert_eq!((stats.reserved, stats.orphans), (1, 3));
        assert_eq!(
            build_tree(&result.bsr, &input).unwrap().to_string(),
            "(S (A \"x\"))"
        );
    }

    #[test]
    fn pruned_child_removes_its_split() {
        init_logger();
        let g = Generated::build(SPLIT).unwrap();
        let input = g.input("abcd");
        let mut result = g.parse(&input, &ParseOptions::default()).unwrap();
        assert_eq!(result.bsr.roots().len(), 1);
        assert!(result.bsr.is_ambiguous());
        assert!(matches!(
            build_tree(&result.bsr, &input),
            Err(TreeError::Ambiguous { .. })
        ));

        let y = g.parser.nt_by_name("Y").unwrap();
        let stats = Disambiguator::new().reserved([y], ["c"]).run(&mut result.bsr, &input);
        assert_eq!((stats.reserved, stats.orphans, stats.passes), (1, 1, 2));
        assert!(!result.bsr.is_ambiguous());
        assert_eq!(
            build_tree(&result.bsr, &input).unwrap().to_string(),
            "(S (X \"a\") (Y \"b\" \"c\") \"d\")"
        );
    }

    #[test]
    fn markdown_grammar_with_reports() {
        let dir = std::env::temp_dir().join(format!("gllex-gen-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("grammar.md");
        std::fs::write(
            &path,
            format!("# Tokens\n\nSome prose.\n\n```gllex\n{LEX1}```\n"),
        )
        .unwrap();

        let config = GenConfig {
            verbose: true,
            ..GenConfig::new(&path)
        };
        assert_eq!(config.output_dir(), dir);
        let g = generate(&config).unwrap();
        assert_eq!(g.grammar.token_names, vec!["Error", "rule1"]);
        for name in ["first_follow.txt", "grammar_slots.txt", "lexer_fsa.txt"] {
            let text = std::fs::read_to_string(dir.join(name)).unwrap();
            assert!(!text.is_empty(), "{name}");
        }
        let slots = std::fs::read_to_string(dir.join("grammar_slots.txt")).unwrap();
        assert!(slots.starts_with("Tokens0R0: Tokens : • rule1 Tokens\n"), "{slots}");
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn grammar_errors_surface_through_anyhow() {
        let err = Generated::build("S : A ;").unwrap_err();
        assert!(format!("{err:#}").contains("no grammar rule A"));
        let err = Generated::build("S : 'a' ; B : 'b' B ;").unwrap_err();
        assert!(err.to_string().contains("production B has empty follow set"));
        let err = load("/nonexistent/grammar.md").unwrap_err();
        assert!(err.to_string().contains("cannot read grammar"));
    }
}

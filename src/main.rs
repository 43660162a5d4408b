// ctree: C front end with error recovery and a terminal tree explorer

use std::fs;
use std::io;
use std::path::PathBuf;
use std::process;

use clap::{Parser as ClapParser, ValueEnum};
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use serde::Serialize;

use ctree::config::{Config, DEFAULT_MAX_NESTING};
use ctree::parser::{Diagnostic, Lexer, Node, Parser, Token};
use ctree::printer;
use ctree::ui::App;

/// What to print instead of opening the explorer
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Emit {
    /// The token stream
    Tokens,
    /// The syntax tree followed by any diagnostics
    Tree,
    /// Only the diagnostics
    Diagnostics,
}

/// Output format for `--emit`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable text (default)
    #[default]
    Human,
    /// JSON for tooling
    Json,
}

#[derive(ClapParser)]
#[command(name = "ctree")]
#[command(version)]
#[command(about = "Parse C source into a syntax tree, reporting every syntax error")]
struct Cli {
    /// C source file
    file: PathBuf,

    /// Print to stdout instead of opening the explorer
    #[arg(long, value_enum)]
    emit: Option<Emit>,

    /// Output format for --emit
    #[arg(long, value_enum, default_value = "human")]
    format: OutputFormat,

    /// Stop after this many syntax errors
    #[arg(long, value_name = "N")]
    max_errors: Option<usize>,

    /// Deepest syntactic nesting accepted before reporting an error
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_NESTING)]
    max_nesting: usize,

    /// Treat `#` lines as errors instead of skipping them
    #[arg(long)]
    keep_directives: bool,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    tokens: Option<&'a [Token]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tree: Option<&'a Node>,
    diagnostics: &'a [Diagnostic],
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let source = match fs::read_to_string(&cli.file) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error: cannot read '{}': {}", cli.file.display(), e);
            process::exit(1);
        }
    };

    let config = Config::new()
        .with_skip_directives(!cli.keep_directives)
        .with_max_errors(cli.max_errors)
        .with_max_nesting(cli.max_nesting);

    let mut lexer = Lexer::with_config(&source, &config);
    let tokens = match lexer.tokenize() {
        Ok(tokens) => tokens,
        Err(e) => {
            let diagnostics = [e.into_diagnostic()];
            report(&cli, None, None, &diagnostics)?;
            process::exit(1);
        }
    };

    let mut parser = Parser::from_tokens(tokens.clone(), config);
    let unit = parser.parse_translation_unit();
    let diagnostics = parser.into_diagnostics();

    match cli.emit {
        Some(Emit::Tokens) => report(&cli, Some(&tokens), None, &[])?,
        Some(Emit::Tree) => report(&cli, None, Some(&unit), &diagnostics)?,
        Some(Emit::Diagnostics) => report(&cli, None, None, &diagnostics)?,
        None => run_explorer(source, unit, diagnostics.clone())?,
    }

    if !diagnostics.is_empty() && cli.emit != Some(Emit::Tokens) {
        process::exit(1);
    }
    Ok(())
}

fn report(
    cli: &Cli,
    tokens: Option<&[Token]>,
    tree: Option<&Node>,
    diagnostics: &[Diagnostic],
) -> Result<(), Box<dyn std::error::Error>> {
    match cli.format {
        OutputFormat::Json => {
            let output = JsonOutput {
                success: diagnostics.is_empty(),
                tokens,
                tree,
                diagnostics,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Human => {
            if let Some(tokens) = tokens {
                print!("{}", printer::format_tokens(tokens));
            }
            if let Some(tree) = tree {
                print!("{}", printer::format_tree(tree));
            }
            if !diagnostics.is_empty() {
                eprint!("{}", printer::format_diagnostics(diagnostics));
            }
        }
    }
    Ok(())
}

fn run_explorer(
    source: String,
    unit: Node,
    diagnostics: Vec<Diagnostic>,
) -> Result<(), Box<dyn std::error::Error>> {
    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(source, unit, diagnostics);
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

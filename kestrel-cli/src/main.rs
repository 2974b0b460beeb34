//! Kestrel command line: inspect how a document tokenizes and what tree the
//! parser builds from it.
//!
//! Run with: cargo run --bin kestrel -- page.html
//!
//! Output:
//! - default: html5lib-style tree dump, followed by parse errors
//! - `--tokens`: the token stream instead of the tree
//! - `--json`: machine-readable tree or tokens

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use kestrel_dom::DomTree;
use kestrel_html::{
    HTMLTokenizer, HtmlError, HtmlInputStream, ParseError, ParserOptions, Parsed, Token,
    TreeNode, dump_tree, parse_document, parse_fragment,
};
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

/// Kestrel: tokenize and parse HTML the way a browser would
#[derive(Parser, Debug)]
#[command(name = "kestrel")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Dump the tree of a file
    kestrel ./index.html

    # Parse inline HTML
    kestrel --html '<p>1<p>2'

    # Parse as the contents of a <tr>
    kestrel --fragment tr --html '<td>x'

    # Show the token stream as JSON
    kestrel --tokens --json --html '<a href=x>y</a>'

    # Fail on the first parse error
    kestrel --strict ./index.html
"#)]
struct Cli {
    /// Path to an HTML file
    #[arg(value_name = "FILE")]
    path: Option<PathBuf>,

    /// Parse this HTML string instead of a file
    #[arg(long, value_name = "HTML", conflicts_with = "path")]
    html: Option<String>,

    /// Parse as a fragment inside this context element
    #[arg(long, value_name = "CONTEXT")]
    fragment: Option<String>,

    /// Decode with this encoding and ignore <meta charset>
    #[arg(long, value_name = "LABEL")]
    encoding: Option<String>,

    /// Stop at the first parse error
    #[arg(long)]
    strict: bool,

    /// Print tokens instead of the tree
    #[arg(long)]
    tokens: bool,

    /// Print only the parse errors
    #[arg(long, conflicts_with = "tokens")]
    errors: bool,

    /// Emit JSON instead of text
    #[arg(long)]
    json: bool,

    /// Log parser decisions to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let bytes = load_input(&cli)?;
    let mut options = ParserOptions::default();
    if let Some(ref label) = cli.encoding {
        options = options.with_encoding(label)?;
    }
    if cli.strict {
        options = options.with_strict_mode();
    }

    if cli.tokens {
        return print_tokens(&bytes, &options, cli.json);
    }

    let result = match cli.fragment {
        Some(ref context) => parse_fragment(&bytes, context, &options),
        None => parse_document(&bytes, &options),
    };
    let parsed = match result {
        Ok(parsed) => parsed,
        Err(HtmlError::Strict(error)) => {
            print_error(&error);
            anyhow::bail!("strict parse failed");
        }
        Err(error) => return Err(error.into()),
    };

    if cli.errors {
        print_errors(&parsed.errors);
        return Ok(());
    }
    if cli.json {
        print_json_tree(&parsed)?;
    } else {
        print_tree(&parsed);
    }
    Ok(())
}

/// Route tracing output to stderr, honouring `RUST_LOG` when it is set
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

/// Read the document bytes from CLI arguments
fn load_input(cli: &Cli) -> anyhow::Result<Vec<u8>> {
    if let Some(ref html) = cli.html {
        Ok(html.as_bytes().to_vec())
    } else if let Some(ref path) = cli.path {
        fs::read(path).map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))
    } else {
        anyhow::bail!("expected a file path or --html")
    }
}

/// Print the raw token stream. Parse errors are interleaved where they occur.
fn print_tokens(bytes: &[u8], options: &ParserOptions, json: bool) -> anyhow::Result<()> {
    let stream = HtmlInputStream::new(bytes, options.encoding);
    let tokens: Vec<Token> = HTMLTokenizer::new(stream).collect();
    if json {
        println!("{}", serde_json::to_string_pretty(&tokens)?);
        return Ok(());
    }
    for token in &tokens {
        match token {
            Token::ParseError(error) => print_error(error),
            other => println!("{other}"),
        }
    }
    Ok(())
}

fn print_tree(parsed: &Parsed<DomTree>) {
    println!("{}", "#document".bold());
    print!("{}", dump_tree(&parsed.tree, parsed.root));
    println!();
    println!(
        "{} {}, {} {}",
        "encoding:".dimmed(),
        parsed.encoding.name(),
        "mode:".dimmed(),
        parsed.quirks_mode
    );
    print_errors(&parsed.errors);
}

fn print_json_tree(parsed: &Parsed<DomTree>) -> anyhow::Result<()> {
    let root = TreeNode::from_dom(&parsed.tree, parsed.root)
        .ok_or_else(|| anyhow::anyhow!("parser returned an empty tree"))?;
    let output = serde_json::json!({
        "encoding": parsed.encoding.name(),
        "mode": parsed.quirks_mode,
        "tree": root,
        "errors": parsed.errors,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_errors(errors: &[ParseError]) {
    if errors.is_empty() {
        println!("{}", "no parse errors".green());
        return;
    }
    println!("{}", format!("{} parse error(s):", errors.len()).yellow().bold());
    for error in errors {
        print_error(error);
    }
}

fn print_error(error: &ParseError) {
    println!("  {} {}", "error".red().bold(), error);
}

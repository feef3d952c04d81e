mod config;

use std::error::Error;
use std::io::{self, IsTerminal};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use guide::DocumentStore;
use guide::parser::ParseError;
use tracing_subscriber::EnvFilter;
use viewer::{Format, Navigator, RenderOptions};

use crate::config::Config;

const DEFAULT_ADDR: &str = "127.0.0.1:7878";

#[derive(Parser)]
#[command(name = "cguide", version, about = "Reader for the bundled C style and security guides")]
struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Config file (default: ./cguide.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory of extra *.md guides; they replace bundled guides of the same name
    #[arg(long, global = true, value_name = "DIR")]
    docs_dir: Option<PathBuf>,

    /// More log output (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List available guides
    List(ListArgs),

    /// Render one guide to stdout
    Show(ShowArgs),

    /// Parse every guide and report diagnostics
    Check,

    /// Serve the guides as HTML over HTTP
    Serve(ServeArgs),
}

#[derive(clap::Args)]
struct ListArgs {
    /// Include titles and summaries
    #[arg(short, long)]
    long: bool,
}

#[derive(clap::Args)]
struct ShowArgs {
    /// Guide name (e.g. "style"); "docs/style.html" style paths also work
    name: String,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<FormatArg>,

    /// Emit a complete HTML page instead of a fragment
    #[arg(long)]
    standalone: bool,

    /// Width of horizontal rules in text output
    #[arg(long)]
    width: Option<usize>,
}

#[derive(clap::Args)]
struct ServeArgs {
    /// Listen address
    #[arg(long, value_name = "HOST:PORT")]
    addr: Option<SocketAddr>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Text,
    Html,
    Markdown,
}

impl From<FormatArg> for Format {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => Format::Text,
            FormatArg::Html => Format::Html,
            FormatArg::Markdown => Format::Markdown,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("error: {}", err);
            process::exit(1);
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<i32, Box<dyn Error>> {
    let config = Config::load(cli.config.as_deref())?;
    let color = !cli.no_color && config.color.unwrap_or(true);

    let docs_dir = cli.docs_dir.or(config.docs_dir.clone());
    let store = load_store(docs_dir.as_deref())?;

    if !matches!(cli.command, Command::Check) {
        let errors: Vec<&ParseError> = store.diagnostics().iter().filter(|d| d.is_error()).collect();
        emit_diagnostics(store.files(), errors, color);
    }

    match cli.command {
        Command::List(args) => {
            let mut stdout = io::stdout().lock();
            Navigator::new(&store).list(&mut stdout, args.long)?;
            Ok(0)
        }
        Command::Show(args) => do_show(&store, &config, args, color),
        Command::Check => Ok(do_check(&store, color)),
        Command::Serve(args) => {
            let addr = match args.addr.or(config.addr) {
                Some(addr) => addr,
                None => DEFAULT_ADDR.parse()?,
            };
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            runtime.block_on(viewer::server::serve(Arc::new(store), addr))?;
            Ok(0)
        }
    }
}

fn load_store(docs_dir: Option<&Path>) -> Result<DocumentStore, guide::StoreError> {
    let mut builder = DocumentStore::builder();
    builder.add_bundled();
    if let Some(dir) = docs_dir {
        builder.add_dir(dir)?;
    }
    Ok(builder.build())
}

fn do_show(
    store: &DocumentStore,
    config: &Config,
    args: ShowArgs,
    color: bool,
) -> Result<i32, Box<dyn Error>> {
    let format = args
        .format
        .map(Format::from)
        .or(config.format)
        .unwrap_or_default();
    let options = RenderOptions {
        color: color && io::stdout().is_terminal(),
        width: args
            .width
            .or(config.width)
            .unwrap_or(RenderOptions::default().width),
        standalone: args.standalone,
    };
    let renderer = format.renderer(&options);

    let mut stdout = io::stdout().lock();
    match Navigator::new(store).show(&args.name, &*renderer, &mut stdout) {
        Ok(_) => Ok(0),
        Err(err) if err.is_not_found() => {
            eprintln!("error: {}", err);
            Ok(1)
        }
        Err(err) => Err(err.into()),
    }
}

fn do_check(store: &DocumentStore, color: bool) -> i32 {
    emit_diagnostics(store.files(), store.diagnostics(), color);

    let (errors, warnings) = store
        .diagnostics()
        .iter()
        .fold((0, 0), |(e, w), d| if d.is_error() { (e + 1, w) } else { (e, w + 1) });
    if errors > 0 {
        eprintln!("error: {} error(s), {} warning(s)", errors, warnings);
        1
    } else {
        eprintln!("ok: {} guide(s), {} warning(s)", store.len(), warnings);
        0
    }
}

fn emit_diagnostics<'a>(
    files: &SimpleFiles<String, String>,
    diagnostics: impl IntoIterator<Item = &'a ParseError>,
    color: bool,
) {
    let color_choice = if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let writer = StandardStream::stderr(color_choice);
    let config = term::Config::default();
    for diagnostic in diagnostics {
        let _ = term::emit_to_write_style(
            &mut writer.lock(),
            &config,
            files,
            &diagnostic.to_diagnostic(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_accepts_format_and_width() {
        let cli = Cli::try_parse_from(["cguide", "show", "style", "--format", "html", "--width", "40"])
            .expect("parse args");
        let Command::Show(args) = cli.command else {
            panic!("expected show");
        };
        assert_eq!(args.name, "style");
        assert_eq!(args.format, Some(FormatArg::Html));
        assert_eq!(args.width, Some(40));
        assert!(!args.standalone);
    }

    #[test]
    fn global_flags_work_after_subcommand() {
        let cli = Cli::try_parse_from(["cguide", "list", "--no-color", "-vv", "--docs-dir", "guides"])
            .expect("parse args");
        assert!(cli.no_color);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.docs_dir, Some(PathBuf::from("guides")));
        assert!(matches!(cli.command, Command::List(ListArgs { long: false })));
    }

    #[test]
    fn serve_parses_socket_address() {
        let cli = Cli::try_parse_from(["cguide", "serve", "--addr", "0.0.0.0:9000"]).expect("parse args");
        let Command::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.addr, Some("0.0.0.0:9000".parse().unwrap()));
    }

    #[test]
    fn show_requires_a_name() {
        assert!(Cli::try_parse_from(["cguide", "show"]).is_err());
    }

    #[test]
    fn default_addr_is_valid() {
        assert!(DEFAULT_ADDR.parse::<SocketAddr>().is_ok());
    }
}

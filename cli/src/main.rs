mod test_runner;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use tracing::warn;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use mdnb::serializer::is_canonical;
use runner::{Controller, Settings};

const SUBCOMMANDS: &[&str] = &["cells", "fmt", "run", "check", "test", "help"];

#[derive(Parser)]
#[command(name = "mdnb", version, about = "Markdown notebooks: cells, fences and language actions")]
struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Log debug detail to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the cells parsed from a document
    Cells(CellsArgs),

    /// Rewrite a document in the form the serializer produces
    Fmt(FmtArgs),

    /// Run language actions on a document's code cells
    Run(RunArgs),

    /// Report fences that will not become code cells
    Check(CheckArgs),

    /// Run .test.md test files
    Test(TestArgs),
}

#[derive(clap::Args)]
struct CellsArgs {
    /// Markdown document
    file: String,

    /// Print cells as JSON instead of debug output
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
struct FmtArgs {
    /// Markdown document
    file: String,

    /// Exit 1 if the document is not already formatted
    #[arg(long, conflicts_with = "write")]
    check: bool,

    /// Write the result back to the file instead of stdout
    #[arg(short, long)]
    write: bool,
}

#[derive(clap::Args)]
struct RunArgs {
    /// Markdown document
    file: String,

    /// Settings file (defaults to mdnb.toml next to the document)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run only the cell at this index. Repeatable.
    #[arg(long = "cell")]
    cells: Vec<usize>,

    /// List code cells and their action labels without running them
    #[arg(long)]
    list: bool,

    /// Suppress action output (just check that the cells run)
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::Args)]
struct CheckArgs {
    /// Markdown document
    file: String,

    /// Exit 1 if there are any warnings
    #[arg(long)]
    deny_warnings: bool,
}

#[derive(clap::Args)]
struct TestArgs {
    /// Path to a .test.md file or directory containing them
    path: String,

    /// Run only tests in these categories (subfolder names). Repeatable.
    #[arg(short, long)]
    category: Vec<String>,

    /// List available categories and exit
    #[arg(long)]
    list_categories: bool,
}

fn main() {
    // `mdnb notes.md` means `mdnb run notes.md`.
    let mut args: Vec<String> = std::env::args().collect();
    if let Some(pos) = args
        .iter()
        .skip(1)
        .position(|a| !a.starts_with('-'))
        .map(|p| p + 1)
    {
        if !SUBCOMMANDS.contains(&args[pos].as_str()) {
            args.insert(pos, "run".to_string());
        }
    }

    let cli = Cli::parse_from(&args);
    init_logging(cli.verbose);

    match cli.command {
        Command::Cells(args) => do_cells(args),
        Command::Fmt(args) => do_fmt(args),
        Command::Run(args) => do_run(args),
        Command::Check(args) => do_check(args, cli.no_color),
        Command::Test(args) => {
            let path = Path::new(&args.path);
            if args.list_categories {
                test_runner::list_categories(path);
                return;
            }
            process::exit(test_runner::run_tests(path, cli.no_color, &args.category));
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn read_source(file: &str) -> String {
    match std::fs::read_to_string(file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", file, e);
            process::exit(1);
        }
    }
}

fn do_cells(args: CellsArgs) {
    let document = mdnb::parse(&read_source(&args.file));
    if args.json {
        match serde_json::to_string_pretty(&document) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("error: {}", e);
                process::exit(1);
            }
        }
    } else {
        println!("{:#?}", document);
    }
}

fn do_fmt(args: FmtArgs) {
    let source = read_source(&args.file);

    if args.check {
        if !is_canonical(&source) {
            eprintln!("{}: not formatted", args.file);
            process::exit(1);
        }
        return;
    }

    let formatted = mdnb::serialize(&mdnb::parse(&source));
    if args.write {
        if formatted != source {
            if let Err(e) = std::fs::write(&args.file, &formatted) {
                eprintln!("error: cannot write '{}': {}", args.file, e);
                process::exit(1);
            }
        }
    } else {
        print!("{}", formatted);
    }
}

fn do_run(args: RunArgs) {
    let source = read_source(&args.file);
    let document = mdnb::parse(&source);

    let settings = match &args.config {
        Some(path) => Settings::load(path),
        None => Settings::discover(Path::new(&args.file)),
    };
    let settings = match settings {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };
    let controller = Controller::activate(settings);

    if args.list {
        for (index, cell) in document.code_cells() {
            if let Some(item) = controller.status_item(cell) {
                println!("{:>3}  {:<12} {}", index, cell.language().unwrap_or_default(), item.text);
            }
        }
        controller.deactivate();
        return;
    }

    let indices: Vec<usize> = if args.cells.is_empty() {
        document.code_cells().map(|(i, _)| i).collect()
    } else {
        args.cells.clone()
    };
    for cell in indices.iter().filter_map(|&i| document.get(i)) {
        if let Some(language) = cell.language() {
            if !controller.supports(language) {
                warn!(language, "no controller support for language");
            }
        }
    }

    let actions = &controller.settings().language_actions;
    let result = if args.quiet {
        runner::execute_cells(&document, &indices, actions, &mut std::io::sink())
    } else {
        runner::execute_cells(&document, &indices, actions, &mut std::io::stdout())
    };
    controller.deactivate();

    if let Err(e) = result {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

fn do_check(args: CheckArgs, no_color: bool) {
    let source = read_source(&args.file);
    let warnings = mdnb::lint::lint(&source);

    let mut files = SimpleFiles::new();
    let file_id = files.add(args.file.clone(), source);

    let color_choice = if no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };
    let writer = StandardStream::stderr(color_choice);
    let config = term::Config::default();
    for warning in &warnings {
        let diagnostic = warning.to_diagnostic(file_id);
        let _ = term::emit_to_write_style(&mut writer.lock(), &config, &files, &diagnostic);
    }

    if warnings.is_empty() {
        eprintln!("ok: {} has no fence problems", args.file);
    } else if args.deny_warnings {
        process::exit(1);
    }
}

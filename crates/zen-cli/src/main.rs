use std::{path::PathBuf, process::ExitCode};

use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use zen::{HttpServer as _, ReplError, RunConfig, Repl, lex};

#[derive(Parser)]
#[command(name = "zen", version, about = "A small tree-walking interpreter.")]
struct Cli {
    /// Script file to execute. Omit to start the REPL.
    file: Option<PathBuf>,

    /// Directory searched first when resolving `import`.
    #[arg(long, value_name = "DIR")]
    module_path: Option<PathBuf>,

    /// Suppress the REPL's startup banner.
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Runs `start <ARGS...>` through the interpreter's own statement grammar,
    /// e.g. `zen start http-server port=8000 root=.` — mirrors the original
    /// interpreter's argv-to-statement reassembly rather than a separate flag set.
    Start {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Out of scope for this runtime: native compilation via an external toolchain.
    Compile {
        file: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        tcc: bool,
        #[arg(long)]
        gcc: bool,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    // Override clap's default `-V` so `-v`/`--version` matches the original `zenith` flag.
    let matches = Cli::command().mut_arg("version", |arg| arg.short('v')).get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|err| err.exit());

    let mut config = RunConfig::default();
    if let Some(module_path) = cli.module_path {
        config.module_path = module_path;
    }
    config.quiet = cli.quiet;

    let result = match cli.command {
        Some(Command::Start { args }) => run_start(config, &args),
        Some(Command::Compile { file, .. }) => {
            eprintln!("error: native compilation of '{}' is not supported by this runtime", file.display());
            return ExitCode::FAILURE;
        }
        None => match cli.file {
            Some(path) => run_file(config, &path),
            None => {
                Repl::new(config).run();
                Ok(())
            }
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run_file(config: RunConfig, path: &PathBuf) -> Result<(), ReplError> {
    let source = std::fs::read_to_string(path).map_err(|err| ReplError::ScriptRead {
        path: path.display().to_string(),
        message: err.to_string(),
    })?;
    let mut interp = zen::Interpreter::new(config);
    let tokens = lex(&source);
    interp.exec_program(&tokens);
    Ok(())
}

fn run_start(config: RunConfig, args: &[String]) -> Result<(), ReplError> {
    let source = format!("start {}", args.join(" "));
    let mut interp = zen::Interpreter::new(config);
    let tokens = lex(&source);
    interp.exec_program(&tokens);
    if interp.host.http.is_running() {
        println!("serving; press enter to stop");
        let mut line = String::new();
        let _ = std::io::stdin().read_line(&mut line);
        interp.host.http.stop();
    }
    Ok(())
}

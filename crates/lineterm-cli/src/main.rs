mod config;
mod error;
mod logger;
mod render;
mod session;
mod url;

use std::io::{self, BufRead, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use lineterm_core::EmulatorState;

use config::CliConfig;
use error::CliError;
use render::{RenderOptions, Renderer};
use session::{Control, Session};

#[derive(Parser)]
#[command(name = "lineterm")]
#[command(about = "A line-mode terminal emulator over a virtual filesystem")]
#[command(version)]
struct Cli {
    /// TOML file describing the filesystem, environment and extra commands
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run these lines instead of reading stdin
    #[arg(short = 'e', long = "command")]
    commands: Vec<String>,

    /// Print each execution's output records as JSON
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = logger::init(cli.verbose) {
        eprintln!("lineterm: cannot install logger: {}", err);
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("lineterm: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = match &cli.config {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::default(),
    };
    let state = EmulatorState::from_config(&config.terminal)?;

    let interactive = cli.commands.is_empty() && io::stdin().is_terminal();
    let options = RenderOptions {
        json: cli.json,
        echo_headers: !interactive,
        allowed_domains: config.host.allowed_domains.clone(),
    };
    let mut session = Session::new(state, Renderer::new(io::stdout(), io::stderr(), options));

    if !cli.commands.is_empty() {
        for line in &cli.commands {
            if session.handle(line)? == Control::Exit {
                break;
            }
        }
        return Ok(());
    }

    if interactive && let Some(banner) = &config.host.banner {
        println!("{}", banner);
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        if interactive {
            session.show_prompt()?;
        }
        let Some(line) = lines.next().transpose()? else {
            break;
        };
        if session.handle(&line)? == Control::Exit {
            break;
        }
    }

    log::debug!(
        "session: ended after {} lines",
        session.state().history().len()
    );
    Ok(())
}

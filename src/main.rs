use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;
use clap::Parser;
use renderer_cook::{Outcome, PathConfiguration, Pipeline};

#[derive(Parser)]
#[command(author, version, about = "Compile renderer shaders and stage runtime resources", long_about = None)]
struct Args {
    /// Solution directory the fixed resource layout is resolved against
    #[arg(long, default_value = "..")]
    solution_root: PathBuf,

    /// Exit immediately on failure instead of waiting for Enter
    #[arg(long)]
    no_pause: bool,
}

fn wait_for_acknowledgement() {
    println!("Press Enter to exit");
    let mut line = String::new();
    if let Err(err) = io::stdin().lock().read_line(&mut line) {
        log::warn!("Failed to read from stdin: {}", err);
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = PathConfiguration::from_solution_root(&args.solution_root);
    log::debug!("Using {:#?}", config);

    match Pipeline::new(&config).run() {
        Ok(Outcome::Staged { .. }) => ExitCode::SUCCESS,
        Ok(Outcome::CompileFailed(_)) => {
            if !args.no_pause {
                wait_for_acknowledgement();
            }
            ExitCode::from(1)
        }
        Err(err) => {
            log::error!("{:#}", err);
            ExitCode::from(2)
        }
    }
}

// src/main.rs

use paladin::{cli, config, logging, run, Outcome};

#[tokio::main]
async fn main() {
    match run_main().await {
        // Don't wait for children or pending restart timers.
        Ok(Outcome::Terminated(_)) => std::process::exit(0),
        Ok(Outcome::Completed) => {}
        Err(err) => {
            eprintln!("paladin error: {err:?}");
            std::process::exit(1);
        }
    }
}

async fn run_main() -> anyhow::Result<Outcome> {
    let args = cli::parse();
    let cfg = config::load_and_validate(&args.config)?;
    logging::init_logging(args.log_level, cfg.log_file.as_deref())?;
    Ok(run(&args, cfg).await?)
}

use anyhow::{Context, Result};
use clap::Parser;
use log::debug;

use roll_dev::cli::orchestration::ReleaseGate;
use roll_dev::cli::Args;
use roll_dev::config::{self, Config};
use roll_dev::domain::RollOutcome;
use roll_dev::git::Git2Repository;
use roll_dev::publish::{self, ArchivePublisher};
use roll_dev::ui::{self, TerminalPrompter};

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        // --help and --version print and exit 0
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            eprint!("{}", e.render());
            std::process::exit(1);
        }
    };

    init_logging(args.verbose);
    std::process::exit(run(&args));
}

/// `RUST_LOG` wins over the verbosity flag
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run(args: &Args) -> i32 {
    let (config, publisher, repo) = match prepare(args) {
        Ok(parts) => parts,
        Err(e) => {
            ui::display_error(&format!("{:#}", e));
            return 1;
        }
    };

    let prompter = TerminalPrompter::new();
    let gate = ReleaseGate::new(&config, &repo, publisher.as_ref(), &prompter);
    let outcome = gate.run(&args.roll_request());
    debug!("roll finished in state {}", gate.state());

    if let RollOutcome::Failed(e) = &outcome {
        ui::display_error(&e.to_string());
    }
    outcome.exit_code()
}

fn prepare(args: &Args) -> Result<(Config, Box<dyn ArchivePublisher>, Git2Repository)> {
    let config = config::load_config(args.config.as_deref())?;

    let publisher: Box<dyn ArchivePublisher> = match publish::from_config(config.publish.as_ref())
    {
        Ok(publisher) => publisher,
        // Printing the next version never publishes
        Err(e) if args.just_print => {
            debug!("publisher unavailable: {}", e);
            Box::new(publish::Unavailable::new(e.to_string()))
        }
        Err(e) => return Err(e.into()),
    };

    let repo = Git2Repository::open(".").context("Git repository error")?;
    Ok((config, publisher, repo))
}

//! Command-line surface

pub mod orchestration;

use std::path::PathBuf;

use crate::domain::IncrementLevel;
use orchestration::RollRequest;

#[derive(clap::Parser, Debug)]
#[command(
    name = "roll-dev",
    about = "Roll the dev channel: tag the next version, publish it and push it upstream"
)]
pub struct Args {
    /// Version component to increment: major, minor or patch (x, y and z also work)
    #[arg(long, value_name = "LEVEL", value_parser = parse_increment)]
    pub increment: IncrementLevel,

    /// Commit to roll [default: upstream.default_commit from the config]
    #[arg(long, value_name = "REF")]
    pub commit: Option<String>,

    /// Custom configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Only compute and print the next version
    #[arg(long)]
    pub just_print: bool,

    /// Log what every step does
    #[arg(short, long)]
    pub verbose: bool,
}

fn parse_increment(value: &str) -> Result<IncrementLevel, String> {
    value.parse::<IncrementLevel>().map_err(|e| e.to_string())
}

impl Args {
    pub fn roll_request(&self) -> RollRequest {
        RollRequest {
            increment: self.increment,
            commit: self.commit.clone(),
            just_print: self.just_print,
        }
    }
}

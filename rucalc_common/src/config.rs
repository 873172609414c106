//! Configuration loading shared by the rucalc orchestrator and agent.

use ::std::{fs::File, io::BufReader};

use ::clap::Parser;
use ::serde::de::DeserializeOwned;
use ::serde_json::from_reader;

use crate::error::{Result, RucalcError};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
/// Command line arguments for rucalc orchestrator and agent.
pub struct Args {
    /// path to the config file
    #[arg(long)]
    pub config_path: String,
}

impl Args {
    /// helper function for exporting the `clap::Parser::parse` function
    pub fn parse_args() -> Self {
        Args::parse()
    }
}

/// Load a json config file into `C`.
/// Any failure here is fatal: the binaries refuse to start with a broken config.
pub fn load_config<C: DeserializeOwned>(path: &str) -> Result<C> {
    let file = File::open(path).map_err(RucalcError::fail_to_load_config)?;
    let reader = BufReader::new(file);
    from_reader(reader).map_err(RucalcError::fail_to_load_config)
}

pub mod config;
pub mod dataset;
pub mod finalize;
pub mod inspect;
pub mod ledger;
pub mod session;

use anyhow::Result;
use config::Config;
use finalize::{FinalizeReport, Finalizer};
use session::Session;
use std::io::{BufRead, Write};

/// Run the interactive loop to completion, then the finalizer.
pub fn run<R: BufRead, W: Write>(config: &Config, input: R, output: W) -> Result<FinalizeReport> {
    let mut session = Session::new(input, output);
    session.run()?;
    let (mut ledger, mut output) = session.into_parts();

    let finalizer = Finalizer::new(config.files.clone(), config.finalize.clone());
    let report = finalizer.run(&mut ledger, &mut output)?;
    output.flush()?;
    Ok(report)
}

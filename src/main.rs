use std::io::Write;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use mnemokeys::cli::CliArgs;
use mnemokeys::Settings;

fn main() -> Result<ExitCode> {
    let args = CliArgs::parse();

    let settings = Settings::load();
    mnemokeys::tracing::init(&settings.log_level);
    tracing::debug!("Running {:?}", args.command);

    let output = args.run()?;
    std::io::stdout().write_all(output.text.as_bytes())?;

    Ok(if output.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

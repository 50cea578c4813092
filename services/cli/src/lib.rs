mod cli;
mod commands;
mod demo;
mod infra;

use upkeep::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}

mod cli;
mod infra;
mod routes;
mod server;

pub mod config;
pub mod error;
pub mod scheduling;
pub mod telemetry;
pub mod workflows;

use error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}

mod cli;
mod infra;
mod report;
mod routes;
mod server;
mod weights;

use settlement_readiness::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}

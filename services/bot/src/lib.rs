mod adapters;
mod cli;
mod demo;
mod infra;
mod routes;
mod server;

use fitlog::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}

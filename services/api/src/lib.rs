mod cli;
mod demo;
mod infra;
mod notify;
mod routes;
mod server;

use franchise_hub::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}

//! Schema migrations for the blog database.
//!
//! Reads `DATABASE_URL` (a `.env` file is honoured), e.g.
//! `cargo run -p migration -- up` or `-- fresh`.

use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter("info,sea_orm_migration=info")
        .init();

    cli::run_cli(migration::Migrator).await;
}

//! Fills the four lookup tables with the default steel categories.
//! Safe to run repeatedly.

use anyhow::Context;
use cadastro_aco::{db::PgRepository, init_tracing, seed::seed_categorias};

async fn run() -> anyhow::Result<()> {
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let db = sqlx::postgres::PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
        .context("connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .context("run migrations")?;

    let repo = PgRepository::new(db.clone());
    seed_categorias(&repo).await?;
    db.close().await;
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    if let Err(e) = run().await {
        tracing::error!(error = ?e, "seed failed");
        std::process::exit(1);
    }
    tracing::info!("seed finished");
}

use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::{dotenv, var};
use kabuka_warehouse::{Config, Dashboard, MarketData, PriceFetcher, Yahoo};
use std::sync::Arc;

mod api;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // one dashboard, and so one price cache, for every worker
    let config = Config::from_env()?;
    let source: Arc<dyn MarketData> = Arc::new(Yahoo::with_user_agent(&config.user_agent)?);
    let fetcher = PriceFetcher::new(source)
        .policy(config.policy)
        .concurrency(config.concurrency);
    let dashboard: web::Data<api::AppDashboard> =
        web::Data::new(Dashboard::new(config.symbols()?, fetcher));
    log::info!(
        "charting {} companies: {:?}",
        dashboard.symbols().len(),
        dashboard.symbols().names().collect::<Vec<_>>()
    );

    // run server
    let bind = var("KABUKA_BIND").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    log::info!("listening on http://{bind}");
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(dashboard.clone())
            .configure(api::configure)
    })
    .bind(bind)?
    .run()
    .await?;

    Ok(())
}

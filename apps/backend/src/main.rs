use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use pickban::config::{Config, MatchRules};
use pickban::export::{ExportQueue, LogExporter, MatchExporter, RetryPolicy, WebhookExporter};
use pickban::middleware::cors::cors_middleware;
use pickban::middleware::request_trace::RequestTrace;
use pickban::middleware::structured_logger::StructuredLogger;
use pickban::routes;
use pickban::state::app_state::AppState;
use pickban::state::security_config::SecurityConfig;
use tracing::info;

mod telemetry;

fn exit_with(message: impl std::fmt::Display) -> ! {
    eprintln!("❌ {message}");
    std::process::exit(1);
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    // Environment variables must be set by the runtime environment
    // (docker env_file, systemd unit, or a sourced .env locally).
    let config = Config::from_env().unwrap_or_else(|e| exit_with(e));

    let rules = MatchRules::load(config.rules_path.as_deref()).unwrap_or_else(|e| exit_with(e));
    info!(
        rules = config
            .rules_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "built-in".to_string()),
        turn_timer_secs = rules.turn_timer_secs,
        "Match rules loaded"
    );

    let exporter: Arc<dyn MatchExporter> = match &config.export_url {
        Some(url) => Arc::new(WebhookExporter::new(url.clone()).unwrap_or_else(|e| exit_with(e))),
        None => Arc::new(LogExporter),
    };
    let exports = ExportQueue::spawn(exporter, RetryPolicy::default());

    let security = SecurityConfig::new(config.jwt_secret.as_bytes())
        .with_referee_role(config.referee_role.clone());
    let data = web::Data::new(AppState::new(security, rules, exports));

    println!(
        "🚀 Starting pickban on http://{}:{}",
        config.host, config.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(cors_middleware())
            .wrap(StructuredLogger)
            .wrap(RequestTrace)
            .app_data(data.clone())
            .route("/", web::get().to(routes::health::root))
            .configure(routes::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}

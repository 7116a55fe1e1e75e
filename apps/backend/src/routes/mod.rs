use actix_web::web;

pub mod health;
pub mod matches;

/// Register every route. `main.rs` wraps the result in the request
/// middlewares; tests mount it bare.
pub fn configure(cfg: &mut web::ServiceConfig) {
    // Health check: /health
    cfg.service(web::scope("/health").configure(health::configure_routes));

    // Match routes: /api/matches/**
    cfg.service(web::scope("/api/matches").configure(matches::configure_routes));

    // Spectator feed: /ws/matches/{match_id}
    cfg.service(
        web::resource("/ws/matches/{match_id}").route(web::get().to(crate::ws::session::upgrade)),
    );
}

use actix_http::Request;
use actix_web::body::BoxBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test, web, App, Error};
use pickban::middleware::request_trace::RequestTrace;
use pickban::middleware::structured_logger::StructuredLogger;
use pickban::routes;
use pickban::state::app_state::AppState;

/// Test service with production routes and the request middlewares.
///
/// `AppState` is cheap to clone; keep a clone to inspect the registry.
pub async fn create_test_app(
    state: AppState,
) -> impl Service<Request, Response = ServiceResponse<BoxBody>, Error = Error> {
    test::init_service(
        App::new()
            .wrap(StructuredLogger)
            .wrap(RequestTrace)
            .app_data(web::Data::new(state))
            .configure(routes::configure),
    )
    .await
}

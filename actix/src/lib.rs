//! Actix Web middleware for Private Captcha verification
//!
//! Wraps a downstream service and verifies the captcha solution carried by
//! each inbound request. On verification failure the middleware
//! short-circuits with the configured status code and a minimal plain-text
//! body; the downstream service is never invoked and verification error
//! details never reach the response.
//!
//! The middleware reads the solution from query-string parameters only.
//! Buffering and replaying request payloads is out of its scope, so for
//! form-POST flows extract the field in the handler (where the body is
//! already deserialized) and call [`Client::verify_request`] with a
//! [`CaptchaRequest`] view of the form data — a `HashMap<String, String>`
//! of the form fields works as-is.
//!
//! ## Example
//!
//! ```no_run
//! use actix_web::{web, App, HttpServer};
//! use pc_actix::CaptchaProtection;
//! use pc_core::Config;
//!
//! # async fn run() -> std::io::Result<()> {
//! let protection = CaptchaProtection::new(Config::new("my-api-key"))
//!     .expect("captcha client");
//!
//! HttpServer::new(move || {
//!     App::new()
//!         .wrap(protection.clone())
//!         .route("/submit", web::post().to(|| async { "ok" }))
//! })
//! .bind(("127.0.0.1", 8080))?
//! .run()
//! .await
//! # }
//! ```

use std::collections::HashMap;
use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::Arc;

use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::StatusCode,
    web::Query,
    Error, HttpResponse,
};
use futures_util::future::LocalBoxFuture;
use tracing::debug;

use pc_core::{CaptchaRequest, Client, Config};

/// Query-string view of an inbound request, read through the adapter's
/// parameter-map capability.
struct QueryParams<'a>(&'a ServiceRequest);

impl CaptchaRequest for QueryParams<'_> {
    fn lookup_by_key(&self, key: &str) -> Option<String> {
        Query::<HashMap<String, String>>::from_query(self.0.query_string())
            .ok()
            .and_then(|params| params.get(key).cloned())
    }
}

/// Captcha verification middleware factory
///
/// Owns one verification client for its lifetime, built once at
/// construction. The API key is mandatory; all other settings keep their
/// engine defaults unless overridden on the [`Config`].
///
/// The solution is read from the query string; see the module docs for
/// handling form-POST bodies.
#[derive(Clone)]
pub struct CaptchaProtection {
    client: Arc<Client>,
}

impl CaptchaProtection {
    /// Build the middleware and its verification client from settings.
    pub fn new(config: Config) -> Result<Self, pc_core::Error> {
        Ok(Self {
            client: Arc::new(Client::new(config)?),
        })
    }

    /// Build the middleware around a pre-built client.
    pub fn with_client(client: Arc<Client>) -> Self {
        Self { client }
    }
}

impl<S, B> Transform<S, ServiceRequest> for CaptchaProtection
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = CaptchaProtectionMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(CaptchaProtectionMiddleware {
            service: Rc::new(service),
            client: Arc::clone(&self.client),
        }))
    }
}

/// Captcha verification middleware service
pub struct CaptchaProtectionMiddleware<S> {
    service: Rc<S>,
    client: Arc<Client>,
}

impl<S, B> Service<ServiceRequest> for CaptchaProtectionMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let client = Arc::clone(&self.client);

        Box::pin(async move {
            match client.verify_request(&QueryParams(&req)).await {
                Ok(_) => {
                    // Verified: forward the request unchanged
                    let response = service.call(req).await?;
                    Ok(response.map_into_left_body())
                }
                Err(error) => {
                    debug!(error = %error, path = req.path(), "captcha verification rejected request");

                    let status = StatusCode::from_u16(client.config().failed_status_code)
                        .unwrap_or(StatusCode::FORBIDDEN);
                    let reason = status.canonical_reason().unwrap_or("Forbidden");
                    let response = HttpResponse::build(status)
                        .content_type("text/plain")
                        .body(reason);

                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, web, App};
    use pc_core::{MockTransport, WireResponse};

    const SUCCESS_BODY: &str = r#"{"success": true, "code": 0}"#;

    async fn test_handler() -> HttpResponse {
        HttpResponse::Ok().json(serde_json::json!({
            "status": "ok"
        }))
    }

    fn protection_with(transport: Arc<MockTransport>, config: Config) -> CaptchaProtection {
        let client = Client::with_transport(config, transport).expect("client construction");
        CaptchaProtection::with_client(Arc::new(client))
    }

    #[actix_web::test]
    async fn test_missing_solution_short_circuits_with_default_status() {
        let transport = Arc::new(MockTransport::new());
        let protection = protection_with(transport.clone(), Config::new("test-key"));

        let app = test::init_service(
            App::new()
                .wrap(protection)
                .route("/submit", web::post().to(test_handler)),
        )
        .await;

        let req = test::TestRequest::post().uri("/submit").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        // The empty solution never reaches the network
        assert_eq!(transport.calls(), 0);
    }

    #[actix_web::test]
    async fn test_custom_failed_status_code() {
        let transport = Arc::new(MockTransport::new());
        let protection = protection_with(
            transport,
            Config::new("test-key").with_failed_status_code(418),
        );

        let app = test::init_service(
            App::new()
                .wrap(protection)
                .route("/submit", web::post().to(test_handler)),
        )
        .await;

        let req = test::TestRequest::post().uri("/submit").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::IM_A_TEAPOT);
    }

    #[actix_web::test]
    async fn test_verified_request_reaches_handler() {
        let transport = Arc::new(MockTransport::new());
        transport.push_response(WireResponse::new(200, SUCCESS_BODY));
        let protection = protection_with(transport.clone(), Config::new("test-key"));

        let app = test::init_service(
            App::new()
                .wrap(protection)
                .route("/submit", web::post().to(test_handler)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/submit?private-captcha-solution=payload")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.status().is_success());
        assert_eq!(transport.calls(), 1);
    }

    #[actix_web::test]
    async fn test_rejected_solution_short_circuits() {
        let transport = Arc::new(MockTransport::new());
        transport.push_response(WireResponse::new(200, r#"{"success": false, "code": 3}"#));
        let protection = protection_with(transport, Config::new("test-key"));

        let app = test::init_service(
            App::new()
                .wrap(protection)
                .route("/submit", web::post().to(test_handler)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/submit?private-captcha-solution=payload")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let body = test::read_body(resp).await;
        // Minimal body describing the status, no verification details
        assert_eq!(body, "Forbidden");
    }

    #[actix_web::test]
    async fn test_custom_form_field() {
        let transport = Arc::new(MockTransport::new());
        transport.push_response(WireResponse::new(200, SUCCESS_BODY));
        let protection = protection_with(
            transport,
            Config::new("test-key").with_form_field("my-captcha"),
        );

        let app = test::init_service(
            App::new()
                .wrap(protection)
                .route("/submit", web::post().to(test_handler)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/submit?my-captcha=payload")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.status().is_success());
    }
}

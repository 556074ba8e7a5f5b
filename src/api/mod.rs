/// HTTP request handlers.
pub mod handlers;
/// Router construction.
pub mod routes;

use crate::types::{Account, AuthResponse, CredentialsRequest, HealthResponse, UserResponse};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// OpenAPI document for the HTTP surface.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::me,
        handlers::auth::health,
    ),
    components(schemas(Account, CredentialsRequest, AuthResponse, UserResponse, HealthResponse)),
    modifiers(&BearerSecurity),
    tags(
        (name = "auth", description = "Registration, login and token verification"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;

struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

//! OpenAPI specification and Swagger UI

use axum::http::header;
use axum::response::{Html, IntoResponse, Json};
use utoipa::OpenApi;

use crate::api::routes::{auth, generate, health, users};
use crate::api::types::ErrorBody;
use crate::data::types::UserRole;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Holonet API",
        version = env!("CARGO_PKG_VERSION"),
        description = "Star Wars holonet: accounts, character biographies and short stories"
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "auth", description = "Login, logout and session status"),
        (name = "users", description = "User administration"),
        (name = "generate", description = "Biography and story generation")
    ),
    paths(
        // Health
        health::health,
        // Auth
        auth::login,
        auth::auth_status,
        auth::logout,
        // Users
        users::list_users,
        users::create_user,
        users::get_current_user,
        users::get_user,
        users::update_user,
        users::delete_user,
        // Generation
        generate::pick_character,
        generate::generate_biography,
        generate::generate_story,
    ),
    components(schemas(
        ErrorBody,
        UserRole,
        // Health
        health::HealthResponse,
        // Auth
        auth::LoginRequest,
        auth::LoginResponse,
        auth::LogoutResponse,
        auth::AuthStatusResponse,
        // Users
        users::types::UserDto,
        users::types::CreateUserRequest,
        users::types::UpdateUserRequest,
        // Generation
        generate::types::CharacterResponse,
        generate::types::BiographyRequest,
        generate::types::BiographyResponse,
        generate::types::StoryRequest,
        generate::types::StoryResponse,
    ))
)]
pub struct ApiDoc;

/// Serve OpenAPI JSON specification
pub async fn openapi_json() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json")],
        Json(ApiDoc::openapi()),
    )
}

/// Serve Swagger UI from CDN
pub async fn swagger_ui_html() -> Html<&'static str> {
    Html(SWAGGER_UI_HTML)
}

const SWAGGER_UI_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Holonet API Documentation</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
    <style>
        html { box-sizing: border-box; overflow-y: scroll; }
        *, *:before, *:after { box-sizing: inherit; }
        body { margin: 0; background: #fafafa; }
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script>
        window.onload = () => {
            window.ui = SwaggerUIBundle({
                url: "/api/openapi.json",
                dom_id: '#swagger-ui',
                deepLinking: true
            });
        };
    </script>
</body>
</html>"#;

//! Biography and short-story generation endpoints

pub mod types;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::auth::Auth;
use crate::api::extractors::ValidatedJson;
use crate::api::types::ApiError;
use crate::domain::GenerationService;
use crate::domain::generation::random_character;

use types::{
    BiographyRequest, BiographyResponse, CharacterResponse, StoryRequest, StoryResponse,
};

#[derive(Clone)]
pub struct GenerateApiState {
    pub generation: GenerationService,
}

/// Build generation routes
pub fn routes(generation: GenerationService) -> Router<()> {
    let state = GenerateApiState { generation };

    Router::new()
        .route("/character", get(pick_character))
        .route("/biography", post(generate_biography))
        .route("/story", post(generate_story))
        .with_state(state)
}

/// Pick a random character from the roster
#[utoipa::path(
    get,
    path = "/api/v1/generate/character",
    tag = "generate",
    responses(
        (status = 200, description = "Random character", body = CharacterResponse)
    )
)]
pub async fn pick_character(_auth: Auth) -> Json<CharacterResponse> {
    Json(CharacterResponse {
        character: random_character().to_string(),
    })
}

/// Generate a character biography
#[utoipa::path(
    post,
    path = "/api/v1/generate/biography",
    tag = "generate",
    request_body = BiographyRequest,
    responses(
        (status = 200, description = "Generated biography", body = BiographyResponse),
        (status = 400, description = "Blank character"),
        (status = 502, description = "Completion API failed"),
        (status = 503, description = "Generation not configured")
    )
)]
pub async fn generate_biography(
    State(state): State<GenerateApiState>,
    auth: Auth,
    ValidatedJson(request): ValidatedJson<BiographyRequest>,
) -> Result<Json<BiographyResponse>, ApiError> {
    let character = request.character.trim().to_string();
    tracing::debug!(user_id = auth.ctx.user_id, %character, "Biography requested");

    let biography = state.generation.biography(&character).await?;

    Ok(Json(BiographyResponse {
        character,
        biography,
    }))
}

/// Generate a short story
#[utoipa::path(
    post,
    path = "/api/v1/generate/story",
    tag = "generate",
    request_body = StoryRequest,
    responses(
        (status = 200, description = "Generated story", body = StoryResponse),
        (status = 502, description = "Completion API failed"),
        (status = 503, description = "Generation not configured")
    )
)]
pub async fn generate_story(
    State(state): State<GenerateApiState>,
    auth: Auth,
    ValidatedJson(request): ValidatedJson<StoryRequest>,
) -> Result<Json<StoryResponse>, ApiError> {
    tracing::debug!(user_id = auth.ctx.user_id, "Story requested");

    let story = state.generation.story(request.theme.as_deref()).await?;

    Ok(Json(StoryResponse { story }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::*;
    use crate::data::types::UserRole;
    use crate::domain::generation::CHARACTERS;
    use crate::domain::generation::tests::StubProvider;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    async fn router_with(generation: GenerationService) -> (Router, String) {
        let repo = user_repo().await;
        let manager = auth_manager();
        let user = seed_user(&repo, "ahsoka", "snips", UserRole::User).await;
        let cookie = session_cookie(&manager, &user);
        (protect(routes(generation), manager, repo), cookie)
    }

    #[tokio::test]
    async fn test_character_from_roster() {
        let (router, cookie) = router_with(GenerationService::disabled()).await;
        let response = router
            .oneshot(empty_request("GET", "/character", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let name = body["character"].as_str().unwrap();
        assert!(CHARACTERS.contains(&name));
    }

    #[tokio::test]
    async fn test_requires_session() {
        let (router, _) = router_with(GenerationService::disabled()).await;
        let response = router
            .oneshot(json_request("POST", "/story", None, "{}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_biography_success() {
        let stub = StubProvider::ok();
        let (router, cookie) =
            router_with(GenerationService::with_provider(stub.clone())).await;

        let response = router
            .oneshot(json_request(
                "POST",
                "/biography",
                Some(&cookie),
                r#"{"character":"  Yoda "}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["character"], "Yoda");
        assert!(body["biography"].as_str().unwrap().contains("Yoda"));

        let requests = stub.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].max_tokens, 800);
    }

    #[tokio::test]
    async fn test_biography_blank_character() {
        let stub = StubProvider::ok();
        let (router, cookie) =
            router_with(GenerationService::with_provider(stub.clone())).await;

        let response = router
            .oneshot(json_request(
                "POST",
                "/biography",
                Some(&cookie),
                r#"{"character":"   "}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(stub.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_story_with_and_without_theme() {
        let stub = StubProvider::ok();
        let (router, cookie) =
            router_with(GenerationService::with_provider(stub.clone())).await;

        let themed = router
            .clone()
            .oneshot(json_request(
                "POST",
                "/story",
                Some(&cookie),
                r#"{"theme":"la bataille de Hoth"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(themed.status(), StatusCode::OK);
        assert!(body_json(themed).await["story"]
            .as_str()
            .unwrap()
            .contains("la bataille de Hoth"));

        let plain = router
            .oneshot(json_request("POST", "/story", Some(&cookie), "{}"))
            .await
            .unwrap();
        assert_eq!(plain.status(), StatusCode::OK);

        let requests = stub.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].max_tokens, 1200);
        assert!(!requests[1].prompt.contains("sur le thème suivant"));
    }

    #[tokio::test]
    async fn test_upstream_failure_is_bad_gateway() {
        let (router, cookie) =
            router_with(GenerationService::with_provider(StubProvider::failing())).await;
        let response = router
            .oneshot(json_request("POST", "/story", Some(&cookie), "{}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(response).await;
        assert_eq!(body["code"], "GENERATION_FAILED");
        assert!(body["message"].as_str().unwrap().contains("upstream exploded"));
    }

    #[tokio::test]
    async fn test_disabled_is_service_unavailable() {
        let (router, cookie) = router_with(GenerationService::disabled()).await;
        let response = router
            .oneshot(json_request(
                "POST",
                "/biography",
                Some(&cookie),
                r#"{"character":"Grogu"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_json(response).await["code"], "GENERATION_UNAVAILABLE");
    }
}

use serde_json::{Value, json};

use crate::common::{TestApp, routes};

fn deepseek() -> Value {
    json!({
        "name": "deepseek",
        "mode": "openai",
        "base_url": "https://api.deepseek.com/v1",
        "api_key": "sk-0123456789abcdef",
    })
}

mod create {
    use super::*;

    #[tokio::test]
    async fn owner_can_register_a_provider() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "password123").await;
        let user_id = app.user_id(&token).await;

        let res = app.post_with_token(routes::PROVIDERS, &deepseek(), &token).await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["name"], "deepseek");
        assert_eq!(res.body["mode"], "openai");
        assert_eq!(res.body["owner_id"], user_id);
        assert_eq!(res.body["api_key_hint"], "****cdef");
        assert!(res.body["api_key"].is_null());
        assert!(!res.text.contains("sk-0123456789abcdef"));
    }

    #[tokio::test]
    async fn duplicate_name_for_the_same_owner_is_a_conflict() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "password123").await;
        let first = app.post_with_token(routes::PROVIDERS, &deepseek(), &token).await;
        assert_eq!(first.status, 201, "{}", first.text);

        let res = app.post_with_token(routes::PROVIDERS, &deepseek(), &token).await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn different_owners_may_reuse_a_name() {
        let app = TestApp::spawn().await;
        let alice = app.create_authenticated_user("alice", "password123").await;
        let bob = app.create_authenticated_user("bob", "password123").await;

        let res = app.post_with_token(routes::PROVIDERS, &deepseek(), &alice).await;
        assert_eq!(res.status, 201, "{}", res.text);
        let res = app.post_with_token(routes::PROVIDERS, &deepseek(), &bob).await;
        assert_eq!(res.status, 201, "{}", res.text);
    }

    #[tokio::test]
    async fn unknown_mode_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "password123").await;
        let mut body = deepseek();
        body["mode"] = json!("carrier-pigeon");

        let res = app.post_with_token(routes::PROVIDERS, &body, &token).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn relative_base_url_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "password123").await;
        let mut body = deepseek();
        body["base_url"] = json!("/v1");

        let res = app.post_with_token(routes::PROVIDERS, &body, &token).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn creating_without_a_token_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.post_without_token(routes::PROVIDERS, &deepseek()).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }
}

mod read {
    use super::*;

    #[tokio::test]
    async fn list_shows_only_the_callers_providers() {
        let app = TestApp::spawn().await;
        let alice = app.create_authenticated_user("alice", "password123").await;
        let bob = app.create_authenticated_user("bob", "password123").await;
        let mut ollama = deepseek();
        ollama["name"] = json!("local");
        ollama["mode"] = json!("ollama");
        ollama["base_url"] = json!("http://localhost:11434");
        app.post_with_token(routes::PROVIDERS, &deepseek(), &alice).await;
        app.post_with_token(routes::PROVIDERS, &ollama, &alice).await;
        app.post_with_token(routes::PROVIDERS, &deepseek(), &bob).await;

        let res = app.get_with_token(routes::PROVIDERS, &alice).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["pagination"]["total"], 2);
        assert_eq!(res.body["data"][0]["name"], "deepseek");
        assert_eq!(res.body["data"][1]["name"], "local");
    }

    #[tokio::test]
    async fn foreign_provider_is_not_found() {
        let app = TestApp::spawn().await;
        let alice = app.create_authenticated_user("alice", "password123").await;
        let bob = app.create_authenticated_user("bob", "password123").await;
        let id = app
            .post_with_token(routes::PROVIDERS, &deepseek(), &alice)
            .await
            .id();

        let res = app.get_with_token(&routes::provider(id), &bob).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}

mod update {
    use super::*;

    #[tokio::test]
    async fn owner_can_rotate_the_key() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "password123").await;
        let id = app
            .post_with_token(routes::PROVIDERS, &deepseek(), &token)
            .await
            .id();

        let res = app
            .patch_with_token(
                &routes::provider(id),
                &json!({"api_key": "sk-rotated-key-9999"}),
                &token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["api_key_hint"], "****9999");
        assert_eq!(res.body["name"], "deepseek");
    }

    #[tokio::test]
    async fn rename_onto_an_existing_name_is_a_conflict() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "password123").await;
        app.post_with_token(routes::PROVIDERS, &deepseek(), &token).await;
        let mut other = deepseek();
        other["name"] = json!("qwen");
        let id = app.post_with_token(routes::PROVIDERS, &other, &token).await.id();

        let res = app
            .patch_with_token(&routes::provider(id), &json!({"name": "deepseek"}), &token)
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn foreign_provider_cannot_be_updated() {
        let app = TestApp::spawn().await;
        let alice = app.create_authenticated_user("alice", "password123").await;
        let bob = app.create_authenticated_user("bob", "password123").await;
        let id = app
            .post_with_token(routes::PROVIDERS, &deepseek(), &alice)
            .await
            .id();

        let res = app
            .patch_with_token(&routes::provider(id), &json!({"name": "mine"}), &bob)
            .await;

        assert_eq!(res.status, 404);
    }
}

mod delete {
    use super::*;

    #[tokio::test]
    async fn owner_can_delete_a_provider() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "password123").await;
        let id = app
            .post_with_token(routes::PROVIDERS, &deepseek(), &token)
            .await
            .id();

        let res = app.delete_with_token(&routes::provider(id), &token).await;
        assert_eq!(res.status, 204, "{}", res.text);

        let res = app.get_with_token(&routes::provider(id), &token).await;
        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn deleting_a_foreign_provider_is_not_found() {
        let app = TestApp::spawn().await;
        let alice = app.create_authenticated_user("alice", "password123").await;
        let bob = app.create_authenticated_user("bob", "password123").await;
        let id = app
            .post_with_token(routes::PROVIDERS, &deepseek(), &alice)
            .await
            .id();

        let res = app.delete_with_token(&routes::provider(id), &bob).await;
        assert_eq!(res.status, 404);

        let res = app.get_with_token(&routes::provider(id), &alice).await;
        assert_eq!(res.status, 200);
    }
}

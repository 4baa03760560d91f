use actix_web::{App, test, web};
use std::sync::Arc;
use todo_api::application::auth_service::AuthService;
use todo_api::application::todo_service::TodoService;
use todo_api::data::todo_repository::InMemoryTodoRepository;
use todo_api::data::user_repository::InMemoryUserRepository;
use todo_api::domain::user::CreateUser;
use todo_api::presentation::handlers::{
    AppState, create_todo, delete_todo, list_todos, update_todo,
};
use todo_api::presentation::middleware::JwtAuthMiddleware;

// Registers two users and returns their tokens alongside the app, so
// cross-user ownership can be exercised.
macro_rules! setup_todo_test {
    () => {{
        let user_repository = Arc::new(InMemoryUserRepository::new());
        let todo_repository = Arc::new(InMemoryTodoRepository::new());
        let jwt_secret = "test-secret-key-for-todo-tests".to_string();
        let auth_service = Arc::new(AuthService::new(user_repository, jwt_secret));

        let (_, token_a) = auth_service
            .register(CreateUser {
                name: "Alice".to_string(),
                email: "alice@example.com".to_string(),
                password: "password-a".to_string(),
            })
            .await
            .unwrap();
        let (_, token_b) = auth_service
            .register(CreateUser {
                name: "Bob".to_string(),
                email: "bob@example.com".to_string(),
                password: "password-b".to_string(),
            })
            .await
            .unwrap();

        let state = web::Data::new(AppState {
            todo_service: TodoService::new(todo_repository),
            auth_service: auth_service.clone(),
        });

        let app = test::init_service(
            App::new().app_data(state.clone()).service(
                web::scope("/api/todos")
                    .wrap(JwtAuthMiddleware::new(auth_service))
                    .route("", web::get().to(list_todos))
                    .route("", web::post().to(create_todo))
                    .route("/{id}", web::put().to(update_todo))
                    .route("/{id}", web::delete().to(delete_todo)),
            ),
        )
        .await;

        (app, token_a, token_b)
    }};
}

fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

macro_rules! create {
    ($app:expr, $token:expr, $body:expr $(,)?) => {{
        let req = test::TestRequest::post()
            .uri("/api/todos")
            .insert_header(bearer($token))
            .set_json($body)
            .to_request();
        let resp = test::call_service($app, req).await;
        assert_eq!(resp.status(), 201);
        let body: serde_json::Value = test::read_body_json(resp).await;
        body
    }};
}

#[actix_web::test]
async fn test_list_is_empty_for_fresh_user() {
    let (app, token, _) = setup_todo_test!();

    let req = test::TestRequest::get()
        .uri("/api/todos")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 0);
    assert_eq!(body["todos"].as_array().unwrap().len(), 0);
}

#[actix_web::test]
async fn test_create_defaults_and_newest_first_ordering() {
    let (app, token, _) = setup_todo_test!();

    let body = create!(
        &app,
        &token,
        serde_json::json!({"title": "Buy milk", "priority": "high"}),
    );
    assert_eq!(body["todo"]["completed"], false);
    assert_eq!(body["todo"]["priority"], "high");

    create!(&app, &token, serde_json::json!({"title": "Walk dog"}));

    let req = test::TestRequest::get()
        .uri("/api/todos")
        .insert_header(bearer(&token))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["count"], 2);
    assert_eq!(body["todos"][0]["title"], "Walk dog");
    assert_eq!(body["todos"][1]["title"], "Buy milk");
    // The most recent create always lands first
    assert_eq!(body["todos"][1]["priority"], "high");
    assert_eq!(body["todos"][0]["priority"], "medium");
}

#[actix_web::test]
async fn test_create_empty_title_is_rejected() {
    let (app, token, _) = setup_todo_test!();

    let req = test::TestRequest::post()
        .uri("/api/todos")
        .insert_header(bearer(&token))
        .set_json(serde_json::json!({"title": "   "}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Title is required");
}

#[actix_web::test]
async fn test_partial_update_leaves_absent_fields() {
    let (app, token, _) = setup_todo_test!();

    let created = create!(
        &app,
        &token,
        serde_json::json!({
            "title": "Report",
            "description": "Q3 numbers",
            "priority": "high",
            "dueDate": "2026-09-15"
        }),
    );
    let id = created["todo"]["id"].as_str().unwrap();

    let req = test::TestRequest::put()
        .uri(&format!("/api/todos/{}", id))
        .insert_header(bearer(&token))
        .set_json(serde_json::json!({"completed": true}))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["todo"]["completed"], true);
    assert_eq!(body["todo"]["title"], "Report");
    assert_eq!(body["todo"]["description"], "Q3 numbers");
    assert_eq!(body["todo"]["priority"], "high");
    assert_eq!(body["todo"]["dueDate"], "2026-09-15");
}

#[actix_web::test]
async fn test_explicit_null_clears_nullable_field() {
    let (app, token, _) = setup_todo_test!();

    let created = create!(
        &app,
        &token,
        serde_json::json!({"title": "Call", "description": "about invoice"}),
    );
    let id = created["todo"]["id"].as_str().unwrap();

    let req = test::TestRequest::put()
        .uri(&format!("/api/todos/{}", id))
        .insert_header(bearer(&token))
        .set_json(serde_json::json!({"description": null}))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    // Cleared description is omitted from the wire form entirely
    assert!(body["todo"].get("description").is_none());
    assert_eq!(body["todo"]["title"], "Call");
}

#[actix_web::test]
async fn test_toggle_completed_twice_restores_original() {
    let (app, token, _) = setup_todo_test!();

    let created = create!(&app, &token, serde_json::json!({"title": "Toggle me"}));
    let id = created["todo"]["id"].as_str().unwrap().to_string();

    for expected in [true, false] {
        let req = test::TestRequest::put()
            .uri(&format!("/api/todos/{}", id))
            .insert_header(bearer(&token))
            .set_json(serde_json::json!({"completed": expected}))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["todo"]["completed"], expected);
    }
}

#[actix_web::test]
async fn test_other_users_todo_is_invisible_and_untouchable() {
    let (app, token_a, token_b) = setup_todo_test!();

    let created = create!(&app, &token_a, serde_json::json!({"title": "Alice's"}));
    let id = created["todo"]["id"].as_str().unwrap();

    // Invisible in Bob's list
    let req = test::TestRequest::get()
        .uri("/api/todos")
        .insert_header(bearer(&token_b))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["count"], 0);

    // Unmodifiable by Bob
    let req = test::TestRequest::put()
        .uri(&format!("/api/todos/{}", id))
        .insert_header(bearer(&token_b))
        .set_json(serde_json::json!({"completed": true}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403);

    // Undeletable by Bob
    let req = test::TestRequest::delete()
        .uri(&format!("/api/todos/{}", id))
        .insert_header(bearer(&token_b))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403);

    // Still present for Alice
    let req = test::TestRequest::get()
        .uri("/api/todos")
        .insert_header(bearer(&token_a))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["count"], 1);
}

#[actix_web::test]
async fn test_update_unknown_id_is_not_found() {
    let (app, token, _) = setup_todo_test!();

    let req = test::TestRequest::put()
        .uri(&format!("/api/todos/{}", uuid::Uuid::new_v4()))
        .insert_header(bearer(&token))
        .set_json(serde_json::json!({"completed": true}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn test_malformed_path_id_is_not_found() {
    let (app, token, _) = setup_todo_test!();

    let req = test::TestRequest::delete()
        .uri("/api/todos/not-a-valid-id")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn test_delete_twice_reports_not_found() {
    let (app, token, _) = setup_todo_test!();

    let created = create!(&app, &token, serde_json::json!({"title": "Ephemeral"}));
    let id = created["todo"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::delete()
        .uri(&format!("/api/todos/{}", id))
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Todo deleted successfully");

    let req = test::TestRequest::delete()
        .uri(&format!("/api/todos/{}", id))
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn test_requests_without_token_are_unauthorized() {
    let (app, _, _) = setup_todo_test!();

    let req = test::TestRequest::get().uri("/api/todos").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    let req = test::TestRequest::post()
        .uri("/api/todos")
        .set_json(serde_json::json!({"title": "nope"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn test_garbage_token_is_unauthorized() {
    let (app, _, _) = setup_todo_test!();

    let req = test::TestRequest::get()
        .uri("/api/todos")
        .insert_header(("Authorization", "Bearer not.a.real.token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

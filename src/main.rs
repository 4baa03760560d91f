use actix_cors::Cors;
use actix_web::{App, HttpServer, http, web};
use std::sync::Arc;
use todo_api::application::auth_service::AuthService;
use todo_api::application::todo_service::TodoService;
use todo_api::data::todo_repository::InMemoryTodoRepository;
use todo_api::data::user_repository::InMemoryUserRepository;
use todo_api::infrastructure::config::Config;
use todo_api::infrastructure::logging::init_logging;
use todo_api::presentation::auth::{login, register};
use todo_api::presentation::handlers::{
    AppState, create_todo, delete_todo, health_check, list_todos, update_todo,
};
use todo_api::presentation::middleware::{JwtAuthMiddleware, RequestLogMiddleware};
use tracing::info;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    init_logging();

    let config = Config::from_env();
    info!(host = %config.host, port = config.port, "Configuration loaded");

    let user_repository = Arc::new(InMemoryUserRepository::new());
    let todo_repository = Arc::new(InMemoryTodoRepository::new());

    let auth_service = Arc::new(AuthService::new(
        user_repository,
        config.jwt_secret.clone(),
    ));
    let todo_service = TodoService::new(todo_repository);

    let state = web::Data::new(AppState {
        todo_service,
        auth_service: auth_service.clone(),
    });

    let cors_origin = config.cors_origin.clone();
    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&cors_origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
            .allowed_headers(vec![http::header::AUTHORIZATION, http::header::CONTENT_TYPE])
            .supports_credentials();

        App::new()
            .app_data(state.clone())
            .wrap(cors)
            .wrap(RequestLogMiddleware)
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(health_check))
                    .service(
                        web::scope("/auth")
                            .route("/register", web::post().to(register))
                            .route("/login", web::post().to(login)),
                    )
                    .service(
                        web::scope("/todos")
                            .wrap(JwtAuthMiddleware::new(auth_service.clone()))
                            .route("", web::get().to(list_todos))
                            .route("", web::post().to(create_todo))
                            .route("/{id}", web::put().to(update_todo))
                            .route("/{id}", web::delete().to(delete_todo)),
                    ),
            )
    });

    let bind_addr = format!("{}:{}", config.host, config.port);
    info!(address = %bind_addr, "Binding server to address");
    let server = server.bind(config.bind_addr())?;

    info!(
        address = %bind_addr,
        routes = %"GET /api/health, POST /api/auth/register, POST /api/auth/login, GET /api/todos, POST /api/todos, PUT /api/todos/{id}, DELETE /api/todos/{id}",
        "Starting HTTP server"
    );
    server.run().await
}

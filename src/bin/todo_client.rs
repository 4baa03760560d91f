use todo_api::client::api::ApiClient;
use todo_api::client::context::AuthContext;
use todo_api::client::views;
use todo_api::infrastructure::logging::init_logging;

const DEFAULT_API_URL: &str = "http://localhost:5000";

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    init_logging();

    let base_url =
        std::env::var("TODO_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

    let mut api = ApiClient::new(base_url);
    let mut ctx = AuthContext::new();
    // No persisted sessions yet; start signed out.
    ctx.hydrate(&mut api, None);

    views::run(&mut api, &mut ctx).await;
}

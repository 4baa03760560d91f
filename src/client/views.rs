use crate::client::api::ApiClient;
use crate::client::context::AuthContext;
use crate::domain::todo::{CreateTodo, Todo, UpdateTodo};
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    Success,
    Error,
    Info,
}

/// Transient message shown once at the top of the next render, then
/// dismissed.
#[derive(Debug)]
pub struct Alert {
    pub level: AlertLevel,
    pub message: String,
}

impl Alert {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: AlertLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: AlertLevel::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: AlertLevel::Info,
            message: message.into(),
        }
    }

    fn render(&self) -> String {
        let tag = match self.level {
            AlertLevel::Success => "ok",
            AlertLevel::Error => "error",
            AlertLevel::Info => "info",
        };
        format!("[{}] {}", tag, self.message)
    }
}

/// Parsed dashboard input.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Add,
    Edit(usize),
    Toggle(usize),
    Delete(usize),
    Refresh,
    Logout,
    Quit,
    Unknown,
}

fn parse_command(input: &str) -> Command {
    let mut parts = input.split_whitespace();
    let verb = parts.next().unwrap_or("");
    let index = parts.next().and_then(|n| n.parse::<usize>().ok());

    match (verb, index) {
        ("a", _) => Command::Add,
        ("e", Some(n)) if n >= 1 => Command::Edit(n - 1),
        ("t", Some(n)) if n >= 1 => Command::Toggle(n - 1),
        ("d", Some(n)) if n >= 1 => Command::Delete(n - 1),
        ("r", _) => Command::Refresh,
        ("l", _) => Command::Logout,
        ("q", _) => Command::Quit,
        _ => Command::Unknown,
    }
}

fn format_todo_line(index: usize, todo: &Todo) -> String {
    let check = if todo.completed { "x" } else { " " };
    let mut line = format!("{:>2}. [{}] {} ({})", index + 1, check, todo.title, todo.priority);
    if let Some(due) = todo.due_date {
        line.push_str(&format!(" due {}", due));
    }
    if let Some(description) = &todo.description {
        line.push_str(&format!(" - {}", description));
    }
    line
}

fn prompt(label: &str) -> String {
    print!("{}: ", label);
    let _ = io::stdout().flush();
    let mut input = String::new();
    let _ = io::stdin().read_line(&mut input);
    input.trim().to_string()
}

fn navbar(ctx: &AuthContext) {
    println!();
    match ctx.user() {
        Some(user) => println!("== MyTodo | Hi, {} | l logout ==", user.name),
        None => println!("== MyTodo =="),
    }
}

fn show_alert(alert: &mut Option<Alert>) {
    if let Some(alert) = alert.take() {
        println!("{}", alert.render());
    }
}

/// Top-level view loop: landing (login/register) until authenticated, then
/// the dashboard until logout or quit.
pub async fn run(api: &mut ApiClient, ctx: &mut AuthContext) {
    let mut alert: Option<Alert> = None;

    loop {
        if !ctx.is_authenticated() {
            navbar(ctx);
            show_alert(&mut alert);
            println!("1 sign in | 2 create account | q quit");
            match prompt("choice").as_str() {
                "1" => {
                    let outcome = login_view(api, ctx).await;
                    alert = Some(if outcome.success {
                        Alert::success(outcome.message)
                    } else {
                        Alert::error(outcome.message)
                    });
                }
                "2" => {
                    let outcome = register_view(api, ctx).await;
                    alert = Some(if outcome.success {
                        Alert::success(outcome.message)
                    } else {
                        Alert::error(outcome.message)
                    });
                }
                "q" => return,
                _ => alert = Some(Alert::info("Unknown choice")),
            }
        } else if !dashboard(api, ctx, &mut alert).await {
            return;
        }
    }
}

async fn login_view(
    api: &mut ApiClient,
    ctx: &mut AuthContext,
) -> crate::client::context::AuthOutcome {
    println!("-- Sign in to your account --");
    let email = prompt("Email");
    let password = prompt("Password");
    ctx.login(api, email, password).await
}

async fn register_view(
    api: &mut ApiClient,
    ctx: &mut AuthContext,
) -> crate::client::context::AuthOutcome {
    println!("-- Create a new account --");
    let name = prompt("Name");
    let email = prompt("Email");
    let password = prompt("Password");
    ctx.register(api, name, email, password).await
}

/// Dashboard loop. The in-memory list is only ever replaced from server
/// responses; nothing is applied optimistically. Returns false to quit the
/// whole client.
async fn dashboard(api: &mut ApiClient, ctx: &mut AuthContext, alert: &mut Option<Alert>) -> bool {
    let mut todos = match api.list_todos().await {
        Ok(todos) => todos,
        Err(e) => {
            *alert = Some(Alert::error(format!("Failed to fetch todos: {}", e)));
            ctx.logout(api);
            return true;
        }
    };

    loop {
        navbar(ctx);
        show_alert(alert);

        if todos.is_empty() {
            println!("No todos yet. Add your first one!");
        } else {
            for (i, todo) in todos.iter().enumerate() {
                println!("{}", format_todo_line(i, todo));
            }
        }
        println!("a add | e N edit | t N toggle | d N delete | r refresh | l logout | q quit");

        match parse_command(&prompt("command")) {
            Command::Add => match api.create_todo(&create_form()).await {
                Ok(todo) => {
                    todos.insert(0, todo);
                    *alert = Some(Alert::success("Todo created successfully!"));
                }
                Err(e) => *alert = Some(Alert::error(e.to_string())),
            },
            Command::Edit(i) => {
                let Some(current) = todos.get(i) else {
                    *alert = Some(Alert::error("No such todo"));
                    continue;
                };
                let id = current.id;
                let patch = edit_form(current);
                match api.update_todo(&id, &patch).await {
                    Ok(updated) => {
                        todos[i] = updated;
                        *alert = Some(Alert::success("Todo updated successfully!"));
                    }
                    Err(e) => *alert = Some(Alert::error(e.to_string())),
                }
            }
            Command::Toggle(i) => {
                let Some(current) = todos.get(i) else {
                    *alert = Some(Alert::error("No such todo"));
                    continue;
                };
                let id = current.id;
                let patch = UpdateTodo {
                    completed: Some(!current.completed),
                    ..UpdateTodo::default()
                };
                match api.update_todo(&id, &patch).await {
                    Ok(updated) => todos[i] = updated,
                    Err(e) => *alert = Some(Alert::error(e.to_string())),
                }
            }
            Command::Delete(i) => {
                let Some(current) = todos.get(i) else {
                    *alert = Some(Alert::error("No such todo"));
                    continue;
                };
                let id = current.id;
                if prompt("Delete this todo? (y/n)") != "y" {
                    continue;
                }
                match api.delete_todo(&id).await {
                    Ok(message) => {
                        todos.remove(i);
                        *alert = Some(Alert::success(message));
                    }
                    Err(e) => *alert = Some(Alert::error(e.to_string())),
                }
            }
            Command::Refresh => match api.list_todos().await {
                Ok(fresh) => todos = fresh,
                Err(e) => *alert = Some(Alert::error(format!("Failed to fetch todos: {}", e))),
            },
            Command::Logout => {
                ctx.logout(api);
                *alert = Some(Alert::info("Signed out"));
                return true;
            }
            Command::Quit => return false,
            Command::Unknown => *alert = Some(Alert::info("Unknown command")),
        }
    }
}

fn create_form() -> CreateTodo {
    println!("-- New todo --");
    let title = prompt("Title");
    let description = prompt("Description (optional)");
    let priority = prompt("Priority low/medium/high (default medium)");
    let due_date = prompt("Due date YYYY-MM-DD (optional)");

    CreateTodo {
        title,
        description: (!description.is_empty()).then_some(description),
        priority: serde_json::from_value(serde_json::Value::String(priority)).ok(),
        due_date: due_date.parse().ok(),
    }
}

/// Edit form, prefilled with the selected todo. Empty input keeps the
/// current value (field absent from the patch); "-" clears an optional
/// field (explicit null).
fn edit_form(current: &Todo) -> UpdateTodo {
    println!("-- Edit todo (enter keeps current, '-' clears) --");
    let title = prompt(&format!("Title [{}]", current.title));
    let description = prompt(&format!(
        "Description [{}]",
        current.description.as_deref().unwrap_or("")
    ));
    let priority = prompt(&format!("Priority [{}]", current.priority));
    let due_date = prompt(&format!(
        "Due date [{}]",
        current
            .due_date
            .map(|d| d.to_string())
            .unwrap_or_default()
    ));

    UpdateTodo {
        title: (!title.is_empty()).then_some(title),
        completed: None,
        priority: serde_json::from_value(serde_json::Value::String(priority)).ok(),
        description: optional_patch(description),
        // An unparsable date keeps the current value rather than clearing it
        due_date: match optional_patch(due_date) {
            Some(Some(raw)) => raw.parse().ok().map(Some),
            Some(None) => Some(None),
            None => None,
        },
    }
}

fn optional_patch(input: String) -> Option<Option<String>> {
    match input.as_str() {
        "" => None,
        "-" => Some(None),
        _ => Some(Some(input)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::todo::{Priority, TodoId};
    use crate::domain::user::UserId;
    use chrono::{NaiveDate, Utc};

    #[test]
    fn test_parse_command_variants() {
        assert_eq!(parse_command("a"), Command::Add);
        assert_eq!(parse_command("e 3"), Command::Edit(2));
        assert_eq!(parse_command("t 1"), Command::Toggle(0));
        assert_eq!(parse_command("d 10"), Command::Delete(9));
        assert_eq!(parse_command("r"), Command::Refresh);
        assert_eq!(parse_command("l"), Command::Logout);
        assert_eq!(parse_command("q"), Command::Quit);
    }

    #[test]
    fn test_parse_command_rejects_bad_input() {
        assert_eq!(parse_command(""), Command::Unknown);
        assert_eq!(parse_command("e"), Command::Unknown);
        assert_eq!(parse_command("e 0"), Command::Unknown);
        assert_eq!(parse_command("x 1"), Command::Unknown);
    }

    #[test]
    fn test_format_todo_line() {
        let todo = Todo {
            id: TodoId::new(),
            title: "Buy milk".to_string(),
            description: Some("2 liters".to_string()),
            completed: true,
            priority: Priority::High,
            due_date: NaiveDate::from_ymd_opt(2026, 9, 15),
            user: UserId::new(),
            created_at: Utc::now(),
        };

        let line = format_todo_line(0, &todo);
        assert_eq!(line, " 1. [x] Buy milk (high) due 2026-09-15 - 2 liters");
    }

    #[test]
    fn test_optional_patch_distinguishes_keep_and_clear() {
        assert_eq!(optional_patch(String::new()), None);
        assert_eq!(optional_patch("-".to_string()), Some(None));
        assert_eq!(
            optional_patch("note".to_string()),
            Some(Some("note".to_string()))
        );
    }

    #[test]
    fn test_alert_render_levels() {
        assert_eq!(Alert::success("done").render(), "[ok] done");
        assert_eq!(Alert::error("nope").render(), "[error] nope");
        assert_eq!(Alert::info("fyi").render(), "[info] fyi");
    }
}

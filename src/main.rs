//! Elidune Admin - interactive book form
//!
//! Opens the add/edit book form against the configured API and drives it
//! from commands read on stdin. Pass a book ID to edit an existing book.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use elidune_admin::{
    config::{AppConfig, LoggingConfig},
    forms::{BookFormController, BookFormDeps, FormStatus, ReferenceField},
    models::{ReferenceKind, Status},
    services::{alerts::Alert, navigation::Navigator, Services},
    AppError,
};

const HELP: &str = "\
Commands:
  name <text>                 set the book name
  description <text>          set the description
  access <text>               set the access number
  status <enabled|disabled>   set the status
  <author|category|publisher> <text>
                              type into a reference field
  pick <field> <n>            select candidate n of a reference field
  clear <field>               empty a reference field
  list <field>                show the candidates of a reference field
  show                        show the form
  submit                      save the book
  help                        show this help
  quit                        leave without saving";

enum Flow {
    Continue,
    Quit,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    init_tracing(&config.logging);

    tracing::info!("Starting Elidune Admin v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Using API at {}", config.api.base_url);

    let book_id = std::env::args().nth(1);
    let services = Services::new(&config.api)?;
    let (navigator, mut navigation) = Navigator::channel(services.alerts.clone());
    let deps = BookFormDeps::from_services(&services, navigator, &config.forms);
    let form = BookFormController::open(deps, book_id);

    println!("{}", form.title());
    if let FormStatus::FetchFailed(message) = form.wait_until_loaded().await {
        println!("{}", message);
        return Ok(());
    }
    println!("{}", HELP);

    let mut alerts = services.alerts.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match run_command(&form, line.trim()).await {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(message) => println!("{}", message),
        }

        if alerts.has_changed().unwrap_or(false) {
            if let Some(alert) = alerts.borrow_and_update().clone() {
                print_alert(&alert);
            }
        }
        if let Ok(intent) = navigation.try_recv() {
            println!("-> {}", intent.url);
            break;
        }
    }

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("elidune_admin={}", logging.level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run_command(form: &BookFormController, line: &str) -> Result<Flow, String> {
    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    match command {
        "" => {}
        "help" => println!("{}", HELP),
        "quit" | "exit" => return Ok(Flow::Quit),
        "name" => form.set_name(rest),
        "description" => form.set_description(rest),
        "access" => form.set_access_book_num(rest),
        "status" => form.set_status(rest.parse::<Status>()?),
        "show" => show(form),
        "list" => print_candidates(form.field(rest.parse::<ReferenceKind>()?)),
        "clear" => form.field(rest.parse::<ReferenceKind>()?).clear(),
        "pick" => {
            let (kind, index) = rest
                .split_once(' ')
                .ok_or_else(|| "usage: pick <field> <n>".to_string())?;
            let field = form.field(kind.parse::<ReferenceKind>()?);
            let index = index
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .ok_or_else(|| format!("invalid candidate number '{}'", index.trim()))?;
            match field.choose(index) {
                Some(entity) => println!("{} = {}", kind, entity.name),
                None => return Err(format!("no candidate {} for {}", index + 1, kind)),
            }
        }
        "submit" => match form.submit().await {
            Ok(_) => {}
            Err(AppError::InvalidForm(_)) => {
                for (field, messages) in form.field_errors() {
                    println!("  {}: {}", field, messages.join(", "));
                }
            }
            // Already reported through the alert banner
            Err(_) => {}
        },
        other => {
            let kind = other
                .parse::<ReferenceKind>()
                .map_err(|_| format!("unknown command '{}', try 'help'", other))?;
            let field = form.field(kind);
            let mut candidates = field.subscribe_candidates();
            field.input(rest);
            // Give the typeahead a moment to catch up with the keystroke
            let _ = tokio::time::timeout(Duration::from_millis(200), candidates.changed()).await;
            print_candidates(field);
        }
    }

    Ok(Flow::Continue)
}

fn show(form: &BookFormController) {
    let value = form.value();
    println!("  name:        {}", value.name);
    for kind in ReferenceKind::ALL {
        let field = form.field(kind);
        let marker = if field.value().is_selected() { "" } else { " (not selected)" };
        println!("  {:<12} {}{}", format!("{}:", kind), field.display_value(), marker);
    }
    println!("  description: {}", value.description);
    println!("  access:      {}", value.access_book_num);
    println!("  status:      {}", value.status);
}

fn print_candidates(field: &ReferenceField) {
    if let Some(error) = field.load_error() {
        println!("  {}", error);
        return;
    }

    let candidates = field.candidates();
    if candidates.is_empty() {
        println!("  no {} matches", field.kind());
    }
    for (i, entity) in candidates.iter().enumerate() {
        println!("  {}. {}", i + 1, entity.name);
    }
}

fn print_alert(alert: &Alert) {
    println!("[{:?}] {}", alert.kind, alert.message);
}

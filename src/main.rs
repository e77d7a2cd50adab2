use std::error::Error;
use std::path::Path;

use inklet::config::InkletConfig;
use inklet::core::document::{Document, DocumentId};
use inklet::notify::LogNotifier;
use inklet::service::{DocumentService, RetryPolicy};
use inklet::store::FileStore;
use inklet::sync::api::HttpApi;

type Service = DocumentService<FileStore, HttpApi>;

fn main() -> Result<(), Box<dyn Error>> {
    let config = InkletConfig::load(&InkletConfig::default_path())?;

    // `RUST_LOG` overrides the config toggle.
    let default_filter = if config.debug_logging {
        "inklet=debug"
    } else {
        "inklet=info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run(config))
}

async fn run(config: InkletConfig) -> Result<(), Box<dyn Error>> {
    let store = FileStore::open(&config.data_dir)?;
    let api = HttpApi::new(&config.api_url, config.api_token.as_deref())?;
    let retry = RetryPolicy {
        max_attempts: config.retry_max_attempts,
        base_delay: config.retry_base_delay(),
    };
    let service = DocumentService::with_retry(store, api, Box::new(LogNotifier), retry);
    service.set_authenticated(config.is_authenticated());

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("list") => cmd_list(&service, args.get(1).map(String::as_str)),
        Some("show") => cmd_show(&service, arg(&args, 1)?),
        Some("new") => cmd_new(&service, arg(&args, 1)?, args.get(2).map(String::as_str)).await,
        Some("save") => cmd_save(&service, arg(&args, 1)?, arg(&args, 2)?).await,
        Some("delete") => cmd_delete(&service, arg(&args, 1)?).await,
        Some("current") => cmd_current(&service, args.get(1).map(String::as_str)).await,
        Some("categories") => cmd_categories(&service, &args[1..]).await,
        Some("sync") => cmd_sync(&service).await,
        _ => {
            print_usage();
            Ok(())
        }
    }
}

fn print_usage() {
    eprintln!(
        "Usage: inklet <command>\n\
         \n\
         Commands:\n\
         \x20 list [category]            List documents\n\
         \x20 show <id>                  Print a document\n\
         \x20 new <name> [category]      Create an empty document\n\
         \x20 save <id> <file>           Replace a document's content from a markdown file\n\
         \x20 delete <id>                Delete a document\n\
         \x20 current [<id>]             Show or set the current document\n\
         \x20 categories [add <name> | rm <name> | mv <old> <new>]\n\
         \x20 sync                       Reconcile with the configured backend"
    );
}

fn arg<'a>(args: &'a [String], index: usize) -> Result<&'a str, Box<dyn Error>> {
    args.get(index)
        .map(String::as_str)
        .ok_or_else(|| "missing argument; run `inklet` for usage".into())
}

fn parse_id(raw: &str) -> Result<DocumentId, Box<dyn Error>> {
    raw.parse::<DocumentId>().map_err(Into::into)
}

fn cmd_list(service: &Service, category: Option<&str>) -> Result<(), Box<dyn Error>> {
    let current = service.current_document()?.map(|d| d.id);
    let docs = service.list_documents()?;
    let mut shown = 0;

    for doc in &docs {
        if let Some(cat) = category {
            if doc.category != cat {
                continue;
            }
        }
        shown += 1;
        let marker = if Some(&doc.id) == current.as_ref() { "*" } else { " " };
        let synced = if doc.is_synced() { "" } else { "  (unsynced)" };
        println!(
            "{} {:<42} [{}] {}{}",
            marker,
            doc.id.to_string(),
            doc.category,
            doc.name,
            synced
        );
    }

    if shown == 0 {
        println!("No documents.");
    }
    Ok(())
}

fn cmd_show(service: &Service, raw_id: &str) -> Result<(), Box<dyn Error>> {
    let doc = service.load_document(&parse_id(raw_id)?)?;
    println!("# {} [{}] ({})", doc.name, doc.category, doc.id);
    if let Some(updated) = doc.updated_at {
        println!("# updated {}", updated.to_rfc3339());
    }
    println!();
    println!("{}", doc.content);
    Ok(())
}

async fn cmd_new(
    service: &Service,
    name: &str,
    category: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    let mut doc = Document::new(name);
    if let Some(cat) = category {
        service.create_category(cat)?;
        doc.category = cat.to_string();
    }
    let saved = service.save_document(doc).await?;
    println!("Created {} ({})", saved.name, saved.id);
    Ok(())
}

async fn cmd_save(service: &Service, raw_id: &str, file: &str) -> Result<(), Box<dyn Error>> {
    let id = parse_id(raw_id)?;
    let mut doc = service.load_document(&id)?;
    doc.content = std::fs::read_to_string(Path::new(file))?;
    let saved = service.save_document(doc).await?;
    if saved.is_synced() {
        println!("Saved {} ({})", saved.name, saved.id);
    } else {
        println!("Saved {} locally ({})", saved.name, saved.id);
    }
    Ok(())
}

async fn cmd_delete(service: &Service, raw_id: &str) -> Result<(), Box<dyn Error>> {
    let doc = service.delete_document(&parse_id(raw_id)?).await?;
    println!("Deleted {} ({})", doc.name, doc.id);
    Ok(())
}

async fn cmd_current(service: &Service, raw_id: Option<&str>) -> Result<(), Box<dyn Error>> {
    match raw_id {
        Some(raw) => {
            let id = parse_id(raw)?;
            service.set_current_document(&id).await?;
            println!("Current document set to {}", id);
        }
        None => match service.current_document()? {
            Some(doc) => println!("{} [{}] {}", doc.id, doc.category, doc.name),
            None => println!("No current document."),
        },
    }
    Ok(())
}

async fn cmd_categories(service: &Service, args: &[String]) -> Result<(), Box<dyn Error>> {
    match args.first().map(String::as_str) {
        None => {
            for name in service.categories()?.names() {
                println!("{}", name);
            }
        }
        Some("add") => {
            let cats = service.create_category(arg(args, 1)?)?;
            println!("{}", cats.names().join(", "));
        }
        Some("rm") => {
            let cats = service.delete_category(arg(args, 1)?).await?;
            println!("{}", cats.names().join(", "));
        }
        Some("mv") => {
            let cats = service
                .rename_category(arg(args, 1)?, arg(args, 2)?)
                .await?;
            println!("{}", cats.names().join(", "));
        }
        Some(other) => {
            eprintln!("Unknown categories subcommand: {}", other);
            print_usage();
        }
    }
    Ok(())
}

async fn cmd_sync(service: &Service) -> Result<(), Box<dyn Error>> {
    if !service.is_authenticated() {
        println!("No backend configured; set api_url and api_token in the config.");
        return Ok(());
    }

    let outcome = service.sync_with_backend().await?;
    println!(
        "Sync complete: {} pulled, {} pushed, {} adopted, {} conflicts",
        outcome.pulled.len(),
        outcome.pushed,
        outcome.adopted,
        outcome.conflicts.len()
    );
    for conflict in &outcome.conflicts {
        println!(
            "  conflict: '{}' [{}] — local {} vs backend {}",
            conflict.name, conflict.category, conflict.local_id, conflict.remote_id
        );
    }
    for err in &outcome.errors {
        println!("  error: {}", err);
    }
    Ok(())
}

use std::collections::{HashMap, HashSet};

use inklet::config::InkletConfig;
use inklet::core::document::Document;
use inklet::store::{FileStore, LocalStore};
use inklet::sync::api::{HttpApi, RemoteApi};

/// Read-only comparison of the local store against the backend. Changes
/// nothing; prints what a sync pass would have to reconcile.
#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("inklet=warn"))
        .init();

    let config = match InkletConfig::load(&InkletConfig::default_path()) {
        Ok(c) => c,
        Err(e) => {
            println!("Failed to load config: {}", e);
            return;
        }
    };

    println!("=== Backend vs Local Comparison ===\n");

    let store = match FileStore::open(&config.data_dir) {
        Ok(s) => s,
        Err(e) => {
            println!("Failed to open local store: {}", e);
            return;
        }
    };
    let local_docs = match store.all_documents() {
        Ok(docs) => docs,
        Err(e) => {
            println!("Failed to read local documents: {}", e);
            return;
        }
    };
    println!("Local: {} documents", local_docs.len());

    if !config.is_authenticated() {
        println!("No backend configured; set api_url and api_token in the config.");
        return;
    }

    println!("--- Backend: {} ---\n", config.api_url);

    let api = match HttpApi::new(&config.api_url, config.api_token.as_deref()) {
        Ok(a) => a,
        Err(e) => {
            println!("  Client error: {}", e);
            return;
        }
    };
    let remote_docs = match api.list_documents().await {
        Ok(docs) => docs,
        Err(e) => {
            println!("  Error listing documents: {}", e);
            return;
        }
    };
    println!("Remote: {} documents", remote_docs.len());

    // Index local documents by their backend id
    let mut local_by_remote: HashMap<u64, &Document> = HashMap::new();
    for doc in &local_docs {
        if let Some(n) = doc.id.remote() {
            local_by_remote.insert(n, doc);
        }
    }

    let mut remote_only = Vec::new();
    let mut content_mismatch = Vec::new();
    let mut matched = 0;

    for remote in &remote_docs {
        match local_by_remote.get(&remote.id) {
            Some(local) => {
                matched += 1;
                if local.content != remote.content {
                    content_mismatch.push((remote.name.clone(), remote.id));
                }
            }
            None => {
                remote_only.push((remote.name.clone(), remote.category.clone(), remote.id));
            }
        }
    }

    let remote_ids: HashSet<u64> = remote_docs.iter().map(|r| r.id).collect();
    let mut local_only = Vec::new();
    for doc in &local_docs {
        match doc.id.remote() {
            Some(n) if remote_ids.contains(&n) => {}
            _ => local_only.push((doc.name.clone(), doc.category.clone(), doc.id.to_string())),
        }
    }

    println!("Matched: {}", matched);

    if !content_mismatch.is_empty() {
        println!("\nCONTENT MISMATCHES:");
        for (name, id) in &content_mismatch {
            println!("  {} (backend id {})", name, id);
        }
    }

    if !remote_only.is_empty() {
        println!("\nON BACKEND ONLY ({}):", remote_only.len());
        for (name, category, id) in &remote_only {
            println!("  [{}] {} (id {})", category, name, id);
        }
    }

    if !local_only.is_empty() {
        println!("\nLOCAL ONLY ({}):", local_only.len());
        for (name, category, id) in &local_only {
            println!("  [{}] {} ({})", category, name, id);
        }
    }

    if content_mismatch.is_empty() && remote_only.is_empty() && local_only.is_empty() {
        println!("All in sync!");
    }

    println!("\n=== Done ===");
}

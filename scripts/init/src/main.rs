use std::time::Duration;

use clap::Parser;
use colored::*;

use sfm_sync::config::SyncConfig;
use sfm_sync::firestore::{field, DocumentStore, FieldValue, FirestoreClient};

#[derive(Parser, Debug)]
#[command(
    name = "sfm-init",
    about = "Bootstrap the Firestore collections for the library mirror"
)]
struct Args {
    /// List each collection after creating the placeholders
    #[arg(long)]
    show: bool,
}

const COLLECTIONS: [&str; 4] = ["artists", "albums", "playlists", "playlist_artists"];

#[tokio::main]
async fn main() {
    let args = Args::parse();

    println!("Firestore Init");
    println!("==============");
    println!();

    let config = match SyncConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e.to_string().bright_red());
            std::process::exit(1);
        }
    };

    let http = match reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            eprintln!(
                "{} Failed to create HTTP client: {}",
                "✗".red().bold(),
                e.to_string().bright_red()
            );
            std::process::exit(1);
        }
    };

    let store = match FirestoreClient::connect(&http, &config).await {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e.to_string().bright_red());
            std::process::exit(1);
        }
    };

    // A placeholder document is enough to make a collection visible in
    // the console before the first real sync.
    for collection in COLLECTIONS {
        match store
            .upsert(
                collection,
                "init_doc",
                vec![field("initialized", FieldValue::Bool(true))],
            )
            .await
        {
            Ok(()) => println!(
                "  {} Initialized collection: {}",
                "✓".green(),
                collection.bright_cyan()
            ),
            Err(e) => eprintln!("  {} {}", "✗".red(), e.to_string().yellow()),
        }
    }

    if args.show {
        for collection in COLLECTIONS {
            println!();
            println!("{} {}", "Contents of".white().bold(), collection.bright_cyan());
            match store.list(collection).await {
                Ok(docs) => {
                    for doc in docs {
                        println!(
                            "  {} => {}",
                            doc.id.bright_white(),
                            serde_json::to_string(&doc.fields).unwrap_or_default()
                        );
                    }
                }
                Err(e) => eprintln!("  {} {}", "✗".red(), e.to_string().yellow()),
            }
        }
    }

    println!();
    println!("Firestore initialization complete.");
}

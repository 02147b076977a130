use std::time::{Duration, Instant};

use clap::Parser;
use colored::*;

use sfm_sync::config::SyncConfig;
use sfm_sync::firestore::FirestoreClient;
use sfm_sync::orchestrator;
use sfm_sync::spotify::{self, SpotifyClient};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "sfm-sync", about = "Mirror a Spotify library into Firestore")]
struct Args {
    /// Fetch everything but skip all Firestore writes
    #[arg(long)]
    dry_run: bool,

    /// Dump the Firestore collections after the sync completes
    #[arg(long)]
    verify: bool,

    /// Print the Spotify authorization URL and exit
    #[arg(long)]
    authorize: bool,

    /// Exchange an authorization code for a refresh token and exit
    #[arg(long)]
    code: Option<String>,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() {
    let args = Args::parse();

    println!("Spotify Library Mirror");
    println!("======================");
    println!();

    let config = match SyncConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e.to_string().bright_red());
            std::process::exit(1);
        }
    };

    if args.authorize {
        println!("Open this URL in a browser and approve access:");
        println!();
        println!("  {}", spotify::authorize_url(&config).bright_cyan());
        println!();
        println!(
            "Then run {} with the code from the redirect URL.",
            "sfm-sync --code <CODE>".bright_cyan()
        );
        return;
    }

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

    if let Some(ref code) = args.code {
        match spotify::exchange_code(&http, &config, code).await {
            Ok(token) => {
                println!("{} Authorized. Add this to .env:", "✓".green());
                println!();
                println!("  SPOTIFY_REFRESH_TOKEN={}", token);
            }
            Err(e) => {
                eprintln!("{} {}", "✗".red().bold(), e.to_string().bright_red());
                std::process::exit(1);
            }
        }
        return;
    }

    // Both clients must come up before anything is fetched or written.
    let catalog = match SpotifyClient::connect(&http, &config).await {
        Ok(c) => {
            println!("{} Connected to Spotify", "✓".green());
            c
        }
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e.to_string().bright_red());
            std::process::exit(1);
        }
    };

    let store = match FirestoreClient::connect(&http, &config).await {
        Ok(s) => {
            println!("{} Connected to Firestore", "✓".green());
            s
        }
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e.to_string().bright_red());
            std::process::exit(1);
        }
    };
    println!();

    let start = Instant::now();
    let summary = orchestrator::run_sync(&catalog, &store, args.dry_run).await;
    let elapsed = start.elapsed();

    println!();
    println!("{}", "═".repeat(60).bright_black());
    println!();
    println!(
        "{} {:.1}s{}",
        "Completed in:".white().bold(),
        elapsed.as_secs_f64(),
        if args.dry_run { " (dry run)" } else { "" }
    );
    println!(
        "  {} {} fetched / {} written",
        "Artists:".white(),
        summary.artists_fetched,
        summary.artists_written
    );
    println!(
        "  {} {} fetched / {} written",
        "Albums:".white(),
        summary.albums_fetched,
        summary.albums_written
    );
    println!(
        "  {} {} fetched / {} written",
        "Playlists:".white(),
        summary.playlists_fetched,
        summary.playlists_written
    );
    if summary.write_failures > 0 {
        println!("  {} {}", "Write failures:".red(), summary.write_failures);
    }

    if args.verify {
        orchestrator::show_store_contents(&store).await;
    }
}

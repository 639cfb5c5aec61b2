//! REST API server demo
//!
//! Runs media-dl with the REST API enabled. Requires `yt-dlp` on PATH
//! (or set `tools.ytdlp_path`); without it every task fails with an
//! `error` event.
//!
//! After starting, you can:
//! - View Swagger UI at http://localhost:8000/swagger-ui
//! - Submit downloads via POST http://localhost:8000/api/downloads
//! - List finished files via GET http://localhost:8000/api/downloads
//! - Stream events via GET http://localhost:8000/api/events
//!
//! Log verbosity follows `RUST_LOG` (default `media_dl=info,tower_http=info`).

use media_dl::config::{ApiConfig, Config, DownloadConfig, ServerIntegrationConfig};
use media_dl::{MediaDownloader, run_with_shutdown};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("media_dl=info,tower_http=info")),
        )
        .init();

    let config = Config {
        download: DownloadConfig {
            download_dir: "downloads".into(),
            processing_dir: "processing".into(),
            ..Default::default()
        },
        server: ServerIntegrationConfig {
            api: ApiConfig {
                bind_address: "127.0.0.1:8000".parse()?,
                ..Default::default()
            },
        },
        ..Default::default()
    };

    let downloader = Arc::new(MediaDownloader::new(config).await?);
    let capabilities = downloader.capabilities();
    if !capabilities.extractor_available {
        eprintln!("warning: yt-dlp was not found; submitted tasks will fail");
    }

    println!("Starting media-dl REST API server");
    println!("Swagger UI: http://localhost:8000/swagger-ui");
    println!("Events stream: http://localhost:8000/api/events");
    println!();
    println!("Example commands:");
    println!("  # Download audio");
    println!("  curl -X POST http://localhost:8000/api/downloads \\");
    println!("    -H 'Content-Type: application/json' \\");
    println!(
        "    -d '{{\"url\": \"https://www.youtube.com/watch?v=dQw4w9WgXcQ\", \"format\": \"mp3\"}}'"
    );
    println!();
    println!("  # Follow progress");
    println!("  curl -N http://localhost:8000/api/events");

    let api_handle = downloader.spawn_api_server();

    tokio::select! {
        result = api_handle => {
            result??;
        }
        result = run_with_shutdown(&downloader) => {
            result?;
            println!("Shut down cleanly");
        }
    }

    Ok(())
}

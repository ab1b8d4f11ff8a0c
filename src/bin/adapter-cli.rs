use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "adapter-cli")]
#[command(about = "Management CLI for the REST adapter", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    #[arg(short, long, env = "REST_ADAPTER_ADMIN_KEY")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check adapter status and registry size
    Status,
    /// List every route in dispatch order
    Routes {
        /// Print one `VERB path method` line per route instead of JSON
        #[arg(long)]
        plain: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    let base = cli.url.trim_end_matches('/');
    match cli.command {
        Commands::Status => {
            let res = client
                .get(format!("{base}/admin/status"))
                .headers(headers)
                .send()
                .await?;
            if let Some(json) = read_json(res).await? {
                println!("{}", serde_json::to_string_pretty(&json)?);
            }
        }
        Commands::Routes { plain } => {
            let res = client
                .get(format!("{base}/admin/routes"))
                .headers(headers)
                .send()
                .await?;
            let Some(json) = read_json(res).await? else {
                return Ok(());
            };
            if plain {
                for route in json.as_array().into_iter().flatten() {
                    println!(
                        "{:<7} {:<40} {}",
                        route["verb"].as_str().unwrap_or("?"),
                        route["path"].as_str().unwrap_or("?"),
                        route["method"].as_str().unwrap_or("?"),
                    );
                }
            } else {
                println!("{}", serde_json::to_string_pretty(&json)?);
            }
        }
    }

    Ok(())
}

async fn read_json(res: reqwest::Response) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(None);
    }
    Ok(Some(res.json().await?))
}

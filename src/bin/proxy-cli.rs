use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde_json::Value;

use hshield_proxy::security::role_from_authorization;

#[derive(Parser)]
#[command(name = "proxy-cli")]
#[command(about = "Probe a running Hshield forwarding proxy", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    #[arg(short, long, default_value = "/proxy")]
    mount: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check proxy liveness
    Health,
    /// Send a request through the proxy and print the JSON reply
    Forward {
        /// HTTP method (GET, POST, ...)
        method: String,
        /// Backend path, e.g. auth/login
        path: String,
        /// Bearer token to send
        #[arg(short, long)]
        token: Option<String>,
        /// JSON request body
        #[arg(short, long)]
        data: Option<String>,
    },
    /// Decode the role claim of a bearer token locally
    Role {
        token: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Health => {
            let res = client.get(format!("{}/healthz", base)).send().await?;
            print_response(res).await?;
        }
        Commands::Forward {
            method,
            path,
            token,
            data,
        } => {
            let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())?;
            let mut headers = HeaderMap::new();
            if let Some(token) = token {
                headers.insert(
                    AUTHORIZATION,
                    HeaderValue::from_str(&format!("Bearer {}", token))?,
                );
            }

            let url = format!(
                "{}{}/{}",
                base,
                cli.mount.trim_end_matches('/'),
                path.trim_start_matches('/')
            );
            let mut req = client.request(method, url).headers(headers);
            if let Some(data) = data {
                req = req
                    .header(CONTENT_TYPE, "application/json")
                    .body(data);
            }
            print_response(req.send().await?).await?;
        }
        Commands::Role { token } => match role_from_authorization(&token) {
            Some(role) => println!("{}", role),
            None => {
                eprintln!("Error: no role claim found in token");
                std::process::exit(1);
            }
        },
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Proxy returned status {}", status);
    }

    let text = res.text().await?;
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}

use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{Map, Value};

#[derive(Parser)]
#[command(name = "inbound-cli")]
#[command(about = "Inspect and change inbound listeners through the admin API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:9097")]
    url: String,

    /// Admin API bearer token, if one is configured.
    #[arg(short, long)]
    key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version, bind host and live listeners
    Status,
    /// Show ports and LAN exposure
    Ports,
    /// Change ports or exposure; omitted options keep their value
    Set {
        #[arg(long)]
        port: Option<u16>,
        #[arg(long)]
        socks_port: Option<u16>,
        #[arg(long)]
        redir_port: Option<u16>,
        #[arg(long)]
        allow_lan: Option<bool>,
        #[arg(long)]
        bind_address: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(key) = &cli.key {
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {key}"))?);
    }

    match cli.command {
        Commands::Status => {
            let res = client
                .get(format!("{}/status", cli.url))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Ports => {
            let res = client
                .get(format!("{}/configs", cli.url))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Set {
            port,
            socks_port,
            redir_port,
            allow_lan,
            bind_address,
        } => {
            let mut patch = Map::new();
            if let Some(v) = port {
                patch.insert("port".into(), v.into());
            }
            if let Some(v) = socks_port {
                patch.insert("socks-port".into(), v.into());
            }
            if let Some(v) = redir_port {
                patch.insert("redir-port".into(), v.into());
            }
            if let Some(v) = allow_lan {
                patch.insert("allow-lan".into(), v.into());
            }
            if let Some(v) = bind_address {
                patch.insert("bind-address".into(), v.into());
            }
            if patch.is_empty() {
                eprintln!("Nothing to change");
                return Ok(());
            }

            let res = client
                .patch(format!("{}/configs", cli.url))
                .headers(headers)
                .json(&Value::Object(patch))
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if status == reqwest::StatusCode::NO_CONTENT {
        println!("Applied");
        return Ok(());
    }

    let text = res.text().await?;
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
    }
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) if !text.is_empty() => println!("{}", text),
        Err(_) => {}
    }
    Ok(())
}

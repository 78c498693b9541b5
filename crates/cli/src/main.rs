//! SocialSpark CLI - Command-line client for the SocialSpark daemon

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tabled::{Table, Tabled};

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:9633";
const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;
const POLL_INTERVAL: Duration = Duration::from_millis(500);
const PROGRESS_BAR_WIDTH: usize = 30;

#[derive(Parser)]
#[command(name = "socialspark")]
#[command(about = "Generate captions, hashtags and mood themes for images", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RPC server URL
    #[arg(long, env = "SOCIALSPARK_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload an image and wait for its content
    Generate {
        /// PNG, JPEG or GIF file, at most 10MB
        image: PathBuf,

        /// Optional description passed to the caption and hashtag prompts
        #[arg(short, long)]
        description: Option<String>,

        /// Skip mood detection for this upload
        #[arg(long)]
        no_theme: bool,
    },

    /// Show the status of a job
    Status {
        /// Job ID
        job_id: String,
    },

    /// Inspect or toggle the mood theme
    Theme {
        #[command(subcommand)]
        command: ThemeCommands,
    },
}

#[derive(Subcommand)]
enum ThemeCommands {
    /// Turn auto-theme on or off
    Auto {
        #[arg(value_enum)]
        switch: Switch,
    },

    /// Show the active theme and its variables
    Show,
}

#[derive(Clone, Copy, ValueEnum)]
enum Switch {
    On,
    Off,
}

#[derive(Serialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    params: serde_json::Value,
    id: u64,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    #[allow(dead_code)]
    jsonrpc: String,
    #[allow(dead_code)]
    id: u64,
    result: Option<serde_json::Value>,
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

#[derive(Deserialize)]
struct SubmitResult {
    job_id: String,
}

#[derive(Deserialize)]
struct JobStatus {
    job_id: String,
    state: String,
    progress: u8,
    caption: Option<String>,
    hashtags: Option<Vec<String>>,
    theme: Option<String>,
    notice: Option<String>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct ThemeView {
    auto_theme: bool,
    current_theme: Option<String>,
    variables: BTreeMap<String, String>,
}

#[derive(Tabled)]
struct StatusRow {
    job_id: String,
    state: String,
    progress: String,
}

#[derive(Tabled)]
struct VariableRow {
    variable: String,
    value: String,
}

async fn call_rpc(url: &str, method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
    let request = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        method: method.to_string(),
        params,
        id: 1,
    };

    let client = reqwest::Client::new();
    let response: JsonRpcResponse = client
        .post(url)
        .json(&request)
        .send()
        .await
        .context("Failed to connect to daemon")?
        .json()
        .await
        .context("Failed to parse response")?;

    if let Some(error) = response.error {
        anyhow::bail!("RPC error ({}): {}", error.code, error.message);
    }

    response
        .result
        .ok_or_else(|| anyhow::anyhow!("No result in response"))
}

async fn fetch_status(url: &str, job_id: &str) -> Result<JobStatus> {
    let result = call_rpc(url, "content.status.v1", json!({ "job_id": job_id })).await?;
    serde_json::from_value(result).context("Unexpected status payload")
}

fn progress_bar(percent: u8) -> String {
    let filled = PROGRESS_BAR_WIDTH * usize::from(percent.min(100)) / 100;
    format!(
        "[{}{}] {:>3}%",
        "#".repeat(filled),
        "-".repeat(PROGRESS_BAR_WIDTH - filled),
        percent
    )
}

fn print_status(status: &JobStatus) {
    let row = StatusRow {
        job_id: status.job_id.clone(),
        state: status.state.clone(),
        progress: format!("{}%", status.progress),
    };
    println!("{}", Table::new(vec![row]));

    match status.state.as_str() {
        "COMPLETED" => {
            println!();
            if let Some(caption) = &status.caption {
                println!("  {} {}", "Caption:".bold(), caption);
            }
            if let Some(tags) = &status.hashtags {
                let rendered: Vec<String> = tags.iter().map(|t| format!("#{}", t)).collect();
                println!("  {} {}", "Hashtags:".bold(), rendered.join(" ").cyan());
            }
            if let Some(theme) = &status.theme {
                println!("  {} {}", "Theme:".bold(), theme.magenta());
            }
        }
        "FAILED" => {
            println!();
            if let Some(notice) = &status.notice {
                println!("  {} {}", "✗".red(), notice.red());
            }
            if let Some(error) = &status.error {
                println!("  {} {}", "Detail:".bold(), error.dimmed());
            }
        }
        "SUPERSEDED" => {
            println!();
            println!("  {}", "Replaced by a newer upload".yellow());
        }
        _ => {}
    }
}

fn print_theme(view: &ThemeView) {
    let auto = if view.auto_theme {
        "ON".green()
    } else {
        "OFF".yellow()
    };
    println!("  {} {}", "Auto-theme:".bold(), auto);
    println!(
        "  {} {}",
        "Current theme:".bold(),
        view.current_theme.as_deref().unwrap_or("none")
    );

    if !view.variables.is_empty() {
        println!();
        let rows: Vec<VariableRow> = view
            .variables
            .iter()
            .map(|(variable, value)| VariableRow {
                variable: variable.clone(),
                value: value.clone(),
            })
            .collect();
        println!("{}", Table::new(rows));
    }
}

async fn generate(
    url: &str,
    image: PathBuf,
    description: Option<String>,
    no_theme: bool,
) -> Result<()> {
    let bytes = tokio::fs::read(&image)
        .await
        .with_context(|| format!("Failed to read {}", image.display()))?;
    if bytes.is_empty() {
        anyhow::bail!("{} is empty", image.display());
    }
    if bytes.len() as u64 > MAX_UPLOAD_BYTES {
        anyhow::bail!("File size exceeds the 10MB limit");
    }

    let mut params = json!({
        "image_base64": STANDARD.encode(&bytes),
        "description": description,
    });
    // Omitted wants_theme follows the daemon's auto-theme switch
    if no_theme {
        params["wants_theme"] = json!(false);
    }

    let result = call_rpc(url, "content.submit.v1", params).await?;
    let submitted: SubmitResult = serde_json::from_value(result)?;
    println!(
        "{} {}",
        "✓ Upload accepted, job".green().bold(),
        submitted.job_id.bold()
    );

    let status = loop {
        let status = fetch_status(url, &submitted.job_id).await?;
        print!("\r  {}", progress_bar(status.progress));
        std::io::stdout().flush()?;
        if status.state != "RUNNING" {
            println!();
            break status;
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    };

    println!();
    print_status(&status);
    if status.state != "COMPLETED" {
        anyhow::bail!("Job {} ended in state {}", status.job_id, status.state);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            image,
            description,
            no_theme,
        } => {
            generate(&cli.rpc_url, image, description, no_theme).await?;
        }

        Commands::Status { job_id } => {
            let status = fetch_status(&cli.rpc_url, &job_id).await?;
            print_status(&status);
        }

        Commands::Theme { command } => {
            let result = match command {
                ThemeCommands::Auto { switch } => {
                    let enabled = matches!(switch, Switch::On);
                    call_rpc(&cli.rpc_url, "theme.auto.v1", json!({ "enabled": enabled })).await?
                }
                ThemeCommands::Show => call_rpc(&cli.rpc_url, "theme.current.v1", json!({})).await?,
            };
            let view: ThemeView = serde_json::from_value(result)?;

            println!("{}", "Theme".cyan().bold());
            println!();
            print_theme(&view);
        }
    }

    Ok(())
}

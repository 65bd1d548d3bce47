use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(about = "Submission CLI for the CAD relay server", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the server is alive
    Ping,
    /// Render a preview mesh from a code file
    Preview { file: PathBuf },
    /// Generate an STL file
    Stl {
        file: PathBuf,
        #[arg(short, long, default_value = "model.stl")]
        output: PathBuf,
    },
    /// Generate a STEP file
    Step {
        file: PathBuf,
        #[arg(short, long, default_value = "model.step")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Ping => {
            let res = client.get(format!("{}/test", cli.url)).send().await?;
            println!("{}", res.text().await?);
        }
        Commands::Preview { file } => {
            let code = std::fs::read_to_string(&file)?;
            let res = client
                .post(format!("{}/preview", cli.url))
                .json(&json!({ "code": code }))
                .send()
                .await?;
            print_envelope(res).await?;
        }
        Commands::Stl { file, output } => {
            submit_binary(&client, &cli.url, "stl", &file, &output).await?;
        }
        Commands::Step { file, output } => {
            submit_binary(&client, &cli.url, "step", &file, &output).await?;
        }
    }

    Ok(())
}

async fn submit_binary(
    client: &reqwest::Client,
    base: &str,
    kind: &str,
    file: &Path,
    output: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let code = std::fs::read_to_string(file)?;
    let res = client
        .post(format!("{}/{}", base, kind))
        .json(&json!({ "code": code }))
        .send()
        .await?;

    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: server returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let bytes = res.bytes().await?;
    std::fs::write(output, &bytes)?;
    println!("Wrote {} bytes to {}", bytes.len(), output.display());
    Ok(())
}

async fn print_envelope(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: server returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};

use crate::sheets::SheetsConnector;

#[derive(Parser)]
#[command(name = "sheetctl")]
#[command(about = "Sheet sync CLI - inspect and write the configured Google Sheet")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "Authenticate and show spreadsheet title, worksheets and header row")]
    Info,

    #[command(about = "List every data row of the first worksheet")]
    Rows,

    #[command(about = "Append a sync row to the first worksheet")]
    Append {
        #[arg(long, help = "User identifier (defaults to anonymous)")]
        user_id: Option<String>,
        #[arg(long, help = "Payload as JSON text, stored serialized")]
        data: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli, sheets: &dyn SheetsConnector) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let output = commands::execute(cli.command, output_format, sheets).await?;
    println!("{}", output);
    Ok(())
}

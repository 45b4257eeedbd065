mod config;
mod error;
mod models;
mod samplesheet;
mod web;
mod zpl;

use std::error::Error;
use std::fs::File;
use std::io::{Read, Write};
use std::path::PathBuf;

use env_logger::Env;
use log::{error, info, warn};
use structopt::StructOpt;

use crate::config::{LabelOptions, Layout, Order};
use crate::samplesheet::{BottleSheet, DEFAULT_COLUMN};

#[macro_use]
extern crate rocket;

type Result<T> = std::result::Result<T, Box<dyn Error>>;

/// Load bottle IDs from a workbook, a text file or stdin
fn load(xlsx: Option<PathBuf>, text: Option<String>, column: &str) -> Result<BottleSheet> {
    if let Some(xlsx) = xlsx {
        info!("Reading bottle IDs from column '{}' of {}", column, xlsx.display());
        return Ok(BottleSheet::from_xlsx(&xlsx, column)?);
    }

    let mut buf = String::new();
    match text.as_deref() {
        None | Some("-") => {
            std::io::stdin().lock().read_to_string(&mut buf)?;
        }
        Some(path) => {
            File::open(path)?.read_to_string(&mut buf)?;
        }
    }
    Ok(BottleSheet::from_text(&buf))
}

fn render(sheet: BottleSheet, rack: String, options: LabelOptions, output: Option<PathBuf>) -> Result<()> {
    if options.layout == Layout::Location && rack.trim().is_empty() {
        warn!("No rack number given (--rack), location labels will print without one.");
    }

    let zpl = zpl::render_sheet(sheet, &rack, &options)?;

    if let Some(output) = &output {
        info!("Writing ZPL to {}...", output.display());
        File::create(output)?.write_all(zpl.as_bytes())?;
    } else {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        out.write_all(zpl.as_bytes())?;
        if !zpl.is_empty() {
            out.write_all(b"\n")?;
        }
    }
    Ok(())
}

fn run(cmd: config::Command) -> Result<()> {
    match cmd {
        config::Command::Render {
            xlsx,
            text,
            rack,
            column,
            layout,
            split,
            sort,
            verbatim,
            output } => {
                let options = LabelOptions {
                    layout,
                    split,
                    order: if sort { Order::Sorted } else { Order::Preserve },
                    verbatim,
                    column: column.unwrap_or_else(|| DEFAULT_COLUMN.to_string()),
                };
                let sheet = load(xlsx, text, &options.column)
                    .map_err(|e| format!("Could not read bottle IDs: {}", e))?;
                if sheet.is_empty() {
                    warn!("No bottle IDs found, nothing to print.");
                }
                render(sheet, rack, options, output)
        }

        config::Command::Sample { path } => {
            BottleSheet::write_template(&path)?;
            info!("Wrote sample workbook to {}", path.display());
            Ok(())
        }

        config::Command::Web => {
            web::rocket();
            Ok(())
        }
    }
}

fn main() {
    // .env may carry RUST_LOG and ROCKET_* settings
    dotenv::dotenv().ok();

    let config = config::Opt::from_args();

    // set up logging
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    if let Err(e) = run(config.cmd) {
        error!("{}", e);
        std::process::exit(1);
    }
}

use anyhow::{Context, Result};
use rusty_dashboard::config::Configurator;
use rusty_dashboard::pipeline::DISPLAY_DATE_FORMAT;
use rusty_dashboard::session::{Session, Windowed};
use rusty_dashboard::table::Table;
use std::path::Path;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn print_table(table: &Table) {
    println!("{}", table.column_names().join(" | "));
    for index in 0..table.row_count() {
        let cells: Vec<String> = table
            .row(index)
            .unwrap_or_default()
            .into_iter()
            .map(ToString::to_string)
            .collect();
        println!("{}", cells.join(" | "));
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config_path = std::env::args().nth(1).context("usage: dashboard <config.json>")?;
    let config = Configurator::new(Path::new(&config_path))
        .load()
        .with_context(|| format!("failed to load configuration {}", config_path))?;
    debug!(?config, "starting dashboard run");

    let bytes = std::fs::read(&config.input)
        .with_context(|| format!("failed to read {}", config.input.display()))?;
    let mut session = Session::upload(&bytes, &config.extension(), config.sheet.as_deref())
        .with_context(|| format!("failed to process {}", config.input.display()))?;

    println!("Preview");
    print_table(&session.preview());
    println!();

    if session.date_candidates().is_empty() {
        println!("No text column to use as a date column");
        return Ok(());
    }
    session.select_date_column(&config.date_column)?;
    if let Some(window) = config.window {
        session.set_window(window.start, window.end)?;
    }
    for direction in &config.shifts {
        session.shift(*direction)?;
    }
    if let Some(window) = session.window() {
        println!(
            "Window {} .. {}",
            window.start().format(DISPLAY_DATE_FORMAT),
            window.end().format(DISPLAY_DATE_FORMAT)
        );
    }

    match session.filtered()? {
        Windowed::Ready(filtered) => println!("Filtered rows: {}", filtered.row_count()),
        Windowed::EmptyWindow => println!("No data in the selected window"),
    }
    for (name, class) in session.column_classes() {
        println!("  {}: {}", name, class.as_str());
    }

    if let Some(output) = &config.output {
        match session.export(&config.charts, output)? {
            Windowed::Ready(pages) => println!("Wrote {} page(s) to {}", pages, output.display()),
            Windowed::EmptyWindow => println!("Nothing to export for the selected window"),
        }
    }
    Ok(())
}

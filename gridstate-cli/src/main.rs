use std::fs::File;
use std::path::PathBuf;

use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use gridstate::prelude::*;
use log::debug;
use simplelog::Config;
use simplelog::LevelFilter;
use simplelog::SimpleLogger;
use simplelog::WriteLogger;

#[derive(Parser)]
#[command(about = "Filter, sort and page a JSON grid definition.")]
struct Args {
    /// Grid definition: `{ "config": {..}, "columns": [..], "data": [..] }`.
    file: PathBuf,

    /// Global filter text.
    #[arg(long)]
    filter: Option<String>,

    /// Column filter as `COLUMN=TEXT` (repeatable).
    #[arg(long = "where")]
    column_filters: Vec<String>,

    /// Sort key as `COLUMN` or `COLUMN:desc` (repeatable, first is primary).
    #[arg(long)]
    sort: Vec<String>,

    /// 1-based page number.
    #[arg(long)]
    page: Option<String>,

    #[arg(long)]
    page_size: Option<usize>,

    /// Comma-separated row ids to select (`#N` for rows without a key).
    #[arg(long, value_delimiter = ',')]
    select: Vec<String>,

    /// Column ids to hide (repeatable).
    #[arg(long)]
    hide: Vec<String>,

    /// Print the export payload instead of the current page.
    #[arg(long)]
    export: bool,

    /// Print the snapshot as JSON.
    #[arg(long)]
    json: bool,

    /// Write a debug log to this file.
    #[arg(long)]
    log: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log.as_ref())?;

    let file = GridFile::load(&args.file)
        .with_context(|| format!("loading {}", args.file.display()))?;
    let mut engine = GridEngine::new(file.columns(), file.records(), file.config.clone());

    if let Some(filter) = &args.filter {
        engine.set_global_filter(filter);
    }
    for spec in &args.column_filters {
        let Some((id, value)) = spec.split_once('=') else {
            bail!("invalid --where '{}': expected COLUMN=TEXT", spec);
        };
        if !engine.set_column_filter(id, value) {
            eprintln!("warning: column '{}' is not filterable", id);
        }
    }

    let sorting = args.sort.iter().map(|s| parse_sort(s)).collect::<Result<Vec<_>>>()?;
    if !sorting.is_empty() {
        engine.set_sorting(sorting);
    }

    for id in &args.hide {
        let mut visibility = engine.column_visibility().clone();
        visibility.insert(id.clone(), false);
        engine.set_column_visibility(visibility);
    }

    if let Some(size) = args.page_size {
        if size == 0 {
            bail!("--page-size must be at least 1");
        }
        engine.set_page_size(size);
    }
    if let Some(page) = &args.page {
        engine.go_to_page_input(page);
    }

    let ids = args
        .select
        .iter()
        .filter(|s| !s.is_empty())
        .map(|s| {
            engine
                .find_row_id(s)
                .with_context(|| format!("no row with id '{}'", s))
        })
        .collect::<Result<Vec<_>>>()?;
    engine.select_rows(&ids);

    if args.export {
        let payload = engine.export_payload();
        debug!("Exporting {} rows to {}", payload.rows.len(), payload.file_name);
        if args.json {
            println!("{}", serde_json::to_string_pretty(&payload)?);
        } else {
            let table = payload.table();
            println!("# {}", payload.file_name);
            print_table(&table.headers, &table.rows, &[]);
        }
        return Ok(());
    }

    let snapshot = engine.snapshot();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print_snapshot(&snapshot);
    }
    Ok(())
}

fn init_logging(path: Option<&PathBuf>) -> Result<()> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating log file {}", path.display()))?;
            WriteLogger::init(LevelFilter::Debug, Config::default(), file)
                .context("initializing logger")?;
        }
        None => {
            SimpleLogger::init(LevelFilter::Warn, Config::default())
                .context("initializing logger")?;
        }
    }
    Ok(())
}

fn parse_sort(spec: &str) -> Result<SortDescriptor> {
    let (id, direction) = match spec.split_once(':') {
        Some((id, "desc")) => (id, SortDirection::Descending),
        Some((id, "asc")) => (id, SortDirection::Ascending),
        Some((_, other)) => bail!("invalid sort direction '{}' (use asc or desc)", other),
        None => (spec, SortDirection::Ascending),
    };
    Ok(SortDescriptor::new(id, direction))
}

fn print_snapshot(snapshot: &GridSnapshot) {
    if !snapshot.render_table {
        println!("(no visible columns)");
        return;
    }

    let headers: Vec<String> = snapshot
        .headers
        .iter()
        .map(|h| match h.sort {
            Some(SortDirection::Ascending) => format!("{} ^", h.label),
            Some(SortDirection::Descending) => format!("{} v", h.label),
            _ => h.label.clone(),
        })
        .collect();
    let rows: Vec<Vec<String>> = snapshot.rows.iter().map(|r| r.cells.clone()).collect();
    print_table(&headers, &rows, &snapshot.footers);

    if snapshot.show_pagination {
        println!(
            "Page {} of {} ({} of {} rows)",
            snapshot.page_index + 1,
            snapshot.page_count,
            snapshot.filtered_rows,
            snapshot.total_rows
        );
    }
    if snapshot.selected_count > 0 {
        println!("{} selected", snapshot.selected_count);
    }
}

fn print_table(headers: &[String], rows: &[Vec<String>], footers: &[String]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for line in rows.iter().map(Vec::as_slice).chain(std::iter::once(footers)) {
        for (i, cell) in line.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let render = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{:<w$}", cell, w = w))
            .collect::<Vec<_>>()
            .join(" | ")
    };

    println!("{}", render(headers));
    println!(
        "{}",
        widths
            .iter()
            .map(|&w| "-".repeat(w))
            .collect::<Vec<_>>()
            .join("-+-")
    );
    for row in rows {
        println!("{}", render(row));
    }
    if !footers.is_empty() {
        println!("{}", render(footers));
    }
}

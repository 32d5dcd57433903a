// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod data;
mod logging;

use anyhow::{Context, Result, anyhow, bail};
use config::Config;
use facilis_store::SqliteStore;
use facilis_table::{Page, Table, TableCommand, TableOptions};
use std::env;
use std::path::{Path, PathBuf};

const DEMO_ASSET_COUNT: usize = 240;
const DEMO_SEED: u64 = 2026;
const DEMO_STORAGE_KEY: &str = "demo:assets";

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `facilis --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;
    logging::init(&config.log_level())?;

    let db_path = if options.demo {
        PathBuf::from(":memory:")
    } else {
        config.db_path()?
    };
    if options.print_db_path {
        println!("{}", db_path.display());
        return Ok(());
    }

    let store = SqliteStore::open(&db_path).with_context(|| {
        format!(
            "open database {} -- if this path is wrong, set [storage].db_path or FACILIS_DB_PATH",
            db_path.display()
        )
    })?;
    store.bootstrap()?;
    tracing::debug!(db_path = %db_path.display(), "preference store ready");

    match (&options.data_path, options.demo) {
        (Some(_), true) => bail!("--data and --demo are mutually exclusive; pick one source"),
        (Some(path), false) => {
            let data = data::load_json_rows(path)?;
            tracing::info!(rows = data.rows.len(), columns = data.columns.len(), path = %path.display(), "loaded data file");
            let table = Table::new(
                data.columns,
                |row: &data::JsonRow| row.id,
                table_options(&config, &data_storage_key(path)),
            )
            .with_store(Box::new(store))
            .with_rows(data.rows);
            present(table, &options, &data_title(path))
        }
        (None, true) => {
            let table = Table::new(
                facilis_testkit::asset_columns()?,
                facilis_testkit::asset_id,
                table_options(&config, DEMO_STORAGE_KEY),
            )
            .with_store(Box::new(store))
            .with_rows(facilis_testkit::sample_assets(DEMO_SEED, DEMO_ASSET_COUNT));
            present(table, &options, "assets")
        }
        (None, false) if options.check_only => Ok(()),
        (None, false) => {
            bail!("no rows to show; pass --data <file.json> or --demo (see --help)")
        }
    }
}

fn table_options(config: &Config, default_key: &str) -> TableOptions {
    TableOptions {
        page_size: config.page_size(),
        storage_key: Some(config.storage_key().unwrap_or(default_key).to_owned()),
        ..TableOptions::default()
    }
}

fn data_storage_key(path: &Path) -> String {
    format!("data:{}", data_title(path))
}

fn data_title(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "data".to_owned())
}

/// Applies the command-line view options, then either prints the page or
/// hands the table to the TUI.
fn present<R>(mut table: Table<R>, options: &CliOptions, title: &str) -> Result<()> {
    if let Some(term) = &options.search {
        table.dispatch(TableCommand::SetSearch(term.clone()));
    }

    for key in &options.sorts {
        if !table.columns().contains(key) {
            bail!(
                "unknown sort column {key:?}; available columns: {}",
                table.columns().keys().join(", ")
            );
        }
        let events = table.dispatch(TableCommand::SortClick(key.clone()));
        if let Some(message) = facilis_tui::refusal_message(&events) {
            bail!("--sort {key}: {message}");
        }
    }

    if let Some(page) = options.page {
        table.dispatch(TableCommand::SetPage(page.saturating_sub(1)));
    }

    if options.check_only {
        let page = table.page();
        tracing::info!(
            rows = page.total_len,
            matching = page.filtered_len,
            "check passed"
        );
        return Ok(());
    }

    if options.dump {
        let rendered = table.render(&table.renderer());
        print!("{}", rendered.to_text());
        println!("{}", dump_footer(&table.page()));
        return Ok(());
    }

    facilis_tui::run_app(&mut table, title)
}

fn dump_footer<R>(page: &Page<'_, R>) -> String {
    format!(
        "page {}/{} | {} of {} rows",
        page.page + 1,
        page.page_count,
        page.filtered_len,
        page.total_len
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_db_path: bool,
    print_example: bool,
    data_path: Option<PathBuf>,
    demo: bool,
    dump: bool,
    search: Option<String>,
    sorts: Vec<String>,
    page: Option<usize>,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_db_path: false,
        print_example: false,
        data_path: None,
        demo: false,
        dump: false,
        search: None,
        sorts: Vec::new(),
        page: None,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-path" => {
                options.print_db_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--data" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--data requires a JSON file path"))?;
                options.data_path = Some(PathBuf::from(value.as_ref()));
            }
            "--demo" => {
                options.demo = true;
            }
            "--dump" => {
                options.dump = true;
            }
            "--search" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--search requires a term"))?;
                options.search = Some(value.as_ref().to_owned());
            }
            "--sort" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--sort requires a column key"))?;
                options.sorts.push(value.as_ref().to_owned());
            }
            "--page" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--page requires a page number"))?;
                let page = value
                    .as_ref()
                    .parse::<usize>()
                    .ok()
                    .filter(|page| *page > 0)
                    .ok_or_else(|| {
                        anyhow!(
                            "--page expects a page number starting at 1, got {:?}",
                            value.as_ref()
                        )
                    })?;
                options.page = Some(page);
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("facilis");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-path             Print resolved database path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --data <file.json>       Show rows from a JSON array of objects");
    println!("  --demo                   Show a generated asset register (in-memory prefs)");
    println!("  --dump                   Print the current page as text and exit");
    println!("  --search <term>          Start with a search term");
    println!("  --sort <key>             Click a column's sort; repeat to cycle");
    println!("  --page <n>               Start on page n (1-based, clamped)");
    println!("  --check                  Validate config, database and data, then exit");
    println!("  --help                   Show this help");
}

use anyhow::{bail, Result};
use catalog_core::{
    load_settings, CatalogHandle, CatalogSnapshot, PresentationBinding, ProductCatalogStore,
    ViewEvent,
};
use clap::Parser;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod commands;
mod render;

use commands::{parse_input, InputCommand, HELP};
use render::{render_catalog, Layout};

#[derive(Parser, Debug)]
#[command(about = "Browse the product catalog from a terminal")]
struct Args {
    /// Catalog endpoint; overrides catalog.toml and the environment.
    #[arg(long)]
    endpoint: Option<String>,
    /// Initial title filter.
    #[arg(long, default_value = "")]
    query: String,
    #[arg(long, value_enum, default_value_t = Layout::Grid)]
    layout: Layout,
    /// Fetch once, print the catalog and exit.
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings()?;
    if let Some(endpoint) = args.endpoint {
        settings.endpoint_url = endpoint;
    }
    // The first fetch is issued below, once the view is listening.
    settings.fetch_on_start = false;
    info!(endpoint = %settings.endpoint_url, "starting catalog browser");

    let handle = ProductCatalogStore::spawn_http(&settings);
    if !args.query.is_empty() {
        handle.set_query(args.query)?;
    }

    if args.once {
        return print_once(&handle, args.layout).await;
    }
    browse(handle, args.layout).await
}

async fn print_once(handle: &CatalogHandle, layout: Layout) -> Result<()> {
    handle.refresh().await?;
    let snapshot = handle.snapshot().await?;
    print!("{}", render_catalog(&snapshot, layout));
    if let Some(error) = snapshot.last_error {
        bail!(error);
    }
    Ok(())
}

async fn browse(handle: CatalogHandle, mut layout: Layout) -> Result<()> {
    let (view_tx, mut view_rx) = mpsc::unbounded_channel();
    let binding = PresentationBinding::attach(handle, view_tx)?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last_render: Option<CatalogSnapshot> = None;

    println!("{HELP}\n");
    println!("Loading products...");
    binding.request_refresh()?;

    loop {
        tokio::select! {
            event = view_rx.recv() => match event {
                Some(ViewEvent::Render(snapshot)) => {
                    print!("{}", render_catalog(&snapshot, layout));
                    last_render = Some(snapshot);
                }
                Some(ViewEvent::RefreshComplete) => debug!("refresh complete"),
                None => break,
            },
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                let cmd = parse_input(&line);
                debug!(command = cmd.name(), "handling input");
                match cmd {
                    InputCommand::Search(text) => binding.update_search_text(Some(&text))?,
                    InputCommand::Refresh => {
                        println!("Refreshing...");
                        binding.request_refresh()?;
                    }
                    InputCommand::ToggleLayout => {
                        layout = layout.toggled();
                        if let Some(snapshot) = &last_render {
                            print!("{}", render_catalog(snapshot, layout));
                        }
                    }
                    InputCommand::Help => println!("{HELP}"),
                    InputCommand::Quit => break,
                }
            }
        }
    }

    binding.detach();
    Ok(())
}

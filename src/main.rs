use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use shopfeed::config::Config;
use shopfeed::datasource::TracingObserver;
use shopfeed::logging::init_tracing;
use shopfeed::{CatalogApi, Datasource, ImageCache, PageOutcome};

#[derive(Parser, Debug)]
#[command(name = "shopfeed", version, about = "Browse a paginated remote catalogue")]
struct Cli {
    /// Path to a config file (default: ~/.config/shopfeed/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Override the catalogue host (e.g. 127.0.0.1:8080)
    #[arg(long, value_name = "HOST")]
    host: Option<String>,

    /// Override the URL scheme (http or https)
    #[arg(long, value_name = "SCHEME")]
    scheme: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List catalogue items, following next-page links
    Items {
        /// Stop after this many pages
        #[arg(long, value_name = "N")]
        pages: Option<usize>,
    },
    /// List catalogue categories
    Categories,
    /// Download the image of an item
    Image {
        /// Item identifier
        item_id: String,
        /// Where to write the image (format from extension)
        #[arg(long, short, value_name = "PATH")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(host) = &cli.host {
        config.api.host = host.clone();
    }
    if let Some(scheme) = &cli.scheme {
        config.api.scheme = scheme.clone();
    }
    config.validate()?;

    init_tracing(&config.logging.filter);

    tokio::select! {
        result = run(cli.command, config) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted");
            Ok(())
        }
    }
}

async fn run(command: Command, config: Config) -> Result<()> {
    let api = CatalogApi::from_config(&config.api).context("Failed to build catalogue client")?;

    match command {
        Command::Categories => {
            let categories = api.fetch_categories().wait().await?;
            for category in categories {
                println!("{}", category);
            }
            Ok(())
        }
        Command::Items { pages } => {
            let datasource = Datasource::spawn(api, ImageCache::new(), Arc::new(TracingObserver));
            let loaded = load_pages(&datasource, pages, |_| false).await?;
            for (position, item) in datasource.items() {
                println!(
                    "{:>4}  {:<12} {:<32} {:>10}  [{}]",
                    position, item.id, item.title, item.price.to_string(), item.category
                );
            }
            tracing::info!(
                pages = loaded,
                items = datasource.len(),
                total = datasource.total().unwrap_or_default(),
                "Done"
            );
            Ok(())
        }
        Command::Image { item_id, output } => {
            let datasource = Datasource::spawn(api, ImageCache::new(), Arc::new(TracingObserver));
            load_pages(&datasource, None, |ds| {
                ds.items().values().any(|item| item.id == item_id)
            })
            .await?;

            let Some(image) = datasource.fetch_image(&item_id).await? else {
                bail!("Item '{}' not found in catalogue", item_id);
            };
            image
                .image()
                .save(&output)
                .with_context(|| format!("Failed to write image to {}", output.display()))?;
            println!(
                "{} ({}x{}) -> {}",
                item_id,
                image.width(),
                image.height(),
                output.display()
            );
            Ok(())
        }
    }
}

/// Load pages from the start until `done` holds, the page limit is hit, or
/// the catalogue runs out. Returns the number of pages merged.
async fn load_pages<F>(datasource: &Datasource, limit: Option<usize>, done: F) -> Result<usize>
where
    F: Fn(&Datasource) -> bool,
{
    let mut loaded = 0;
    let mut outcome = datasource.request_page(0).await?;

    loop {
        match outcome {
            PageOutcome::Merged { .. } => loaded += 1,
            PageOutcome::Superseded | PageOutcome::Skipped => break,
        }
        let limit_reached = limit.is_some_and(|limit| loaded >= limit);
        if limit_reached || done(datasource) || !datasource.has_next_page() {
            break;
        }
        outcome = datasource.request_next_page().await?;
    }

    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_items_with_page_limit() {
        let cli = Cli::try_parse_from(["shopfeed", "--host", "127.0.0.1:9000", "items", "--pages", "2"])
            .unwrap();
        assert_eq!(cli.host.as_deref(), Some("127.0.0.1:9000"));
        assert!(matches!(cli.command, Command::Items { pages: Some(2) }));
    }

    #[test]
    fn parse_image_requires_output() {
        assert!(Cli::try_parse_from(["shopfeed", "image", "abc"]).is_err());
        let cli = Cli::try_parse_from(["shopfeed", "image", "abc", "-o", "out.png"]).unwrap();
        match cli.command {
            Command::Image { item_id, output } => {
                assert_eq!(item_id, "abc");
                assert_eq!(output, PathBuf::from("out.png"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the event map toolchain.
//!
//! Two subcommands cover the two halves of the workflow:
//!
//! - `fetch`: pull event listings from RA.co into the events CSV
//! - `render`: geocode a saved CSV and write the interactive map
//!
//! Run with no subcommand for a dialoguer-guided interactive session.
//!
//! Uses `indicatif-log-bridge` (via [`event_map_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and progress bars never fight for the terminal.

mod pipeline;

use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use dialoguer::{Input, Select};
use event_map_cli_utils::{IndicatifProgress, MultiProgress};
use event_map_geocoder::nominatim::NominatimResolver;
use event_map_render::{Backend, MapView, PlaybackOptions, leaflet::LeafletRenderer};
use event_map_source::progress::ProgressCallback;
use event_map_source::ra_co::{EventListingQuery, RaCoFetcher, write_events_csv};
use event_map_transform::AnimationConfig;

#[derive(Parser)]
#[command(name = "event_map", about = "Event map toolchain")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch event listings from RA.co and save them as CSV
    Fetch {
        /// RA.co area code (e.g., 29 for Amsterdam)
        area: u32,

        /// Start of the listing window (YYYY-MM-DD)
        start_date: NaiveDate,

        /// End of the listing window (YYYY-MM-DD)
        end_date: NaiveDate,

        /// Output CSV path
        #[arg(short, long, default_value = "data/events.csv")]
        output: PathBuf,

        /// Maximum number of listings to fetch
        #[arg(long)]
        limit: Option<u64>,
    },

    /// Geocode a saved events CSV and render the interactive map
    Render {
        /// Input events CSV path
        #[arg(short, long, default_value = "data/events.csv")]
        input: PathBuf,

        /// Output HTML path
        #[arg(short, long, default_value = "data/event_map.html")]
        output: PathBuf,

        /// Rendering backend: "static" or "animated"
        #[arg(long, default_value = "animated")]
        backend: String,

        /// Smallest marker radius in pixels
        #[arg(long, default_value_t = 1)]
        min_radius: i64,

        /// Largest marker radius in pixels
        #[arg(long, default_value_t = 100)]
        max_radius: i64,

        /// Map title
        #[arg(long)]
        title: Option<String>,

        /// Do not open the rendered map in a browser
        #[arg(long)]
        no_open: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = event_map_cli_utils::init_logger();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Fetch {
            area,
            start_date,
            end_date,
            output,
            limit,
        }) => fetch(&multi, area, start_date, end_date, &output, limit).await?,
        Some(Commands::Render {
            input,
            output,
            backend,
            min_radius,
            max_radius,
            title,
            no_open,
        }) => {
            let backend: Backend = backend.parse().map_err(|_| {
                format!("invalid backend '{backend}' (expected 'static' or 'animated')")
            })?;
            render(
                &multi, input, output, backend, min_radius, max_radius, title, !no_open,
            )
            .await?;
        }
        None => interactive(&multi).await?,
    }

    Ok(())
}

/// Runs the `fetch` subcommand.
async fn fetch(
    multi: &MultiProgress,
    area: u32,
    start_date: NaiveDate,
    end_date: NaiveDate,
    output: &std::path::Path,
    limit: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let fetcher = RaCoFetcher::new()?;
    let query = EventListingQuery::for_window(area, start_date, end_date);

    log::info!("Fetching area {area} listings, {start_date} through {end_date}");

    let progress: Arc<dyn ProgressCallback> =
        IndicatifProgress::bar(multi, "Fetching listings...");
    let events = fetcher.fetch_all(&query, limit, &progress).await?;

    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    write_events_csv(&events, output)?;

    Ok(())
}

/// Runs the `render` subcommand.
#[allow(clippy::too_many_arguments)]
async fn render(
    multi: &MultiProgress,
    input: PathBuf,
    output: PathBuf,
    backend: Backend,
    min_radius: i64,
    max_radius: i64,
    title: Option<String>,
    open: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut view = MapView::default();
    if let Some(title) = title {
        view.title = title;
    }

    let args = pipeline::RenderRun {
        input,
        output,
        min_radius,
        max_radius,
        view,
        animation: AnimationConfig::default(),
        playback: PlaybackOptions::default(),
        open,
    };

    let resolver = NominatimResolver::from_embedded_config()?;
    let renderer = LeafletRenderer::new(backend);
    let progress: Arc<dyn ProgressCallback> = IndicatifProgress::bar(multi, "Rendering map...");

    pipeline::run(&args, &resolver, &renderer, &progress).await?;

    Ok(())
}

/// Top-level tool selection for the interactive session.
enum Tool {
    Fetch,
    Render,
}

impl Tool {
    const ALL: &[Self] = &[Self::Fetch, Self::Render];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Fetch => "Fetch event listings",
            Self::Render => "Render map from saved CSV",
        }
    }
}

/// Guides the user through a run when no subcommand was given.
async fn interactive(multi: &MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    println!("Event Map Toolchain");
    println!();

    let labels: Vec<&str> = Tool::ALL.iter().map(Tool::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Tool::ALL[idx] {
        Tool::Fetch => {
            let area: u32 = Input::new()
                .with_prompt("RA.co area code (29 = Amsterdam)")
                .default(29)
                .interact_text()?;
            let start: NaiveDate = Input::new()
                .with_prompt("Window start (YYYY-MM-DD)")
                .interact_text()?;
            let end: NaiveDate = Input::new()
                .with_prompt("Window end (YYYY-MM-DD)")
                .interact_text()?;
            let output: String = Input::new()
                .with_prompt("Output CSV")
                .default("data/events.csv".to_string())
                .interact_text()?;

            fetch(multi, area, start, end, std::path::Path::new(&output), None).await
        }
        Tool::Render => {
            let input: String = Input::new()
                .with_prompt("Input CSV")
                .default("data/events.csv".to_string())
                .interact_text()?;
            let backends = [Backend::Animated, Backend::Static];
            let backend_idx = Select::new()
                .with_prompt("Backend")
                .items(&["animated", "static"])
                .default(0)
                .interact()?;

            render(
                multi,
                PathBuf::from(input),
                PathBuf::from("data/event_map.html"),
                backends[backend_idx],
                1,
                100,
                None,
                true,
            )
            .await
        }
    }
}

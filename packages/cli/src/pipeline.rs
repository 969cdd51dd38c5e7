//! The load → resolve → scale → animate → render pipeline.
//!
//! One explicit function per run, configuration in, report out; nothing
//! happens as a side effect of loading the module. Stage ordering
//! matters in exactly one place: scaling needs the attendance counts of
//! *all* validated records before any record's radius exists, so the
//! scale pass runs over the full dataset, including records that later
//! drop out as unresolved, and only then are unresolved records
//! excluded from rendering.

use std::path::PathBuf;
use std::sync::Arc;

use event_map_event_models::{
    EventRecord, ExcludedRecord, ExclusionReason, PlottedEvent, RunReport,
};
use event_map_geocoder::{AddressResolver, GeocodedAddress};
use event_map_render::{
    MapDocument, MapRenderer, MapView, Marker, PlaybackOptions, RenderError, features,
    open_in_browser,
};
use event_map_source::SourceError;
use event_map_source::csv_file;
use event_map_source::progress::ProgressCallback;
use event_map_transform::{AnimationConfig, ZeroStepsError, animation, scale};
use thiserror::Error;

/// Errors that abort a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Loading the input CSV failed (missing or unreadable file).
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Scaling configuration was invalid.
    #[error(transparent)]
    Scale(#[from] scale::ScaleError),

    /// Animation configuration was invalid.
    #[error(transparent)]
    Animation(#[from] ZeroStepsError),

    /// Writing the map document failed.
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Configuration for one render run.
pub struct RenderRun {
    /// Input events CSV.
    pub input: PathBuf,
    /// Output HTML document.
    pub output: PathBuf,
    /// Smallest marker radius (scale target minimum).
    pub min_radius: i64,
    /// Largest marker radius (scale target maximum).
    pub max_radius: i64,
    /// Map viewport and title.
    pub view: MapView,
    /// Growth animation settings.
    pub animation: AnimationConfig,
    /// Playback settings for the animated layer.
    pub playback: PlaybackOptions,
    /// Open the rendered document in a browser when done.
    pub open: bool,
}

/// Runs the full pipeline and returns the run report.
///
/// Geocoding misses and service failures exclude individual records and
/// never abort the run; only a missing input file, invalid scale/animation
/// configuration, or an unwritable output is fatal.
///
/// # Errors
///
/// Returns [`PipelineError`] on fatal failures only.
pub async fn run(
    args: &RenderRun,
    resolver: &dyn AddressResolver,
    renderer: &dyn MapRenderer,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<RunReport, PipelineError> {
    let outcome = csv_file::load_events(&args.input)?;
    let records = outcome.records;
    let mut excluded = outcome.excluded;

    // Resolve every record's coordinates, sequentially. The resolver owns
    // rate limiting and retries; a `None` here is a permanent miss.
    progress.set_message("Geocoding addresses...".to_string());
    progress.set_total(records.len() as u64);

    let mut resolutions: Vec<Option<GeocodedAddress>> = Vec::with_capacity(records.len());
    for record in &records {
        let resolution = match resolver.resolve(&record.address).await {
            Ok(found) => found,
            Err(e) => {
                log::warn!(
                    "Geocoding failed for '{}' ({}): {e}",
                    record.event_name,
                    record.address
                );
                excluded.push(ExcludedRecord {
                    event_name: record.event_name.clone(),
                    address: Some(record.address.clone()),
                    reason: ExclusionReason::GeocodingFailed,
                });
                resolutions.push(None);
                progress.inc(1);
                continue;
            }
        };

        if resolution.is_none() {
            log::warn!(
                "No match for '{}' ({})",
                record.event_name,
                record.address
            );
            excluded.push(ExcludedRecord {
                event_name: record.event_name.clone(),
                address: Some(record.address.clone()),
                reason: ExclusionReason::AddressNotFound,
            });
        }
        resolutions.push(resolution);
        progress.inc(1);
    }
    progress.finish("Geocoding complete".to_string());

    // Scale over the full validated dataset, then keep only resolved
    // records. A record dropped as unresolved still participated in the
    // min/max, so its absence does not perturb anyone else's radius.
    let plotted: Vec<PlottedEvent> = if records.is_empty() {
        Vec::new()
    } else {
        #[allow(clippy::cast_precision_loss)]
        let values: Vec<f64> = records.iter().map(|r| r.attending as f64).collect();
        let scaled = scale::scale_to_range(&values, args.min_radius, args.max_radius)?;

        records
            .into_iter()
            .zip(resolutions)
            .zip(scaled)
            .filter_map(|((record, resolution), scaled_attendance)| {
                resolution.map(|geo| PlottedEvent {
                    record,
                    latitude: geo.latitude,
                    longitude: geo.longitude,
                    scaled_attendance,
                })
            })
            .collect()
    };

    if plotted.is_empty() {
        log::warn!("No records resolved; rendering an empty map");
    }

    let frames = animation::build_dataset(&plotted, &args.animation)?;
    let markers = plotted.iter().map(marker_for).collect();

    let doc = MapDocument {
        view: args.view.clone(),
        markers,
        animation: features::feature_collection(&frames),
        playback: args.playback.clone(),
    };

    let written = renderer.render(&doc, &args.output)?;

    if args.open {
        // A browser that refuses to open is an inconvenience, not a
        // failed run; the document is already on disk.
        if let Err(e) = open_in_browser(&written) {
            log::warn!("{e}");
        }
    }

    let report = RunReport {
        rows_read: outcome.rows_read,
        plotted: plotted.len(),
        excluded,
    };
    log_summary(&report);

    Ok(report)
}

/// Builds the static marker for one plotted event.
fn marker_for(event: &PlottedEvent) -> Marker {
    #[allow(clippy::cast_precision_loss)]
    let radius = event.scaled_attendance as f64;
    Marker {
        lat: event.latitude,
        lng: event.longitude,
        radius,
        popup: popup_html(&event.record),
        tooltip: event.record.event_name.clone(),
    }
}

/// Builds the popup HTML for one record: name, venue, guest count, and
/// a link to the event page when one exists.
fn popup_html(record: &EventRecord) -> String {
    let mut html = format!(
        "<b>{}</b><br>{}<br>{} guests",
        escape_html(&record.event_name),
        escape_html(&record.venue_name),
        record.attending
    );
    if let Some(url) = &record.content_url {
        html.push_str(&format!(
            "<br><a href=\"https://ra.co{}\" target=\"_blank\">Event page</a>",
            escape_html(url)
        ));
    }
    html
}

/// Escapes text for embedding in popup HTML.
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Logs the end-of-run summary: totals plus one line per exclusion.
fn log_summary(report: &RunReport) {
    log::info!(
        "Run complete: {} rows read, {} plotted, {} excluded",
        report.rows_read,
        report.plotted,
        report.excluded.len()
    );
    for excluded in &report.excluded {
        log::warn!(
            "  excluded: '{}' ({}){}",
            excluded.event_name,
            excluded.reason,
            excluded
                .address
                .as_deref()
                .map(|a| format!(" [{a}]"))
                .unwrap_or_default()
        );
    }
}

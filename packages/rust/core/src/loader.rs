//! Per-event load: schedule → talks → media listing → attached files.
//!
//! A schedule that cannot be fetched or parsed fails the event. A media
//! listing that cannot be fetched only means no files get attached.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, instrument, warn};

use recordings_media::{FilenamePattern, join_file_reference};
use recordings_schedule::{TalkIndex, map_schedule};
use recordings_shared::{ConferenceMetadata, EventConfig, RecordingsError, Result, Talk};

use crate::fetch::Fetcher;

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// A fully loaded event. Immutable once built.
#[derive(Debug, Clone)]
pub struct LoadedEvent {
    /// Configured metadata with the schedule's conference fields merged over it.
    pub metadata: BTreeMap<String, String>,
    /// The schedule's `<conference>` block, shared with every talk.
    pub conference: Arc<ConferenceMetadata>,
    /// Talks in schedule document order.
    pub talks: Vec<Arc<Talk>>,
    /// What happened with the media listing.
    pub media: MediaOutcome,
}

/// Outcome of the media-listing step of a load.
#[derive(Debug, Clone)]
pub enum MediaOutcome {
    /// The event has no listing or no filename pattern.
    NotConfigured,
    /// The listing could not be fetched; the schedule was kept.
    Unavailable(Arc<RecordingsError>),
    /// The filename pattern does not compile or lacks two groups. The listing
    /// was not fetched and the schedule was kept.
    InvalidPattern(Arc<RecordingsError>),
    /// The listing was scanned.
    Matched(MediaStats),
}

/// Counts from scanning one media listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MediaStats {
    /// Pairs attached to a talk.
    pub attached: usize,
    /// Pairs whose talk id is numeric but not in the schedule.
    pub unmatched: usize,
    /// Pairs whose captured talk id is not an integer.
    pub invalid_ids: usize,
}

impl MediaStats {
    /// Pairs that were found but not attached.
    pub fn dropped(&self) -> usize {
        self.unmatched + self.invalid_ids
    }
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Load one event from its configured sources.
#[instrument(skip_all, fields(event = %event.label()))]
pub async fn load_event(fetcher: &Fetcher, event: &EventConfig) -> Result<LoadedEvent> {
    let start = Instant::now();

    // Compile before any fetch; a bad pattern only costs the event its media.
    let media_source = match event.media_source() {
        Some((listing, pattern)) => match FilenamePattern::new(pattern) {
            Ok(compiled) => Ok(Some((listing, compiled))),
            Err(e) => {
                warn!(pattern, error = %e, "invalid filename pattern, media listing skipped");
                Err(Arc::new(e))
            }
        },
        None => Ok(None),
    };

    info!(schedule = %event.schedule, "fetching schedule");
    let xml = fetcher.fetch_text(&event.schedule).await?;
    let mapped = map_schedule(&xml)?;

    let mut metadata = event.metadata.clone();
    mapped.conference.merge_into(&mut metadata);

    let mut talks = mapped.talks;

    let media = match media_source {
        Err(error) => MediaOutcome::InvalidPattern(error),
        Ok(None) => MediaOutcome::NotConfigured,
        Ok(Some((listing, pattern))) => {
            info!(media_listing = listing, "fetching media listing");
            match fetcher.fetch_text(listing).await {
                Ok(text) => {
                    let stats = attach_media(&mut talks, listing, &text, &pattern);
                    if stats.dropped() > 0 {
                        warn!(
                            unmatched = stats.unmatched,
                            invalid_ids = stats.invalid_ids,
                            pattern = pattern.as_str(),
                            "media listing entries did not match any talk"
                        );
                    }
                    MediaOutcome::Matched(stats)
                }
                Err(e) => {
                    warn!(media_listing = listing, error = %e, "media listing unavailable, keeping schedule");
                    MediaOutcome::Unavailable(Arc::new(e))
                }
            }
        }
    };

    let talks: Vec<Arc<Talk>> = talks.into_talks().into_iter().map(Arc::new).collect();

    info!(
        title = %mapped.conference.title,
        talks = talks.len(),
        with_media = talks.iter().filter(|t| t.has_media()).count(),
        duration_ms = start.elapsed().as_millis(),
        "event loaded"
    );

    Ok(LoadedEvent {
        metadata,
        conference: mapped.conference,
        talks,
        media,
    })
}

/// Scan `text` and attach every matching file to its talk.
///
/// File references are `listing` joined with the captured filename. Pairs
/// whose id is not numeric, or names no talk in `talks`, are dropped.
pub fn attach_media(
    talks: &mut TalkIndex,
    listing: &str,
    text: &str,
    pattern: &FilenamePattern,
) -> MediaStats {
    let mut stats = MediaStats::default();

    for found in pattern.scan(text) {
        let Some(id) = found.parsed_talk_id() else {
            debug!(filename = found.filename, talk_id = found.talk_id, "non-numeric talk id");
            stats.invalid_ids += 1;
            continue;
        };

        if talks.attach_file(id, join_file_reference(listing, found.filename)) {
            stats.attached += 1;
        } else {
            debug!(filename = found.filename, id, "no talk with this id");
            stats.unmatched += 1;
        }
    }

    stats
}

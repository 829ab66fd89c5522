//! Observer seam for everything the pipeline reports while it runs.
//!
//! The fetch orchestrators and persistence helpers never call the logger directly.
//! They hand a [`PipelineEvent`] to an [`EventObserver`] supplied by the caller.
//! [`LogObserver`] forwards events to the `log` facade and is the default;
//! [`RecordingObserver`] keeps them in memory so callers can assert on them.

use crate::types::artifact::Artifacts;
use chrono::NaiveDate;
use log::{debug, error, info, warn};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

/// Something noteworthy that happened during a fetch or save.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    /// A daily request is about to be sent.
    Requesting {
        year: i32,
        url: String,
        params: Vec<(String, String)>,
    },
    RawPayloadSaved {
        year: i32,
        path: PathBuf,
    },
    /// The payload has no usable `daily` block.
    MissingDailyBlock,
    /// The `daily` block has no `time` field.
    MissingTimeField,
    /// A year was fetched but produced no rows.
    EmptyYear {
        year: i32,
    },
    YearFailed {
        year: i32,
        error: String,
    },
    NoData {
        start_year: i32,
        end_year: i32,
    },
    DuplicateDates {
        count: usize,
    },
    PartialYearRequested {
        year: i32,
        until: NaiveDate,
    },
    EmptyPartialYear {
        year: i32,
    },
    PartialYearFailed {
        year: i32,
        error: String,
    },
    PolitenessDelay {
        delay: Duration,
    },
    /// `save_frame` was given an empty frame.
    SaveSkipped {
        base_filename: String,
    },
    /// The optional parquet copy could not be written; the CSV copy exists.
    SecondaryWriteFailed {
        base_filename: String,
        error: String,
    },
    ArtifactsSaved {
        base_filename: String,
        artifacts: Artifacts,
    },
}

pub trait EventObserver: Send + Sync {
    fn on_event(&self, event: &PipelineEvent);
}

/// Forwards every event to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl EventObserver for LogObserver {
    fn on_event(&self, event: &PipelineEvent) {
        match event {
            PipelineEvent::Requesting { year, url, params } => {
                info!(
                    "Requesting Open-Meteo daily data: year={} url={} params={:?}",
                    year, url, params
                )
            }
            PipelineEvent::RawPayloadSaved { year, path } => {
                debug!("Saved raw payload for {} to {}", year, path.display())
            }
            PipelineEvent::MissingDailyBlock => {
                warn!("Payload contains no 'daily' block; returning empty frame.")
            }
            PipelineEvent::MissingTimeField => {
                warn!("'daily' block lacks 'time' field; returning empty frame.")
            }
            PipelineEvent::EmptyYear { year } => {
                warn!("No daily data returned for {}; skipping.", year)
            }
            PipelineEvent::YearFailed { year, error } => {
                error!("Failed to fetch/process year {}: {}", year, error)
            }
            PipelineEvent::NoData {
                start_year,
                end_year,
            } => warn!(
                "No data collected for {}-{}; returning empty frame.",
                start_year, end_year
            ),
            PipelineEvent::DuplicateDates { count } => {
                warn!("Found {} duplicate dates; keeping first occurrence.", count)
            }
            PipelineEvent::PartialYearRequested { year, until } => {
                info!("Fetching partial year={} up to {}", year, until)
            }
            PipelineEvent::EmptyPartialYear { year } => warn!(
                "No daily data returned for partial year={}; returning empty frame.",
                year
            ),
            PipelineEvent::PartialYearFailed { year, error } => {
                error!("Failed to fetch partial year {}: {}", year, error)
            }
            PipelineEvent::PolitenessDelay { delay } => {
                debug!("Sleeping {:?} before the next request", delay)
            }
            PipelineEvent::SaveSkipped { base_filename } => {
                warn!("Frame is empty; skipping save for '{}'.", base_filename)
            }
            PipelineEvent::SecondaryWriteFailed {
                base_filename,
                error,
            } => warn!(
                "Parquet write failed for '{}' ({}). CSV was written.",
                base_filename, error
            ),
            PipelineEvent::ArtifactsSaved {
                base_filename,
                artifacts,
            } => info!("Saved artifacts for '{}': {:?}", base_filename, artifacts),
        }
    }
}

/// Keeps every event it sees, in order.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<PipelineEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PipelineEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Number of recorded events matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&PipelineEvent) -> bool) -> usize {
        self.events().iter().filter(|e| predicate(e)).count()
    }
}

impl EventObserver for RecordingObserver {
    fn on_event(&self, event: &PipelineEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event.clone()),
            Err(poisoned) => poisoned.into_inner().push(event.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_observer_keeps_order() {
        let observer = RecordingObserver::new();
        observer.on_event(&PipelineEvent::EmptyYear { year: 2023 });
        observer.on_event(&PipelineEvent::DuplicateDates { count: 2 });
        assert_eq!(
            observer.events(),
            vec![
                PipelineEvent::EmptyYear { year: 2023 },
                PipelineEvent::DuplicateDates { count: 2 },
            ]
        );
        assert_eq!(
            observer.count(|e| matches!(e, PipelineEvent::DuplicateDates { .. })),
            1
        );
    }

    #[test]
    fn test_log_observer_accepts_every_event() {
        // Nothing is asserted beyond "does not panic" since no logger is installed.
        let observer = LogObserver;
        observer.on_event(&PipelineEvent::MissingDailyBlock);
        observer.on_event(&PipelineEvent::PolitenessDelay {
            delay: Duration::from_millis(5),
        });
        observer.on_event(&PipelineEvent::ArtifactsSaved {
            base_filename: "x".into(),
            artifacts: Artifacts::new(),
        });
    }
}

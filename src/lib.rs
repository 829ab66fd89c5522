mod error;
mod events;
mod http;
mod open_meteo;
mod persistence;
mod types;
mod utils;
mod weather_data;

#[cfg(test)]
mod test_utils;

pub use error::OpenMeteoError;
pub use open_meteo::*;

pub use events::{EventObserver, LogObserver, PipelineEvent, RecordingObserver};

pub use http::error::TransportError;
pub use http::session::{retry_session, RetryConfig, RetryingSession};
pub use http::transport::{Transport, TransportResponse};

pub use types::artifact::{ArtifactKind, Artifacts};
pub use types::lat_lon::LatLon;
pub use types::weather_code::WeatherCode;

pub use weather_data::error::WeatherDataError;
pub use weather_data::normalizer::{daily_json_to_frame, DATE_COLUMN};
pub use weather_data::request::{
    daily_variables, DailyRequest, ARCHIVE_BASE_URL, DEFAULT_BASE_URL, WEATHER_CODE_VARIABLE,
};

pub use persistence::error::PersistenceError;
pub use persistence::load::{load_csv, LoadOptions};
pub use persistence::save::{artifact_path, save_frame, SaveOptions};

use crate::http::error::TransportError;
use crate::persistence::error::PersistenceError;
use crate::weather_data::error::WeatherDataError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OpenMeteoError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    WeatherData(#[from] WeatherDataError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

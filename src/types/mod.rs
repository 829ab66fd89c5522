pub mod artifact;
pub mod lat_lon;
pub mod weather_code;

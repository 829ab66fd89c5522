/// Represents a geographical coordinate using latitude and longitude.
///
/// Latitude is the first element (index 0), and longitude is the second (index 1).
/// Both values are represented as `f64` degrees.
///
/// # Examples
///
/// ```
/// use openmeteo_daily::LatLon;
///
/// let sydney = LatLon(-33.8688, 151.2093);
/// assert_eq!(sydney.latitude(), -33.8688);
/// assert_eq!(sydney.longitude(), 151.2093);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon(pub f64, pub f64);

impl LatLon {
    pub fn latitude(&self) -> f64 {
        self.0
    }

    pub fn longitude(&self) -> f64 {
        self.1
    }
}

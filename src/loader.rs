//! Loader capability seam (`spec.md` §9 Design Notes "Multimethods").
//!
//! The source dispatches weather/landfire fetching on `(source-kind ×
//! variable)`. Raster I/O, projection handling, and the outer Monte Carlo
//! driver are explicitly out of scope (`spec.md` §1); this trait exists so a
//! driver crate can plug in GeoTIFF/database loaders without the engine
//! knowing anything about file formats. No implementation ships here.

use crate::error::EngineResult;
use crate::landscape::Landscape;
use crate::weather_sampler::WeatherVariable;

/// A source of already-parsed simulation inputs. Implementations live in the
/// driver, not this crate.
pub trait LandscapeSource {
    fn load_landscape(&self) -> EngineResult<Landscape>;
    fn load_weather_variable(&self, name: &str) -> EngineResult<WeatherVariable>;
    fn load_ignition_raster(&self) -> EngineResult<Vec<f64>>;
}

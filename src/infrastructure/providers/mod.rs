//! Provider clients for the external geocoding and routing services

mod google;
mod nominatim;
mod osrm;

pub use google::GoogleGeocoder;
pub use nominatim::NominatimGeocoder;
pub use osrm::OsrmRouter;

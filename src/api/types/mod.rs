//! Request/response DTOs and the error envelope

pub mod error;
pub mod geocode;
pub mod route;

pub use error::{ApiError, ApiErrorResponse, ApiErrorType};
pub use geocode::{GeocodeRequest, GeocodeResponse};
pub use route::{CoordinatesDto, RouteRequest, RouteResponse};

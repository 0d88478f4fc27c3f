//! Address hierarchy (city → district → neighborhood → address).
//!
//! These are passive records: named nodes plus a free-text street/building
//! line. No behavior beyond validation and address rendering.

pub mod address;
pub mod place;

pub use address::{Address, AddressId};
pub use place::{City, CityId, District, DistrictId, Neighborhood, NeighborhoodId};

pub mod coords;
pub mod storage;
pub mod store;
pub mod types;

pub use coords::{directions_url, extract_coordinates};
pub use storage::{get_data_path, load_parcels, save_parcels, ParcelFile};
pub use store::{CollectionStats, ParcelPatch, ParcelStore};
pub use types::{
    Classification, Comparison, Coordinates, Destination, Parcel, TravelSlot, TravelTime,
    TravelTimes, Trend,
};

mod client;
mod endpoints;

pub use client::ApiClient;
pub use endpoints::{
    activity_details_path, activity_gps_path, ACTIVITIES_PATH, DEFAULT_COUNT, DEFAULT_OFFSET,
    GENERAL_DATA_PATH,
};

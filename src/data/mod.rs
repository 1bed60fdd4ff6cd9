pub mod point_cloud;

pub use point_cloud::{PointCloud, PointCloudError};

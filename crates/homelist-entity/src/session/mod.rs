//! Session domain records.

pub mod device;
pub mod model;

pub use device::DeviceInfo;
pub use model::Session;

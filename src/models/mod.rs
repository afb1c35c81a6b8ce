mod device;
mod license;
mod plan;

pub use device::*;
pub use license::*;
pub use plan::*;

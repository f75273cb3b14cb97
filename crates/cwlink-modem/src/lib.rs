pub mod device;
pub mod error;
pub mod keyer;

pub use device::SidetoneSink;
pub use error::ModemError;
pub use keyer::{spawn_send, LineSink, SendHandle};

pub mod audio;
pub mod codec;
pub mod events;
pub mod session;
pub mod tools;

pub use codec::{decode, encode, DecodeError, EncodeError};
pub use events::{ClientCommand, ServerEvent};

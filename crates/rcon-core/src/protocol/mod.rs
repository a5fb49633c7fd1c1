//! Protocol module containing message types and the binary codec.

pub mod codec;
pub mod messages;
pub mod sequence;

pub use codec::{checksum, decode_message, decode_request, encode_message, hex_dump, ProtocolError};
pub use messages::*;
pub use sequence::SequenceCounter;

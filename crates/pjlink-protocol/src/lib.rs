pub mod codec;
pub mod mnemonic;
pub mod request;
pub mod response;

pub use codec::{PjLinkCodec, ServerMessage};
pub use mnemonic::Mnemonic;
pub use request::Request;
pub use response::Response;

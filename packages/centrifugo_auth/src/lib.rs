//! HS256 connection and channel tokens for Centrifugo clients.

pub mod claims;
pub mod encoding;
pub mod error;
pub mod token;

pub use claims::{ChannelClaims, ConnectionClaims, Header};
pub use error::TokenError;
pub use token::{Secret, Token, TokenSigner};

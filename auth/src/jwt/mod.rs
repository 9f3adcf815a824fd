pub mod claims;
pub mod codec;
pub mod errors;
pub mod issuer;

pub use claims::Claims;
pub use claims::Token;
pub use claims::TokenType;
pub use codec::TokenCodec;
pub use errors::TokenError;
pub use issuer::RefreshPolicy;
pub use issuer::TokenIssuer;
pub use issuer::TokenLifetimes;
pub use issuer::TokenPair;

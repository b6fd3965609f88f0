mod clock_fake;
mod clock_system;
pub mod jwt_signer;
mod token_service_impl;

pub use clock_fake::*;
pub use clock_system::*;
pub use jwt_signer::JwtSigner;
pub use token_service_impl::*;

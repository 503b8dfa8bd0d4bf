//! Authentication types: the [`Principal`] identity model and the
//! [`Authenticator`] collaborator contract.

mod authenticator;
mod principal;

pub use authenticator::{Authenticator, StaticTokenAuthenticator};
pub use principal::{Principal, ROLE_ADMIN, ROLE_USER};

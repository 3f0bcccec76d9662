//! Credential models: redacted token secrets and the access/refresh pair owned by token stores.

pub mod credentials;
pub mod secret;

pub use credentials::*;
pub use secret::*;

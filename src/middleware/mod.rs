mod issuer_auth;

pub use issuer_auth::*;

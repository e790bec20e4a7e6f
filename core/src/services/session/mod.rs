//! Refresh token sessions: issuance, rotation and revocation

mod service;


pub use service::SessionService;

pub mod league;
pub mod profile;
pub mod registration;
pub mod session;

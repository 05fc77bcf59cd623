pub mod leagues;
pub mod profiles;
pub mod registrations;

pub mod classification;
pub mod session;
pub mod user;

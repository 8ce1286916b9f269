pub mod prelude;

pub mod classifications;
pub mod salts;
pub mod sessions;
pub mod users;

pub use super::classifications::Entity as Classifications;
pub use super::salts::Entity as Salts;
pub use super::sessions::Entity as Sessions;
pub use super::users::Entity as Users;

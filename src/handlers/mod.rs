pub mod addresses;
pub mod auth;
pub mod cart;
pub mod common;
pub mod orders;
pub mod payments;
pub mod products;
pub mod reviews;

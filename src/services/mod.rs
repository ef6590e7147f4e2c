pub mod addresses;
pub mod cart;
pub mod catalog;
pub mod midtrans;
pub mod orders;
pub mod payments;
pub mod reviews;

pub use addresses::AddressService;
pub use cart::CartService;
pub use catalog::CatalogService;
pub use orders::OrderService;
pub use payments::PaymentService;
pub use reviews::ReviewService;

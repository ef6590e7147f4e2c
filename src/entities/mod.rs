pub mod address;
pub mod cart_item;
pub mod order;
pub mod order_item;
pub mod password_otp;
pub mod product;
pub mod promo;
pub mod review;
pub mod user;

pub use address::Entity as Address;
pub use cart_item::Entity as CartItem;
pub use order::Entity as Order;
pub use order_item::Entity as OrderItem;
pub use password_otp::Entity as PasswordOtp;
pub use product::Entity as Product;
pub use promo::Entity as Promo;
pub use review::Entity as Review;
pub use user::Entity as User;

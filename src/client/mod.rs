//! Client-side state: the shopping cart and the signed-in session, both kept
//! in durable local storage and independent of the server until checkout.

pub mod cart;
pub mod session;
pub mod storage;

pub use cart::{Cart, CartItem};
pub use session::Session;
pub use storage::{FileStorage, LocalStorage, MemoryStorage, StorageError};

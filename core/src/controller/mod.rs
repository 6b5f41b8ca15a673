//! Controllers own the client's view of server state.
//!
//! Each controller is the only writer of its state. State lives behind
//! `RefCell`/`Cell` so operations take `&self` and can overlap on a single
//! thread; no borrow is ever held across an `.await`.

pub mod item;
pub mod list;

pub use item::{ItemController, ItemState};
pub use list::{ListController, ListState};

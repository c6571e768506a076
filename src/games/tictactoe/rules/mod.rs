//! Game rules for tic-tac-toe.
//!
//! Pure functions over a [`Board`](super::Board); the board and the game
//! state machine delegate to them.

pub mod draw;
pub mod win;

pub use draw::is_full;
pub use win::{LINES, has_line};

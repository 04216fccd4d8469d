//! The stock widgets.

pub mod button;
pub mod item;
pub mod item_holder;
pub mod scroll_bar;
pub mod scroll_window;
pub mod text_field;

pub use button::Button;
pub use item::Item;
pub use item_holder::{AcceptFn, ItemHolder};
pub use scroll_bar::{ScrollBar, ScrollPart};
pub use scroll_window::ScrollWindow;
pub use text_field::{FieldColor, TextField};

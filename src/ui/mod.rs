mod layout;
mod page;

pub use layout::{UiLayout, split_layout};
pub use page::draw;

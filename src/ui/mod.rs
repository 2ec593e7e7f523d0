pub mod conversation;
pub mod widgets;

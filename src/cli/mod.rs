pub mod banner;
pub mod coder;
pub mod completer;
pub mod faq;
pub mod palette;
pub mod prompt;
pub mod sidebar;

pub mod encode;
pub mod table;

pub use encode::{encode, symbol_duration, unit_duration};
pub use table::{char_for, code_for, WORD_GAP_CODE};

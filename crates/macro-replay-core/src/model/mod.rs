mod event;
mod recorded_macro;

pub use {
    event::{Event, MouseButton},
    recorded_macro::{Macro, MacroStats},
};

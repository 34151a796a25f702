mod event;
mod recorded_macro;
mod recorder;
mod store;
mod support;

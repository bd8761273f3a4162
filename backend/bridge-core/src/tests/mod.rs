mod codec;
mod config;
mod gate;
mod state;
mod support;

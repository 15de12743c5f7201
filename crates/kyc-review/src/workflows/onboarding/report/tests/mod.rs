mod common;
mod compiler;

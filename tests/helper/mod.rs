#![allow(dead_code)]

mod site;

pub use site::*;

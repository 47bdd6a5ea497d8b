#![allow(dead_code)]

pub mod asset_server;
pub mod http;
pub mod webdriver_server;

#![allow(dead_code)]

pub mod fake_platform;
pub mod fixtures;
pub mod redis_container;

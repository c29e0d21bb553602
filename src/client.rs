pub mod atcoder;
pub mod browser;

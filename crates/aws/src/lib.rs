#![doc = include_str!("../README.md")]

mod client;
pub mod credentials;
pub mod s3;
pub mod sigv4;
pub mod sqs;

pub use credentials::Credentials;
pub use s3::S3;
pub use sqs::Sqs;

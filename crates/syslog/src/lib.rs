#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`parser`]: RFC 5424 프레임 파서
//! - [`classify`]: 앱별 JSON 출력 분류 캐시
//! - [`normalizer`]: 분류, 보강, 라우팅 후 인덱싱하는 핸들러
//! - [`listener`]: TCP 수신기 플러그인
//! - [`config`]: 수신기 설정 (core 설정 변환)
//! - [`error`]: 도메인 에러 타입

pub mod classify;
pub mod config;
pub mod error;
pub mod listener;
pub mod normalizer;
pub mod parser;

mod tcp;

// --- 주요 타입 re-export ---

pub use classify::ClassificationCache;
pub use config::{Framing, ListenerConfig, ListenerConfigBuilder};
pub use error::SyslogError;
pub use listener::SyslogListener;
pub use normalizer::SyslogHandler;
pub use parser::Rfc5424Parser;

#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`notification`]: SNS 봉투와 CloudTrail 알림 디코딩
//! - [`bundle`]: 로그 번들 스트리밍 디코딩과 레코드 보강
//! - [`processor`]: 메시지 하나의 인덱싱과 확인(삭제)
//! - [`indexer`]: 수신 루프 플러그인
//! - [`config`]: 인덱서 설정 (core 설정 변환)
//! - [`error`]: 도메인 에러 타입

pub mod bundle;
pub mod config;
pub mod error;
pub mod indexer;
pub mod notification;
pub mod processor;

// --- 주요 타입 re-export ---

pub use config::{IndexerConfig, IndexerConfigBuilder};
pub use error::CloudTrailError;
pub use indexer::CloudTrailIndexer;
pub use notification::CloudTrailNotification;
pub use processor::{BatchProcessor, MessageOutcome};

#![doc = include_str!("../README.md")]

pub mod backend;
pub mod config;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod plugin;
pub mod queue;
pub mod storage;
pub mod types;

// --- 주요 타입 re-export ---

// 에러
pub use error::{
    BackendError, ConfigError, ParseError, PipelineError, PluginError, SyslogIdxError,
    TransportError,
};

// 설정
pub use config::SyslogIdxConfig;

// 협력자 trait
pub use backend::{AliasInfo, Document, IndexBackend};
pub use queue::{QueueClient, QueueMessage};
pub use storage::{ObjectReader, ObjectStore};

// 생명주기
pub use pipeline::{BoxFuture, HealthStatus};
pub use plugin::{DynPlugin, Plugin, PluginInfo, PluginRegistry, PluginState, PluginType};

// 도메인 타입
pub use types::{Facility, IndexTarget, LogEntry, LogParts, Severity, index_name_for};

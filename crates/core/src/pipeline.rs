//! 컴포넌트 상태 보고 타입

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

/// `Send` 가능한 boxed future
///
/// RPITIT trait을 dyn-compatible 형태로 노출할 때 사용합니다.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// 컴포넌트 건강 상태
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    /// 정상 동작
    Healthy,
    /// 동작하지만 일시적 오류가 있음 (사유 포함)
    Degraded(String),
    /// 동작하지 않음 (사유 포함)
    Unhealthy(String),
}

impl HealthStatus {
    /// 정상 상태인지 확인합니다.
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }

    /// 비정상 상태인지 확인합니다.
    pub fn is_unhealthy(&self) -> bool {
        matches!(self, Self::Unhealthy(_))
    }
}

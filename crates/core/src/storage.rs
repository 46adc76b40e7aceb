//! 오브젝트 스토리지 추상화

use std::future::Future;
use std::pin::Pin;

use tokio::io::AsyncRead;

use crate::error::TransportError;

/// 저장된 오브젝트의 스트리밍 본문
pub type ObjectReader = Pin<Box<dyn AsyncRead + Send>>;

/// 오브젝트 스토리지 읽기 연산
pub trait ObjectStore: Send + Sync + 'static {
    /// `bucket/key`를 스트리밍 읽기용으로 엽니다.
    ///
    /// 반환된 리더는 본문을 도착하는 대로 내보냅니다. 호출자는 오브젝트 전체가
    /// 메모리에 들어간다고 가정하면 안 됩니다.
    fn get_reader(
        &self,
        bucket: &str,
        key: &str,
    ) -> impl Future<Output = Result<ObjectReader, TransportError>> + Send;
}

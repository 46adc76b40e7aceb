//! TCP Syslog 수신 루프
//!
//! 각 TCP 연결은 별도의 tokio 태스크에서 처리되며, 세마포어로 동시 연결 수를 제한합니다.
//! Newline framing과 RFC 6587 octet-counting framing을 지원합니다.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use syslogidx_core::backend::IndexBackend;
use syslogidx_core::metrics as m;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::{Framing, ListenerConfig};
use crate::error::SyslogError;
use crate::normalizer::SyslogHandler;
use crate::parser::Rfc5424Parser;

/// octet-counting 길이 접두사의 최대 자릿수
const MAX_LENGTH_DIGITS: u64 = 10;

/// accept 실패 후 재시도 전 대기 시간
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// 연결 수락 루프를 실행합니다.
///
/// `cancel`이 취소될 때까지 반환하지 않습니다. 취소되면 열린 연결도 모두 닫힙니다.
pub(crate) async fn serve<B: IndexBackend>(
    listener: TcpListener,
    config: Arc<ListenerConfig>,
    handler: Arc<SyslogHandler<B>>,
    cancel: CancellationToken,
) {
    let connection_semaphore = Arc::new(Semaphore::new(config.max_connections));

    loop {
        tokio::select! {
            result = listener.accept() => {
                let (stream, addr) = match result {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        error!(error = %e, "syslog accept error");
                        tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                        continue;
                    }
                };

                let permit = match Arc::clone(&connection_semaphore).try_acquire_owned() {
                    Ok(p) => p,
                    Err(_) => {
                        metrics::counter!(m::SYSLOG_CONNECTIONS_REJECTED_TOTAL).increment(1);
                        warn!(peer = %addr, "max connections reached, rejecting syslog connection");
                        continue;
                    }
                };

                debug!(peer = %addr, "accepted syslog connection");

                let config = Arc::clone(&config);
                let handler = Arc::clone(&handler);
                let cancel = cancel.clone();

                tokio::spawn(async move {
                    metrics::gauge!(m::SYSLOG_CONNECTIONS_ACTIVE).increment(1.0);
                    handle_connection(stream, addr, &config, &handler, &cancel).await;
                    metrics::gauge!(m::SYSLOG_CONNECTIONS_ACTIVE).decrement(1.0);
                    drop(permit);
                });
            }
            _ = cancel.cancelled() => {
                info!("syslog listener received shutdown signal");
                break;
            }
        }
    }
}

/// 단일 TCP 연결을 처리합니다.
///
/// 파싱에 실패한 프레임은 건너뛰고 연결을 유지합니다. 프레이밍 에러, 유휴 타임아웃,
/// 취소, EOF는 연결을 닫습니다.
async fn handle_connection<B: IndexBackend>(
    stream: TcpStream,
    peer: SocketAddr,
    config: &ListenerConfig,
    handler: &SyslogHandler<B>,
    cancel: &CancellationToken,
) {
    let parser = Rfc5424Parser::new();
    let idle_timeout = Duration::from_secs(config.connection_timeout_secs);
    let mut frames = FrameReader::new(
        BufReader::new(stream),
        config.framing,
        config.max_message_size,
    );

    loop {
        tokio::select! {
            result = timeout(idle_timeout, frames.next_frame()) => match result {
                Ok(Ok(Some(frame))) => {
                    metrics::counter!(m::SYSLOG_MESSAGES_RECEIVED_TOTAL).increment(1);
                    match parser.parse(&frame) {
                        Ok(parts) => handler.handle(parts).await,
                        Err(e) => {
                            metrics::counter!(m::SYSLOG_PARSE_ERRORS_TOTAL).increment(1);
                            warn!(peer = %peer, error = %e, "skipping malformed syslog frame");
                        }
                    }
                }
                Ok(Ok(None)) => {
                    debug!(peer = %peer, "syslog connection closed by peer");
                    break;
                }
                Ok(Err(e)) => {
                    warn!(peer = %peer, error = %e, "closing syslog connection");
                    break;
                }
                Err(_) => {
                    debug!(peer = %peer, "syslog connection idle timeout");
                    break;
                }
            },
            _ = cancel.cancelled() => {
                debug!(peer = %peer, "syslog connection received shutdown signal");
                break;
            }
        }
    }
}

/// 바이트 스트림에서 syslog 프레임을 하나씩 꺼내는 리더
pub(crate) struct FrameReader<R> {
    reader: R,
    framing: Framing,
    max_message_size: usize,
}

impl<R: AsyncBufRead + Unpin> FrameReader<R> {
    pub(crate) fn new(reader: R, framing: Framing, max_message_size: usize) -> Self {
        Self {
            reader,
            framing,
            max_message_size,
        }
    }

    /// 다음 프레임을 읽습니다. 스트림이 끝나면 `None`.
    pub(crate) async fn next_frame(&mut self) -> Result<Option<Vec<u8>>, SyslogError> {
        match self.framing {
            Framing::NewlineDelimited => self.next_line().await,
            Framing::OctetCounting => self.next_counted().await,
        }
    }

    /// 개행으로 끝나는 프레임. 빈 줄은 건너뜁니다.
    /// 마지막 줄에 개행이 없으면 EOF에서 프레임으로 취급합니다.
    async fn next_line(&mut self) -> Result<Option<Vec<u8>>, SyslogError> {
        // 본문 + CRLF 까지 읽어야 한도 크기의 프레임을 판별할 수 있음
        let limit = self.max_message_size as u64 + 2;

        loop {
            let mut buf = Vec::new();
            let n = (&mut self.reader)
                .take(limit)
                .read_until(b'\n', &mut buf)
                .await?;
            if n == 0 {
                return Ok(None);
            }

            if buf.last() == Some(&b'\n') {
                buf.pop();
            }
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
            if buf.len() > self.max_message_size {
                return Err(SyslogError::FrameTooLarge {
                    size: buf.len(),
                    max: self.max_message_size,
                });
            }
            if buf.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            return Ok(Some(buf));
        }
    }

    /// `LEN SP MSG` 프레임. 프레임 사이의 개행은 무시합니다.
    async fn next_counted(&mut self) -> Result<Option<Vec<u8>>, SyslogError> {
        let mut prefix = Vec::new();

        loop {
            prefix.clear();
            let n = (&mut self.reader)
                .take(MAX_LENGTH_DIGITS + 1)
                .read_until(b' ', &mut prefix)
                .await?;
            if n == 0 {
                return Ok(None);
            }

            let start = prefix
                .iter()
                .position(|b| !matches!(b, b'\r' | b'\n'))
                .unwrap_or(prefix.len());
            if start == prefix.len() {
                // 개행만 읽었으면 다음 프레임으로
                continue;
            }
            prefix.drain(..start);
            break;
        }

        if prefix.pop() != Some(b' ') {
            return Err(SyslogError::InvalidFrameLength(
                String::from_utf8_lossy(&prefix).into_owned(),
            ));
        }

        let digits = std::str::from_utf8(&prefix)
            .ok()
            .filter(|s| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()));
        let len: usize = digits
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| {
                SyslogError::InvalidFrameLength(String::from_utf8_lossy(&prefix).into_owned())
            })?;

        if len > self.max_message_size {
            return Err(SyslogError::FrameTooLarge {
                size: len,
                max: self.max_message_size,
            });
        }

        let mut frame = vec![0u8; len];
        self.reader.read_exact(&mut frame).await?;
        Ok(Some(frame))
    }
}

//! 앱별 JSON 출력 분류 캐시
//!
//! 앱 이름 → "JSON 객체를 출력하는가" 매핑을 프로세스 수명 동안 보관합니다.
//! 캐시는 재시작 시 사라지며 설정의 시드 테이블로 다시 채워집니다.
//!
//! 앱의 분류는 해당 앱의 메시지를 최소 한 번 관찰하기 전까지 존재하지 않으며,
//! 한 번 비 JSON으로 강등된 앱은 다시 JSON으로 승격되지 않습니다.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// 동시 접근 가능한 분류 캐시
///
/// 연결 태스크마다 공유되므로 모든 갱신은 키 단위로 원자적입니다.
#[derive(Debug, Default)]
pub struct ClassificationCache {
    apps: RwLock<HashMap<String, bool>>,
}

impl ClassificationCache {
    /// 빈 캐시를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 시드 테이블로 채운 캐시를 생성합니다.
    pub fn with_seed<I, S>(seed: I) -> Self
    where
        I: IntoIterator<Item = (S, bool)>,
        S: Into<String>,
    {
        let apps = seed.into_iter().map(|(app, is_json)| (app.into(), is_json));
        Self {
            apps: RwLock::new(apps.collect()),
        }
    }

    /// 앱의 현재 분류를 조회합니다. 아직 관찰되지 않은 앱은 `None`입니다.
    pub fn get(&self, app: &str) -> Option<bool> {
        self.apps
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(app)
            .copied()
    }

    /// 처음 관찰한 결과를 기록합니다.
    ///
    /// 이미 분류가 있으면 덮어쓰지 않습니다. 이 호출로 항목이 새로 생겼으면 `true`.
    pub fn record(&self, app: &str, is_json: bool) -> bool {
        let mut apps = self.apps.write().unwrap_or_else(PoisonError::into_inner);
        if apps.contains_key(app) {
            return false;
        }
        apps.insert(app.to_owned(), is_json);
        true
    }

    /// 앱을 비 JSON으로 강등합니다.
    ///
    /// 이 호출이 JSON → 비 JSON 전환을 일으켰으면 `true`.
    pub fn demote(&self, app: &str) -> bool {
        let mut apps = self.apps.write().unwrap_or_else(PoisonError::into_inner);
        match apps.get_mut(app) {
            Some(is_json) if *is_json => {
                *is_json = false;
                true
            }
            Some(_) => false,
            None => {
                apps.insert(app.to_owned(), false);
                false
            }
        }
    }

    /// 분류된 앱 수
    pub fn len(&self) -> usize {
        self.apps.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// 비어 있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

//! 데이터 모듈 오류 타입.
//!
//! 오류는 두 부류로 나뉩니다:
//! - **일시적(transient)**: 타임아웃, 연결 실패, 호출 한도 초과.
//!   제한된 횟수만큼 백오프 재시도 후 제공자 실패로 처리합니다.
//! - **구조적(structural)**: 응답 형식 오류, 명시적 데이터 없음, 검증 탈락.
//!   재시도 없이 즉시 다음 제공자로 넘어갑니다.

use thiserror::Error;

/// 데이터 관련 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// 요청 타임아웃
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// 연결 오류
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// 호출 한도 초과
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// 잘못된 응답 형식
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// 제공자가 명시적으로 데이터 없음을 반환
    #[error("No data: {0}")]
    NoData(String),

    /// 검증 탈락 (0 이하, 범위 밖 등)
    #[error("Validation rejected: {0}")]
    ValidationRejected(String),

    /// 데이터 가져오기 오류 (외부 소스, 기타)
    #[error("Fetch error: {0}")]
    FetchError(String),
}

impl DataError {
    /// 재시도 대상인 일시적 오류인지 확인합니다.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DataError::Timeout(_) | DataError::ConnectionError(_) | DataError::RateLimited(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, DataError>;

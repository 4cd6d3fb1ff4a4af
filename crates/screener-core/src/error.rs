//! 핵심 도메인 오류 타입.

use thiserror::Error;

/// 도메인/설정 관련 오류.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 잘못된 설정
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// 잘못된 시계열 데이터
    #[error("Invalid series: {0}")]
    InvalidSeries(String),
}

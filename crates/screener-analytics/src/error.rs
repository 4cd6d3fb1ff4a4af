//! 분석 엔진 오류 타입.

use thiserror::Error;

/// 분석 엔진 오류.
#[derive(Debug, Error)]
pub enum EngineError {
    /// 설정 오류
    #[error("설정 오류: {0}")]
    Config(#[from] screener_core::CoreError),

    /// 계산 오류
    #[error("계산 오류: {0}")]
    Calculation(String),
}

/// 분석 엔진 결과 타입.
pub type EngineResult<T> = Result<T, EngineError>;

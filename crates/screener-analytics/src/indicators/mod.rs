//! 기술적 지표 모듈.
//!
//! 일봉 시리즈에서 파생 지표를 계산하는 순수 함수들을 제공합니다.
//! 모든 함수는 상태가 없고, 달력 날짜가 아닌 시퀀스 위치 기준 윈도우로
//! 동작하므로 휴장일 공백의 영향을 받지 않습니다.
//!
//! 데이터가 부족하면 0 같은 가짜 값 대신 명시적 오류/`None`을
//! 반환합니다. 하류의 조건 평가는 이를 "판정 불가 = 실패"로 처리해야
//! 하며, 거짓 통과로 이어지지 않습니다.
//!
//! # 지원 지표
//!
//! - `kd` - KD 스토캐스틱 및 골든/데드크로스 판정
//! - `trend` - SMA, 롤링 고저, 이동평균 상회 판정
//! - `momentum` - RSI, MACD, 등락률
//! - `volatility` - 볼린저 밴드
//! - `volume` - 거래량 급증 배수

pub mod kd;
pub mod momentum;
pub mod trend;
pub mod volatility;
pub mod volume;

use thiserror::Error;

pub use kd::{kd, KdParams, KdSeries};
pub use momentum::{change_pct, macd, rsi, MacdResult};
pub use trend::{above_ma, rolling_max, rolling_min, sma};
pub use volatility::{bollinger, BollingerBands};
pub use volume::surge_ratio;

/// 지표 계산 오류.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IndicatorError {
    /// 데이터 부족 오류
    #[error("데이터가 부족합니다: 필요 {required}개, 제공 {provided}개")]
    InsufficientData { required: usize, provided: usize },

    /// 잘못된 파라미터
    #[error("잘못된 파라미터: {0}")]
    InvalidParameter(String),
}

/// 지표 계산 결과 타입.
pub type IndicatorResult<T> = Result<T, IndicatorError>;

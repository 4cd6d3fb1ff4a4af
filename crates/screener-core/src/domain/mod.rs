//! 도메인 모델.
//!
//! - `market_data` - 일봉, 법인 수급, 신용거래 데이터
//! - `snapshot` - 메트릭 해석 결과 및 종목 스냅샷
//! - `screening` - 조건 판정 및 스크리닝 결과

pub mod market_data;
pub mod screening;
pub mod snapshot;

pub use market_data::*;
pub use screening::*;
pub use snapshot::*;

//! 정적 기본값 테이블.
//!
//! 폴백 체인이 모두 실패했을 때 사용하는 최종 폴백입니다. 순수 로컬
//! 조회이며 I/O가 없고 실패하지 않습니다. 종목별 테이블에 없는 종목은
//! 메트릭별 일반 기본값을 받습니다.
//!
//! 테이블 값은 운영 중 관측된 대형주의 대략적인 수준이며, 비즈니스
//! 가정에 해당하므로 상수로 박지 않고 필드로 노출해 배포별로 교체할 수
//! 있게 합니다.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

use screener_core::{InstrumentId, MetricKind};

/// 메트릭 종류별 정적 기본값 테이블.
#[derive(Debug, Clone)]
pub struct DefaultValueTable {
    /// 종목별 EPS 기본값
    pub eps: HashMap<String, Decimal>,
    /// 종목별 ROE 기본값 (%)
    pub roe: HashMap<String, Decimal>,
    /// 종목별 투신 지분율 기본값 (%)
    pub trust_holding: HashMap<String, Decimal>,
    /// EPS 일반 기본값
    pub generic_eps: Decimal,
    /// ROE 일반 기본값 (%)
    pub generic_roe: Decimal,
    /// 배당수익률 일반 기본값 (%)
    pub generic_dividend_yield: Decimal,
    /// 투신 지분율 일반 기본값 (%)
    pub generic_trust_holding: Decimal,
}

impl Default for DefaultValueTable {
    fn default() -> Self {
        let eps = [
            ("2330", dec!(39.2)),
            ("2454", dec!(72.5)),
            ("2317", dec!(10.5)),
            ("2308", dec!(11.2)),
            ("2382", dec!(4.8)),
            ("2303", dec!(2.8)),
            ("2412", dec!(5.2)),
            ("2886", dec!(2.1)),
            ("2891", dec!(2.5)),
            ("1301", dec!(3.8)),
        ];
        let roe = [
            ("2330", dec!(28.5)),
            ("2454", dec!(25.3)),
            ("2317", dec!(12.8)),
            ("2308", dec!(18.5)),
            ("2382", dec!(15.2)),
            ("2303", dec!(8.5)),
            ("2412", dec!(18.2)),
            ("2886", dec!(10.5)),
            ("2891", dec!(11.2)),
            ("1301", dec!(9.8)),
        ];
        let trust_holding = [
            ("2330", dec!(0.8)),
            ("2454", dec!(1.2)),
            ("2317", dec!(1.5)),
            ("2308", dec!(2.1)),
            ("2382", dec!(1.8)),
            ("2303", dec!(2.5)),
            ("2412", dec!(3.2)),
            ("2886", dec!(2.8)),
            ("2891", dec!(2.5)),
            ("1301", dec!(1.9)),
        ];

        let to_map = |entries: &[(&str, Decimal)]| {
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect::<HashMap<_, _>>()
        };

        Self {
            eps: to_map(&eps),
            roe: to_map(&roe),
            trust_holding: to_map(&trust_holding),
            generic_eps: dec!(2.5),
            generic_roe: dec!(12.0),
            generic_dividend_yield: dec!(1.5),
            generic_trust_holding: dec!(2.0),
        }
    }
}

impl DefaultValueTable {
    /// 메트릭 종류와 종목에 대한 기본값을 반환합니다.
    ///
    /// 종목별 테이블에 없으면 일반 기본값으로 한 단계 더 폴백합니다.
    /// 항상 값을 반환하며 실패하지 않습니다.
    pub fn lookup(&self, kind: MetricKind, id: &InstrumentId) -> Decimal {
        let ticker = id.as_str();
        match kind {
            MetricKind::Eps => self.eps.get(ticker).copied().unwrap_or(self.generic_eps),
            MetricKind::Roe => self.roe.get(ticker).copied().unwrap_or(self.generic_roe),
            MetricKind::DividendYield => self.generic_dividend_yield,
            MetricKind::TrustHoldingPct => self
                .trust_holding
                .get(ticker)
                .copied()
                .unwrap_or(self.generic_trust_holding),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_ticker() {
        let table = DefaultValueTable::default();
        let id = InstrumentId::new("2330");
        assert_eq!(table.lookup(MetricKind::Eps, &id), dec!(39.2));
        assert_eq!(table.lookup(MetricKind::Roe, &id), dec!(28.5));
        assert_eq!(table.lookup(MetricKind::TrustHoldingPct, &id), dec!(0.8));
    }

    #[test]
    fn test_lookup_unknown_ticker_falls_back_to_generic() {
        let table = DefaultValueTable::default();
        let id = InstrumentId::new("9999");
        assert_eq!(table.lookup(MetricKind::Eps, &id), dec!(2.5));
        assert_eq!(table.lookup(MetricKind::Roe, &id), dec!(12.0));
        assert_eq!(table.lookup(MetricKind::DividendYield, &id), dec!(1.5));
        assert_eq!(table.lookup(MetricKind::TrustHoldingPct, &id), dec!(2.0));
    }

    #[test]
    fn test_generic_defaults_pass_scalar_validation_ranges() {
        // 기본값 자체가 검증(양수, 퍼센트 범위)을 통과해야
        // "해석은 항상 유효한 값으로 끝난다" 불변식이 성립한다.
        let table = DefaultValueTable::default();
        assert!(table.generic_eps > Decimal::ZERO);
        assert!(table.generic_roe > Decimal::ZERO);
        assert!(table.generic_dividend_yield > Decimal::ZERO);
        assert!(table.generic_trust_holding > Decimal::ZERO);
        assert!(table.generic_trust_holding <= dec!(100));
    }
}

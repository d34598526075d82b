/// Series derived element-wise from the WETH-per-gETH mid column.
///
/// All three share the index of the source series. A zero mid is not guarded
/// against; its reciprocal propagates as an infinite value.
#[derive(Debug, Clone)]
pub struct DerivedSeries {
    /// The mid quote itself, read as the net-asset-value signal.
    pub nav: Vec<f64>,
    /// Deviation of gETH's implied value from 1:1 parity with WETH, in percent.
    pub premium_pct: Vec<f64>,
    /// Units flipped: gETH per WETH.
    pub inverse_ratio: Vec<f64>,
}

impl DerivedSeries {
    pub fn from_mid(mid: &[f64]) -> Self {
        let nav = mid.to_vec();
        let premium_pct = mid.iter().map(|y| (1.0 / y - 1.0) * 100.0).collect();
        let inverse_ratio = mid.iter().map(|y| 1.0 / y).collect();

        Self {
            nav,
            premium_pct,
            inverse_ratio,
        }
    }
}

use crate::data_loader::MidPriceLoader;
use crate::metrics::DerivedSeries;
use crate::models::MidPriceRecord;
use anyhow::Result;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use std::path::PathBuf;

/// Y-axis envelope for the NAV chart (WETH per gETH).
pub const NAV_ENVELOPE: (f64, f64) = (0.9, 1.1);
/// Y-axis envelope for the flipped gETH/WETH chart.
pub const RATIO_ENVELOPE: (f64, f64) = (0.95, 1.05);
/// Floor on the range expansion, so an all-equal series still spans a visible band.
pub const RANGE_PAD_FLOOR: f64 = 0.0005;

// 8x4 in at 160 dpi
const CHART_SIZE: (u32, u32) = (1280, 640);

/// Tighter of the observed range expanded by 3x its spread and the fixed envelope.
pub fn clamped_value_range(values: &[f64], envelope: (f64, f64)) -> (f64, f64) {
    let lo = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let hi = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let pad = ((hi - lo) * 3.0).max(RANGE_PAD_FLOOR);

    (envelope.0.max(lo - pad), envelope.1.min(hi + pad))
}

/// Observed range with a 5% margin on each side; no envelope.
pub fn padded_value_range(values: &[f64]) -> (f64, f64) {
    let lo = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let hi = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let margin = if hi > lo { (hi - lo) * 0.05 } else { 0.05 };

    (lo - margin, hi + margin)
}

pub struct ChartReport {
    data_dir: PathBuf,
    output_dir: PathBuf,
}

impl ChartReport {
    pub fn new() -> Result<Self> {
        Self::with_dirs(PathBuf::from("data"), PathBuf::from("charts"))
    }

    pub fn with_dirs(data_dir: PathBuf, output_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&output_dir)?;

        Ok(Self {
            data_dir,
            output_dir,
        })
    }

    pub fn generate_all_charts(&self) -> Result<()> {
        println!("📊 Generating gETH NAV charts");

        let series = MidPriceLoader::new(self.data_dir.clone()).load_series()?;
        println!("Loaded {} mid-price records", series.len());

        let mid: Vec<f64> = series.iter().map(|r| r.mid).collect();
        let derived = DerivedSeries::from_mid(&mid);

        self.render_nav_chart(&series, &derived.nav)?;
        self.render_premium_chart(&series, &derived.premium_pct)?;
        self.render_ratio_chart(&series, &derived.inverse_ratio)?;

        self.print_summary(&series, &derived);

        Ok(())
    }

    fn render_nav_chart(&self, series: &[MidPriceRecord], nav: &[f64]) -> Result<()> {
        if series.is_empty() {
            return Ok(());
        }

        let output_path = self.output_dir.join("geth_nav.png");
        let root = BitMapBackend::new(&output_path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let min_ts = series.first().unwrap().timestamp;
        let max_ts = series.last().unwrap().timestamp;
        let (y_lo, y_hi) = clamped_value_range(nav, NAV_ENVELOPE);

        let mut chart = ChartBuilder::on(&root)
            .caption("gETH NAV (WETH per gETH)", ("sans-serif", 30).into_font())
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(min_ts..max_ts, y_lo..y_hi)?;

        chart.configure_mesh()
            .x_desc("time")
            .y_desc("WETH/gETH")
            .x_label_formatter(&|ts| ts.format("%Y-%m-%d").to_string())
            .y_label_formatter(&|v| format!("{:.4}", v))
            .draw()?;

        chart.draw_series(LineSeries::new(
            series.iter().zip(nav).map(|(r, v)| (r.timestamp, *v)),
            &BLUE,
        ))?;

        root.present()?;
        println!("  ✅ Saved {}", output_path.display());

        Ok(())
    }

    fn render_premium_chart(&self, series: &[MidPriceRecord], premium_pct: &[f64]) -> Result<()> {
        if series.is_empty() {
            return Ok(());
        }

        let output_path = self.output_dir.join("geth_premium.png");
        let root = BitMapBackend::new(&output_path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let min_ts = series.first().unwrap().timestamp;
        let max_ts = series.last().unwrap().timestamp;
        let (y_lo, y_hi) = padded_value_range(premium_pct);

        let mut chart = ChartBuilder::on(&root)
            .caption("gETH Premium vs ETH (%)", ("sans-serif", 30).into_font())
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(min_ts..max_ts, y_lo..y_hi)?;

        chart.configure_mesh()
            .x_desc("time")
            .y_desc("%")
            .x_label_formatter(&|ts| ts.format("%Y-%m-%d").to_string())
            .draw()?;

        chart.draw_series(LineSeries::new(
            series.iter().zip(premium_pct).map(|(r, v)| (r.timestamp, *v)),
            &BLUE,
        ))?;

        // Dashed parity reference at zero
        chart.draw_series(DashedLineSeries::new(
            vec![(min_ts, 0.0), (max_ts, 0.0)],
            6,
            4,
            BLACK.stroke_width(1),
        ))?;

        root.present()?;
        println!("  ✅ Saved {}", output_path.display());

        Ok(())
    }

    fn render_ratio_chart(&self, series: &[MidPriceRecord], inverse_ratio: &[f64]) -> Result<()> {
        if series.is_empty() {
            return Ok(());
        }

        let output_path = self.output_dir.join("geth_ratio.png");
        let root = BitMapBackend::new(&output_path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let min_ts = series.first().unwrap().timestamp;
        let max_ts = series.last().unwrap().timestamp;
        let (y_lo, y_hi) = clamped_value_range(inverse_ratio, RATIO_ENVELOPE);

        let mut chart = ChartBuilder::on(&root)
            .caption("gETH / WETH", ("sans-serif", 30).into_font())
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(min_ts..max_ts, y_lo..y_hi)?;

        chart.configure_mesh()
            .x_desc("time")
            .y_desc("gETH/WETH")
            .x_label_formatter(&|ts| ts.format("%Y-%m-%d").to_string())
            .y_label_formatter(&|v| format!("{:.4}", v))
            .draw()?;

        chart.draw_series(LineSeries::new(
            series.iter().zip(inverse_ratio).map(|(r, v)| (r.timestamp, *v)),
            &BLUE,
        ))?;

        root.present()?;
        println!("  ✅ Saved {}", output_path.display());

        Ok(())
    }

    fn print_summary(&self, series: &[MidPriceRecord], derived: &DerivedSeries) {
        let first = series.first().unwrap();
        let last = series.last().unwrap();
        let min_mid = series.iter().map(|r| r.mid).fold(f64::INFINITY, f64::min);
        let max_mid = series.iter().map(|r| r.mid).fold(f64::NEG_INFINITY, f64::max);

        println!("\n📈 gETH NAV summary");
        println!("  Records: {}", series.len());
        println!("  Covered: {} → {}", first.timestamp, last.timestamp);
        println!("  Mid:     min {:.6}  max {:.6}", min_mid, max_mid);
        println!(
            "  Latest:  mid={:.6} WETH/gETH  premium={:.4}%",
            last.mid,
            derived.premium_pct.last().unwrap()
        );
        println!("  ✅ Charts written to {}", self.output_dir.display());
    }
}

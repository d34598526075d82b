use crate::models::MidPriceRecord;
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use polars::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;

pub struct MidPriceLoader {
    data_dir: PathBuf,
}

impl MidPriceLoader {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Discover the monthly mid-price CSVs, merge them, and sort by timestamp.
    pub fn load_series(&self) -> Result<Vec<MidPriceRecord>> {
        let pattern = self.data_dir.join("geth_mid_*.csv");
        let mut files: Vec<PathBuf> = glob(pattern.to_str().unwrap())?
            .filter_map(Result::ok)
            .collect();
        files.sort();

        if files.is_empty() {
            bail!(
                "no monthly mid-price csvs found under {}",
                self.data_dir.display()
            );
        }

        println!("Found {} monthly mid-price files", files.len());

        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")
            .unwrap());

        let mut monthly_dfs = Vec::new();
        for file in &files {
            info!("Loading {}", file.display());

            // The collector writes 18-decimal price strings; force float
            let schema = Arc::new(Schema::from_iter([
                Field::new("weth_per_geth_mid", DataType::Float64),
            ]));

            let df = CsvReader::new(
                std::fs::File::open(file)
                    .with_context(|| format!("opening {}", file.display()))?,
            )
            .has_header(true)
            .with_dtypes(Some(schema))
            .finish()
            .with_context(|| format!("reading {}", file.display()))?;

            pb.inc(1);
            monthly_dfs.push(df);
        }
        pb.finish_and_clear();

        let combined = concat(
            monthly_dfs.iter().map(|df| df.clone().lazy()).collect::<Vec<_>>().as_slice(),
            UnionArgs::default(),
        )?
        .collect()?;

        if combined.height() == 0 {
            bail!("monthly mid-price csvs contained no rows");
        }

        let timestamps = combined.column("timestamp_iso")?.utf8()?;
        let mids = combined.column("weth_per_geth_mid")?.f64()?;

        let mut records = Vec::with_capacity(combined.height());
        for i in 0..combined.height() {
            let ts_str = timestamps
                .get(i)
                .ok_or_else(|| anyhow::anyhow!("row {}: missing timestamp_iso", i))?;
            let mid = mids
                .get(i)
                .ok_or_else(|| anyhow::anyhow!("row {}: missing weth_per_geth_mid", i))?;
            let timestamp = DateTime::parse_from_rfc3339(ts_str)
                .with_context(|| format!("row {}: bad timestamp_iso '{}'", i, ts_str))?
                .with_timezone(&Utc);
            records.push(MidPriceRecord { timestamp, mid });
        }

        // Stable sort keeps concatenation order for duplicate timestamps
        records.sort_by_key(|r| r.timestamp);

        info!("Merged {} records from {} files", records.len(), files.len());
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::Path;

    fn write_monthly_csv(dir: &Path, name: &str, rows: &[(&str, &str)]) {
        let mut f = std::fs::File::create(dir.join(name)).unwrap();
        writeln!(
            f,
            "timestamp_iso,weth_per_geth_mint,weth_per_geth_redeem,weth_per_geth_mid,asset_symbol,share_symbol,period_expiration_unix"
        )
        .unwrap();
        for (ts, mid) in rows {
            writeln!(f, "{},{},{},{},WETH,gETH,1754006400", ts, mid, mid, mid).unwrap();
        }
    }

    #[test]
    fn merges_and_sorts_monthly_files() {
        let dir = tempfile::tempdir().unwrap();
        write_monthly_csv(
            dir.path(),
            "geth_mid_202507.csv",
            &[
                ("2025-07-31T23:55:00.000Z", "1.000300000000000000"),
                ("2025-07-01T00:00:00.000Z", "1.000100000000000000"),
            ],
        );
        write_monthly_csv(
            dir.path(),
            "geth_mid_202506.csv",
            &[("2025-06-15T12:00:00.000Z", "0.999900000000000000")],
        );

        let records = MidPriceLoader::new(dir.path().to_path_buf())
            .load_series()
            .unwrap();

        assert_eq!(records.len(), 3);
        assert!(records.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
        assert_eq!(records[0].mid, 0.9999);
        assert_eq!(records[2].mid, 1.0003);
    }

    #[test]
    fn fails_without_input_files() {
        let dir = tempfile::tempdir().unwrap();
        let err = MidPriceLoader::new(dir.path().to_path_buf())
            .load_series()
            .unwrap_err();
        assert!(err.to_string().contains("no monthly mid-price csvs"));
    }

    #[test]
    fn fails_on_missing_mid_column() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = std::fs::File::create(dir.path().join("geth_mid_202501.csv")).unwrap();
        writeln!(f, "timestamp_iso,asset_symbol").unwrap();
        writeln!(f, "2025-01-01T00:00:00.000Z,WETH").unwrap();

        assert!(MidPriceLoader::new(dir.path().to_path_buf())
            .load_series()
            .is_err());
    }

    #[test]
    fn fails_on_unparseable_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        write_monthly_csv(
            dir.path(),
            "geth_mid_202502.csv",
            &[("not-a-timestamp", "1.000000000000000000")],
        );

        let err = MidPriceLoader::new(dir.path().to_path_buf())
            .load_series()
            .unwrap_err();
        assert!(err.to_string().contains("bad timestamp_iso"));
    }
}

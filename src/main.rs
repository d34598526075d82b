use anyhow::Result;
use geth_nav_report::ChartReport;

fn main() -> Result<()> {
    env_logger::init();

    println!("📈 gETH NAV Chart Report");
    println!("{}", "=".repeat(60));

    let report = ChartReport::new()?;
    report.generate_all_charts()?;

    Ok(())
}

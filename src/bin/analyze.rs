use anyhow::{Context, Result};
use chrono::Local;
use prettytable::{format, Cell, Row, Table};
use tracing_subscriber::{fmt, EnvFilter};

use foia_vendor_risk::{
    analysis::{self, group_thousands, Report},
    Config,
};

fn rule(title: &str) {
    println!("{:-<80}", "");
    println!("{}", title);
    println!("{:-<80}", "");
}

fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr) // report goes to stdout
        .init();

    let cfg = Config::from_env();
    let dataset_path = cfg.dataset_path();
    let out = &cfg.output_dir;

    println!("{:=<80}", "");
    println!("FOIA/OPEN DATA ANALYSIS REPORT");
    println!("Procurement Risk and Transparency Assessment");
    println!("Generated: {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
    println!("{:=<80}", "");

    let records = analysis::load_dataset(&dataset_path)
        .context("run the dataset build before analysing it")?;
    println!("Records loaded: {}\n", group_thousands(records.len() as f64));
    let report = Report::build(&records);

    // ─── summary ─────────────────────────────────────────────────────
    rule("DATASET SUMMARY");
    let stats = &report.summary;
    print!("{}", serde_yaml::to_string(stats)?);
    if stats.total_contract_value > 0.0 {
        println!(
            "Total Contract Value: {} UZS",
            group_thousands(stats.total_contract_value)
        );
    }
    println!();

    // ─── exclusions ──────────────────────────────────────────────────
    rule("US SAM EXCLUSIONS ANALYSIS");
    match &report.exclusions {
        Some(excl) => {
            println!("Total Exclusions: {}", group_thousands(excl.total_exclusions as f64));
            println!(
                "Unique Excluded Vendors: {}",
                group_thousands(excl.unique_excluded_vendors as f64)
            );
            println!("\nTop Excluding Agencies:");
            for (agency, count) in excl.top_agencies.iter().take(5) {
                println!("  {}: {}", agency, group_thousands(*count as f64));
            }
        }
        None => println!("No exclusion records in dataset"),
    }
    println!();

    // ─── contracts ───────────────────────────────────────────────────
    rule("UZBEKISTAN CONTRACTS ANALYSIS");
    match &report.contracts {
        Some(contracts) => {
            let v = &contracts.value_stats;
            println!("Total Contracts: {}", group_thousands(v.total_contracts as f64));
            println!(
                "Contracts with Value: {}",
                group_thousands(v.contracts_with_value as f64)
            );
            if v.total_value > 0.0 {
                println!("Total Value: {} UZS", group_thousands(v.total_value));
                println!("Mean Value: {} UZS", group_thousands(v.mean_value));
                println!("Median Value: {} UZS", group_thousands(v.median_value));
                println!("Max Value: {} UZS", group_thousands(v.max_value));
            }
            println!("\nTop Vendors by Contract Count:");
            for (vendor, count) in contracts.top_vendors_by_count.iter().take(5) {
                println!("  {}: {}", vendor, count);
            }
        }
        None => println!("No contract award records in dataset"),
    }
    println!();

    // ─── cross-border ────────────────────────────────────────────────
    rule("CROSS-BORDER VENDOR ANALYSIS");
    let cross = &report.cross_border;
    if cross.is_empty() {
        println!("No exact name matches found between jurisdictions");
    } else {
        println!("Potential cross-border vendors found: {}", cross.len());
        println!("(Requires manual verification with fuzzy matching)");
    }
    println!();

    // ─── risk ────────────────────────────────────────────────────────
    rule("VENDOR RISK ANALYSIS");
    let risks = &report.risks;
    if risks.is_empty() {
        println!("No high-risk indicators identified");
    } else {
        println!("Vendors with risk indicators: {}", risks.len());
        println!("\nTop 5 High-Risk Vendors:");

        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_BOX_CHARS);
        table.add_row(Row::new(vec![
            Cell::new("Vendor").style_spec("bFg"),
            Cell::new("Score").style_spec("bFg"),
            Cell::new("Factors").style_spec("bFg"),
            Cell::new("Records").style_spec("bFg"),
            Cell::new("Countries").style_spec("bFg"),
        ]));
        for r in risks.iter().take(5) {
            table.add_row(Row::new(vec![
                Cell::new(&r.vendor_name),
                Cell::new(&r.risk_score.to_string()).style_spec("r"),
                Cell::new(&r.risk_factors),
                Cell::new(&r.total_records.to_string()).style_spec("r"),
                Cell::new(&r.countries),
            ]));
        }
        table.printstd();
    }
    println!();

    // ─── transparency ────────────────────────────────────────────────
    rule("DATA TRANSPARENCY METRICS");
    let metrics = &report.transparency;
    println!("Data Completeness:");
    for (field, pct) in &metrics.completeness {
        println!("  {}: {:.1}%", field, pct);
    }
    println!("\nOverall Data Quality Score: {}%", metrics.data_quality_score);
    println!("\nData Sources:");
    println!("  US Sources: {}", metrics.us_sources);
    println!("  Uzbek Sources: {}", metrics.uzbek_sources);
    println!("  Total Unique Sources: {}", metrics.total_sources);
    println!();

    report.write_csvs(out)?;

    println!("{:=<80}", "");
    println!("ANALYSIS COMPLETE - All outputs saved to: {}", out.display());
    println!("{:=<80}", "");
    Ok(())
}

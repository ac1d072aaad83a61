use anyhow::Context;
use log::info;
use nhanes_explorer::PipelineConfig;
use nhanes_explorer::utils::logging::{print_section, print_table_overview};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = PipelineConfig::from_env().context("Failed to load configuration")?;
    info!("Effective configuration:\n{config}");

    let report = nhanes_explorer::run(&config).context("NHANES analysis failed")?;

    if !report.table.is_empty() {
        let batch = report
            .table
            .to_record_batch()
            .context("Failed to convert the analysis table")?;
        print_section("Analysis table");
        print_table_overview("cleaned", &batch);
    }

    print_section("Summary by stratum");
    println!("{}", report.summary);

    for model in &report.models {
        print_section(&format!("Model: {}", model.name));
        println!("{model}");
    }

    if !report.charts.is_empty() {
        print_section("Charts");
        for path in &report.charts {
            println!("  {}", path.display());
        }
    }

    Ok(())
}

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use shared::{list_assignment_files, load_assignment, AssignmentFile, ReportGenerator};
use std::io::{self, Write as _};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "export-groups")]
#[command(about = "Export a saved case assignment as an HTML report and CSV tables")]
struct Args {
    /// Path to the saved assignment (if not provided, will list available files)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Title for the HTML report
    #[arg(short, long, default_value = "Case Digest Assignments")]
    title: String,

    /// Directory to write into (defaults to Documents)
    #[arg(short, long)]
    out_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let args = Args::parse();

    let assignment_file = if let Some(path) = args.file {
        path
    } else {
        select_assignment_file()?
    };

    println!("📖 Reading assignment: {}", assignment_file.display());
    let data = load_assignment(&assignment_file)?;
    let result = &data.result;

    println!(
        "✓ Loaded {} groups with {} cases ({} pages)",
        result.num_groups(),
        result.item_count(),
        result.total_weight()
    );

    let created = created_at(&data);
    let out_dir = args
        .out_dir
        .unwrap_or_else(ReportGenerator::default_output_dir);
    let stem = assignment_file
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("assignment")
        .to_string();

    println!("\n📝 Generating HTML report...");
    let html_content = ReportGenerator::generate_html(result, &args.title, created);
    let html_path = ReportGenerator::save(&html_content, &out_dir, &stem, "html", created)
        .context("Failed to save HTML file")?;
    println!("✓ HTML saved to: {}", html_path.display());

    println!("\n📊 Generating CSV tables...");
    let rows_csv = ReportGenerator::generate_rows_csv(result)?;
    let rows_path =
        ReportGenerator::save(&rows_csv, &out_dir, &format!("{}-cases", stem), "csv", created)
            .context("Failed to save cases CSV file")?;
    println!("✓ Cases CSV saved to: {}", rows_path.display());

    let summary_csv = ReportGenerator::generate_summary_csv(result)?;
    let summary_path = ReportGenerator::save(
        &summary_csv,
        &out_dir,
        &format!("{}-summary", stem),
        "csv",
        created,
    )
    .context("Failed to save summary CSV file")?;
    println!("✓ Summary CSV saved to: {}", summary_path.display());

    println!("\n✅ Done!");

    Ok(())
}

fn created_at(data: &AssignmentFile) -> DateTime<Utc> {
    match DateTime::parse_from_rfc3339(&data.created_at) {
        Ok(dt) => dt.with_timezone(&Utc),
        Err(e) => {
            tracing::warn!(
                created_at = %data.created_at,
                error = %e,
                "unreadable timestamp, using now"
            );
            Utc::now()
        }
    }
}

fn select_assignment_file() -> Result<PathBuf> {
    let files = list_assignment_files()?;

    if files.is_empty() {
        anyhow::bail!("No saved assignments found. Run assign-cases with --save first.");
    }

    println!("Saved assignments:\n");
    for (i, (path, data)) in files.iter().enumerate() {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let created = DateTime::parse_from_rfc3339(&data.created_at)
            .map(|dt| {
                dt.with_timezone(&chrono::Local)
                    .format("%Y-%m-%d %H:%M")
                    .to_string()
            })
            .unwrap_or_else(|_| "unknown".to_string());

        println!(
            "  {}) {} ({} cases from {}, saved {})",
            i + 1,
            filename,
            data.result.item_count(),
            data.source,
            created
        );
    }

    print!("\nSelect file (1-{}): ", files.len());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    let selection: usize = input
        .trim()
        .parse()
        .context("Invalid selection. Please enter a number.")?;

    if selection < 1 || selection > files.len() {
        anyhow::bail!("Selection out of range. Please choose 1-{}", files.len());
    }

    Ok(files[selection - 1].0.clone())
}

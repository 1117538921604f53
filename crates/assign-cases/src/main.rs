use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use shared::config::parse_initial_loads;
use shared::{
    load_assignment, parse_csv, parse_text, save_assignment, Assigner, AssignmentFile, Config,
    ParsedItems, ReportGenerator,
};
use std::fs::{self, File};
use std::io::{self as stdio, BufRead, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "assign-cases")]
#[command(about = "Split case digests into groups with balanced page counts")]
struct Args {
    /// CSV file (Case Name, Number of Pages) or text file ("Case Name - Pages" per line).
    /// If omitted, cases are entered interactively.
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Number of groups
    #[arg(short, long)]
    groups: Option<usize>,

    /// Pages each group already carries, comma-separated (e.g. "120,0,45")
    #[arg(short, long, conflicts_with = "carry_from")]
    loads: Option<String>,

    /// Start from the final totals of a saved assignment
    #[arg(long)]
    carry_from: Option<PathBuf>,

    /// Abort if any line or row cannot be read, instead of skipping it
    #[arg(long)]
    strict: bool,

    /// Save the assignment so it can be exported or carried forward later
    #[arg(short, long)]
    save: bool,

    /// Also write a CSV with one row per case to the Documents directory
    #[arg(long)]
    csv: bool,
}

fn prompt_cases_entry() -> Result<String> {
    println!("Enter cases, one per line, as: Case Name - Pages");
    println!("Finish with an empty line (or Ctrl-D).\n");
    stdio::stdout().flush()?;

    let mut input = String::new();
    for line in stdio::stdin().lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            break;
        }
        input.push_str(&line);
        input.push('\n');
    }

    Ok(input)
}

fn read_cases(path: &Path, config: &Config) -> Result<ParsedItems> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    if is_csv {
        let file =
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        parse_csv(file, &config.name_column, &config.weight_column)
            .with_context(|| format!("Failed to read CSV {}", path.display()))
    } else {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(parse_text(&content))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(stdio::stderr).init();

    let args = Args::parse();
    let config = Config::from_env()?;

    // Work out groups and starting loads: carried-forward run, then flags, then environment
    let (num_groups, initial_loads) = if let Some(path) = &args.carry_from {
        let previous = load_assignment(path)?;
        if let Some(groups) = args.groups {
            if groups != previous.result.num_groups() {
                anyhow::bail!(
                    "--groups {} does not match the {} groups in {}",
                    groups,
                    previous.result.num_groups(),
                    path.display()
                );
            }
        }
        println!(
            "✓ Carrying forward {} groups from {}",
            previous.result.num_groups(),
            path.display()
        );
        (
            previous.result.num_groups(),
            Some(previous.result.carry_forward_loads()),
        )
    } else {
        let loads = match &args.loads {
            Some(raw) => Some(parse_initial_loads(raw).context("Invalid --loads")?),
            None => config.initial_loads.clone(),
        };
        (args.groups.unwrap_or(config.num_groups), loads)
    };

    let assigner = Assigner::new(num_groups, initial_loads).context("Invalid group setup")?;

    let (source, parsed) = match &args.file {
        Some(path) => {
            println!("📖 Reading cases from {}", path.display());
            (path.display().to_string(), read_cases(path, &config)?)
        }
        None => ("manual entry".to_string(), parse_text(&prompt_cases_entry()?)),
    };

    if !parsed.is_clean() {
        println!("\n⚠ Skipped {} entries:", parsed.rejected.len());
        for err in &parsed.rejected {
            println!("  ✗ {}", err);
            tracing::warn!(error = %err, "skipped case entry");
        }
        if args.strict {
            anyhow::bail!("{} entries could not be read (--strict)", parsed.rejected.len());
        }
    }

    if parsed.items.is_empty() {
        println!("No cases to assign.");
        return Ok(());
    }

    println!(
        "✓ Read {} cases, assigning to {} groups\n",
        parsed.items.len(),
        assigner.num_groups()
    );

    let result = assigner.assign_cases(&parsed.items)?;

    print!("{}", ReportGenerator::generate_text(&result));

    let now = Utc::now();

    if args.csv {
        let csv_content = ReportGenerator::generate_rows_csv(&result)?;
        let csv_path = ReportGenerator::save(
            &csv_content,
            &ReportGenerator::default_output_dir(),
            "case-groups",
            "csv",
            now,
        )
        .context("Failed to save CSV file")?;
        println!("\n📊 CSV saved to: {}", csv_path.display());
    }

    if args.save {
        let data = AssignmentFile::new(source, result);
        let filename = format!("assignment-{}.json", now.format("%Y-%m-%d-%H%M%S"));
        let saved = save_assignment(&data, &filename).context("Failed to save assignment")?;
        println!("\n✅ Assignment saved to: {}", saved.display());
    }

    Ok(())
}

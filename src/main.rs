mod config;
mod error;
mod index;
mod locate;
mod model;
mod parser;
mod reconcile;
mod stats;
mod store;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::config::Labels;
use crate::index::ReferenceIndex;
use crate::model::{FilteredResult, ProfessorTable, RunMeta, RunReport, SubjectTable};
use crate::reconcile::scope::Scope;

#[derive(Parser)]
#[command(name = "accred_check", about = "Cross-check professor and subject tables of accreditation documents")]
struct Cli {
    /// Settings file (default: ./accred.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the professor list and professor tables from a converted HTML document
    Professors {
        file: PathBuf,
        /// Write the tagged tables as JSON
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Extract the subject list and subject tables from a converted HTML document
    Subjects {
        file: PathBuf,
        /// Write the tagged tables as JSON
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Cross-check both documents for one study programme
    Verify {
        #[arg(long)]
        professors: PathBuf,
        #[arg(long)]
        subjects: PathBuf,
        /// Study programme under review (empty: everything)
        #[arg(long, default_value = "")]
        programme: String,
        /// Studies type, e.g. OAS or MAS
        #[arg(short = 't', long)]
        studies_type: Option<String>,
        /// Also write this run's report here
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Find the professors and subjects documents in a hyperlink list (JSON)
    Locate { links: PathBuf },
    /// Overview statistics for a pair of documents
    Stats {
        #[arg(long)]
        professors: PathBuf,
        #[arg(long)]
        subjects: PathBuf,
        #[arg(long, default_value = "")]
        programme: String,
        #[arg(short = 't', long)]
        studies_type: Option<String>,
        /// Max professors in the load table
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },
    /// List earlier verification runs from the results log
    Results {
        /// Max runs to show, newest first
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = config::load(cli.config.as_deref())?;

    let result = match cli.command {
        Commands::Professors { file, out } => {
            let labels = Labels::compile(&settings.labels)?;
            let tables = parser::read_professors(&read_document(&file)?, &labels);
            print_professors(&tables);
            if let Some(out) = out {
                store::write_json(&out, &tables)?;
                println!("\nWrote {}", out.display());
            }
            Ok(())
        }
        Commands::Subjects { file, out } => {
            let labels = Labels::compile(&settings.labels)?;
            let tables = parser::read_subjects(&read_document(&file)?, &labels);
            print_subjects(&tables);
            if let Some(out) = out {
                store::write_json(&out, &tables)?;
                println!("\nWrote {}", out.display());
            }
            Ok(())
        }
        Commands::Verify {
            professors,
            subjects,
            programme,
            studies_type,
            out,
        } => {
            let labels = Labels::compile(&settings.labels)?;
            let scope = Scope::new(programme, studies_type);
            let pb = stage_bar(4)?;

            pb.set_message("reading documents");
            let prof_html = read_document(&professors)?;
            let subj_html = read_document(&subjects)?;
            pb.inc(1);

            pb.set_message("extracting tables");
            let mut index = ReferenceIndex::build(&prof_html, &subj_html, &labels);
            index.apply_scope(&scope);
            info!("{} declarations in scope", index.declarations());
            pb.inc(1);

            pb.set_message("reconciling");
            let reconciliation = reconcile::reconcile(&index.professors, &index.subjects);
            pb.inc(1);

            pb.set_message("filtering");
            let filtered = reconcile::scope::filter(&reconciliation, &scope);
            pb.inc(1);
            pb.finish_and_clear();

            print_filtered(&filtered);

            let report = RunReport {
                meta: RunMeta {
                    run_at: chrono::Utc::now().to_rfc3339(),
                    studies_programme: scope.studies_programme.clone(),
                    studies_type: scope.studies_type.clone(),
                    professors_file: professors.display().to_string(),
                    subjects_file: subjects.display().to_string(),
                },
                reconciliation,
                filtered,
            };
            if let Some(out) = out {
                store::write_json(&out, &report)?;
                println!("\nWrote {}", out.display());
            }
            let runs = store::append_result(&settings.output_dir, &report)?;
            println!(
                "Appended to {} ({} runs)",
                store::results_path(&settings.output_dir).display(),
                runs
            );
            Ok(())
        }
        Commands::Locate { links } => {
            let links = locate::load_links(&links)?;
            let locator = locate::Locator::new(&settings.locate)?;
            println!("{} links", links.len());
            match locator.professors_file(&links) {
                Some(l) => println!("Professors: {} ({})", l.path, truncate(&l.line, 60)),
                None => println!("Professors: not found"),
            }
            match locator.subjects_file(&links) {
                Some(l) => println!("Subjects:   {} ({})", l.path, truncate(&l.line, 60)),
                None => println!("Subjects:   not found"),
            }
            Ok(())
        }
        Commands::Stats {
            professors,
            subjects,
            programme,
            studies_type,
            limit,
        } => {
            let labels = Labels::compile(&settings.labels)?;
            let mut index = ReferenceIndex::build(
                &read_document(&professors)?,
                &read_document(&subjects)?,
                &labels,
            );
            index.apply_scope(&Scope::new(programme, studies_type));
            print_overview(&stats::overview(&index), limit);
            Ok(())
        }
        Commands::Results { limit } => {
            let runs = store::load_results(&settings.output_dir)?;
            if runs.is_empty() {
                println!("No runs yet. Run 'verify' first.");
                return Ok(());
            }
            println!(
                "{:<25} | {:<32} | {:<5} | {:>5} | {:>5} | {:>5} | {:>5}",
                "Run at", "Programme", "Type", "P→S", "S→P", "Prof", "Subj"
            );
            println!("{}", "-".repeat(100));
            for r in runs.iter().rev().take(limit) {
                let f = &r.filtered;
                println!(
                    "{:<25} | {:<32} | {:<5} | {:>5} | {:>5} | {:>5} | {:>5}",
                    truncate(&r.meta.run_at, 25),
                    truncate(&r.meta.studies_programme, 32),
                    r.meta.studies_type.as_deref().unwrap_or("-"),
                    f.prof_to_subj_not_found.len(),
                    f.subj_to_prof_not_found.len(),
                    f.prof_to_subj_pot_matches_prof_name_middle.len(),
                    f.prof_to_subj_pot_matches_subj_name.len()
                );
            }
            println!("\n{} runs in {}", runs.len(), store::results_path(&settings.output_dir).display());
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn read_document(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn stage_bar(stages: u64) -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new(stages);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

fn print_professors(tables: &[ProfessorTable]) {
    for table in tables {
        match table {
            ProfessorTable::ProfList { data, .. } => {
                println!("Professor list: {} entries", data.len());
            }
            ProfessorTable::ProfTables { data, .. } => {
                println!(
                    "\n{:>3} | {:<28} | {:<20} | {:<30} | {:>4}",
                    "Key", "Name", "Title", "Discipline", "Subj"
                );
                println!("{}", "-".repeat(97));
                for p in data {
                    println!(
                        "{:>3} | {:<28} | {:<20} | {:<30} | {:>4}",
                        p.table_key,
                        truncate(p.name(), 28),
                        truncate(p.title.as_deref().unwrap_or("-"), 20),
                        truncate(p.sci_discipline.as_deref().unwrap_or("-"), 30),
                        p.subjects_all.len()
                    );
                }
                println!("\n{} professor tables", data.len());
            }
        }
    }
}

fn print_subjects(tables: &[SubjectTable]) {
    for table in tables {
        match table {
            SubjectTable::SubjList { data, .. } => {
                println!("Subject list: {} entries", data.len());
            }
            SubjectTable::SubjTables { data, .. } => {
                println!(
                    "\n{:>3} | {:<12} | {:<36} | {:<30} | {:>4}",
                    "Key", "Code", "Subject", "Professor", "ESPB"
                );
                println!("{}", "-".repeat(99));
                for s in data {
                    println!(
                        "{:>3} | {:<12} | {:<36} | {:<30} | {:>4}",
                        s.table_key,
                        s.subject_code.as_deref().unwrap_or("-"),
                        truncate(s.subject_name(), 36),
                        truncate(s.professor(), 30),
                        s.espb.as_deref().unwrap_or("-")
                    );
                }
                println!("\n{} subject tables", data.len());
            }
        }
    }
}

fn print_filtered(f: &FilteredResult) {
    let programme = if f.studies_programme.is_empty() {
        "(all programmes)"
    } else {
        f.studies_programme.as_str()
    };
    println!("Programme: {}\n", programme);

    let counts = [
        ("Declared, no subject table", f.prof_to_subj_not_found.len()),
        ("Subject table, no declaration", f.subj_to_prof_not_found.len()),
        ("Declared, professor not named", f.prof_to_subj_pot_matches_prof_name.len()),
        ("  ...beyond a middle initial", f.prof_to_subj_pot_matches_prof_name_middle.len()),
        ("Subject table, professor not declaring", f.subj_to_prof_pot_matches_prof_name.len()),
        ("  ...beyond a middle initial", f.subj_to_prof_pot_matches_prof_name_middle.len()),
        ("Declared, subject name differs", f.prof_to_subj_pot_matches_subj_name.len()),
        ("Subject table, subject name differs", f.subj_to_prof_pot_matches_subj_name.len()),
    ];
    for (label, n) in counts {
        println!("  {:<40} {:>4}", label, n);
    }

    if !f.prof_to_subj_not_found.is_empty() {
        println!("\n--- Declared subjects without a subject table ---");
        for e in &f.prof_to_subj_not_found {
            let d = &e.source.declaration;
            println!(
                "  {:<24} | {:<12} | {}",
                truncate(&e.source.professor, 24),
                d.code,
                truncate(&d.name, 40)
            );
        }
    }
    if !f.subj_to_prof_not_found.is_empty() {
        println!("\n--- Subject tables nobody declares ---");
        for e in &f.subj_to_prof_not_found {
            println!(
                "  {:<48} | {}",
                truncate(e.source.subject(), 48),
                truncate(e.source.professor(), 30)
            );
        }
    }
    if !f.prof_to_subj_pot_matches_prof_name_middle.is_empty() {
        println!("\n--- Professor names that disagree ---");
        for e in &f.prof_to_subj_pot_matches_prof_name_middle {
            for c in &e.potential_matches {
                println!(
                    "  {:<12} | {:<24} vs {}",
                    e.source.declaration.code,
                    truncate(&e.source.professor, 24),
                    truncate(c.record.professor(), 40)
                );
            }
        }
    }
    if !f.prof_to_subj_pot_matches_subj_name.is_empty() {
        println!("\n--- Subject names that disagree ---");
        for e in &f.prof_to_subj_pot_matches_subj_name {
            for c in &e.potential_matches {
                println!(
                    "  {:<12} | {:<32} vs {}",
                    e.source.declaration.code,
                    truncate(&e.source.declaration.name, 32),
                    truncate(c.record.subject_name(), 40)
                );
            }
        }
    }
}

fn print_overview(o: &stats::Overview, limit: usize) {
    println!("Professors:         {}", o.professors);
    println!("Listed subjects:    {}", o.listed_subjects);
    println!("Subject tables:     {}", o.detailed_subjects);
    println!("Total ESPB:         {} (avg {:.1})", o.total_espb, o.avg_espb);
    println!("Class hours (P+V):  {}", o.total_class_hours);
    println!("Subjects/professor: {:.2}", o.avg_subjects_per_professor);

    for (title, counts) in [
        ("Titles", &o.titles),
        ("Programmes", &o.programmes),
        ("Subject types", &o.subject_types),
        ("Semesters", &o.semesters),
    ] {
        println!("\n--- {} ---", title);
        for (k, n) in counts {
            println!("  {:<40} {:>4}", truncate(k, 40), n);
        }
    }

    if !o.load.is_empty() {
        println!("\n{:>3} | {:<28} | {:<20} | {:>6} | {:>5}", "#", "Professor", "Title", "Active", "Total");
        println!("{}", "-".repeat(74));
        for (i, l) in o.load.iter().take(limit).enumerate() {
            println!(
                "{:>3} | {:<28} | {:<20} | {:>6} | {:>5}",
                i + 1,
                truncate(&l.name, 28),
                truncate(&l.title, 20),
                l.active,
                l.total
            );
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

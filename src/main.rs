use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use env_logger::Builder as LoggerBuilder;
use log::{debug, info, LevelFilter};
use std::path::{Path, PathBuf};

use gpa_calc::calculator::{self, CalculatorSession, Constant};
use gpa_calc::config::Config;
use gpa_calc::grading::{self, CategoryFilter, Course, UnresolvedLetterPolicy};
use gpa_calc::output;
use gpa_calc::records::RecordStore;

const EXIT_SUCCESS: i32 = 0;
const EXIT_INPUT: i32 = 1;
const EXIT_CONFIG: i32 = 4;
const EXIT_STORAGE: i32 = 5;

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SciFunction {
    Sin,
    Cos,
    Tan,
    /// log BASE N
    Log,
    Ln,
    /// pow BASE EXPONENT
    Pow,
    Sqrt,
    Square,
    Cube,
    Fact,
    /// comb N M
    Comb,
    /// perm N M
    Perm,
    Pi,
    E,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Calculate the GPA of a course sheet
    Calc {
        /// Course sheet (.yaml/.yml, otherwise tab-separated)
        sheet: PathBuf,
        /// Which courses to include: all, compulsory, major, elective
        #[arg(short, long)]
        scope: Option<CategoryFilter>,
    },
    /// Show the grade points of every sheet row, "-" when not computable
    Resolve { sheet: PathBuf },
    /// Save the courses of a sheet as a new record
    Save { sheet: PathBuf },
    /// List saved records
    Records,
    /// Show one saved record
    Show { id: i64 },
    /// Delete a saved record
    Delete { id: i64 },
    /// Merge a sheet with saved records, dropping duplicate courses
    Merge {
        /// Base course sheet (optional)
        sheet: Option<PathBuf>,
        /// Ids of the records to merge in
        #[arg(long, num_args = 1.., required = true)]
        ids: Vec<i64>,
        /// Save the merged courses as a new record
        #[arg(long)]
        save: bool,
        /// Write the merged courses as a report to this file
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Write a tab-separated report of a sheet
    Export {
        sheet: PathBuf,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show the grade conversion table
    Scale,
    /// Evaluate an arithmetic expression
    Eval {
        /// Numbers, + - * / and parentheses
        expression: String,
    },
    /// Run a scientific calculator function
    Sci {
        function: SciFunction,
        #[arg(allow_negative_numbers = true)]
        args: Vec<f64>,
        /// Treat angles as radians instead of degrees
        #[arg(long)]
        radians: bool,
    },
}

#[derive(Parser, Debug)]
#[command(name = "gpa-calc")]
#[command(about = "GPA calculator with saved transcripts", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/gpa-calc/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

fn init_env_logger(verbose: bool) {
    let mut logger_builder = LoggerBuilder::new();
    logger_builder.filter(None, if verbose { LevelFilter::Debug } else { LevelFilter::Warn });
    if let Ok(rust_log) = std::env::var("RUST_LOG") {
        logger_builder.parse_filters(&rust_log);
    }
    logger_builder.init();
}

fn exit_with(code: i32, kind: &str, err: anyhow::Error) -> ! {
    eprintln!("{} error: {:#}", kind, err);
    std::process::exit(code);
}

fn load_courses(path: &Path, policy: UnresolvedLetterPolicy) -> Vec<Course> {
    let rows = gpa_calc::sheet::load_sheet(path).unwrap_or_else(|e| exit_with(EXIT_INPUT, "Input", e));
    let courses = grading::resolve_rows(&rows, policy);
    info!(
        "Read {} rows from {}, {} computable",
        rows.len(),
        path.display(),
        courses.len()
    );
    courses
}

fn open_store(config: &Config) -> RecordStore {
    let path = config
        .records_path()
        .unwrap_or_else(|e| exit_with(EXIT_CONFIG, "Config", e));
    RecordStore::open(&path).unwrap_or_else(|e| exit_with(EXIT_STORAGE, "Storage", e))
}

fn write_report(courses: &[Course], target: Option<&Path>) {
    let summary = grading::aggregate(courses);
    let report = output::format_export_report(courses, &summary, Local::now());
    match target {
        Some(path) => {
            if let Err(e) = std::fs::write(path, report) {
                exit_with(EXIT_INPUT, "Export", e.into());
            }
            println!("Report written to {}", path.display());
        }
        None => print!("{}", report),
    }
}

fn run_sci(function: SciFunction, args: &[f64], session: &mut CalculatorSession) -> anyhow::Result<f64> {
    let arg = |i: usize| -> anyhow::Result<f64> {
        args.get(i)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("{:?} needs {} argument(s)", function, i + 1))
    };
    let whole = |v: f64| -> anyhow::Result<u32> {
        if v.fract() != 0.0 || v < 0.0 || v > f64::from(u32::MAX) {
            anyhow::bail!("{} is not a non-negative integer", v);
        }
        Ok(v as u32)
    };

    let value = match function {
        SciFunction::Sin => session.sin(arg(0)?)?,
        SciFunction::Cos => session.cos(arg(0)?)?,
        SciFunction::Tan => session.tan(arg(0)?)?,
        SciFunction::Log => session.log(arg(0)?, arg(1)?)?,
        SciFunction::Ln => session.ln(arg(0)?)?,
        SciFunction::Pow => session.power(arg(0)?, arg(1)?)?,
        SciFunction::Sqrt => session.sqrt(arg(0)?)?,
        SciFunction::Square => session.square(arg(0)?)?,
        SciFunction::Cube => session.cube(arg(0)?)?,
        SciFunction::Fact => session.factorial(whole(arg(0)?)?)?,
        SciFunction::Comb => session.combination(whole(arg(0)?)?, whole(arg(1)?)?)?,
        SciFunction::Perm => session.permutation(whole(arg(0)?)?, whole(arg(1)?)?)?,
        SciFunction::Pi => session.insert_constant(Constant::Pi),
        SciFunction::E => session.insert_constant(Constant::E),
    };
    Ok(value)
}

fn main() {
    let cli = Cli::parse();
    init_env_logger(cli.verbose);

    // Load config
    let config_path = cli.config.map(PathBuf::from);
    let config = match gpa_calc::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => exit_with(EXIT_CONFIG, "Config", e),
    };

    if let Err(errors) = gpa_calc::config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let policy = config.letter_policy();
    let use_colors = output::should_use_colors(config.color_mode());
    debug!("Letter policy: {:?}, colors: {}", policy, use_colors);

    match cli.command {
        Commands::Calc { sheet, scope } => {
            let courses = load_courses(&sheet, policy);
            if courses.is_empty() {
                eprintln!("No computable courses in {}.", sheet.display());
                std::process::exit(EXIT_INPUT);
            }

            let scope = scope.unwrap_or_else(|| config.scope());
            let selected = grading::filter_by_category(&courses, scope);
            let summary = grading::aggregate(&selected);

            println!("{}", output::format_course_table(&selected, use_colors));
            println!();
            println!("{}", output::format_summary(&summary, scope, use_colors));
        }
        Commands::Resolve { sheet } => {
            let rows = gpa_calc::sheet::load_sheet(&sheet)
                .unwrap_or_else(|e| exit_with(EXIT_INPUT, "Input", e));
            let resolved: Vec<_> = rows
                .into_iter()
                .enumerate()
                .map(|(i, raw)| {
                    let points = grading::resolve_course(&raw, i + 1, policy).map(|c| c.gpa());
                    (raw, points)
                })
                .collect();
            println!("{}", output::format_resolved_rows(&resolved, use_colors));
        }
        Commands::Save { sheet } => {
            let courses = load_courses(&sheet, policy);
            if courses.is_empty() {
                eprintln!("No course data to save.");
                std::process::exit(EXIT_INPUT);
            }

            let mut store = open_store(&config);
            let record = store
                .save(&courses)
                .unwrap_or_else(|e| exit_with(EXIT_STORAGE, "Storage", e));
            println!(
                "Saved record {} ({} courses, GPA {})",
                record.id,
                record.courses.len(),
                output::format_gpa(record.summary_or_compute().gpa)
            );
        }
        Commands::Records => {
            let store = open_store(&config);
            println!("{}", output::format_record_list(store.list(), use_colors));
        }
        Commands::Show { id } => {
            let store = open_store(&config);
            match store.load_by_id(id) {
                Some(record) => println!("{}", output::format_record_detail(record, use_colors)),
                None => println!("No record with id {}.", id),
            }
        }
        Commands::Delete { id } => {
            let mut store = open_store(&config);
            match store.delete_by_id(id) {
                Ok(true) => println!("Deleted record {}.", id),
                Ok(false) => println!("No record with id {}.", id),
                Err(e) => exit_with(EXIT_STORAGE, "Storage", e),
            }
        }
        Commands::Merge {
            sheet,
            ids,
            save,
            export,
        } => {
            let base = match sheet {
                Some(ref path) => load_courses(path, policy),
                None => Vec::new(),
            };

            let mut store = open_store(&config);
            let missing: Vec<_> = ids
                .iter()
                .filter(|id| store.load_by_id(**id).is_none())
                .collect();
            if !missing.is_empty() {
                log::warn!("Unknown record ids ignored: {:?}", missing);
            }

            let merged = store.merge_selected(&base, &ids);
            println!("{}", output::format_course_table(&merged, use_colors));
            println!();
            println!("Merge complete: {} courses.", merged.len());

            if save {
                if merged.is_empty() {
                    eprintln!("No course data to save.");
                    std::process::exit(EXIT_INPUT);
                }
                let record = store
                    .save(&merged)
                    .unwrap_or_else(|e| exit_with(EXIT_STORAGE, "Storage", e));
                println!("Saved merged courses as record {}", record.id);
            }
            if let Some(path) = export {
                write_report(&merged, Some(path.as_path()));
            }
        }
        Commands::Export {
            sheet,
            output: target,
        } => {
            let courses = load_courses(&sheet, policy);
            if courses.is_empty() {
                eprintln!("No course data to export.");
                std::process::exit(EXIT_INPUT);
            }
            write_report(&courses, target.as_deref());
        }
        Commands::Scale => {
            println!("{}", output::format_conversion_chart(use_colors));
        }
        Commands::Eval { expression } => match calculator::evaluate(&expression) {
            Ok(value) => println!("{}", calculator::format_number(value)),
            Err(e) => exit_with(EXIT_INPUT, "Expression", e),
        },
        Commands::Sci {
            function,
            args,
            radians,
        } => {
            let mut session = CalculatorSession::new(config.angle_mode());
            if radians {
                session.set_angle_mode(calculator::AngleMode::Radians);
            }
            match run_sci(function, &args, &mut session) {
                Ok(value) => debug!("{:?} = {}", function, value),
                Err(e) => exit_with(EXIT_INPUT, "Calculator", e),
            }
            println!("{}", session.display());
        }
    }

    std::process::exit(EXIT_SUCCESS);
}

#![forbid(unsafe_code)]
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use planning::{
    io,
    model::{hhmm, weekday_name, Schedule},
    params::{export_params_json, load_params_from_file, BreakPolicy, ScheduleParams},
    scheduler::{detect_conflicts, rng_for, ConflictKind, Scheduler},
    storage::{JsonStorage, Storage},
};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI de planification des équipes (roster CSV → planning CSV/JSON)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Valider un roster CSV
    Validate {
        #[arg(long)]
        csv: String,
    },

    /// Écrire un fichier de paramètres par défaut pour ce roster
    ///
    /// Horizon par défaut : 90 jours consécutifs. `work_days_per_week` n'est
    /// utilisé qu'avec un horizon en semaines (`"horizon": {"weeks": N}`).
    InitParams {
        #[arg(long)]
        csv: String,
        #[arg(long, default_value = "params.json")]
        out: String,
    },

    /// Générer un planning
    Generate {
        #[arg(long)]
        csv: String,
        #[arg(long, default_value = "params.json")]
        params: String,
        /// Graine du générateur (planning reproductible)
        #[arg(long)]
        seed: Option<u64>,
        /// Premier jour planifié (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,
        /// Échec si une pause ne tient pas dans un créneau
        #[arg(long)]
        strict: bool,
        #[arg(long)]
        out_csv: Option<String>,
        #[arg(long)]
        out_json: Option<String>,
    },

    /// Vérifier un planning JSON
    Check {
        #[arg(long)]
        schedule: String,
        #[arg(long, default_value = "params.json")]
        params: String,
    },

    /// Afficher un planning JSON
    Show {
        #[arg(long)]
        schedule: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let code = match cli.cmd {
        Commands::Validate { csv } => {
            let sheet = io::import_roster_csv(&csv)?;
            let mut scheduler = Scheduler::new();
            let roster = scheduler.load(&sheet)?;
            let roles: Vec<&str> = roster.roles.iter().map(|r| r.as_str()).collect();
            println!(
                "OK: {} employee(s), roles: {}",
                roster.employees.len(),
                roles.join(", ")
            );
            0
        }
        Commands::InitParams { csv, out } => {
            let sheet = io::import_roster_csv(&csv)?;
            let mut scheduler = Scheduler::new();
            let roster = scheduler.load(&sheet)?;
            export_params_json(&out, &ScheduleParams::starter(roster))?;
            println!("Parameters written to {out}");
            0
        }
        Commands::Generate {
            csv,
            params,
            seed,
            start,
            strict,
            out_csv,
            out_json,
        } => {
            let mut params = load_params_from_file(&params)?;
            if let Some(start) = start {
                let date = NaiveDate::parse_from_str(&start, "%Y-%m-%d")
                    .with_context(|| format!("invalid start date: {start}"))?;
                params.start_date = Some(date);
            }
            if strict {
                params.break_policy = BreakPolicy::Abort;
            }
            let mut rng = rng_for(seed.or(params.seed));

            let sheet = io::import_roster_csv(&csv)?;
            let mut scheduler = Scheduler::new();
            scheduler.load(&sheet)?;
            let schedule = scheduler.generate(&params, &mut rng)?;

            if let Some(path) = out_csv {
                io::export_schedule_csv(path, &schedule)?;
            }
            if let Some(path) = out_json {
                JsonStorage::open(path).save(&schedule)?;
            }

            println!(
                "{} assignment(s) over {} employee(s)",
                schedule.entries.len(),
                schedule.hours.len()
            );
            if schedule.is_complete() {
                0
            } else {
                eprintln!("{} slot(s) left under-filled", schedule.unfilled.len());
                for slot in &schedule.unfilled {
                    eprintln!(
                        "  {} {} {}: {}/{}",
                        slot.date, slot.shift, slot.role, slot.filled, slot.requested
                    );
                }
                // Code 2 = WARNING/INCOMPLETE
                2
            }
        }
        Commands::Check { schedule, params } => {
            let params = load_params_from_file(&params)?;
            let schedule = JsonStorage::open(&schedule).load()?;
            let conflicts = detect_conflicts(&schedule, params.weekly_hours);
            if conflicts.is_empty() {
                println!("OK: no conflicts");
                0
            } else {
                eprintln!("Found {} conflict(s)", conflicts.len());
                for c in &conflicts {
                    eprintln!(
                        "  {} {} employee {}: {}",
                        c.date,
                        c.shift,
                        c.employee,
                        match c.kind {
                            ConflictKind::BreakOutsideShift => "break outside shift",
                            ConflictKind::BreakOverlap => "overlapping breaks",
                            ConflictKind::DoubleBooking => "double booking",
                            ConflictKind::BudgetExceeded => "weekly hours exceeded",
                        }
                    );
                }
                2
            }
        }
        Commands::Show { schedule } => {
            let schedule = JsonStorage::open(&schedule).load()?;
            print_schedule(&schedule);
            0
        }
    };

    std::process::exit(code);
}

fn print_schedule(schedule: &Schedule) {
    for e in &schedule.entries {
        let breaks: Vec<String> = e
            .breaks
            .iter()
            .map(|b| format!("{}-{}", hhmm::format(b.start), hhmm::format(b.end)))
            .collect();
        println!(
            "{} {:<9} | {:<7} | {:<10} | {} {} | {}-{} | {}",
            e.date,
            weekday_name(e.weekday),
            e.shift,
            e.role,
            e.employee_id,
            e.employee_name,
            hhmm::format(e.start),
            hhmm::format(e.end),
            breaks.join(" ")
        );
    }
    for h in &schedule.hours {
        println!(
            "{} {}: {} shift(s), {:.1} h",
            h.employee_id,
            h.employee_name,
            h.shifts,
            h.assigned_minutes as f64 / 60.0
        );
    }
}

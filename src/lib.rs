#![forbid(unsafe_code)]
//! Planning — affectation des équipes d'un magasin aux créneaux et aux rôles.
//!
//! - Roster CSV validé avant toute génération.
//! - Allocation gloutonne en une passe : jours × créneaux × rôles.
//! - Préférences (jours de repos, tâche préférée), compétences, budget d'heures hebdomadaire.
//! - Pauses posées à l'intérieur des créneaux, générateur aléatoire injectable.
//! - Export CSV/JSON ; pas de base de données.

pub mod io;
pub mod model;
pub mod params;
pub mod scheduler;
pub mod storage;

pub use model::{
    BreakType, BreakWindow, Employee, EmployeeId, HoursUsage, Role, Roster, Schedule,
    ScheduleEntry, ShiftKind, ShiftWindow, UnfilledSlot,
};
pub use params::{
    export_params_json, load_params_from_file, BreakPolicy, Horizon, ScheduleParams, TradingDay,
};
pub use scheduler::{
    available, detect_conflicts, plan_breaks, rng_for, select, select_shuffled, validate,
    validate_roster, Candidate, Conflict, ConflictKind, EmployeeRecord, InsufficientBreakWindow,
    ParamError, RosterError, RosterSheet, RunState, SchedError, Scheduler,
};
pub use storage::{JsonStorage, Storage};

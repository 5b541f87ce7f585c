use crate::model::{BreakType, Role};
use chrono::NaiveTime;
use thiserror::Error;

/// États du planificateur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    DataLoaded,
    Generating,
    Complete,
    Failed,
}

/// Roster refusé au chargement. `row` est la ligne de données (base 1).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RosterError {
    #[error("duplicate employee IDs: {}", .0.join(", "))]
    DuplicateId(Vec<String>),
    #[error("row {row}: missing value for {field}")]
    MissingField { row: usize, field: String },
    #[error("row {row}: invalid break type {value:?} (expected TYPE_A or TYPE_B)")]
    InvalidBreakType { row: usize, value: String },
    #[error("row {row}: role {role} is not a boolean flag: {value:?}")]
    InvalidRoleFlag {
        row: usize,
        role: String,
        value: String,
    },
    #[error("row {row}: invalid {field}: {value:?}")]
    InvalidField {
        row: usize,
        field: String,
        value: String,
    },
    #[error("missing required column: {0}")]
    MissingColumn(String),
    #[error("column declared more than once: {0}")]
    DuplicateColumn(String),
}

/// Paramètres de génération absents ou hors bornes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParamError {
    #[error("{field} out of range: {value} (expected {expected})")]
    OutOfRange {
        field: &'static str,
        value: i64,
        expected: &'static str,
    },
    #[error("closing time {closing} must be after opening time {opening}")]
    BusinessHours {
        opening: NaiveTime,
        closing: NaiveTime,
    },
    #[error("shift length of {minutes} min outside [{min}, {max}] min")]
    ShiftLength { minutes: i64, min: i64, max: i64 },
    #[error("headcount given for a role the roster does not declare: {0}")]
    UnknownRole(Role),
    #[error("total headcount per shift {total} exceeds the maximum of {max}")]
    TooManyEmployees { total: u32, max: u32 },
    #[error("schedule horizon runs past the supported calendar")]
    HorizonOverflow,
}

/// Fenêtre de pause trop courte pour le type de pause de l'employé.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("break window of {available_minutes} min too short for {break_type} ({required_minutes} min required)")]
pub struct InsufficientBreakWindow {
    pub break_type: BreakType,
    pub available_minutes: i64,
    pub required_minutes: i64,
}

#[derive(Error, Debug)]
pub enum SchedError {
    #[error("invalid roster: {0}")]
    InvalidRoster(#[from] RosterError),
    #[error("invalid parameters: {0}")]
    InvalidParameters(#[from] ParamError),
    #[error(transparent)]
    InsufficientBreakWindow(#[from] InsufficientBreakWindow),
    #[error("no roster loaded")]
    NotLoaded,
}

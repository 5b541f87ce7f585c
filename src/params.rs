use crate::model::{hhmm, Role, Roster, ShiftKind, ShiftWindow};
use crate::scheduler::ParamError;
use anyhow::{Context, Result};
use chrono::{Days, Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Durée minimale d'un créneau, en minutes.
pub const MIN_SHIFT_MINUTES: i64 = 4 * 60;
/// Durée maximale d'un créneau, en minutes.
pub const MAX_SHIFT_MINUTES: i64 = 12 * 60;
pub const DEFAULT_MAX_EMPLOYEES_PER_SHIFT: u32 = 10;

const MAX_HORIZON_DAYS: u32 = 3660;

/// Horizon de planification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Horizon {
    /// Jours calendaires consécutifs.
    Days(u32),
    /// Semaines ; seuls les `work_days_per_week` premiers jours de chaque semaine sont planifiés.
    Weeks(u32),
}

/// Conduite à tenir quand les pauses d'un employé ne tiennent pas dans le créneau.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakPolicy {
    /// L'affectation est écartée, le créneau reste incomplet.
    #[default]
    Skip,
    /// La génération échoue.
    Abort,
}

/// Jour planifié et index de sa période (semaine).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradingDay {
    pub date: NaiveDate,
    pub week: u32,
}

/// Paramètres d'une génération (fichier JSON ou construits en code).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleParams {
    pub weekly_hours: u32,
    /// Jours travaillés par semaine. Ne sert qu'avec `Horizon::Weeks` (jours planifiés
    /// de chaque semaine) ; avec `Horizon::Days`, seule la borne 1..=7 est contrôlée.
    pub work_days_per_week: u32,
    pub horizon: Horizon,
    /// Premier jour ; la date du jour si absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(with = "hhmm")]
    pub opening_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub closing_time: NaiveTime,
    /// Minutes après le début du créneau avant la première pause possible.
    pub break_start_offset_minutes: u32,
    /// Minutes avant la fin du créneau après lesquelles plus aucune pause n'est posée.
    pub break_end_offset_minutes: u32,
    #[serde(default)]
    pub headcount: BTreeMap<Role, u32>,
    #[serde(default)]
    pub break_policy: BreakPolicy,
    #[serde(default = "default_shuffle")]
    pub shuffle_selection: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default = "default_max_employees")]
    pub max_employees_per_shift: u32,
}

fn default_shuffle() -> bool {
    true
}

fn default_max_employees() -> u32 {
    DEFAULT_MAX_EMPLOYEES_PER_SHIFT
}

impl ScheduleParams {
    pub fn new(
        weekly_hours: u32,
        work_days_per_week: u32,
        horizon: Horizon,
        opening_time: NaiveTime,
        closing_time: NaiveTime,
    ) -> Self {
        Self {
            weekly_hours,
            work_days_per_week,
            horizon,
            start_date: None,
            opening_time,
            closing_time,
            break_start_offset_minutes: 45,
            break_end_offset_minutes: 45,
            headcount: BTreeMap::new(),
            break_policy: BreakPolicy::Skip,
            shuffle_selection: true,
            seed: None,
            max_employees_per_shift: DEFAULT_MAX_EMPLOYEES_PER_SHIFT,
        }
    }

    /// Valeurs par défaut du formulaire de saisie, un employé par rôle du roster.
    pub fn starter(roster: &Roster) -> Self {
        let mut params = Self::new(
            40,
            5,
            Horizon::Days(90),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
            NaiveTime::from_hms_opt(22, 0, 0).unwrap_or_default(),
        );
        params.headcount = roster.roles.iter().map(|r| (r.clone(), 1)).collect();
        params
    }

    pub fn starting(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn with_headcount<R: Into<Role>>(mut self, role: R, count: u32) -> Self {
        self.headcount.insert(role.into(), count);
        self
    }

    pub fn with_break_offsets(mut self, start_minutes: u32, end_minutes: u32) -> Self {
        self.break_start_offset_minutes = start_minutes;
        self.break_end_offset_minutes = end_minutes;
        self
    }

    pub fn with_break_policy(mut self, policy: BreakPolicy) -> Self {
        self.break_policy = policy;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Effectif demandé pour `role` ; 0 si non renseigné.
    pub fn headcount_for(&self, role: &Role) -> u32 {
        self.headcount.get(role).copied().unwrap_or(0)
    }

    pub fn weekly_minutes(&self) -> i64 {
        i64::from(self.weekly_hours) * 60
    }

    /// Vérifie les bornes indépendantes du roster.
    pub fn validate(&self) -> Result<(), ParamError> {
        if !(1..=168).contains(&self.weekly_hours) {
            return Err(ParamError::OutOfRange {
                field: "weekly_hours",
                value: i64::from(self.weekly_hours),
                expected: "1..=168",
            });
        }
        if !(1..=7).contains(&self.work_days_per_week) {
            return Err(ParamError::OutOfRange {
                field: "work_days_per_week",
                value: i64::from(self.work_days_per_week),
                expected: "1..=7",
            });
        }
        let (field, count, limit) = match self.horizon {
            Horizon::Days(n) => ("horizon.days", n, MAX_HORIZON_DAYS),
            Horizon::Weeks(n) => ("horizon.weeks", n, MAX_HORIZON_DAYS / 7),
        };
        if count == 0 || count > limit {
            return Err(ParamError::OutOfRange {
                field,
                value: i64::from(count),
                expected: "at least 1 and at most ten years",
            });
        }
        if self.closing_time <= self.opening_time {
            return Err(ParamError::BusinessHours {
                opening: self.opening_time,
                closing: self.closing_time,
            });
        }
        for window in self.shift_windows() {
            let minutes = window.duration_minutes();
            if !(MIN_SHIFT_MINUTES..=MAX_SHIFT_MINUTES).contains(&minutes) {
                return Err(ParamError::ShiftLength {
                    minutes,
                    min: MIN_SHIFT_MINUTES,
                    max: MAX_SHIFT_MINUTES,
                });
            }
        }
        if self.break_start_offset_minutes == 0 {
            return Err(ParamError::OutOfRange {
                field: "break_start_offset_minutes",
                value: 0,
                expected: "at least 1",
            });
        }
        if self.break_end_offset_minutes == 0 {
            return Err(ParamError::OutOfRange {
                field: "break_end_offset_minutes",
                value: 0,
                expected: "at least 1",
            });
        }
        let total: u32 = self.headcount.values().sum();
        if total > self.max_employees_per_shift {
            return Err(ParamError::TooManyEmployees {
                total,
                max: self.max_employees_per_shift,
            });
        }
        Ok(())
    }

    /// Vérifie que chaque rôle cité dans `headcount` existe dans le roster.
    pub fn validate_for(&self, roster: &Roster) -> Result<(), ParamError> {
        self.validate()?;
        match self.headcount.keys().find(|role| !roster.has_role(role)) {
            Some(role) => Err(ParamError::UnknownRole(role.clone())),
            None => Ok(()),
        }
    }

    /// Les heures d'ouverture coupées en deux créneaux égaux (le soir prend la minute impaire).
    pub fn shift_windows(&self) -> [ShiftWindow; 2] {
        let half = (self.closing_time - self.opening_time).num_minutes() / 2;
        let midday = self.opening_time + Duration::minutes(half);
        [
            ShiftWindow {
                kind: ShiftKind::Morning,
                start: self.opening_time,
                end: midday,
            },
            ShiftWindow {
                kind: ShiftKind::Evening,
                start: midday,
                end: self.closing_time,
            },
        ]
    }

    /// Jours à planifier à partir de `start`, dans l'ordre calendaire.
    pub fn trading_days(&self, start: NaiveDate) -> Result<Vec<TradingDay>, ParamError> {
        let offsets: Vec<u32> = match self.horizon {
            Horizon::Days(n) => (0..n).collect(),
            Horizon::Weeks(n) => {
                let per_week = self.work_days_per_week;
                (0..n)
                    .flat_map(|week| (0..per_week).map(move |day| week * 7 + day))
                    .collect()
            }
        };
        offsets
            .into_iter()
            .map(|offset| {
                let date = start
                    .checked_add_days(Days::new(u64::from(offset)))
                    .ok_or(ParamError::HorizonOverflow)?;
                Ok(TradingDay {
                    date,
                    week: offset / 7,
                })
            })
            .collect()
    }
}

pub fn load_params_from_file<P: AsRef<Path>>(path: P) -> Result<ScheduleParams> {
    let path = path.as_ref();
    let data = fs::read(path).with_context(|| format!("reading params {}", path.display()))?;
    let params: ScheduleParams = serde_json::from_slice(&data)
        .with_context(|| format!("parsing params {}", path.display()))?;
    params.validate()?;
    Ok(params)
}

pub fn export_params_json<P: AsRef<Path>>(path: P, params: &ScheduleParams) -> Result<()> {
    let json = serde_json::to_string_pretty(params)?;
    fs::write(path, json)?;
    Ok(())
}

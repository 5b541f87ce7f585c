//! Contrôle d'intégrité du roster avant toute planification.
//!
//! Ordre des contrôles : identifiants dupliqués, champs manquants, codes de pause,
//! drapeaux de rôle, puis format des autres champs. La première erreur interrompt
//! le chargement ; aucune réparation partielle n'est tentée.

use super::RosterError;
use crate::model::{BreakType, Employee, EmployeeId, Role, Roster};
use chrono::Weekday;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Noms de colonnes reconnus dans un roster tabulaire.
pub mod columns {
    pub const ID: &str = "ID";
    pub const NAME: &str = "Name";
    pub const BREAK_TYPE: &str = "BreakType";
    pub const SKILL_RATING: &str = "SkillRating";
    pub const PREFERRED_TASK: &str = "PreferredTask";
    pub const DAYS_OFF: [&str; 3] = ["PreferredDayOff1", "PreferredDayOff2", "PreferredDayOff3"];
    /// Colonne informative, jamais interprétée comme un rôle.
    pub const STATUS: &str = "Status";

    pub const REQUIRED: [&str; 5] = [ID, NAME, BREAK_TYPE, SKILL_RATING, PREFERRED_TASK];

    /// Vrai si `header` n'est pas une colonne de rôle.
    pub fn is_reserved(header: &str) -> bool {
        REQUIRED.contains(&header) || DAYS_OFF.contains(&header) || header == STATUS
    }
}

/// Ligne brute telle que fournie par la source du roster.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeRecord {
    /// Ligne de données (base 1).
    pub row: usize,
    pub id: Option<String>,
    pub name: Option<String>,
    pub break_type: Option<String>,
    pub skill_rating: Option<String>,
    pub preferred_task: Option<String>,
    /// Jusqu'à trois jours de repos souhaités ; vide = pas de préférence.
    pub days_off: Vec<Option<String>>,
    pub role_flags: BTreeMap<Role, Option<String>>,
}

/// Roster non validé : rôles déclarés et lignes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterSheet {
    pub roles: Vec<Role>,
    pub records: Vec<EmployeeRecord>,
}

/// Valide un roster brut et le convertit en [`Roster`] typé.
pub fn validate(sheet: &RosterSheet) -> Result<Roster, RosterError> {
    check_roles(&sheet.roles)?;
    check_duplicates(sheet)?;
    check_missing(sheet)?;
    let break_types = parse_break_types(sheet)?;
    let flags = parse_role_flags(sheet)?;

    let mut employees = Vec::with_capacity(sheet.records.len());
    for ((rec, break_type), roles) in sheet.records.iter().zip(break_types).zip(flags) {
        employees.push(build_employee(rec, break_type, roles)?);
    }

    Ok(Roster {
        roles: sheet.roles.clone(),
        employees,
    })
}

/// Contrôle un roster déjà typé (construit en code ou désérialisé).
pub fn validate_roster(roster: &Roster) -> Result<(), RosterError> {
    check_roles(&roster.roles)?;
    let mut seen = HashSet::new();
    let dups: BTreeSet<String> = roster
        .employees
        .iter()
        .filter(|e| !seen.insert(e.id))
        .map(|e| e.id.to_string())
        .collect();
    if !dups.is_empty() {
        return Err(RosterError::DuplicateId(dups.into_iter().collect()));
    }

    for (idx, employee) in roster.employees.iter().enumerate() {
        let row = idx + 1;
        if let Some(role) = employee.roles.iter().find(|r| !roster.has_role(r)) {
            return Err(RosterError::InvalidRoleFlag {
                row,
                role: role.to_string(),
                value: "true".to_string(),
            });
        }
        if employee.days_off.len() > columns::DAYS_OFF.len() {
            return Err(RosterError::InvalidField {
                row,
                field: "days_off".to_string(),
                value: employee.days_off.len().to_string(),
            });
        }
        if !employee.skill_rating.is_finite() {
            return Err(RosterError::InvalidField {
                row,
                field: columns::SKILL_RATING.to_string(),
                value: employee.skill_rating.to_string(),
            });
        }
    }
    Ok(())
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Un rôle déclaré deux fois serait servi deux fois par créneau.
fn check_roles(roles: &[Role]) -> Result<(), RosterError> {
    let mut seen = HashSet::new();
    match roles.iter().find(|role| !seen.insert(*role)) {
        Some(role) => Err(RosterError::DuplicateColumn(role.to_string())),
        None => Ok(()),
    }
}

fn normalize_id(raw: &str) -> String {
    raw.parse::<u32>()
        .map(|n| n.to_string())
        .unwrap_or_else(|_| raw.to_string())
}

fn check_duplicates(sheet: &RosterSheet) -> Result<(), RosterError> {
    let mut seen = HashSet::new();
    let mut dups = BTreeSet::new();
    for raw in sheet.records.iter().filter_map(|rec| present(&rec.id)) {
        let key = normalize_id(raw);
        if !seen.insert(key.clone()) {
            dups.insert(key);
        }
    }
    if dups.is_empty() {
        Ok(())
    } else {
        Err(RosterError::DuplicateId(dups.into_iter().collect()))
    }
}

fn check_missing(sheet: &RosterSheet) -> Result<(), RosterError> {
    for rec in &sheet.records {
        let fixed = [
            (columns::ID, &rec.id),
            (columns::NAME, &rec.name),
            (columns::BREAK_TYPE, &rec.break_type),
            (columns::SKILL_RATING, &rec.skill_rating),
            (columns::PREFERRED_TASK, &rec.preferred_task),
        ];
        if let Some((field, _)) = fixed.iter().find(|(_, v)| present(v).is_none()) {
            return Err(RosterError::MissingField {
                row: rec.row,
                field: (*field).to_string(),
            });
        }
        for role in &sheet.roles {
            if rec.role_flags.get(role).and_then(present).is_none() {
                return Err(RosterError::MissingField {
                    row: rec.row,
                    field: role.to_string(),
                });
            }
        }
    }
    Ok(())
}

fn parse_break_types(sheet: &RosterSheet) -> Result<Vec<BreakType>, RosterError> {
    sheet
        .records
        .iter()
        .map(|rec| {
            let raw = present(&rec.break_type).unwrap_or_default();
            BreakType::parse(raw).ok_or_else(|| RosterError::InvalidBreakType {
                row: rec.row,
                value: raw.to_string(),
            })
        })
        .collect()
}

fn parse_role_flags(sheet: &RosterSheet) -> Result<Vec<BTreeSet<Role>>, RosterError> {
    let mut out = Vec::with_capacity(sheet.records.len());
    for rec in &sheet.records {
        let mut roles = BTreeSet::new();
        for role in &sheet.roles {
            let raw = rec.role_flags.get(role).and_then(present).unwrap_or_default();
            match parse_bool(raw) {
                Some(true) => {
                    roles.insert(role.clone());
                }
                Some(false) => {}
                None => {
                    return Err(RosterError::InvalidRoleFlag {
                        row: rec.row,
                        role: role.to_string(),
                        value: raw.to_string(),
                    })
                }
            }
        }
        out.push(roles);
    }
    Ok(out)
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" | "oui" => Some(true),
        "false" | "0" | "no" | "n" | "non" => Some(false),
        _ => None,
    }
}

fn build_employee(
    rec: &EmployeeRecord,
    break_type: BreakType,
    roles: BTreeSet<Role>,
) -> Result<Employee, RosterError> {
    let invalid = |field: &str, value: &str| RosterError::InvalidField {
        row: rec.row,
        field: field.to_string(),
        value: value.to_string(),
    };

    let raw_id = present(&rec.id).unwrap_or_default();
    let id = raw_id
        .parse::<u32>()
        .map_err(|_| invalid(columns::ID, raw_id))?;

    let raw_skill = present(&rec.skill_rating).unwrap_or_default();
    let skill_rating = raw_skill
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| invalid(columns::SKILL_RATING, raw_skill))?;

    let mut days_off: Vec<Weekday> = Vec::new();
    for (column, value) in columns::DAYS_OFF.iter().zip(&rec.days_off) {
        let Some(raw) = present(value) else { continue };
        if matches!(raw.to_ascii_lowercase().as_str(), "none" | "-") {
            continue;
        }
        let day = raw
            .parse::<Weekday>()
            .map_err(|_| invalid(*column, raw))?;
        if !days_off.contains(&day) {
            days_off.push(day);
        }
    }

    Ok(Employee {
        id: EmployeeId::new(id),
        name: present(&rec.name).unwrap_or_default().to_string(),
        roles,
        break_type,
        days_off,
        skill_rating,
        preferred_task: Role::new(present(&rec.preferred_task).unwrap_or_default()),
    })
}

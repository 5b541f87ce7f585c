use chrono::{NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

/// Identifiant fort pour Employee
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EmployeeId(u32);

impl EmployeeId {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Rôle / tâche tenu pendant un créneau (Cashier, Manager, Stock...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().trim().to_owned())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Role {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// Code de pause d'un employé.
///
/// - `TypeA` : une pause longue (45 min) puis une courte (15 min).
/// - `TypeB` : une pause moyenne (30 min) puis deux courtes (15 min).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BreakType {
    #[serde(rename = "TYPE_A")]
    TypeA,
    #[serde(rename = "TYPE_B")]
    TypeB,
}

impl BreakType {
    /// Accepte `1`/`A`/`TYPE_A` et `2`/`B`/`TYPE_B` (casse ignorée).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "1" | "A" | "TYPE_A" => Some(Self::TypeA),
            "2" | "B" | "TYPE_B" => Some(Self::TypeB),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::TypeA => "TYPE_A",
            Self::TypeB => "TYPE_B",
        }
    }

    /// Pauses sous forme `(décalage, durée)` en minutes depuis le début de la première.
    pub fn pattern(self) -> &'static [(i64, i64)] {
        match self {
            Self::TypeA => &[(0, 45), (60, 15)],
            Self::TypeB => &[(0, 30), (30, 15), (45, 15)],
        }
    }

    /// Durée minimale de fenêtre nécessaire pour poser toutes les pauses.
    pub fn span_minutes(self) -> i64 {
        self.pattern()
            .iter()
            .map(|(offset, len)| offset + len)
            .max()
            .unwrap_or(0)
    }
}

impl fmt::Display for BreakType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Employé tel que chargé depuis le roster (après validation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    /// Rôles pour lesquels le drapeau d'éligibilité est vrai.
    #[serde(default)]
    pub roles: BTreeSet<Role>,
    pub break_type: BreakType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub days_off: Vec<Weekday>,
    #[serde(default)]
    pub skill_rating: f64,
    pub preferred_task: Role,
}

impl Employee {
    pub fn new<N: Into<String>>(id: u32, name: N, break_type: BreakType) -> Self {
        Self {
            id: EmployeeId::new(id),
            name: name.into(),
            roles: BTreeSet::new(),
            break_type,
            days_off: Vec::new(),
            skill_rating: 0.0,
            preferred_task: Role::new(""),
        }
    }

    pub fn with_role<R: Into<Role>>(mut self, role: R) -> Self {
        self.roles.insert(role.into());
        self
    }

    pub fn with_day_off(mut self, day: Weekday) -> Self {
        self.days_off.push(day);
        self
    }

    pub fn with_skill(mut self, rating: f64) -> Self {
        self.skill_rating = rating;
        self
    }

    pub fn preferring<R: Into<Role>>(mut self, role: R) -> Self {
        self.preferred_task = role.into();
        self
    }

    pub fn can_fill(&self, role: &Role) -> bool {
        self.roles.contains(role)
    }

    pub fn is_off(&self, day: Weekday) -> bool {
        self.days_off.contains(&day)
    }

    pub fn prefers(&self, role: &Role) -> bool {
        &self.preferred_task == role
    }
}

/// Roster complet : rôles déclarés (ordre des colonnes) et employés (ordre du fichier).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Roster {
    pub roles: Vec<Role>,
    pub employees: Vec<Employee>,
}

impl Roster {
    pub fn new<I, R>(roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<Role>,
    {
        Self {
            roles: roles.into_iter().map(Into::into).collect(),
            employees: Vec::new(),
        }
    }

    pub fn with_employee(mut self, employee: Employee) -> Self {
        self.employees.push(employee);
        self
    }

    pub fn has_role(&self, role: &Role) -> bool {
        self.roles.contains(role)
    }

    pub fn find_employee(&self, id: EmployeeId) -> Option<&Employee> {
        self.employees.iter().find(|e| e.id == id)
    }
}

/// Demi-journée d'ouverture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShiftKind {
    Morning,
    Evening,
}

impl ShiftKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Morning => "Morning",
            Self::Evening => "Evening",
        }
    }
}

impl fmt::Display for ShiftKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// Créneau horaire d'une journée `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftWindow {
    pub kind: ShiftKind,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl ShiftWindow {
    /// Durée en minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// Pause posée à l'intérieur d'un créneau.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakWindow {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

impl BreakWindow {
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    pub fn overlaps(&self, other: &BreakWindow) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Ligne du planning : une affectation (jour, créneau, rôle, employé).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub date: NaiveDate,
    pub weekday: Weekday,
    /// Index de la période (semaine) dans l'horizon, base 0.
    pub week: u32,
    pub shift: ShiftKind,
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub role: Role,
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
    pub breaks: Vec<BreakWindow>,
}

impl ScheduleEntry {
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// Créneau/rôle resté incomplet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnfilledSlot {
    pub date: NaiveDate,
    pub shift: ShiftKind,
    pub role: Role,
    pub requested: u32,
    pub filled: u32,
    /// Affectations écartées faute de fenêtre de pause suffisante.
    #[serde(default)]
    pub skipped_for_breaks: u32,
}

/// Heures affectées à un employé sur l'ensemble du run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoursUsage {
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub assigned_minutes: i64,
    pub shifts: u32,
}

/// Résultat d'une génération.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub run_id: Uuid,
    pub entries: Vec<ScheduleEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unfilled: Vec<UnfilledSlot>,
    #[serde(default)]
    pub hours: Vec<HoursUsage>,
}

impl Schedule {
    /// Vrai si tous les effectifs demandés ont été pourvus.
    pub fn is_complete(&self) -> bool {
        self.unfilled.is_empty()
    }

    pub fn entries_for(&self, id: EmployeeId) -> impl Iterator<Item = &ScheduleEntry> + '_ {
        self.entries.iter().filter(move |e| e.employee_id == id)
    }
}

/// Nom complet du jour, tel qu'attendu dans les colonnes `PreferredDayOff*`.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// (Dé)sérialisation `HH:MM` des heures.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&time.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    /// `HH:MM`, secondes tolérées.
    pub fn parse(raw: &str) -> Result<NaiveTime, chrono::ParseError> {
        let raw = raw.trim();
        NaiveTime::parse_from_str(raw, FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
    }

    pub fn format(time: NaiveTime) -> String {
        time.format(FORMAT).to_string()
    }
}

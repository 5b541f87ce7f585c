use crate::model::{hhmm, weekday_name, Role, Schedule};
use crate::scheduler::{columns, EmployeeRecord, RosterError, RosterSheet};
use anyhow::{bail, Context};
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

/// Taille maximale d'un roster importé.
pub const MAX_ROSTER_BYTES: u64 = 10 * 1024 * 1024;

/// Import du roster depuis un fichier `.csv`.
///
/// Colonnes `ID,Name,BreakType,SkillRating,PreferredTask` obligatoires,
/// `PreferredDayOff1..3` et `Status` optionnelles ; toute autre colonne est un rôle.
pub fn import_roster_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<RosterSheet> {
    let path = path.as_ref();
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if !is_csv {
        bail!("roster must be a .csv file: {}", path.display());
    }
    let size = fs::metadata(path)
        .with_context(|| format!("reading {}", path.display()))?
        .len();
    if size > MAX_ROSTER_BYTES {
        bail!("roster file too large ({size} bytes, max {MAX_ROSTER_BYTES})");
    }
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    read_roster_csv(file).with_context(|| format!("importing roster {}", path.display()))
}

/// Lecture d'un roster CSV depuis n'importe quelle source.
pub fn read_roster_csv<R: Read>(reader: R) -> anyhow::Result<RosterSheet> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let index: HashMap<&str, usize> = headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (name, idx))
        .collect();
    let mut seen = HashSet::new();
    if let Some(dup) = headers
        .iter()
        .filter(|name| !name.is_empty())
        .find(|name| !seen.insert(*name))
    {
        return Err(RosterError::DuplicateColumn(dup.to_string()).into());
    }
    if let Some(missing) = columns::REQUIRED.iter().find(|c| !index.contains_key(*c)) {
        return Err(RosterError::MissingColumn((*missing).to_string()).into());
    }

    let roles: Vec<(Role, usize)> = headers
        .iter()
        .enumerate()
        .filter(|(_, name)| !name.is_empty() && !columns::is_reserved(name))
        .map(|(idx, name)| (Role::new(name), idx))
        .collect();

    let mut sheet = RosterSheet {
        roles: roles.iter().map(|(role, _)| role.clone()).collect(),
        records: Vec::new(),
    };

    for (row, rec) in rdr.records().enumerate() {
        let rec = rec?;
        let field = |column: &str| index.get(column).and_then(|idx| cell(&rec, *idx));
        sheet.records.push(EmployeeRecord {
            row: row + 1,
            id: field(columns::ID),
            name: field(columns::NAME),
            break_type: field(columns::BREAK_TYPE),
            skill_rating: field(columns::SKILL_RATING),
            preferred_task: field(columns::PREFERRED_TASK),
            days_off: columns::DAYS_OFF.iter().map(|c| field(*c)).collect(),
            role_flags: roles
                .iter()
                .map(|(role, idx)| (role.clone(), cell(&rec, *idx)))
                .collect(),
        });
    }
    Ok(sheet)
}

fn cell(rec: &StringRecord, idx: usize) -> Option<String> {
    rec.get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

const SCHEDULE_HEADER: [&str; 15] = [
    "Date",
    "Weekday",
    "Week",
    "Shift",
    "EmployeeID",
    "EmployeeName",
    "Role",
    "StartTime",
    "EndTime",
    "Break1Start",
    "Break1End",
    "Break2Start",
    "Break2End",
    "Break3Start",
    "Break3End",
];

/// Export CSV du planning, une ligne par affectation.
pub fn export_schedule_csv<P: AsRef<Path>>(path: P, schedule: &Schedule) -> anyhow::Result<()> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_schedule_csv(file, schedule)
}

pub fn write_schedule_csv<W: Write>(writer: W, schedule: &Schedule) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_writer(writer);
    w.write_record(SCHEDULE_HEADER)?;

    let mut week_buf = itoa::Buffer::new();
    let mut id_buf = itoa::Buffer::new();
    for e in &schedule.entries {
        let date = e.date.format("%Y-%m-%d").to_string();
        let mut breaks: Vec<String> = e
            .breaks
            .iter()
            .flat_map(|b| [hhmm::format(b.start), hhmm::format(b.end)])
            .collect();
        breaks.resize(6, String::new());
        let start = hhmm::format(e.start);
        let end = hhmm::format(e.end);

        let mut record = vec![
            date.as_str(),
            weekday_name(e.weekday),
            week_buf.format(e.week),
            e.shift.label(),
            id_buf.format(e.employee_id.get()),
            e.employee_name.as_str(),
            e.role.as_str(),
            start.as_str(),
            end.as_str(),
        ];
        record.extend(breaks.iter().map(String::as_str));
        w.write_record(&record)?;
    }
    w.flush()?;
    Ok(())
}

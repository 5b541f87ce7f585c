use crate::model::Schedule;
use anyhow::Context;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Support de persistance d'un planning généré (relu par `check` et `show`).
pub trait Storage {
    fn load(&self) -> anyhow::Result<Schedule>;
    /// Écrit le planning complet ; un lecteur concurrent voit l'ancien ou le nouveau, jamais un mélange.
    fn save(&self, schedule: &Schedule) -> anyhow::Result<()>;
}

/// Planning sérialisé en JSON indenté, un fichier par run.
pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Répertoire du fichier temporaire : celui de la cible, pour que le renommage reste local.
    fn staging_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

impl Storage for JsonStorage {
    fn load(&self) -> anyhow::Result<Schedule> {
        let file = File::open(&self.path)
            .with_context(|| format!("opening schedule {}", self.path.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("decoding schedule {}", self.path.display()))
    }

    fn save(&self, schedule: &Schedule) -> anyhow::Result<()> {
        let staged = NamedTempFile::new_in(self.staging_dir())
            .with_context(|| format!("staging schedule in {}", self.staging_dir().display()))?;
        {
            let mut out = BufWriter::new(staged.as_file());
            serde_json::to_writer_pretty(&mut out, schedule)?;
            out.flush()?;
        }
        staged.as_file().sync_all()?;
        staged
            .persist(&self.path)
            .with_context(|| format!("replacing schedule {}", self.path.display()))?;
        Ok(())
    }
}

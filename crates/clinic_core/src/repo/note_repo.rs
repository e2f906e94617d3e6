//! Per-patient note store.
//!
//! # Responsibility
//! - Hold one patient's notes in insertion order with autoincrement codes.
//! - Persist the whole per-patient file after every mutation when attached.
//!
//! # Invariants
//! - Codes are strictly increasing and never reused: the next code is one
//!   plus the highest code ever observed, not the survivor count.
//! - Deletion never renumbers surviving notes.
//! - A detached store never touches the filesystem; durability is decided
//!   at construction and cannot be changed per operation.

use crate::codec::json;
use crate::model::note::Note;
use crate::model::patient::Phn;
use crate::repo::StoreResult;
use log::{debug, info};
use std::path::{Path, PathBuf};

/// File-backed (or memory-only) collection of one patient's notes.
#[derive(Debug, Clone)]
pub struct NoteStore {
    phn: Phn,
    notes: Vec<Note>,
    autocounter: u64,
    /// Records directory when durable; `None` keeps the store memory-only.
    backing: Option<PathBuf>,
}

impl NoteStore {
    /// Creates an empty memory-only store; the counter starts at 1.
    pub fn detached(phn: Phn) -> Self {
        Self {
            phn,
            notes: Vec::new(),
            autocounter: 1,
            backing: None,
        }
    }

    /// Rebuilds a memory-only store around already-decoded notes.
    pub(crate) fn preloaded(phn: Phn, notes: Vec<Note>) -> Self {
        let autocounter = next_code(&notes);
        Self {
            phn,
            notes,
            autocounter,
            backing: None,
        }
    }

    /// Opens the durable store for `phn`, loading its file under
    /// `records_dir`.
    ///
    /// A missing or empty file yields an empty store with the counter at 1.
    pub fn attached(phn: Phn, records_dir: &Path) -> StoreResult<Self> {
        let notes = load_notes(phn, records_dir)?;
        let autocounter = next_code(&notes);
        debug!(
            "event=notes_load module=note_store status=ok phn={phn} count={} next_code={autocounter}",
            notes.len()
        );
        Ok(Self {
            phn,
            notes,
            autocounter,
            backing: Some(records_dir.to_path_buf()),
        })
    }

    /// Re-points the store at a new health number after a rekey.
    ///
    /// Notes and counter survive; the next persist targets the file named
    /// by the new key.
    pub(crate) fn rebind(&mut self, new_phn: Phn) {
        self.phn = new_phn;
    }

    /// Appends a new note under the next code and returns a copy of it.
    pub fn create(&mut self, text: &str) -> StoreResult<Note> {
        let note = Note::new(self.autocounter, text);
        self.autocounter += 1;
        self.notes.push(note.clone());
        self.persist()?;
        info!(
            "event=note_create module=note_store status=ok phn={} code={}",
            self.phn, note.code
        );
        Ok(note)
    }

    /// Finds a note by code; absence is a normal outcome.
    pub fn search(&self, code: u64) -> Option<Note> {
        self.notes.iter().find(|note| note.code == code).cloned()
    }

    /// Returns every note whose text contains `text`, in store order.
    ///
    /// The match is case-sensitive.
    pub fn search_by_text(&self, text: &str) -> Vec<Note> {
        self.notes
            .iter()
            .filter(|note| note.text.contains(text))
            .cloned()
            .collect()
    }

    /// Replaces the text of the note under `code` and refreshes its
    /// timestamp. Returns `false` when no such note exists.
    pub fn update(&mut self, code: u64, new_text: &str) -> StoreResult<bool> {
        let Some(note) = self.notes.iter_mut().find(|note| note.code == code) else {
            return Ok(false);
        };
        note.update_text(new_text);
        self.persist()?;
        Ok(true)
    }

    /// Removes the note under `code`. Returns `false` when no such note
    /// exists; surviving notes keep their codes.
    pub fn delete(&mut self, code: u64) -> StoreResult<bool> {
        let before = self.notes.len();
        self.notes.retain(|note| note.code != code);
        if self.notes.len() == before {
            return Ok(false);
        }
        self.persist()?;
        info!(
            "event=note_delete module=note_store status=ok phn={} code={code}",
            self.phn
        );
        Ok(true)
    }

    /// All notes, newest-added first.
    ///
    /// The reverse-insertion order is a presentation contract; storage keeps
    /// insertion order.
    pub fn list_all(&self) -> Vec<Note> {
        self.notes.iter().rev().cloned().collect()
    }

    /// Notes in insertion order, as held in memory.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    fn persist(&self) -> StoreResult<()> {
        let Some(records_dir) = &self.backing else {
            return Ok(());
        };
        std::fs::create_dir_all(records_dir)?;
        let encoded = json::encode_notes(&self.notes)?;
        std::fs::write(note_file_path(self.phn, records_dir), encoded)?;
        Ok(())
    }
}

fn load_notes(phn: Phn, records_dir: &Path) -> StoreResult<Vec<Note>> {
    let path = note_file_path(phn, records_dir);
    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err.into()),
    };
    if contents.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(json::decode_notes(&contents)?)
}

fn note_file_path(phn: Phn, records_dir: &Path) -> PathBuf {
    records_dir.join(format!("{phn}.json"))
}

fn next_code(notes: &[Note]) -> u64 {
    notes.iter().map(|note| note.code).max().unwrap_or(0) + 1
}

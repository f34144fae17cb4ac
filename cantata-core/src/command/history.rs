//! Undo/redo history and macro grouping.

use std::collections::VecDeque;

use cantata_types::Event;

use super::change::{apply_change, resolve, Change};
use super::Command;
use crate::error::DomainError;
use crate::project::Project;

/// One undoable step: a single command, or a macro of several.
#[derive(Debug, Clone)]
struct HistoryEntry {
    description: String,
    changes: Vec<Change>,
    /// Id counter values around the step. Undo restores `counters_before`
    /// and redo restores `counters_after`, so a snapshot taken before an
    /// edit round-trips exactly, counters included.
    counters_before: (u32, u32, u32),
    counters_after: (u32, u32, u32),
}

#[derive(Debug, Clone)]
struct MacroRecorder {
    description: String,
    changes: Vec<Change>,
    /// Set by the first command the macro executes.
    counters_before: Option<(u32, u32, u32)>,
    counters_after: Option<(u32, u32, u32)>,
}

/// Executes commands against a project and keeps the undo/redo stacks.
///
/// Undo replays each recorded change inverted, in reverse order; redo
/// replays them forward. Changes carry concrete ids and old values, so
/// replaying never re-validates or re-allocates, and an undo/redo round
/// trip reproduces the project state exactly.
#[derive(Debug)]
pub struct CommandManager {
    undo_stack: VecDeque<HistoryEntry>,
    redo_stack: VecDeque<HistoryEntry>,
    max_depth: usize,
    open_macro: Option<MacroRecorder>,
}

impl CommandManager {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            max_depth,
            open_macro: None,
        }
    }

    /// Validate and apply a command, recording it for undo. Any edit
    /// invalidates the redo stack.
    pub fn execute(
        &mut self,
        project: &mut Project,
        command: Command,
    ) -> Result<Vec<Event>, DomainError> {
        let counters_before = project.id_counters();
        let change = resolve(project, &command)?;
        let events = apply_change(project, &change)?;
        let counters_after = project.id_counters();
        self.redo_stack.clear();
        match &mut self.open_macro {
            Some(recorder) => {
                recorder.counters_before.get_or_insert(counters_before);
                recorder.counters_after = Some(counters_after);
                recorder.changes.push(change);
            }
            None => self.push_entry(HistoryEntry {
                description: command.description(),
                changes: vec![change],
                counters_before,
                counters_after,
            }),
        }
        Ok(events)
    }

    /// Start grouping subsequent commands into one undoable step.
    pub fn begin_macro(&mut self, description: impl Into<String>) -> Result<(), DomainError> {
        if self.open_macro.is_some() {
            return Err(DomainError::MacroInProgress);
        }
        self.open_macro = Some(MacroRecorder {
            description: description.into(),
            changes: Vec::new(),
            counters_before: None,
            counters_after: None,
        });
        Ok(())
    }

    /// Close the open macro and record it. A macro that executed no
    /// commands leaves no history entry.
    pub fn end_macro(&mut self) -> Result<(), DomainError> {
        let recorder = self
            .open_macro
            .take()
            .ok_or_else(|| DomainError::validation("no macro in progress"))?;
        if let (Some(counters_before), Some(counters_after)) =
            (recorder.counters_before, recorder.counters_after)
        {
            self.push_entry(HistoryEntry {
                description: recorder.description,
                changes: recorder.changes,
                counters_before,
                counters_after,
            });
        }
        Ok(())
    }

    /// Abort the open macro, rolling back everything it executed.
    /// Nothing is recorded.
    pub fn cancel_macro(&mut self, project: &mut Project) -> Result<Vec<Event>, DomainError> {
        let recorder = self
            .open_macro
            .take()
            .ok_or_else(|| DomainError::validation("no macro in progress"))?;
        let mut events = Vec::new();
        for change in recorder.changes.iter().rev() {
            events.extend(apply_change(project, &change.invert())?);
        }
        if let Some(counters) = recorder.counters_before {
            project.restore_id_counters(counters);
        }
        Ok(events)
    }

    pub fn undo(&mut self, project: &mut Project) -> Result<Vec<Event>, DomainError> {
        if self.open_macro.is_some() {
            return Err(DomainError::MacroInProgress);
        }
        let entry = self.undo_stack.pop_back().ok_or(DomainError::EmptyHistory)?;
        let mut events = Vec::new();
        for change in entry.changes.iter().rev() {
            events.extend(apply_change(project, &change.invert())?);
        }
        project.restore_id_counters(entry.counters_before);
        self.redo_stack.push_back(entry);
        Ok(events)
    }

    pub fn redo(&mut self, project: &mut Project) -> Result<Vec<Event>, DomainError> {
        if self.open_macro.is_some() {
            return Err(DomainError::MacroInProgress);
        }
        let entry = self.redo_stack.pop_back().ok_or(DomainError::EmptyHistory)?;
        let mut events = Vec::new();
        for change in &entry.changes {
            events.extend(apply_change(project, change)?);
        }
        project.restore_id_counters(entry.counters_after);
        self.undo_stack.push_back(entry);
        Ok(events)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn macro_in_progress(&self) -> bool {
        self.open_macro.is_some()
    }

    /// Descriptions of the undoable steps, oldest first.
    pub fn undo_descriptions(&self) -> Vec<&str> {
        self.undo_stack
            .iter()
            .map(|e| e.description.as_str())
            .collect()
    }

    fn push_entry(&mut self, entry: HistoryEntry) {
        self.undo_stack.push_back(entry);
        while self.undo_stack.len() > self.max_depth {
            self.undo_stack.pop_front();
        }
    }
}

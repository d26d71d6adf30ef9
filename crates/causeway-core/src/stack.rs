//! Ordered navigation history and its mutation rules.
//!
//! `NavStack` owns the record sequence and the state bookkeeping for
//! insertions and removals. It never animates anything: it assigns the
//! init-enter/init-leave roles and leaves driving them to the transition
//! pipeline, so inserting or removing at arbitrary history positions only
//! ever animates the boundary between the new active view and its
//! predecessor.

use crate::{ViewRecord, ViewState};

/// Ordered sequence of view records. Index 0 is the root (oldest) entry.
pub struct NavStack {
    id: u64,
    views: Vec<ViewRecord>,
    next_view_id: u64,
}

impl NavStack {
    /// `id` identifies the owning navigation host; records carry it so a
    /// record can belong to at most one stack at a time.
    pub fn new(id: u64) -> Self {
        Self {
            id,
            views: Vec::new(),
            next_view_id: 0,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn views(&self) -> &[ViewRecord] {
        &self.views
    }

    /// Inserts `records` at `index` (clamped to the current length, so an
    /// out-of-range index appends). Demotes whichever record currently holds
    /// the enter role: an `Active` record becomes `InitLeave`, and a queued
    /// `InitEnter` that never started is superseded back to `Inactive`.
    /// The last inserted record is promoted to `InitEnter` and returned.
    pub fn insert(&mut self, index: usize, records: Vec<ViewRecord>) -> Option<ViewRecord> {
        if records.is_empty() {
            return None;
        }
        let index = index.min(self.views.len());

        if let Some(active) = self.get_active() {
            active.set_state(ViewState::InitLeave);
        } else if let Some(queued) = self.get_by_state(ViewState::InitEnter) {
            // A transition was queued but never started; it is about to be
            // superseded, so keep it in history without entering.
            queued.set_state(ViewState::Inactive);
        }

        let mut promoted = None;
        for (offset, record) in records.into_iter().enumerate() {
            record.set_nav(self.id);
            record.set_state(ViewState::Inactive);
            self.next_view_id += 1;
            record.set_id(self.next_view_id);
            self.views.insert(index + offset, record.clone());
            promoted = Some(record);
        }

        if let Some(record) = &promoted {
            record.set_state(ViewState::InitEnter);
        }
        promoted
    }

    /// Marks `count` records from `start` for removal and reconciles the
    /// stack's enter/leave roles. Records caught mid-transition finish their
    /// visible transition first (`RemoveAfterTrans`); every other marked
    /// record that no animation will reference is finalized and evicted
    /// synchronously. Returns the record that must animate out, if any.
    pub fn remove_range(&mut self, start: usize, count: usize) -> Option<ViewRecord> {
        let (leaving, doomed) = self.mark_removals(start, count);
        for view in doomed {
            view.will_leave();
            view.did_leave();
            view.did_unload();
            self.evict(&view);
            view.destroy();
        }
        leaving
    }

    /// State-only half of [`NavStack::remove_range`]: marks and reconciles,
    /// but leaves finalization of plain `Remove` records to the caller so
    /// lifecycle hooks can run without the stack borrowed.
    pub fn mark_removals(&mut self, start: usize, count: usize) -> (Option<ViewRecord>, Vec<ViewRecord>) {
        for i in start..start.saturating_add(count) {
            let Some(view) = self.get_by_index(i) else {
                break;
            };
            if view.state().mid_transition() {
                view.set_state(ViewState::RemoveAfterTrans);
            } else {
                view.set_state(ViewState::Remove);
            }
        }

        if let Some(leaving) = self.get_by_state(ViewState::InitLeave) {
            // A leave is already queued; whatever was queued to enter is
            // superseded, and the nearest earlier inactive record becomes
            // the view to show once the leave completes.
            if let Some(queued) = self.get_by_state(ViewState::InitEnter) {
                queued.set_state(ViewState::Inactive);
            }
            self.promote_preceding_inactive(&leaving);
        } else if let Some(leaving) = self.get_by_state(ViewState::TransLeave) {
            // A transition is playing but removal still needs a valid next
            // active view once it settles.
            log::debug!("removal raced a playing transition; forcing {:?} active", leaving.page());
            leaving.set_state(ViewState::ForceActive);
        } else if let Some(top_removed) = self.get_by_state(ViewState::Remove) {
            // No transition is staged yet. The topmost marked record is the
            // visible one, so it animates out; the nearest inactive record
            // below it becomes the entering view.
            top_removed.set_state(ViewState::InitLeave);
            self.promote_preceding_inactive(&top_removed);
        }

        if self.get_active().is_some() {
            // The active record survived, so every removal happened strictly
            // before it in history and no transition is needed.
            if let Some(queued) = self.get_by_state(ViewState::InitEnter) {
                queued.set_state(ViewState::Inactive);
            }
            if let Some(leaving) = self.get_by_state(ViewState::InitLeave) {
                leaving.set_state(ViewState::Remove);
            }
        }

        let doomed: Vec<ViewRecord> = self
            .views
            .iter()
            .filter(|view| view.state() == ViewState::Remove)
            .cloned()
            .collect();

        (self.get_by_state(ViewState::InitLeave), doomed)
    }

    /// Walks backwards from `view` and promotes the first inactive record
    /// to `InitEnter`.
    fn promote_preceding_inactive(&self, view: &ViewRecord) {
        let Some(index) = self.index_of(view) else {
            return;
        };
        for candidate in self.views[..index].iter().rev() {
            if candidate.state() == ViewState::Inactive {
                candidate.set_state(ViewState::InitEnter);
                break;
            }
        }
    }

    /// Drops `view` from the sequence without running lifecycle events.
    pub fn evict(&mut self, view: &ViewRecord) -> bool {
        match self.index_of(view) {
            Some(index) => {
                self.views.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn get_active(&self) -> Option<ViewRecord> {
        self.get_by_state(ViewState::Active)
    }

    /// Most recent record in `state`, scanning from the end.
    pub fn get_by_state(&self, state: ViewState) -> Option<ViewRecord> {
        self.views
            .iter()
            .rev()
            .find(|view| view.state() == state)
            .cloned()
    }

    pub fn get_by_index(&self, index: usize) -> Option<ViewRecord> {
        self.views.get(index).cloned()
    }

    /// Record immediately before `view` in history order.
    pub fn get_previous(&self, view: &ViewRecord) -> Option<ViewRecord> {
        let index = self.index_of(view)?;
        if index == 0 {
            None
        } else {
            self.get_by_index(index - 1)
        }
    }

    pub fn first(&self) -> Option<ViewRecord> {
        self.views.first().cloned()
    }

    pub fn last(&self) -> Option<ViewRecord> {
        self.views.last().cloned()
    }

    pub fn index_of(&self, view: &ViewRecord) -> Option<usize> {
        self.views.iter().position(|candidate| candidate.ptr_eq(view))
    }
}

#[cfg(test)]
#[path = "tests/stack_tests.rs"]
mod tests;

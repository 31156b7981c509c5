//! Notes section of the workspace page
//!
//! Stale-while-revalidate: the first load shows a placeholder, later
//! reloads keep the current notes on screen with a small "Syncing..."
//! indicator, and a failed reload shows a banner above the stale notes
//! instead of replacing them.

use std::sync::{Mutex, MutexGuard};

use super::{settle, PageContext};
use crate::api::services::notes;
use crate::api::Note;
use crate::router::{PageError, PageResult, Router, WORKSPACE};
use crate::state::Store;
use crate::view::{components, Block, MountHandle};

pub(crate) const NOTES_SECTION: &str = "notes";
pub(crate) const FORM_SECTION: &str = "note-form";

/// Tenant of the workspace on screen
///
/// Workspace actions only run while the workspace page is routed, even when
/// a tenant id survives from an earlier session.
pub(crate) fn open_tenant_id(router: &Router, store: &Store) -> PageResult<String> {
    if router.current_path() != WORKSPACE {
        return Err(PageError::Failed("Open a workspace first".to_string()));
    }
    store
        .active_tenant_id()
        .ok_or_else(|| PageError::Failed("No workspace selected".to_string()))
}

/// What the section knows about the notes of the open workspace
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotesState {
    pub notes: Vec<Note>,
    pub is_initial_loading: bool,
    pub is_fetching: bool,
    pub error: Option<String>,
}

impl NotesState {
    /// State before the first fetch
    pub fn initial() -> Self {
        Self {
            is_initial_loading: true,
            ..Self::default()
        }
    }

    /// Blocks to show for this state
    pub fn view(&self) -> Vec<Block> {
        if self.is_initial_loading && self.notes.is_empty() {
            return vec![Block::Muted("Loading notes...".into())];
        }

        if self.notes.is_empty() {
            if let Some(error) = &self.error {
                return vec![components::error_alert(error.clone())];
            }
        }

        let mut blocks = Vec::with_capacity(self.notes.len() + 2);
        if let Some(error) = &self.error {
            blocks.push(components::error_alert(error.clone()));
        }

        if self.notes.is_empty() {
            blocks.push(Block::Muted("No notes yet. Create your first note!".into()));
        } else {
            blocks.extend(self.notes.iter().map(components::note_card));
        }

        if self.is_fetching {
            blocks.push(components::spinner("Syncing..."));
        }
        blocks
    }
}

pub struct NotesSection {
    ctx: PageContext,
    state: Mutex<NotesState>,
}

impl NotesSection {
    pub fn new(ctx: PageContext) -> Self {
        Self {
            ctx,
            state: Mutex::new(NotesState::initial()),
        }
    }

    fn state(&self) -> MutexGuard<'_, NotesState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn snapshot(&self) -> NotesState {
        self.state().clone()
    }

    /// Forget previous notes and run the first fetch for `tenant_id`
    pub async fn load(&self, handle: &MountHandle, tenant_id: &str) -> PageResult<()> {
        if !handle.is_current() {
            return Ok(());
        }
        *self.state() = NotesState::initial();
        self.fetch(handle, tenant_id, false).await
    }

    /// Reload notes, keeping the current ones on screen
    pub async fn refresh(&self, router: &Router) -> PageResult<()> {
        let tenant_id = open_tenant_id(router, &self.ctx.store)?;
        self.fetch(&router.current_handle(), &tenant_id, true).await
    }

    /// Create a note and reload
    pub async fn create(&self, router: &Router, content: &str) -> PageResult<()> {
        let tenant_id = open_tenant_id(router, &self.ctx.store)?;
        let handle = router.current_handle();
        let Some(content) = Self::checked_content(&handle, content) else {
            return Ok(());
        };

        match settle(notes::create(&self.ctx.api, &tenant_id, content).await)? {
            Ok(_) => {
                handle.replace_section(FORM_SECTION, Vec::new());
                self.fetch(&handle, &tenant_id, true).await
            }
            Err(message) => {
                handle.replace_section(FORM_SECTION, vec![components::error_alert(message)]);
                Ok(())
            }
        }
    }

    /// Replace the content of a note and reload
    pub async fn update(&self, router: &Router, note_id: &str, content: &str) -> PageResult<()> {
        let tenant_id = open_tenant_id(router, &self.ctx.store)?;
        let handle = router.current_handle();
        let Some(content) = Self::checked_content(&handle, content) else {
            return Ok(());
        };

        match settle(notes::update(&self.ctx.api, note_id, content).await)? {
            Ok(_) => {
                handle.replace_section(FORM_SECTION, Vec::new());
                self.fetch(&handle, &tenant_id, true).await
            }
            Err(message) => {
                handle.replace_section(FORM_SECTION, vec![components::error_alert(message)]);
                Ok(())
            }
        }
    }

    /// Delete a note and reload
    pub async fn delete(&self, router: &Router, note_id: &str) -> PageResult<()> {
        let tenant_id = open_tenant_id(router, &self.ctx.store)?;
        let handle = router.current_handle();

        match settle(notes::delete(&self.ctx.api, note_id).await)? {
            Ok(_) => {
                tracing::info!(note_id = %note_id, "Note deleted");
                self.fetch(&handle, &tenant_id, true).await
            }
            Err(message) => {
                handle.push_to_section(NOTES_SECTION, components::error_alert(message));
                Ok(())
            }
        }
    }

    async fn fetch(&self, handle: &MountHandle, tenant_id: &str, revalidate: bool) -> PageResult<()> {
        {
            let mut state = self.state();
            if revalidate {
                state.is_fetching = true;
            } else {
                state.is_initial_loading = true;
            }
            state.error = None;
        }
        self.paint(handle);

        let result = settle(notes::list_by_tenant(&self.ctx.api, tenant_id).await)?;
        if !handle.is_current() {
            tracing::debug!(tenant_id = %tenant_id, "Dropped notes from superseded render");
            return Ok(());
        }

        {
            let mut state = self.state();
            state.is_initial_loading = false;
            state.is_fetching = false;
            match result {
                Ok(listed) => {
                    state.notes = listed.map(|l| l.notes).unwrap_or_default();
                    state.error = None;
                }
                Err(message) => {
                    tracing::debug!(tenant_id = %tenant_id, error = %message, "Notes fetch failed");
                    state.error = Some(message);
                }
            }
        }
        self.paint(handle);
        Ok(())
    }

    fn paint(&self, handle: &MountHandle) {
        let blocks = self.state().view();
        handle.replace_section(NOTES_SECTION, blocks);
    }

    fn checked_content<'a>(handle: &MountHandle, content: &'a str) -> Option<&'a str> {
        let content = content.trim();
        if content.is_empty() {
            handle.replace_section(
                FORM_SECTION,
                vec![components::error_alert("Content cannot be empty")],
            );
            return None;
        }
        Some(content)
    }
}

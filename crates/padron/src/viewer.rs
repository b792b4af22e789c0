//! Bounded page navigation over an incident list.
//!
//! A cursor is private to the viewer that opened it and lives in an
//! idle-expiring table; after the idle window passes, navigation fails
//! `Expired` and the platform layer turns its controls inert. Short lists
//! never get a cursor at all.

use moka::sync::Cache;
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

use crate::error::{RegistryError, RegistryResult};
use crate::ids::UserId;
use crate::records::{Identity, Incident};
use crate::render;

pub const PAGE_SIZE: usize = 5;

const CURSOR_CAPACITY: u64 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CursorId(Uuid);

impl CursorId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for CursorId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct PageCursor {
    viewer: UserId,
    subject: UserId,
    identity: Identity,
    incidents: Vec<Incident>,
    page_index: usize,
}

impl PageCursor {
    fn total_pages(&self) -> usize {
        self.incidents.len().div_ceil(PAGE_SIZE).max(1)
    }

    fn render(&self) -> String {
        render::police_file_page(
            self.subject,
            &self.identity,
            &self.incidents,
            self.page_index,
            self.total_pages(),
        )
    }
}

/// What opening a file hands back to the platform layer.
#[derive(Debug, Clone)]
pub enum FileView {
    /// Everything fits on one screen; no paging controls are exposed.
    Static { content: String },
    /// Paged view; later navigation goes through [`ViewerManager::advance`].
    Paged {
        cursor: CursorId,
        content: String,
        page_index: usize,
        total_pages: usize,
    },
}

impl FileView {
    pub fn content(&self) -> &str {
        match self {
            FileView::Static { content } => content,
            FileView::Paged { content, .. } => content,
        }
    }
}

pub struct ViewerManager {
    cursors: Cache<CursorId, PageCursor>,
}

impl ViewerManager {
    pub fn new(idle_timeout_seconds: u64) -> Self {
        let cursors = Cache::builder()
            .max_capacity(CURSOR_CAPACITY)
            .time_to_idle(Duration::from_secs(idle_timeout_seconds))
            .build();
        Self { cursors }
    }

    /// Render the first page. Lists that fit on one page produce a static
    /// view and no cursor.
    pub fn open(
        &self,
        viewer: UserId,
        subject: UserId,
        identity: Identity,
        incidents: Vec<Incident>,
    ) -> FileView {
        if incidents.len() <= PAGE_SIZE {
            return FileView::Static {
                content: render::police_file_page(subject, &identity, &incidents, 0, 1),
            };
        }

        let cursor = PageCursor {
            viewer,
            subject,
            identity,
            incidents,
            page_index: 0,
        };
        let id = CursorId::new();
        let content = cursor.render();
        let total_pages = cursor.total_pages();
        self.cursors.insert(id, cursor);
        FileView::Paged {
            cursor: id,
            content,
            page_index: 0,
            total_pages,
        }
    }

    /// Step the cursor one page in either direction. Only the viewer that
    /// opened the cursor may navigate it; steps past either end leave the
    /// page unchanged (no wraparound).
    pub fn advance(&self, id: CursorId, actor: UserId, step: i64) -> RegistryResult<FileView> {
        let mut cursor = self.cursors.get(&id).ok_or(RegistryError::Expired)?;
        if cursor.viewer != actor {
            return Err(RegistryError::NotAuthorized);
        }

        let total_pages = cursor.total_pages();
        cursor.page_index = if step < 0 {
            cursor.page_index.saturating_sub(step.unsigned_abs() as usize)
        } else {
            (cursor.page_index + step as usize).min(total_pages - 1)
        };

        let content = cursor.render();
        let page_index = cursor.page_index;
        self.cursors.insert(id, cursor);
        Ok(FileView::Paged {
            cursor: id,
            content,
            page_index,
            total_pages,
        })
    }
}

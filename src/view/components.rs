//! UI Components
//!
//! Reusable block builders shared by the pages.

use super::{AlertKind, Block, FieldKind};
use crate::api::{Note, TenantRole, TenantSummary};

/// Maximum characters of note content used as its title
pub const NOTE_TITLE_LEN: usize = 40;

pub fn alert(kind: AlertKind, message: impl Into<String>) -> Block {
    Block::Alert {
        kind,
        message: message.into(),
    }
}

pub fn error_alert(message: impl Into<String>) -> Block {
    alert(AlertKind::Error, message)
}

pub fn spinner(label: impl Into<String>) -> Block {
    Block::Spinner {
        label: label.into(),
    }
}

/// Button mapped to the shell command that triggers it
pub fn button(label: impl Into<String>, command: impl Into<String>) -> Block {
    Block::Button {
        label: label.into(),
        command: Some(command.into()),
    }
}

pub fn input(label: impl Into<String>, kind: FieldKind, placeholder: impl Into<String>) -> Block {
    Block::Field {
        label: label.into(),
        kind,
        placeholder: placeholder.into(),
    }
}

pub fn header(title: impl Into<String>, actions: &[&str]) -> Block {
    Block::Header {
        title: title.into(),
        actions: actions.iter().map(|a| a.to_string()).collect(),
    }
}

pub fn section(id: impl Into<String>, children: Vec<Block>) -> Block {
    Block::Section {
        id: id.into(),
        children,
    }
}

/// Error card shown when a whole page failed to load
pub fn error_card(message: impl Into<String>) -> Block {
    Block::Card {
        id: None,
        title: "Error".to_string(),
        body: Some(message.into()),
        meta: None,
        badges: Vec::new(),
    }
}

/// Workspace card: name, role badge and member count
pub fn tenant_card(tenant: &TenantSummary) -> Block {
    let role = tenant.role.unwrap_or(TenantRole::Member);
    let members = tenant.member_count.unwrap_or(0);
    let meta = if members == 1 {
        "1 member".to_string()
    } else {
        format!("{} members", members)
    };

    Block::Card {
        id: Some(tenant.id.clone()),
        title: tenant.name.clone(),
        body: None,
        meta: Some(meta),
        badges: vec![role.to_string()],
    }
}

/// Pseudo-title of a note: the first characters with line breaks flattened
pub fn note_title(content: &str) -> String {
    let mut title: String = content
        .chars()
        .take(NOTE_TITLE_LEN)
        .map(|c| if c == '\n' { ' ' } else { c })
        .collect();
    if content.chars().count() > NOTE_TITLE_LEN {
        title.push_str("...");
    }
    title
}

pub fn note_card(note: &Note) -> Block {
    Block::Card {
        id: Some(note.id.clone()),
        title: note_title(&note.content),
        body: Some(note.content.clone()),
        meta: Some(note.created_at.format("%Y-%m-%d").to_string()),
        badges: Vec::new(),
    }
}

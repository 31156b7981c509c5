//! View Layer
//!
//! Pages do not draw directly: they describe what is on screen as a list of
//! [`Block`]s written into the single [`Mount`]. The shell prints the mount
//! after every action.
//!
//! Write access goes through a [`MountHandle`] bound to one render
//! generation. Once the router starts a newer render, handles of older
//! generations stop writing, so a slow page cannot paint over the page the
//! user navigated to.

pub mod components;

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;

/// Alert severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Info,
    Success,
    Warning,
    Error,
}

/// Form field type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
    Password,
    TextArea,
}

/// A node of the rendered view
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Page header with a title and the shell commands available as actions
    Header { title: String, actions: Vec<String> },
    Heading(String),
    Text(String),
    Muted(String),
    Alert { kind: AlertKind, message: String },
    Card {
        id: Option<String>,
        title: String,
        body: Option<String>,
        meta: Option<String>,
        badges: Vec<String>,
    },
    Spinner { label: String },
    Button { label: String, command: Option<String> },
    Field { label: String, kind: FieldKind, placeholder: String },
    /// Addressable container whose children can be replaced in place
    Section { id: String, children: Vec<Block> },
}

impl Block {
    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let pad = "  ".repeat(depth);
        match self {
            Block::Header { title, actions } => {
                writeln!(f, "{}== {} ==", pad, title)?;
                if !actions.is_empty() {
                    writeln!(f, "{}   [{}]", pad, actions.join("] ["))?;
                }
            }
            Block::Heading(text) => writeln!(f, "{}# {}", pad, text)?,
            Block::Text(text) => writeln!(f, "{}{}", pad, text)?,
            Block::Muted(text) => writeln!(f, "{}({})", pad, text)?,
            Block::Alert { kind, message } => {
                let label = match kind {
                    AlertKind::Info => "info",
                    AlertKind::Success => "ok",
                    AlertKind::Warning => "warning",
                    AlertKind::Error => "error",
                };
                writeln!(f, "{}[{}] {}", pad, label, message)?;
            }
            Block::Card {
                id,
                title,
                body,
                meta,
                badges,
            } => {
                let mut line = format!("{}* {}", pad, title);
                for badge in badges {
                    line.push_str(&format!(" <{}>", badge));
                }
                if let Some(id) = id {
                    line.push_str(&format!("  (id: {})", id));
                }
                writeln!(f, "{}", line)?;
                if let Some(body) = body {
                    for body_line in body.lines() {
                        writeln!(f, "{}    {}", pad, body_line)?;
                    }
                }
                if let Some(meta) = meta {
                    writeln!(f, "{}    {}", pad, meta)?;
                }
            }
            Block::Spinner { label } => writeln!(f, "{}... {}", pad, label)?,
            Block::Button { label, command } => match command {
                Some(cmd) => writeln!(f, "{}[{}] -> {}", pad, label, cmd)?,
                None => writeln!(f, "{}[{}]", pad, label)?,
            },
            Block::Field { label, placeholder, .. } => {
                writeln!(f, "{}{}: <{}>", pad, label, placeholder)?
            }
            Block::Section { children, .. } => {
                for child in children {
                    child.write_indented(f, depth + 1)?;
                }
            }
        }
        Ok(())
    }

    /// Recursively collect plain text, used by tests and logs
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Block::Header { title, .. } => push_line(out, title),
            Block::Heading(t) | Block::Text(t) | Block::Muted(t) => push_line(out, t),
            Block::Alert { message, .. } => push_line(out, message),
            Block::Card {
                title,
                body,
                meta,
                badges,
                ..
            } => {
                push_line(out, title);
                for badge in badges {
                    push_line(out, badge);
                }
                if let Some(body) = body {
                    push_line(out, body);
                }
                if let Some(meta) = meta {
                    push_line(out, meta);
                }
            }
            Block::Spinner { label } | Block::Button { label, .. } | Block::Field { label, .. } => {
                push_line(out, label)
            }
            Block::Section { children, .. } => {
                for child in children {
                    child.collect_text(out);
                }
            }
        }
    }
}

fn push_line(out: &mut String, line: &str) {
    if !out.is_empty() {
        out.push('\n');
    }
    out.push_str(line);
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

#[derive(Debug, Default)]
struct MountState {
    generation: u64,
    blocks: Vec<Block>,
}

/// The single container pages render into
#[derive(Debug, Clone, Default)]
pub struct Mount {
    inner: Arc<Mutex<MountState>>,
}

impl Mount {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MountState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Start a new render generation: clear the container and return the
    /// only handle allowed to write until the next call
    pub fn begin(&self, token: CancellationToken) -> MountHandle {
        let mut state = self.lock();
        state.generation += 1;
        state.blocks.clear();

        MountHandle {
            mount: self.clone(),
            generation: state.generation,
            token,
        }
    }

    /// Handle for the current generation
    pub fn handle(&self, token: CancellationToken) -> MountHandle {
        MountHandle {
            mount: self.clone(),
            generation: self.generation(),
            token,
        }
    }

    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    pub fn blocks(&self) -> Vec<Block> {
        self.lock().blocks.clone()
    }

    /// All text currently on screen, one block per line group
    pub fn text_content(&self) -> String {
        self.lock()
            .blocks
            .iter()
            .map(Block::text_content)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// True when any block contains `needle`
    pub fn contains_text(&self, needle: &str) -> bool {
        self.text_content().contains(needle)
    }

    /// Render the container for the terminal
    pub fn render_text(&self) -> String {
        self.lock()
            .blocks
            .iter()
            .map(|b| b.to_string())
            .collect::<String>()
    }
}

/// Generation-bound write access to the [`Mount`]
#[derive(Debug, Clone)]
pub struct MountHandle {
    mount: Mount,
    generation: u64,
    token: CancellationToken,
}

impl MountHandle {
    /// True while no newer render has started and the render is not cancelled
    pub fn is_current(&self) -> bool {
        !self.token.is_cancelled() && self.mount.generation() == self.generation
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Apply `f` to the blocks; dropped when the handle is stale
    pub fn update(&self, f: impl FnOnce(&mut Vec<Block>)) -> bool {
        let mut state = self.mount.lock();
        if self.token.is_cancelled() || state.generation != self.generation {
            tracing::debug!(
                generation = self.generation,
                current = state.generation,
                "Dropped write from superseded render"
            );
            return false;
        }
        f(&mut state.blocks);
        true
    }

    /// Replace the whole container
    pub fn replace(&self, blocks: Vec<Block>) -> bool {
        self.update(|current| *current = blocks)
    }

    /// Append a block
    pub fn push(&self, block: Block) -> bool {
        self.update(|current| current.push(block))
    }

    /// Replace the children of the section with `id`, appending the section
    /// if it is not on screen yet
    pub fn replace_section(&self, id: &str, children: Vec<Block>) -> bool {
        self.update(|blocks| {
            match find_section(blocks, id) {
                Some(existing) => *existing = children,
                None => blocks.push(Block::Section {
                    id: id.to_string(),
                    children,
                }),
            }
        })
    }

    /// Append to the section with `id`
    pub fn push_to_section(&self, id: &str, block: Block) -> bool {
        self.update(|blocks| {
            if let Some(children) = find_section(blocks, id) {
                children.push(block);
            }
        })
    }
}

fn find_section<'a>(blocks: &'a mut [Block], id: &str) -> Option<&'a mut Vec<Block>> {
    for block in blocks.iter_mut() {
        if let Block::Section { id: section_id, children } = block {
            if section_id.as_str() == id {
                return Some(children);
            }
            if let Some(found) = find_section(children, id) {
                return Some(found);
            }
        }
    }
    None
}

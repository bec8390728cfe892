//! DOT and JSON rendering of a machine's transition graph.

use crate::core::{EventId, Source, StateId};
use crate::machine::Machine;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors from rendering or exporting a graph.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to write graph: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize graph: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphFormat {
    #[default]
    Dot,
    Json,
}

/// Presentation settings for [`render`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub format: GraphFormat,
    pub title: Option<String>,
    pub font_name: Option<String>,
    pub font_size: u32,
    pub node_shape: String,
    pub edge_style: String,
    pub bgcolor: Option<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            format: GraphFormat::Dot,
            title: None,
            font_name: None,
            font_size: 12,
            node_shape: "ellipse".to_string(),
            edge_style: "solid".to_string(),
            bgcolor: None,
        }
    }
}

impl RenderOptions {
    pub fn json() -> Self {
        Self {
            format: GraphFormat::Json,
            ..Self::default()
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn font(mut self, name: impl Into<String>, size: u32) -> Self {
        self.font_name = Some(name.into());
        self.font_size = size;
        self
    }

    pub fn node_shape(mut self, shape: impl Into<String>) -> Self {
        self.node_shape = shape.into();
        self
    }

    pub fn edge_style(mut self, style: impl Into<String>) -> Self {
        self.edge_style = style.into();
        self
    }

    pub fn bgcolor(mut self, color: impl Into<String>) -> Self {
        self.bgcolor = Some(color.into());
        self
    }
}

/// One edge of a [`GraphSnapshot`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeSnapshot {
    pub from: Source,
    pub event: EventId,
    pub to: StateId,
    pub guarded: bool,
    pub has_action: bool,
}

/// Serializable view of a machine's structure. Callbacks are reduced to
/// presence flags.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub initial: StateId,
    pub current: StateId,
    pub states: Vec<StateId>,
    pub transitions: Vec<EdgeSnapshot>,
    pub handlers: Vec<StateId>,
}

impl GraphSnapshot {
    pub fn of<C>(machine: &Machine<'_, C>) -> Self {
        let transitions: Vec<EdgeSnapshot> = machine
            .transitions()
            .iter()
            .map(|t| EdgeSnapshot {
                from: t.from,
                event: t.event,
                to: t.to,
                guarded: t.is_guarded(),
                has_action: t.action.is_some(),
            })
            .collect();

        let handlers = machine.handlers().states();

        let mut states = BTreeSet::from([machine.initial_state(), machine.current_state()]);
        states.extend(transitions.iter().filter_map(|e| e.from.state()));
        states.extend(transitions.iter().map(|e| e.to));
        states.extend(handlers.iter().copied());

        Self {
            initial: machine.initial_state(),
            current: machine.current_state(),
            states: states.into_iter().collect(),
            transitions,
            handlers,
        }
    }

    fn has_wildcard(&self) -> bool {
        self.transitions.iter().any(|e| e.from.is_any())
    }
}

/// Render the machine as a DOT digraph or a JSON snapshot.
///
/// The initial state is drawn with a double border, the wildcard source as
/// a point node named `*`, and guarded edges are labelled `event [guard]`.
///
/// ```rust
/// use fluxstate::graph::{render, RenderOptions};
/// use fluxstate::{Machine, Transition};
///
/// let mut ctx = ();
/// let mut machine = Machine::new(0, &mut ctx);
/// machine.add_transition(Transition::new(0, 7, 1)).unwrap();
///
/// let dot = render(&machine, &RenderOptions::default().title("Door")).unwrap();
/// assert!(dot.starts_with("digraph FSM {"));
/// assert!(dot.contains("\"0\" -> \"1\" [label=\"7\"];"));
/// ```
pub fn render<C>(machine: &Machine<'_, C>, options: &RenderOptions) -> Result<String, RenderError> {
    let snapshot = GraphSnapshot::of(machine);
    match options.format {
        GraphFormat::Dot => Ok(to_dot(&snapshot, options)),
        GraphFormat::Json => Ok(serde_json::to_string_pretty(&snapshot)?),
    }
}

/// Render the machine and write it to `path`.
pub fn export<C>(
    machine: &Machine<'_, C>,
    path: impl AsRef<Path>,
    options: &RenderOptions,
) -> Result<(), RenderError> {
    let path = path.as_ref();
    let rendered = render(machine, options)?;
    fs::write(path, rendered)?;
    debug!(path = %path.display(), format = ?options.format, "Graph exported");
    Ok(())
}

fn to_dot(snapshot: &GraphSnapshot, options: &RenderOptions) -> String {
    // Writing to a String cannot fail.
    let mut out = String::from("digraph FSM {\n");

    if let Some(title) = &options.title {
        let _ = writeln!(out, "    label=\"{}\";", escape(title));
        out.push_str("    labelloc=top;\n");
    }
    if let Some(font) = &options.font_name {
        let _ = writeln!(out, "    fontname=\"{}\";", escape(font));
    }
    if options.font_size > 0 {
        let _ = writeln!(out, "    fontsize={};", options.font_size);
    }
    if let Some(color) = &options.bgcolor {
        let _ = writeln!(out, "    bgcolor=\"{}\";", escape(color));
    }
    let _ = writeln!(out, "    node [shape=\"{}\"];", escape(&options.node_shape));
    let _ = writeln!(out, "    edge [style=\"{}\"];", escape(&options.edge_style));

    for state in &snapshot.states {
        if *state == snapshot.initial {
            let _ = writeln!(out, "    \"{}\" [peripheries=2];", state);
        } else {
            let _ = writeln!(out, "    \"{}\";", state);
        }
    }
    if snapshot.has_wildcard() {
        out.push_str("    \"*\" [shape=point];\n");
    }

    for edge in &snapshot.transitions {
        let label = if edge.guarded {
            format!("{} [guard]", edge.event)
        } else {
            edge.event.to_string()
        };
        let _ = writeln!(
            out,
            "    \"{}\" -> \"{}\" [label=\"{}\"];",
            edge.from, edge.to, label
        );
    }

    out.push_str("}\n");
    out
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

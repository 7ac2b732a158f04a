//! In-memory session state and its reducer.
//!
//! Every mutation goes through [`Session::apply`], so the transition rules
//! are enumerable and testable without a terminal attached.

pub mod history;

use crate::model::{IslaTurn, Luma, Swatch};
use history::{History, LumaNode};

/// Why a generation was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// A fresh top-level prompt: clears history and starts a new arena.
    Root,
    /// An evolution of the node at this index: appends a child.
    Evolve(usize),
}

/// A completed interaction with the service, tagged with the sequence
/// number of the dispatch that produced it.
#[derive(Debug, Clone)]
pub enum Event {
    Generated {
        seq: u64,
        origin: Origin,
        prompt: String,
        luma: Luma,
    },
    Replied {
        seq: u64,
        turn: IslaTurn,
    },
    Fixed {
        seq: u64,
        node: usize,
        fixed: Vec<Swatch>,
    },
    Failed {
        seq: u64,
        message: String,
    },
}

impl Event {
    fn seq(&self) -> u64 {
        match self {
            Event::Generated { seq, .. }
            | Event::Replied { seq, .. }
            | Event::Fixed { seq, .. }
            | Event::Failed { seq, .. } => *seq,
        }
    }
}

/// State for one interactive session: the result arena, the Isla
/// transcript, and the loading/error flags overlaying them.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub history: History,
    pub transcript: Vec<IslaTurn>,
    loading: bool,
    error: Option<String>,
    latest_seq: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new dispatch: clears any stale error, raises the loading
    /// flag, and returns the sequence number the completion must carry.
    pub fn begin_request(&mut self) -> u64 {
        self.latest_seq += 1;
        self.loading = true;
        self.error = None;
        self.latest_seq
    }

    /// True while a dispatched request has not completed. The triggering
    /// affordance stays disabled for exactly this window.
    pub fn in_flight(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Apply a completion event.
    ///
    /// A completion whose sequence number is not the latest issued is
    /// dropped: a newer dispatch has superseded it, and letting it land
    /// would let an abandoned request overwrite newer state.
    pub fn apply(&mut self, event: Event) {
        if event.seq() != self.latest_seq {
            tracing::debug!(
                seq = event.seq(),
                latest = self.latest_seq,
                "discarding stale completion"
            );
            return;
        }
        self.loading = false;
        match event {
            Event::Generated {
                origin,
                prompt,
                luma,
                ..
            } => match origin {
                Origin::Root => {
                    self.transcript.clear();
                    self.history.reset(prompt, luma);
                }
                Origin::Evolve(parent) => {
                    self.history.evolve(parent, prompt, luma);
                }
            },
            Event::Replied { turn, .. } => self.transcript.push(turn),
            Event::Fixed { node, fixed, .. } => {
                if let Some(node) = self.history.get_mut(node) {
                    node.luma.apply_fix(fixed);
                }
            }
            Event::Failed { message, .. } => self.error = Some(message),
        }
    }

    /// The most recently generated node, if any.
    pub fn current(&self) -> Option<&LumaNode> {
        self.history.latest().map(|(_, node)| node)
    }
}

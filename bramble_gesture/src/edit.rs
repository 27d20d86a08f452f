// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-place caption editing.

use alloc::string::{String, ToString};

/// State for editing one node's caption in place.
///
/// `VIEW → EDIT → VIEW`. Entering edit snapshots the caption so a cancel
/// (or focus loss) can restore it; an explicit [`CaptionEdit::commit`]
/// hands the live text to the data model instead. At most one caption
/// edits at a time.
///
/// Every keystroke goes through [`CaptionEdit::input`], which stores the
/// live text and arms a redraw marker. The host re-measures immediately
/// (the editing surface must track the text) but defers the connector
/// redraw behind its own short delay, draining the marker with
/// [`CaptionEdit::take_pending_redraw`] when the delay elapses — bounding
/// redraw frequency without this crate owning a timer.
#[derive(Clone, Debug, Default)]
pub struct CaptionEdit<K> {
    session: Option<Session<K>>,
}

#[derive(Clone, Debug)]
struct Session<K> {
    node: K,
    original: String,
    text: String,
    redraw_pending: bool,
}

impl<K: Copy + PartialEq> CaptionEdit<K> {
    /// Not editing.
    pub const fn new() -> Self {
        Self { session: None }
    }

    /// Enter edit mode on `node`, snapshotting `current` for rollback.
    ///
    /// A no-op (returning `false`) while any edit session is active —
    /// including one on the same node.
    pub fn edit(&mut self, node: K, current: &str) -> bool {
        if self.session.is_some() {
            return false;
        }
        self.session = Some(Session {
            node,
            original: current.to_string(),
            text: current.to_string(),
            redraw_pending: false,
        });
        true
    }

    /// Whether an edit session is active.
    pub fn is_editing(&self) -> bool {
        self.session.is_some()
    }

    /// The node being edited.
    pub fn node(&self) -> Option<K> {
        self.session.as_ref().map(|s| s.node)
    }

    /// The live (not yet committed) text.
    pub fn text(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.text.as_str())
    }

    /// Record a keystroke's result and arm the debounced redraw.
    ///
    /// Ignored when not editing.
    pub fn input(&mut self, text: &str) {
        if let Some(session) = self.session.as_mut() {
            session.text = text.to_string();
            session.redraw_pending = true;
        }
    }

    /// Drain the debounce marker.
    ///
    /// Returns the edited node once per armed [`CaptionEdit::input`] burst;
    /// the host calls this after its delay and redraws that node's
    /// connectors.
    pub fn take_pending_redraw(&mut self) -> Option<K> {
        let session = self.session.as_mut()?;
        if !session.redraw_pending {
            return None;
        }
        session.redraw_pending = false;
        Some(session.node)
    }

    /// Commit: exit to view mode, yielding the node and the live text for
    /// the data model.
    pub fn commit(&mut self) -> Option<(K, String)> {
        self.session.take().map(|s| (s.node, s.text))
    }

    /// Cancel (or focus loss): exit to view mode, yielding the node and the
    /// snapshot the caption must be restored to.
    pub fn cancel(&mut self) -> Option<(K, String)> {
        self.session.take().map(|s| (s.node, s.original))
    }
}

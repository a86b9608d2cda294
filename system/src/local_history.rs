use crate::shape::DrawableObject;

#[derive(Debug, Clone)]
struct Entry {
    /// Ordinal of the local edit that produced the shape, `None` for shapes
    /// received from the hub.
    local: Option<usize>,
    shape: DrawableObject,
}

/// Linear undo history of one client.
///
/// Every shape is kept once, in arrival order, tagged with the local edit
/// that produced it. Checkpoint `k` is the view holding every remote shape and
/// the first `k` local edits, so remote shapes survive any cursor move. The
/// visible view is cached and rebuilt on undo and redo, keeping memory linear
/// in the number of shapes.
#[derive(Debug, Clone)]
pub struct LocalHistory {
    entries: Vec<Entry>,
    visible: Vec<DrawableObject>,
    local_edits: usize,
    cursor: usize,
}

impl LocalHistory {
    pub fn new(initial: Vec<DrawableObject>) -> Self {
        Self {
            entries: initial
                .iter()
                .cloned()
                .map(|shape| Entry { local: None, shape })
                .collect(),
            visible: initial,
            local_edits: 0,
            cursor: 0,
        }
    }

    pub fn current(&self) -> &[DrawableObject] {
        &self.visible
    }

    /// Appends a shape authored locally: drops the redo tail and records a new checkpoint.
    pub fn push_local(&mut self, shape: DrawableObject) {
        let cursor = self.cursor;
        self.entries
            .retain(|entry| entry.local.map_or(true, |ordinal| ordinal <= cursor));
        self.local_edits = cursor + 1;
        self.cursor = self.local_edits;
        self.visible.push(shape.clone());
        self.entries.push(Entry {
            local: Some(self.local_edits),
            shape,
        });
    }

    /// Records a shape authored by a peer. It belongs to every checkpoint, so
    /// moving the cursor never adds or removes it.
    pub fn fold_remote(&mut self, shape: &DrawableObject) {
        self.visible.push(shape.clone());
        self.entries.push(Entry {
            local: None,
            shape: shape.clone(),
        });
    }

    pub fn undo(&mut self) -> bool {
        if self.can_undo() {
            self.cursor -= 1;
            self.rebuild_visible();
            true
        } else {
            false
        }
    }

    pub fn redo(&mut self) -> bool {
        if self.can_redo() {
            self.cursor += 1;
            self.rebuild_visible();
            true
        } else {
            false
        }
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.local_edits
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of checkpoints, the initial one included.
    pub fn len(&self) -> usize {
        self.local_edits + 1
    }

    fn rebuild_visible(&mut self) {
        let cursor = self.cursor;
        self.visible = self
            .entries
            .iter()
            .filter(|entry| entry.local.map_or(true, |ordinal| ordinal <= cursor))
            .map(|entry| entry.shape.clone())
            .collect();
    }
}

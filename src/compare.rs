//! Greedy structural comparison
//!
//! Scores and reassigns matches between the nodes of two documents,
//! including cross-representation equivalences (inline note vs. shared-note
//! reference) and split payload coverage across sibling name pieces. The
//! matching is a greedy heuristic with first-found tie-breaking and
//! steal-and-clear reassignment; it is deliberately not an optimal bipartite
//! matcher, and downstream compliance expectations are pinned to this exact
//! behavior.

use std::collections::HashMap;

use tracing::debug;

use crate::document::{is_pointer_payload, Document, NodeId};

/// Structure roles holding fragments of a personal name, eligible for
/// split-coverage matching.
const NAME_PIECE_TAGS: [&str; 6] = ["NPFX", "GIVN", "NICK", "SPFX", "SURN", "NSFX"];

/// Inline annotation and shared-annotation reference, treated as
/// semantically equivalent representations.
const INLINE_NOTE_TAG: &str = "NOTE";
const SHARED_NOTE_TAG: &str = "SNOTE";

/// Header fields expected to differ between any two documents.
pub const DEFAULT_EXEMPT_PATHS: [&str; 3] = ["HEAD.SOUR", "HEAD.DEST", "HEAD.DATE"];

/// Score returned when a pairing is ruled out entirely.
const DISQUALIFIED: i64 = i64::MIN / 2;

/// Per-node match bookkeeping, keyed by node identity within one tree and
/// discarded at the end of each comparison.
#[derive(Debug, Default, Clone)]
struct MatchInfo {
    /// Counterpart nodes in the other tree
    counterparts: Vec<NodeId>,
    /// Accumulated score across all pairings involving this node
    score: i64,
}

#[derive(Debug, Default)]
struct MatchTable {
    info: HashMap<NodeId, MatchInfo>,
}

impl MatchTable {
    fn add(&mut self, id: NodeId, counterpart: NodeId, score: i64) {
        let entry = self.info.entry(id).or_default();
        entry.counterparts.push(counterpart);
        entry.score += score;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

impl Side {
    fn other(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }
}

/// Outcome of a comparison: nodes present only in the baseline (`removed`),
/// nodes present only in the other document (`added`), both in document
/// order, plus the baseline line count the compliance percentage derives
/// from.
#[derive(Debug, Clone)]
pub struct ComparisonReport {
    pub removed: Vec<NodeId>,
    pub added: Vec<NodeId>,
    pub baseline_line_count: usize,
}

impl ComparisonReport {
    /// `100 - floor(100 * removed / baselineLineCount)`
    pub fn compliance_percentage(&self) -> i64 {
        if self.baseline_line_count == 0 {
            return 100;
        }
        100 - (100 * self.removed.len() as i64) / self.baseline_line_count as i64
    }
}

/// Compare two documents with the default header exemptions.
pub fn compare(baseline: &Document, other: &Document) -> ComparisonReport {
    let exempt: Vec<String> = DEFAULT_EXEMPT_PATHS.iter().map(|s| s.to_string()).collect();
    compare_with_exemptions(baseline, other, &exempt)
}

/// Compare two documents, ignoring nodes whose tag path falls under any of
/// the given exempt prefixes.
pub fn compare_with_exemptions(
    baseline: &Document,
    other: &Document,
    exempt_paths: &[String],
) -> ComparisonReport {
    let mut comparator = Comparator {
        left: baseline,
        right: other,
        tables: [MatchTable::default(), MatchTable::default()],
        exempt: exempt_paths,
    };
    comparator.run()
}

struct Comparator<'a> {
    left: &'a Document,
    right: &'a Document,
    tables: [MatchTable; 2],
    exempt: &'a [String],
}

impl<'a> Comparator<'a> {
    fn doc(&self, side: Side) -> &'a Document {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    fn run(&mut self) -> ComparisonReport {
        let (left, right) = (self.left, self.right);

        for &record in left.records() {
            if self.is_complete(Side::Left, record) {
                continue;
            }
            if let Some((counterpart, score)) =
                self.find_best_match(Side::Left, record, right.records())
            {
                self.save_match(Side::Left, record, counterpart, score);
            }
        }
        // Symmetric pass over the other document's records
        for &record in right.records() {
            if self.is_complete(Side::Right, record) {
                continue;
            }
            if let Some((counterpart, score)) =
                self.find_best_match(Side::Right, record, left.records())
            {
                self.save_match(Side::Right, record, counterpart, score);
            }
        }

        let removed = self.unmatched(Side::Left);
        let added = self.unmatched(Side::Right);
        let report = ComparisonReport {
            removed,
            added,
            baseline_line_count: left.line_count,
        };
        debug!(
            removed = report.removed.len(),
            added = report.added.len(),
            compliance = report.compliance_percentage(),
            "comparison finished"
        );
        // All bookkeeping is dropped with the comparator, so either
        // document can be compared again.
        report
    }

    fn unmatched(&self, side: Side) -> Vec<NodeId> {
        let doc = self.doc(side);
        doc.walk()
            .into_iter()
            .filter(|&id| !self.is_exempt(side, id) && !self.is_complete(side, id))
            .collect()
    }

    fn is_exempt(&self, side: Side, id: NodeId) -> bool {
        let path = self.doc(side).tag_path(id);
        self.exempt
            .iter()
            .any(|prefix| path == *prefix || path.starts_with(&format!("{prefix}.")))
    }

    /// Ordinary nodes are complete when they have at least one counterpart;
    /// name-piece nodes are complete when the union of counterpart payloads
    /// fully covers their own payload.
    fn is_complete(&self, side: Side, id: NodeId) -> bool {
        let Some(info) = self.tables[side.index()].info.get(&id) else {
            return false;
        };
        if info.counterparts.is_empty() {
            return false;
        }
        let node = self.doc(side).node(id);
        if NAME_PIECE_TAGS.contains(&node.tag.as_str()) && node.payload.is_some() {
            return self.remaining_payload(side, id).trim().is_empty();
        }
        true
    }

    /// The space-padded part of this node's payload not yet covered by its
    /// recorded counterparts.
    fn remaining_payload(&self, side: Side, id: NodeId) -> String {
        let node = self.doc(side).node(id);
        let mut remaining = format!(" {} ", node.payload.as_deref().unwrap_or(""));
        let Some(info) = self.tables[side.index()].info.get(&id) else {
            return remaining;
        };
        let other = self.doc(side.other());
        for &counterpart in &info.counterparts {
            let Some(payload) = other.node(counterpart).payload.as_deref() else {
                continue;
            };
            let padded = format!(" {payload} ");
            if let Some(pos) = remaining.find(&padded) {
                remaining.replace_range(pos..pos + padded.len(), " ");
            } else if padded.contains(&remaining) {
                remaining = " ".to_string();
            }
        }
        remaining
    }

    /// Score a candidate pairing; `a` lives in `side`'s document, `b` in
    /// the other.
    fn score(&self, side: Side, a: NodeId, b: NodeId) -> i64 {
        let na = self.doc(side).node(a);
        let nb = self.doc(side.other()).node(b);

        // Split coverage across compatible name-piece roles
        if NAME_PIECE_TAGS.contains(&na.tag.as_str())
            && NAME_PIECE_TAGS.contains(&nb.tag.as_str())
            && na.payload.is_some()
            && nb.payload.is_some()
        {
            let padded_a = format!(" {} ", na.payload.as_deref().unwrap_or(""));
            let padded_b = format!(" {} ", nb.payload.as_deref().unwrap_or(""));
            let contained = self.remaining_payload(side, a).contains(&padded_b)
                || self.remaining_payload(side.other(), b).contains(&padded_a);
            if !contained {
                return 0;
            }
            return 1 + self.score_children(side, a, b);
        }

        if na.tag != nb.tag {
            // An inline note and a shared-note reference score through the
            // dereferenced shared-note record.
            if is_note_pair(&na.tag, &nb.tag) {
                return self.score_note_pair(side, a, b);
            }
            return 0;
        }

        let pa = na.payload.as_deref();
        let pb = nb.payload.as_deref();
        let pointer_a = pa.map(is_pointer_payload).unwrap_or(false);
        let pointer_b = pb.map(is_pointer_payload).unwrap_or(false);
        if pointer_a != pointer_b {
            return DISQUALIFIED;
        }
        let base = if pointer_a {
            // Pointer targets are matched by reference elsewhere; a
            // structural match here is worth a flat unit.
            1
        } else if pa == pb {
            1
        } else {
            -1
        };
        base + self.score_children(side, a, b)
    }

    /// Sum of each child's best score against the other node's full child
    /// set; children match independently, not as a global assignment.
    fn score_children(&self, side: Side, a: NodeId, b: NodeId) -> i64 {
        let mut total = 0;
        for &child in self.doc(side).children(a) {
            let best = self
                .doc(side.other())
                .children(b)
                .iter()
                .map(|&other_child| self.score(side, child, other_child))
                .max()
                .unwrap_or(0);
            if best > 0 {
                total += best;
            }
        }
        total
    }

    fn score_note_pair(&self, side: Side, a: NodeId, b: NodeId) -> i64 {
        let na = self.doc(side).node(a);
        // Orient: which side holds the shared-note reference?
        let (ref_side, ref_id, note_id) = if na.tag == SHARED_NOTE_TAG {
            (side, a, b)
        } else {
            (side.other(), b, a)
        };
        let Some(target) = self.deref_shared_note(ref_side, ref_id) else {
            return 0;
        };
        let target_node = self.doc(ref_side).node(target);
        let note_node = self.doc(ref_side.other()).node(note_id);
        let literal = if target_node.payload == note_node.payload {
            1
        } else {
            -1
        };
        literal + self.score_children(ref_side, target, note_id)
    }

    fn deref_shared_note(&self, side: Side, id: NodeId) -> Option<NodeId> {
        let doc = self.doc(side);
        let payload = doc.node(id).payload.as_deref()?;
        if !is_pointer_payload(payload) || payload == "@VOID@" {
            return None;
        }
        doc.record_by_key(payload)
    }

    /// Iterate the candidates, protecting an already-complete candidate
    /// whose accumulated score is at least this pairing's score; ties keep
    /// the first candidate found. Zero or negative best means no match.
    fn find_best_match(
        &self,
        side: Side,
        id: NodeId,
        candidates: &[NodeId],
    ) -> Option<(NodeId, i64)> {
        let mut best: Option<(NodeId, i64)> = None;
        for &candidate in candidates {
            let score = self.score(side, id, candidate);
            if let Some(info) = self.tables[side.other().index()].info.get(&candidate) {
                if info.score >= score && self.is_complete(side.other(), candidate) {
                    continue;
                }
            }
            if best.map(|(_, s)| score > s).unwrap_or(true) {
                best = Some((candidate, score));
            }
        }
        best.filter(|&(_, score)| score > 0)
    }

    /// Record a mutual pairing. Stealing a counterpart from an
    /// already-complete node clears that node's previous counterparts
    /// recursively first, so completeness never rests on stale state.
    /// Afterward the children of both nodes are matched repeatedly until no
    /// further positive pairing is found.
    fn save_match(&mut self, side: Side, a: NodeId, b: NodeId, score: i64) {
        if self.is_complete(side.other(), b) {
            let previous = self.tables[side.other().index()]
                .info
                .remove(&b)
                .map(|info| info.counterparts)
                .unwrap_or_default();
            for stolen in previous {
                self.clear_subtree(side, stolen);
            }
        }

        self.tables[side.index()].add(a, b, score);
        self.tables[side.other().index()].add(b, a, score);

        let tag_a = self.doc(side).node(a).tag.clone();
        let tag_b = self.doc(side.other()).node(b).tag.clone();
        if tag_a != tag_b && is_note_pair(&tag_a, &tag_b) {
            // Propagate a parallel match between the dereferenced
            // shared-note record and the literal note.
            let (ref_side, ref_id, note_id) = if tag_a == SHARED_NOTE_TAG {
                (side, a, b)
            } else {
                (side.other(), b, a)
            };
            if let Some(target) = self.deref_shared_note(ref_side, ref_id) {
                self.tables[ref_side.index()].add(target, note_id, score);
                self.tables[ref_side.other().index()].add(note_id, target, score);
                self.match_children(ref_side, target, note_id);
            }
        }

        self.match_children(side, a, b);
    }

    /// Repeatedly match `a`'s children against `b`'s children until no
    /// further positive-scoring pairing appears; a match discovered deep in
    /// a subtree can improve as its siblings are resolved.
    fn match_children(&mut self, side: Side, a: NodeId, b: NodeId) {
        loop {
            let mut improved = false;
            let children: Vec<NodeId> = self.doc(side).children(a).to_vec();
            for child in children {
                if self.is_complete(side, child) {
                    continue;
                }
                let candidates = self.doc(side.other()).children(b);
                if let Some((counterpart, score)) =
                    self.find_best_match(side, child, candidates)
                {
                    self.save_match(side, child, counterpart, score);
                    improved = true;
                }
            }
            if !improved {
                break;
            }
        }
    }

    /// Clearing a node clears its entire subtree's recorded matches.
    fn clear_subtree(&mut self, side: Side, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            self.tables[side.index()].info.remove(&current);
            stack.extend_from_slice(self.doc(side).children(current));
        }
    }
}

fn is_note_pair(a: &str, b: &str) -> bool {
    (a == INLINE_NOTE_TAG && b == SHARED_NOTE_TAG) || (a == SHARED_NOTE_TAG && b == INLINE_NOTE_TAG)
}

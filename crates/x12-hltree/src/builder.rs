use std::collections::HashMap;

use x12_tokenizer::Document;

use crate::node::HLNode;
use crate::{Error, HLTree, Result};

struct RawHL {
    doc_index: usize,
    id: String,
    parent_id: Option<String>,
    level_code: String,
    has_children: bool,
}

/// Build the HL forest for `document`.
///
/// Runs in four passes: enumerate the raw `HL` segments, cross-link each
/// to its parent by id, assign each node's own segment range from document
/// order, then materialize the forest's root list.
///
/// # Errors
///
/// See [`Error`] for the individual failure modes.
pub fn build(document: &Document) -> Result<HLTree> {
    let raw = enumerate_hl_segments(document)?;
    if raw.is_empty() {
        return Err(Error::NoHLSegments);
    }

    let index_by_id: HashMap<&str, usize> = raw
        .iter()
        .enumerate()
        .map(|(arena_idx, hl)| (hl.id.as_str(), arena_idx))
        .collect();

    let parents = link_parents(&raw, &index_by_id)?;
    let ranges = assign_ranges(&raw, document.len());

    let mut nodes: Vec<HLNode> = raw
        .into_iter()
        .zip(parents)
        .zip(ranges)
        .map(|((hl, parent), (segment_start, segment_end))| HLNode {
            id: hl.id,
            parent_hl_id: hl.parent_id,
            level_code: hl.level_code,
            has_children: hl.has_children,
            parent,
            children: Vec::new(),
            segment_start,
            segment_end,
        })
        .collect();

    let mut roots = Vec::new();
    for idx in 0..nodes.len() {
        match nodes[idx].parent {
            Some(parent_idx) => nodes[parent_idx].children.push(idx),
            None => roots.push(idx),
        }
    }
    if roots.is_empty() {
        return Err(Error::NoRootNodes);
    }

    tracing::debug!(
        node_count = nodes.len(),
        root_count = roots.len(),
        "built HL tree"
    );

    Ok(HLTree::new(nodes, roots))
}

fn enumerate_hl_segments(document: &Document) -> Result<Vec<RawHL>> {
    document
        .find_all("HL")
        .map(|segment| {
            let id = segment
                .element(1)
                .filter(|e| !e.value().is_empty())
                .ok_or(Error::MissingHLID {
                    index: segment.index(),
                })?
                .as_str()
                .into_owned();
            let parent_id = segment
                .element(2)
                .filter(|e| !e.value().is_empty())
                .map(|e| e.as_str().into_owned());
            let level_code = segment
                .element(3)
                .filter(|e| !e.value().is_empty())
                .ok_or_else(|| Error::MissingLevelCode { id: id.clone() })?
                .as_str()
                .into_owned();
            let has_children = segment
                .element(4)
                .is_some_and(|e| e.value() == b"1");

            Ok(RawHL {
                doc_index: segment.index(),
                id,
                parent_id,
                level_code,
                has_children,
            })
        })
        .collect()
}

fn link_parents(raw: &[RawHL], index_by_id: &HashMap<&str, usize>) -> Result<Vec<Option<usize>>> {
    raw.iter()
        .map(|hl| match &hl.parent_id {
            None => Ok(None),
            Some(parent_id) => index_by_id
                .get(parent_id.as_str())
                .copied()
                .map(Some)
                .ok_or_else(|| Error::ParentNotFound {
                    child: hl.id.clone(),
                    parent: parent_id.clone(),
                }),
        })
        .collect()
}

fn assign_ranges(raw: &[RawHL], document_len: usize) -> Vec<(usize, usize)> {
    raw.iter()
        .enumerate()
        .map(|(i, hl)| {
            let end = raw.get(i + 1).map_or(document_len, |next| next.doc_index);
            (hl.doc_index, end)
        })
        .collect()
}

//! Comment tree - Rebuilds reply nesting from a flat list of comments

use crate::entities::Comment;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CommentNode {
    #[serde(flatten)]
    pub comment: Comment,
    pub replies: Vec<CommentNode>,
}

impl CommentNode {
    /// Number of comments in this subtree, the node included
    pub fn size(&self) -> usize {
        1 + self.replies.iter().map(CommentNode::size).sum::<usize>()
    }
}

/// Groups comments under their `parent_id` in one pass, then assembles the tree.
///
/// Comments whose parent is missing from `comments` become roots. Siblings are ordered
/// by creation time, ties broken by id.
pub fn build_comment_tree(mut comments: Vec<Comment>) -> Vec<CommentNode> {
    comments.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then(a.comment_id.cmp(&b.comment_id))
    });

    let known: HashSet<i64> = comments.iter().map(|c| c.comment_id).collect();
    let mut children: HashMap<Option<i64>, Vec<Comment>> = HashMap::new();
    for comment in comments {
        let parent = comment
            .parent_id
            .filter(|parent| known.contains(parent) && *parent != comment.comment_id);
        children.entry(parent).or_default().push(comment);
    }

    let mut roots = assemble(None, &mut children);

    // parent chains that never reach a root (corrupt cycles) are surfaced as roots
    while let Some(key) = children.keys().next().copied() {
        for comment in children.remove(&key).unwrap_or_default() {
            let replies = assemble(Some(comment.comment_id), &mut children);
            roots.push(CommentNode { comment, replies });
        }
    }

    roots
}

fn assemble(
    parent: Option<i64>,
    children: &mut HashMap<Option<i64>, Vec<Comment>>,
) -> Vec<CommentNode> {
    children
        .remove(&parent)
        .unwrap_or_default()
        .into_iter()
        .map(|comment| {
            let replies = assemble(Some(comment.comment_id), children);
            CommentNode { comment, replies }
        })
        .collect()
}

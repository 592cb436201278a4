use crate::api::{RedditCommentData, RedditMoreData, Replies, Thing};
use rcc_core::CommentRecord;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::debug;

/// Comments of one post, assembled from the initial listing and any
/// later "load more" expansions.
#[derive(Debug)]
pub struct CommentTree {
    post_fullname: String,
    comments: HashMap<String, RedditCommentData>,
    children: HashMap<String, Vec<String>>,
    insertion_order: Vec<String>,
    pending: VecDeque<RedditMoreData>,
}

impl CommentTree {
    pub fn new(post_fullname: impl Into<String>) -> Self {
        Self {
            post_fullname: post_fullname.into(),
            comments: HashMap::new(),
            children: HashMap::new(),
            insertion_order: Vec::new(),
            pending: VecDeque::new(),
        }
    }

    pub fn post_fullname(&self) -> &str {
        &self.post_fullname
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn next_pending(&mut self) -> Option<RedditMoreData> {
        self.pending.pop_front()
    }

    /// Drops every unexpanded placeholder.
    pub fn discard_pending(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }

    /// Adds listing entries. Comments already present are not duplicated,
    /// but their replies are still merged in.
    pub fn insert_things(&mut self, things: Vec<Thing>) {
        for thing in things {
            match thing {
                Thing::Comment(comment) => self.insert_comment(comment),
                Thing::More(more) => self.pending.push_back(more),
                Thing::Post(post) => debug!("Ignoring post {} inside comment listing", post.id),
            }
        }
    }

    fn insert_comment(&mut self, mut comment: RedditCommentData) {
        let replies = match std::mem::take(&mut comment.replies) {
            Replies::Listing(listing) => listing.data.children,
            Replies::Empty(_) => Vec::new(),
        };

        if !self.comments.contains_key(&comment.name) {
            self.children
                .entry(comment.parent_id.clone())
                .or_default()
                .push(comment.name.clone());
            self.insertion_order.push(comment.name.clone());
            self.comments.insert(comment.name.clone(), comment);
        }

        self.insert_things(replies);
    }

    /// Breadth-first list of every comment: all top-level comments first,
    /// then their replies level by level. Comments whose parent never
    /// arrived are appended at the end in arrival order.
    pub fn flatten(&self, post_created_utc: f64) -> Vec<CommentRecord> {
        let mut records = Vec::with_capacity(self.comments.len());
        let mut visited = HashSet::with_capacity(self.comments.len());
        let mut queue: VecDeque<&String> = self
            .children
            .get(&self.post_fullname)
            .map(|roots| roots.iter().collect())
            .unwrap_or_default();

        while let Some(name) = queue.pop_front() {
            if !visited.insert(name.as_str()) {
                continue;
            }
            if let Some(comment) = self.comments.get(name) {
                records.push(to_record(comment, post_created_utc));
            }
            if let Some(replies) = self.children.get(name) {
                queue.extend(replies.iter());
            }
        }

        let orphans: Vec<&String> = self
            .insertion_order
            .iter()
            .filter(|name| !visited.contains(name.as_str()))
            .collect();
        if !orphans.is_empty() {
            debug!(
                "{} comments of {} were not reachable from the post",
                orphans.len(),
                self.post_fullname
            );
        }
        for name in orphans {
            if let Some(comment) = self.comments.get(name) {
                records.push(to_record(comment, post_created_utc));
            }
        }

        records
    }
}

fn to_record(comment: &RedditCommentData, post_created_utc: f64) -> CommentRecord {
    CommentRecord::new(
        comment.body.clone(),
        comment.score,
        (comment.created_utc - post_created_utc) / 60.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{RedditListing, RedditListingData};

    fn comment(id: &str, parent: &str, created: f64, replies: Vec<Thing>) -> Thing {
        Thing::Comment(RedditCommentData {
            id: id.to_string(),
            name: format!("t1_{}", id),
            parent_id: parent.to_string(),
            body: format!("body {}", id),
            score: 1,
            created_utc: created,
            replies: if replies.is_empty() {
                Replies::default()
            } else {
                Replies::Listing(Box::new(RedditListing {
                    kind: "Listing".to_string(),
                    data: RedditListingData {
                        children: replies,
                        after: None,
                        before: None,
                    },
                }))
            },
        })
    }

    fn more(parent: &str, children: &[&str]) -> Thing {
        Thing::More(RedditMoreData {
            id: "m".to_string(),
            parent_id: parent.to_string(),
            count: children.len() as u64,
            children: children.iter().map(|c| c.to_string()).collect(),
        })
    }

    fn bodies(records: &[CommentRecord]) -> Vec<&str> {
        records.iter().map(|r| r.text.as_str()).collect()
    }

    #[test]
    fn test_flatten_is_breadth_first() {
        let mut tree = CommentTree::new("t3_p");
        tree.insert_things(vec![
            comment("a", "t3_p", 60.0, vec![comment("a1", "t1_a", 120.0, vec![])]),
            comment("b", "t3_p", 90.0, vec![]),
        ]);

        let records = tree.flatten(0.0);
        assert_eq!(bodies(&records), ["body a", "body b", "body a1"]);
        assert_eq!(records[0].elapsed_minutes, 1.0);
        assert_eq!(records[2].elapsed_minutes, 2.0);
    }

    #[test]
    fn test_expansion_merges_into_existing_parents() {
        let mut tree = CommentTree::new("t3_p");
        tree.insert_things(vec![
            comment("a", "t3_p", 0.0, vec![]),
            more("t3_p", &["b", "c"]),
        ]);
        assert_eq!(tree.pending_len(), 1);

        let stub = tree.next_pending().unwrap();
        assert_eq!(stub.children, ["b", "c"]);
        // morechildren returns a flat list keyed by parent id.
        tree.insert_things(vec![
            comment("b", "t3_p", 0.0, vec![]),
            comment("c", "t1_a", 0.0, vec![]),
        ]);

        assert_eq!(bodies(&tree.flatten(0.0)), ["body a", "body b", "body c"]);
    }

    #[test]
    fn test_refetched_comment_is_not_duplicated() {
        let mut tree = CommentTree::new("t3_p");
        tree.insert_things(vec![comment("a", "t3_p", 0.0, vec![])]);
        // A "continue this thread" fetch returns the parent again with its replies.
        tree.insert_things(vec![comment(
            "a",
            "t3_p",
            0.0,
            vec![comment("a1", "t1_a", 0.0, vec![])],
        )]);

        assert_eq!(tree.len(), 2);
        assert_eq!(bodies(&tree.flatten(0.0)), ["body a", "body a1"]);
    }

    #[test]
    fn test_orphans_are_kept() {
        let mut tree = CommentTree::new("t3_p");
        tree.insert_things(vec![comment("x", "t1_missing", 30.0, vec![])]);
        let records = tree.flatten(0.0);
        assert_eq!(bodies(&records), ["body x"]);
    }

    #[test]
    fn test_discard_pending() {
        let mut tree = CommentTree::new("t3_p");
        tree.insert_things(vec![more("t3_p", &["a"]), more("t1_a", &[])]);
        assert_eq!(tree.discard_pending(), 2);
        assert!(tree.next_pending().is_none());
        assert!(tree.is_empty());
    }
}

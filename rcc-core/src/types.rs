use serde::{Deserialize, Serialize};

/// One flattened comment: body text, score and minutes elapsed since the
/// parent post was created. Serialized as `[text, score, minutes]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "(String, i64, f64)", into = "(String, i64, f64)")]
pub struct CommentRecord {
    pub text: String,
    pub score: i64,
    pub elapsed_minutes: f64,
}

impl CommentRecord {
    pub fn new(text: impl Into<String>, score: i64, elapsed_minutes: f64) -> Self {
        Self {
            text: text.into(),
            score,
            elapsed_minutes,
        }
    }
}

impl From<(String, i64, f64)> for CommentRecord {
    fn from((text, score, elapsed_minutes): (String, i64, f64)) -> Self {
        Self {
            text,
            score,
            elapsed_minutes,
        }
    }
}

impl From<CommentRecord> for (String, i64, f64) {
    fn from(record: CommentRecord) -> Self {
        (record.text, record.score, record.elapsed_minutes)
    }
}

/// All comments captured for a single post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostDocument {
    pub subreddit: String,
    pub post_id: String,
    /// Days between the post's creation date and the collection date.
    pub post_age: i64,
    pub comments: Vec<CommentRecord>,
}

impl PostDocument {
    pub fn collection_name(&self) -> String {
        collection_name(&self.subreddit)
    }

    pub fn snapshot_file_name(&self) -> String {
        format!("{}_{}_comments.json", self.subreddit, self.post_id)
    }
}

/// Logical collection holding every document of one community.
pub fn collection_name(subreddit: &str) -> String {
    format!("{}_comments_collection", subreddit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_record_serializes_as_triple() {
        let record = CommentRecord::new("nice post", 12, 3.5);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"["nice post",12,3.5]"#);
    }

    #[test]
    fn test_post_document_names() {
        let document = PostDocument {
            subreddit: "science".to_string(),
            post_id: "abc123".to_string(),
            post_age: 40,
            comments: vec![],
        };
        assert_eq!(document.collection_name(), "science_comments_collection");
        assert_eq!(document.snapshot_file_name(), "science_abc123_comments.json");
    }

    #[test]
    fn test_post_document_reads_stored_shape() {
        let json = r#"{
            "comments": [["first", 3, 1.25], ["second", -2, 60.0]],
            "post_age": 120,
            "post_id": "xyz",
            "subreddit": "worldnews"
        }"#;
        let document: PostDocument = serde_json::from_str(json).unwrap();
        assert_eq!(document.comments.len(), 2);
        assert_eq!(document.comments[1].score, -2);
        assert_eq!(document.comments[0].elapsed_minutes, 1.25);
    }
}

//! Typed arguments and results for the endpoint wrappers

use crate::errors::{PiazzaApiError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// A post given either as a record returned by another call or as a bare id.
///
/// Content-mutating calls accept both; [`PostRef::cid`] picks the id.
#[derive(Debug, Clone, PartialEq)]
pub enum PostRef {
    Raw(Value),
    Record(Map<String, Value>),
}

impl PostRef {
    /// The `id` field of a record, the value itself otherwise.
    pub fn cid(&self) -> Value {
        match self {
            PostRef::Raw(id) => id.clone(),
            PostRef::Record(record) => match record.get("id") {
                Some(id) => id.clone(),
                None => Value::Object(record.clone()),
            },
        }
    }
}

impl From<Value> for PostRef {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(record) => PostRef::Record(record),
            other => PostRef::Raw(other),
        }
    }
}

impl From<&Value> for PostRef {
    fn from(value: &Value) -> Self {
        PostRef::from(value.clone())
    }
}

impl From<Map<String, Value>> for PostRef {
    fn from(record: Map<String, Value>) -> Self {
        PostRef::Record(record)
    }
}

impl From<u64> for PostRef {
    fn from(id: u64) -> Self {
        PostRef::Raw(id.into())
    }
}

impl From<i64> for PostRef {
    fn from(id: i64) -> Self {
        PostRef::Raw(id.into())
    }
}

impl From<i32> for PostRef {
    fn from(id: i32) -> Self {
        PostRef::Raw(id.into())
    }
}

impl From<&str> for PostRef {
    fn from(id: &str) -> Self {
        PostRef::Raw(id.into())
    }
}

impl From<String> for PostRef {
    fn from(id: String) -> Self {
        PostRef::Raw(id.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostType {
    Note,
    Question,
    Poll,
}

impl PostType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostType::Note => "note",
            PostType::Question => "question",
            PostType::Poll => "poll",
        }
    }
}

/// A new top-level post.
///
/// Content containing `<p>` tags is rendered as HTML, plain text otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPost {
    pub post_type: PostType,
    pub folders: Vec<String>,
    pub subject: String,
    pub content: String,
    pub is_announcement: bool,
    pub bypass_email: bool,
    pub anonymous: bool,
}

impl NewPost {
    pub fn new(
        post_type: PostType,
        folders: impl IntoIterator<Item = impl Into<String>>,
        subject: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            post_type,
            folders: folders.into_iter().map(Into::into).collect(),
            subject: subject.into(),
            content: content.into(),
            is_announcement: false,
            bypass_email: false,
            anonymous: false,
        }
    }

    pub fn announcement(mut self, is_announcement: bool) -> Self {
        self.is_announcement = is_announcement;
        self
    }

    pub fn bypass_email(mut self, bypass_email: bool) -> Self {
        self.bypass_email = bypass_email;
        self
    }

    pub fn anonymous(mut self, anonymous: bool) -> Self {
        self.anonymous = anonymous;
        self
    }

    /// `content.create` params for this post.
    pub fn to_params(&self) -> Map<String, Value> {
        let mut params = Map::new();
        params.insert(
            "anonymous".into(),
            crate::utils::yes_no(self.anonymous).into(),
        );
        params.insert("subject".into(), self.subject.clone().into());
        params.insert("content".into(), self.content.clone().into());
        params.insert("folders".into(), json!(self.folders));
        params.insert("type".into(), self.post_type.as_str().into());
        params.insert(
            "config".into(),
            json!({
                "bypass_email": u8::from(self.bypass_email),
                "is_announcement": u8::from(self.is_announcement),
            }),
        );
        if self.bypass_email {
            params.insert("prof_override".into(), Value::Bool(true));
        }
        params
    }
}

/// Which slice of the feed to return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedFilter {
    /// Posts updated since you last read them.
    Unread,
    Following,
    Folder(String),
}

impl FeedFilter {
    /// Build a filter from independent flags; exactly one must be set and a
    /// folder filter needs a folder name.
    pub fn from_flags(
        unread: bool,
        following: bool,
        folder: bool,
        folder_name: &str,
    ) -> Result<Self> {
        match (unread, following, folder) {
            (true, false, false) => Ok(FeedFilter::Unread),
            (false, true, false) => Ok(FeedFilter::Following),
            (false, false, true) => {
                let filter = FeedFilter::Folder(folder_name.to_string());
                filter.validate()?;
                Ok(filter)
            }
            _ => Err(PiazzaApiError::InvalidArgument(
                "exactly one of unread, following or folder must be selected".to_string(),
            )),
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            FeedFilter::Folder(name) if name.is_empty() => Err(
                PiazzaApiError::InvalidArgument("folder filter needs a folder name".to_string()),
            ),
            _ => Ok(()),
        }
    }

    /// Query parameters for `network.filter_feed`.
    pub fn to_params(&self) -> Result<Map<String, Value>> {
        self.validate()?;
        let mut params = Map::new();
        match self {
            FeedFilter::Unread => {
                params.insert("updated".into(), 1.into());
            }
            FeedFilter::Following => {
                params.insert("following".into(), 1.into());
            }
            FeedFilter::Folder(name) => {
                params.insert("folder".into(), 1.into());
                params.insert("filter_folder".into(), name.clone().into());
            }
        }
        Ok(params)
    }
}

/// One class the current user belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserClass {
    pub name: String,
    pub num: String,
    pub term: String,
    pub nid: String,
    pub is_ta: bool,
}

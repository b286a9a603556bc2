//! A single Piazza network (class) and the calls scoped to it.

use crate::errors::{PiazzaApiError, Result};
use crate::extraction::feed_post_ids;
use crate::networking::Session;
use crate::rpc::{PiazzaRpc, into_params};
use crate::types::{FeedFilter, NewPost, PostRef};
use crate::utils::yes_no;
use log::debug;
use serde_json::{Value, json};
use std::sync::Arc;
use std::thread::sleep;
use std::time::Duration;

pub const DEFAULT_SORT: &str = "updated";
pub const FEED_LIMIT: u32 = 100;

/// Abstraction for a Piazza network (or class)
///
/// Binds a network id to a dispatcher sharing the caller's session, so no
/// call below needs the id again.
#[derive(Debug, Clone)]
pub struct Network {
    nid: String,
    rpc: PiazzaRpc,
}

fn to_list(value: Value, what: &str) -> Result<Vec<Value>> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(PiazzaApiError::RequestError {
            context: format!("Expected a list of {what}."),
            payload: other,
        }),
    }
}

fn post_id(post: Value) -> Result<Value> {
    match post.get("id") {
        Some(id) if !id.is_null() => Ok(id.clone()),
        _ => Err(PiazzaApiError::RequestError {
            context: "Post has no id.".to_string(),
            payload: post,
        }),
    }
}

fn strings(items: impl IntoIterator<Item = impl Into<String>>) -> Vec<String> {
    items.into_iter().map(Into::into).collect()
}

impl Network {
    pub fn new(network_id: &str, session: Arc<Session>) -> Self {
        Self {
            nid: network_id.to_string(),
            rpc: PiazzaRpc::new(session, Some(network_id)),
        }
    }

    pub fn id(&self) -> &str {
        &self.nid
    }

    pub fn rpc(&self) -> &PiazzaRpc {
        &self.rpc
    }

    // Posts

    /// All data on post `post`.
    pub fn get_post(&self, post: impl Into<PostRef>) -> Result<Value> {
        self.rpc.content_get(post.into().cid(), None)
    }

    /// Every post visible to the current user, fetched one at a time
    ///
    /// Reads the whole feed for the post ids, then fetches each post on
    /// demand, waiting `pause` before every fetch. This is not a bulk
    /// endpoint; a pause of about a second keeps large classes from getting
    /// the session throttled.
    pub fn iter_all_posts(&self, limit: Option<usize>, pause: Duration) -> Result<PostIter<'_>> {
        let feed = self.get_feed(999_999, 0)?;
        let mut cids = feed_post_ids(&feed);
        if let Some(limit) = limit {
            cids.truncate(limit);
        }
        debug!("iterating {} posts of {}", cids.len(), self.nid);
        Ok(PostIter {
            network: self,
            cids: cids.into_iter(),
            pause,
        })
    }

    /// Create a top-level post.
    pub fn create_post(&self, post: &NewPost) -> Result<Value> {
        self.rpc.content_create(post.to_params())
    }

    /// Create a followup on `post`; the content goes in the subject field.
    pub fn create_followup(
        &self,
        post: impl Into<PostRef>,
        content: &str,
        anonymous: bool,
        instructor: bool,
    ) -> Result<Value> {
        self.rpc.content_create(into_params(json!({
            "cid": post.into().cid(),
            "type": "followup",
            "subject": content,
            "content": "",
            "config": {
                "editor": "rte",
                "ionly": instructor,
            },
            "anonymous": yes_no(anonymous),
        })))
    }

    /// Create or edit the instructor answer of `post`.
    ///
    /// `revision` counts edits so far: the first answerer passes 0.
    pub fn create_instructor_answer(
        &self,
        post: impl Into<PostRef>,
        content: &str,
        revision: u32,
        anonymous: bool,
    ) -> Result<Value> {
        self.rpc.content_instructor_answer(into_params(json!({
            "cid": post.into().cid(),
            "type": "i_answer",
            "content": content,
            "revision": revision,
            "anonymous": yes_no(anonymous),
        })))
    }

    pub fn create_student_answer(
        &self,
        post: impl Into<PostRef>,
        content: &str,
        revision: u32,
        anonymous: bool,
    ) -> Result<Value> {
        self.rpc
            .content_student_answer(post.into().cid(), content, revision, anonymous)
    }

    /// Reply to a followup; the content goes in the subject field.
    pub fn create_reply(
        &self,
        post: impl Into<PostRef>,
        content: &str,
        anonymous: bool,
    ) -> Result<Value> {
        self.rpc.content_create(into_params(json!({
            "cid": post.into().cid(),
            "type": "feedback",
            "subject": content,
            "content": "",
            "anonymous": yes_no(anonymous),
        })))
    }

    pub fn update_post(&self, post: impl Into<PostRef>, content: &str) -> Result<Value> {
        self.rpc.content_update(into_params(json!({
            "cid": post.into().cid(),
            "subject": content,
        })))
    }

    /// Mark `duplicated` as a duplicate of the older `master` post, which
    /// keeps it as a followup.
    pub fn mark_as_duplicate(
        &self,
        duplicated: impl Into<PostRef>,
        master: impl Into<PostRef>,
        msg: &str,
    ) -> Result<Value> {
        let from = post_id(self.get_post(duplicated)?)?;
        let to = post_id(self.get_post(master)?)?;
        self.rpc.content_mark_duplicate(into_params(json!({
            "cid_dupe": from,
            "cid_to": to,
            "msg": msg,
        })))
    }

    pub fn resolve_post(&self, post: impl Into<PostRef>) -> Result<Value> {
        self.rpc.content_mark_resolved(into_params(json!({
            "cid": post.into().cid(),
            "resolved": "true",
        })))
    }

    pub fn pin_post(&self, post: impl Into<PostRef>, unpin: bool) -> Result<Value> {
        self.rpc
            .content_pin(into_params(json!({ "cid": post.into().cid() })), unpin)
    }

    pub fn delete_post(&self, post: impl Into<PostRef>) -> Result<Value> {
        self.rpc
            .content_delete(into_params(json!({ "cid": post.into().cid() })))
    }

    /// Mark a post as a good note.
    pub fn add_feedback(&self, post: impl Into<PostRef>) -> Result<Value> {
        self.rpc.content_add_feedback(into_params(json!({
            "cid": post.into().cid(),
            "type": "tag_good",
        })))
    }

    pub fn remove_feedback(&self, post: impl Into<PostRef>) -> Result<Value> {
        self.rpc.content_remove_feedback(into_params(json!({
            "cid": post.into().cid(),
            "type": "tag_good",
        })))
    }

    // Users

    /// Data of the users `user_ids`, as returned by `get_all_users`.
    pub fn get_users(
        &self,
        user_ids: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<Value> {
        self.rpc.get_users(&strings(user_ids), None)
    }

    pub fn iter_users(
        &self,
        user_ids: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<std::vec::IntoIter<Value>> {
        Ok(to_list(self.get_users(user_ids)?, "users")?.into_iter())
    }

    pub fn get_all_users(&self) -> Result<Value> {
        self.rpc.get_all_users(None)
    }

    pub fn iter_all_users(&self) -> Result<std::vec::IntoIter<Value>> {
        Ok(to_list(self.get_all_users()?, "users")?.into_iter())
    }

    /// Enroll `student_emails`; returns all users including the new ones.
    pub fn add_students(
        &self,
        student_emails: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<Value> {
        self.rpc.add_students(&strings(student_emails), None)
    }

    /// Remove `user_ids`; returns the users left in the network.
    pub fn remove_users(
        &self,
        user_ids: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<Value> {
        self.rpc.remove_users(&strings(user_ids), None)
    }

    // Feed

    /// Your feed, `limit` posts from `offset`
    ///
    /// Pass [`FEED_LIMIT`] and 0 for the first page. Feed entries are
    /// summaries (snippets, not full content).
    pub fn get_feed(&self, limit: u32, offset: u32) -> Result<Value> {
        self.rpc.get_my_feed(limit, offset, DEFAULT_SORT, None)
    }

    pub fn get_filtered_feed(&self, filter: &FeedFilter) -> Result<Value> {
        self.rpc.filter_feed(filter, DEFAULT_SORT, None)
    }

    /// Posts matching `query`, in feed format.
    pub fn search_feed(&self, query: &str) -> Result<Value> {
        self.rpc.search(query, None)
    }

    // Statistics

    /// The numbers shown on the class statistics page.
    pub fn get_statistics(&self) -> Result<Value> {
        self.rpc.get_stats(None)
    }
}

/// Posts of a network fetched lazily; see [`Network::iter_all_posts`].
#[derive(Debug)]
pub struct PostIter<'a> {
    network: &'a Network,
    cids: std::vec::IntoIter<Value>,
    pause: Duration,
}

impl Iterator for PostIter<'_> {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        let cid = self.cids.next()?;
        if !self.pause.is_zero() {
            sleep(self.pause);
        }
        Some(self.network.get_post(cid))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.cids.size_hint()
    }
}

use std::collections::{HashMap, VecDeque};

use crate::client::ChatMessage;
use crate::core::constants::MESSAGE_CACHE_LIMIT;

/// Messages delivered live during this session, newest first per chat.
#[derive(Debug, Default)]
pub struct MessageCache {
    chats: HashMap<i64, VecDeque<ChatMessage>>,
}

impl MessageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, message: ChatMessage) {
        let buffer = self.chats.entry(message.chat_id).or_default();
        buffer.push_front(message);
        buffer.truncate(MESSAGE_CACHE_LIMIT);
    }

    pub fn count(&self, chat_id: i64) -> usize {
        self.chats.get(&chat_id).map_or(0, VecDeque::len)
    }

    pub fn recent(&self, chat_id: i64) -> impl Iterator<Item = &ChatMessage> {
        self.chats.get(&chat_id).into_iter().flatten()
    }

    /// Drops the chat's buffer, returning how many messages it held.
    pub fn clear(&mut self, chat_id: i64) -> usize {
        self.chats.remove(&chat_id).map_or(0, |buffer| buffer.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn message(chat_id: i64, id: i32) -> ChatMessage {
        ChatMessage {
            id,
            chat_id,
            from_id: Some(1),
            date: Utc.timestamp_opt(1_700_000_000 + i64::from(id), 0).unwrap(),
            text: format!("message {id}"),
            media: None,
        }
    }

    #[test]
    fn newest_message_comes_first() {
        let mut cache = MessageCache::new();
        cache.record(message(5, 1));
        cache.record(message(5, 2));
        let ids: Vec<i32> = cache.recent(5).map(|m| m.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn buffer_is_capped_per_chat() {
        let mut cache = MessageCache::new();
        for id in 0..(MESSAGE_CACHE_LIMIT as i32 + 25) {
            cache.record(message(9, id));
        }
        cache.record(message(10, 1));

        assert_eq!(cache.count(9), MESSAGE_CACHE_LIMIT);
        assert_eq!(cache.count(10), 1);
        let newest = cache.recent(9).next().map(|m| m.id);
        assert_eq!(newest, Some(MESSAGE_CACHE_LIMIT as i32 + 24));
        let oldest = cache.recent(9).last().map(|m| m.id);
        assert_eq!(oldest, Some(25));
    }

    #[test]
    fn clear_drops_only_that_chat() {
        let mut cache = MessageCache::new();
        cache.record(message(3, 1));
        cache.record(message(3, 2));
        cache.record(message(4, 1));

        assert_eq!(cache.clear(3), 2);
        assert_eq!(cache.count(3), 0);
        assert_eq!(cache.recent(3).count(), 0);
        assert_eq!(cache.clear(3), 0);
        assert_eq!(cache.count(4), 1);
    }
}

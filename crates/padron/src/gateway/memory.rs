//! In-process gateway adapter.
//!
//! Records every outbound payload instead of delivering it. Used by
//! embedders that render output themselves and by tests asserting on
//! outbound traffic, including the failure-injection switches for the
//! best-effort delivery paths.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use crate::ids::{ChannelId, UserId};

use super::{Gateway, GatewayError, GatewayResult, MessageHandle};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Reply {
        to: UserId,
        text: String,
    },
    DirectMessage {
        to: UserId,
        handle: MessageHandle,
        text: String,
    },
    DeletedDirectMessage {
        to: UserId,
        handle: MessageHandle,
    },
    Announcement {
        channel: ChannelId,
        text: String,
    },
}

#[derive(Default)]
pub struct MemoryGateway {
    sent: Mutex<Vec<Outbound>>,
    next_handle: AtomicU64,
    fail_direct_messages: AtomicBool,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `direct_message` call fail, to exercise the
    /// best-effort notification paths.
    pub fn fail_direct_messages(&self, fail: bool) {
        self.fail_direct_messages.store(fail, Ordering::SeqCst);
    }

    /// Everything sent so far, in order.
    pub fn sent(&self) -> Vec<Outbound> {
        self.sent.lock().expect("gateway log lock").clone()
    }

    /// Direct messages delivered to `user` that have not been removed.
    pub fn visible_direct_messages(&self, user: UserId) -> Vec<(MessageHandle, String)> {
        let sent = self.sent.lock().expect("gateway log lock");
        let mut visible = Vec::new();
        for entry in sent.iter() {
            match entry {
                Outbound::DirectMessage { to, handle, text } if *to == user => {
                    visible.push((handle.clone(), text.clone()));
                }
                Outbound::DeletedDirectMessage { to, handle } if *to == user => {
                    visible.retain(|(kept, _)| kept != handle);
                }
                _ => {}
            }
        }
        visible
    }

    pub fn announcements(&self) -> Vec<(ChannelId, String)> {
        self.sent
            .lock()
            .expect("gateway log lock")
            .iter()
            .filter_map(|entry| match entry {
                Outbound::Announcement { channel, text } => Some((*channel, text.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn replies_to(&self, user: UserId) -> Vec<String> {
        self.sent
            .lock()
            .expect("gateway log lock")
            .iter()
            .filter_map(|entry| match entry {
                Outbound::Reply { to, text } if *to == user => Some(text.clone()),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl Gateway for MemoryGateway {
    async fn reply(&self, actor: UserId, text: &str) -> GatewayResult<()> {
        self.sent
            .lock()
            .expect("gateway log lock")
            .push(Outbound::Reply {
                to: actor,
                text: text.to_string(),
            });
        Ok(())
    }

    async fn direct_message(&self, user: UserId, text: &str) -> GatewayResult<MessageHandle> {
        if self.fail_direct_messages.load(Ordering::SeqCst) {
            return Err(GatewayError("direct message channel unavailable".to_string()));
        }
        let handle = MessageHandle(format!(
            "dm-{}",
            self.next_handle.fetch_add(1, Ordering::SeqCst)
        ));
        self.sent
            .lock()
            .expect("gateway log lock")
            .push(Outbound::DirectMessage {
                to: user,
                handle: handle.clone(),
                text: text.to_string(),
            });
        Ok(handle)
    }

    async fn delete_direct_message(
        &self,
        user: UserId,
        handle: &MessageHandle,
    ) -> GatewayResult<()> {
        let mut sent = self.sent.lock().expect("gateway log lock");
        let delivered = sent.iter().any(|entry| {
            matches!(entry, Outbound::DirectMessage { handle: h, .. } if h == handle)
        });
        let already_removed = sent.iter().any(|entry| {
            matches!(entry, Outbound::DeletedDirectMessage { handle: h, .. } if h == handle)
        });
        if !delivered || already_removed {
            return Err(GatewayError("message already removed".to_string()));
        }
        sent.push(Outbound::DeletedDirectMessage {
            to: user,
            handle: handle.clone(),
        });
        Ok(())
    }

    async fn announce(&self, channel: ChannelId, text: &str) -> GatewayResult<()> {
        self.sent
            .lock()
            .expect("gateway log lock")
            .push(Outbound::Announcement {
                channel,
                text: text.to_string(),
            });
        Ok(())
    }
}

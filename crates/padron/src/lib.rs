pub mod error;
pub mod ids;
pub mod config;
pub mod access;
pub mod records;
pub mod gateway;
pub mod disclosure;
pub mod viewer;
pub mod render;
pub mod service;
pub mod util;

pub use crate::access::{has_capability, Actor, Capability};
pub use crate::config::RegistryConfig;
pub use crate::disclosure::{DisclosureDecision, DisclosureId};
pub use crate::error::{RegistryError, RegistryResult};
pub use crate::gateway::{Gateway, MemoryGateway, MessageHandle, SharedGateway};
pub use crate::ids::{ChannelId, RoleId, UserId};
pub use crate::records::{Identity, IdentityDraft, Incident, IncidentDraft, RecordStore};
pub use crate::service::Registry;
pub use crate::viewer::{CursorId, FileView};

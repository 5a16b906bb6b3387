//! External collaborators and the recommendation orchestrator.
//!
//! - [`assistant`] - AI generation service client
//! - [`recommender`] - turns a user message + catalog into a reply and
//!   product recommendations
//! - [`notify`] - chat-platform Bot API notifications
//! - [`delivery`] - delivery cost calculation

pub mod assistant;
pub mod delivery;
pub mod notify;
pub mod recommender;

pub use assistant::{AssistantClient, AssistantError};
pub use delivery::delivery_cost;
pub use notify::{Notifier, NotifyError};
pub use recommender::{
    ChatTurn, GeneratedReply, GenerationFailure, Recommender, RecommendedProduct, ReplyGenerator,
};

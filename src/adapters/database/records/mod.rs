pub mod matching;
pub mod message;
pub mod swipe;
pub mod user;

pub use matching::{ConversationRecord, MatchRecord};
pub use message::{MessageRecord, MessageViewRecord};
pub use swipe::{IncomingLikeRecord, SwipeHistoryRecord, SwipeRecord};
pub use user::{UserAccountRecord, UserSummaryRecord};

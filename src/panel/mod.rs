//! Panel state: respondent records, the persona roster, and the store
//! boundary behind which respondent state persists.

pub mod respondent;
pub mod roster;
pub mod store;

pub use respondent::{clamp_intensity, Respondent};
pub use roster::{Profile, Roster};
pub use store::{ConversationRecord, JsonStore, MemoryStore, RespondentStore};

//! DTOs module - Data Transfer Objects
//!
//! Request bodies (validated with `validator`), response shapes and the insert payloads
//! handed to the repositories. DTOs keep the API representation apart from the entities.

pub mod admin;
pub mod ai;
pub mod calculation;
pub mod chat;
pub mod expense;
pub mod feed;
pub mod notification;
pub mod query;
pub mod user;
pub mod ws_event;

// Re-exports
pub use admin::AdminStatsDTO;
pub use ai::{
    CaptionDTO, CaptionRequestDTO, CoachReplyDTO, CoachRequestDTO, CoachTurnDTO,
    PricingStrategyRequestDTO,
};
pub use calculation::{
    CalculationDTO, CalculationFormDTO, CalculationRecordDTO, PublishCalculationDTO,
};
pub use chat::{
    ChatMessageDTO, ChatSessionDTO, CreateChatMessageDTO, MatchResultDTO, MessageBodyDTO,
    SendMessageDTO,
};
pub use expense::{
    CategoryTotalDTO, CreateExpenseDTO, ExpenseDTO, ExpenseFormDTO, ExpenseSummaryDTO,
};
pub use feed::{CreateCommentDTO, FeedDetailDTO, NewCommentDTO, PublicCalculationDTO};
pub use notification::{
    AdminNotificationDTO, CreateNotificationDTO, NotificationDTO, NotificationInboxDTO,
    NotificationSentDTO, NotificationTarget,
};
pub use query::{ExpenseQuery, OffsetQuery, PageQuery};
pub use user::{CreateUserDTO, LoginDTO, RegisterDTO, TokenDTO, UpdateUserDTO, UserDTO};
pub use ws_event::WsEventDTO;

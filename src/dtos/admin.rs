//! Admin DTOs - Dashboard figures

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AdminStatsDTO {
    pub users: i64,
    pub calculations: i64,
    pub published_calculations: i64,
    pub expenses_total: f64,
    pub sessions_waiting: i64,
    pub sessions_active: i64,
    pub users_online: usize,
}

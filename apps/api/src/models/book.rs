use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::layout::TypographyConfig;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BookRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub genre: Option<String>,
    /// Print settings; missing keys fall back to the trade-paperback defaults.
    pub typography: Json<TypographyConfig>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BookRow {
    pub fn typography(&self) -> TypographyConfig {
        self.typography.0
    }
}

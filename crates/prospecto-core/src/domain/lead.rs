use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub name: String,
    pub rut: String,
    pub email: String,
    pub full_phone: String,
    pub projects: Vec<String>,
    pub unit_types: Vec<String>,
    pub submitted_at: i64,
}

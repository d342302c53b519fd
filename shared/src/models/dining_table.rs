//! Dining Table Model

use serde::{Deserialize, Serialize};

/// Table occupancy status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableStatus {
    #[default]
    Available,
    Occupied,
    Reserved,
    Inactive,
}

impl TableStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Occupied => "occupied",
            Self::Reserved => "reserved",
            Self::Inactive => "inactive",
        }
    }
}

impl std::fmt::Display for TableStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dining table entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiningTable {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub status: TableStatus,
}

/// Create dining table payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTableCreate {
    pub name: String,
}

/// Update dining table payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiningTableUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TableStatus>,
}

/// Table summary statistics shown above the floor plan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableCounts {
    pub available: usize,
    pub occupied: usize,
    pub reserved: usize,
    pub inactive: usize,
}

impl TableCounts {
    pub fn from_tables(tables: &[DiningTable]) -> Self {
        tables.iter().fold(Self::default(), |mut acc, t| {
            match t.status {
                TableStatus::Available => acc.available += 1,
                TableStatus::Occupied => acc.occupied += 1,
                TableStatus::Reserved => acc.reserved += 1,
                TableStatus::Inactive => acc.inactive += 1,
            }
            acc
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_status_wire_format() {
        let table: DiningTable =
            serde_json::from_str(r#"{"id":3,"name":"T3","status":"reserved"}"#).unwrap();
        assert_eq!(table.status, TableStatus::Reserved);
        assert_eq!(
            serde_json::to_value(TableStatus::Occupied).unwrap(),
            serde_json::json!("occupied")
        );
    }

    #[test]
    fn test_table_counts() {
        let tables = vec![
            DiningTable { id: 1, name: "T1".into(), status: TableStatus::Available },
            DiningTable { id: 2, name: "T2".into(), status: TableStatus::Occupied },
            DiningTable { id: 3, name: "T3".into(), status: TableStatus::Available },
        ];
        let counts = TableCounts::from_tables(&tables);
        assert_eq!(counts.available, 2);
        assert_eq!(counts.occupied, 1);
        assert_eq!(counts.reserved, 0);
    }
}

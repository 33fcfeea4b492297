use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::ServiceError;

/// Lifecycle of a purchase order.
///
/// ```text
/// DRAFT ──> ORDERED ──> DELIVERED
///   │          │
///   └──────────┴──────> CANCELLED
/// ```
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    strum::Display, strum::EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[sea_orm(string_value = "DRAFT")]
    Draft,
    #[sea_orm(string_value = "ORDERED")]
    Ordered,
    #[sea_orm(string_value = "DELIVERED")]
    Delivered,
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

impl OrderStatus {
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Draft, Ordered) | (Draft, Cancelled) | (Ordered, Delivered) | (Ordered, Cancelled)
        )
    }

    /// DELIVERED is only entered by receiving the goods, so the ledger moves
    /// together with the status.
    pub fn requires_receipt(self) -> bool {
        self == OrderStatus::Delivered
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Lines may be attached while the order has not been received or cancelled.
    pub fn accepts_lines(self) -> bool {
        matches!(self, OrderStatus::Draft | OrderStatus::Ordered)
    }

    pub fn parse(value: &str) -> Result<Self, ServiceError> {
        OrderStatus::from_str(value.trim())
            .map_err(|_| ServiceError::InvalidState(format!("Unrecognized order status: {}", value)))
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "purchase_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub order_number: String,
    pub store_id: String,
    pub supplier_id: Option<String>,
    pub order_date: DateTime<Utc>,
    pub expected_delivery_date: Option<DateTime<Utc>>,
    pub actual_delivery_date: Option<DateTime<Utc>>,
    pub status: OrderStatus,
    pub is_auto_order: bool,
    pub employee_id: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub total_amount: Decimal,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::purchase_order_line::Entity")]
    Lines,
    #[sea_orm(
        belongs_to = "super::store::Entity",
        from = "Column::StoreId",
        to = "super::store::Column::Id"
    )]
    Store,
}

impl Related<super::purchase_order_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lines.def()
    }
}

impl Related<super::store::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Store.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Iterable;

    #[test]
    fn terminal_states_have_no_exits() {
        for next in OrderStatus::iter() {
            assert!(!OrderStatus::Delivered.can_transition_to(next));
            assert!(!OrderStatus::Cancelled.can_transition_to(next));
        }
    }

    #[test]
    fn draft_cannot_skip_to_delivered() {
        assert!(!OrderStatus::Draft.can_transition_to(OrderStatus::Delivered));
        assert!(OrderStatus::Draft.can_transition_to(OrderStatus::Ordered));
    }

    #[test]
    fn only_delivered_needs_a_receipt() {
        let needing: Vec<_> = OrderStatus::iter().filter(|s| s.requires_receipt()).collect();
        assert_eq!(needing, vec![OrderStatus::Delivered]);
    }

    #[test]
    fn parses_wire_names() {
        assert_eq!(OrderStatus::parse("ORDERED").unwrap(), OrderStatus::Ordered);
        assert_eq!(OrderStatus::Cancelled.to_string(), "CANCELLED");
        assert!(matches!(
            OrderStatus::parse("SHIPPED"),
            Err(ServiceError::InvalidState(_))
        ));
    }
}

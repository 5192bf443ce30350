use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A claimed rental box. `box_number` carries a unique index that is
/// store-wide, not per tenant: once any tenant claims a number it cannot be
/// reused. The customer reference is advisory; deleting a customer must
/// cascade-delete its boxes in application code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoxRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub tenant_id: String,
    pub customer_id: String,
    pub box_number: String,
}

impl BoxRecord {
    pub fn new(tenant_id: String, customer_id: String, box_number: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            tenant_id,
            customer_id,
            box_number,
        }
    }
}

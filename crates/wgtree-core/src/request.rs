//! Payloads submitted to the backend after a successful pre-flight.

use serde::{Deserialize, Serialize};

use crate::model::WorkgroupId;

/// Body of a create-workgroup request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkgroupRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub parent_id: Option<WorkgroupId>,
}

/// Body of a move-workgroup request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveWorkgroupRequest {
    pub workgroup_id: WorkgroupId,
    pub new_parent_id: Option<WorkgroupId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_wire_shape() {
        let req = CreateWorkgroupRequest {
            name: "Ops".into(),
            description: None,
            parent_id: Some(WorkgroupId(4)),
        };
        assert_eq!(
            serde_json::to_value(&req).expect("json"),
            serde_json::json!({"name": "Ops", "parentId": 4})
        );
    }

    #[test]
    fn move_request_to_root_sends_null_parent() {
        let req = MoveWorkgroupRequest {
            workgroup_id: WorkgroupId(9),
            new_parent_id: None,
        };
        assert_eq!(
            serde_json::to_value(req).expect("json"),
            serde_json::json!({"workgroupId": 9, "newParentId": null})
        );
    }
}

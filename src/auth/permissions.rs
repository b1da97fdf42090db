use serde::{Deserialize, Serialize};

/// Employee roles recognized by the workflow engine.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Manager,
    ContractManager,
    Supervisor,
    Warehouse,
    Requester,
    Viewer,
}

/// Named actions an actor may be authorized to perform, rendered as
/// `family.action` strings on the wire and in logs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumIter,
)]
pub enum Capability {
    #[serde(rename = "requests.view")]
    #[strum(serialize = "requests.view")]
    RequestsView,
    #[serde(rename = "requests.create")]
    #[strum(serialize = "requests.create")]
    RequestsCreate,
    #[serde(rename = "requests.edit")]
    #[strum(serialize = "requests.edit")]
    RequestsEdit,
    #[serde(rename = "requests.submit")]
    #[strum(serialize = "requests.submit")]
    RequestsSubmit,
    #[serde(rename = "requests.approve")]
    #[strum(serialize = "requests.approve")]
    RequestsApprove,
    #[serde(rename = "requests.reject")]
    #[strum(serialize = "requests.reject")]
    RequestsReject,
    #[serde(rename = "requests.separate")]
    #[strum(serialize = "requests.separate")]
    RequestsSeparate,
    #[serde(rename = "requests.deliver")]
    #[strum(serialize = "requests.deliver")]
    RequestsDeliver,
    #[serde(rename = "requests.cancel")]
    #[strum(serialize = "requests.cancel")]
    RequestsCancel,
    #[serde(rename = "transfers.view")]
    #[strum(serialize = "transfers.view")]
    TransfersView,
    #[serde(rename = "transfers.create")]
    #[strum(serialize = "transfers.create")]
    TransfersCreate,
    #[serde(rename = "transfers.edit")]
    #[strum(serialize = "transfers.edit")]
    TransfersEdit,
    #[serde(rename = "transfers.submit")]
    #[strum(serialize = "transfers.submit")]
    TransfersSubmit,
    #[serde(rename = "transfers.approve")]
    #[strum(serialize = "transfers.approve")]
    TransfersApprove,
    #[serde(rename = "transfers.reject")]
    #[strum(serialize = "transfers.reject")]
    TransfersReject,
    #[serde(rename = "transfers.ship")]
    #[strum(serialize = "transfers.ship")]
    TransfersShip,
    #[serde(rename = "transfers.receive")]
    #[strum(serialize = "transfers.receive")]
    TransfersReceive,
    #[serde(rename = "transfers.cancel")]
    #[strum(serialize = "transfers.cancel")]
    TransfersCancel,
}

/// Roles allowed to exercise a capability. Roles not listed are denied.
pub fn allowed_roles(capability: Capability) -> &'static [Role] {
    use Capability::*;
    use Role::*;

    match capability {
        RequestsView => &[ContractManager, Supervisor, Warehouse, Requester, Admin, Manager],
        RequestsCreate => &[Supervisor, Requester, Admin],
        RequestsEdit => &[Supervisor, Requester, Admin],
        RequestsSubmit => &[Supervisor, Requester, Admin],
        RequestsApprove => &[ContractManager, Supervisor, Admin],
        RequestsReject => &[ContractManager, Supervisor, Admin],
        RequestsSeparate => &[Warehouse, Admin],
        RequestsDeliver => &[Warehouse, Admin],
        RequestsCancel => &[ContractManager, Admin],
        TransfersView => &[ContractManager, Warehouse, Admin, Manager],
        TransfersCreate => &[Warehouse, Admin],
        TransfersEdit => &[Warehouse, Admin],
        TransfersSubmit => &[Warehouse, Admin],
        TransfersApprove => &[ContractManager, Admin],
        TransfersReject => &[ContractManager, Admin],
        TransfersShip => &[Warehouse, Admin],
        TransfersReceive => &[Warehouse, Admin],
        TransfersCancel => &[ContractManager, Admin],
    }
}

/// Checks whether a role is authorized for a capability.
pub fn has_permission(role: Role, capability: Capability) -> bool {
    allowed_roles(capability).contains(&role)
}

/// Conjunction over a list of capability checks.
pub fn has_all_permissions(role: Role, capabilities: &[Capability]) -> bool {
    capabilities.iter().all(|c| has_permission(role, *c))
}

/// Disjunction over a list of capability checks.
pub fn has_any_permission(role: Role, capabilities: &[Capability]) -> bool {
    capabilities.iter().any(|c| has_permission(role, *c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn admin_is_allowed_everywhere() {
        for capability in Capability::iter() {
            assert!(
                has_permission(Role::Admin, capability),
                "admin denied {capability}"
            );
        }
    }

    #[test]
    fn viewer_is_denied_everywhere() {
        for capability in Capability::iter() {
            assert!(
                !has_permission(Role::Viewer, capability),
                "viewer allowed {capability}"
            );
        }
    }

    #[test]
    fn warehouse_executes_but_does_not_approve() {
        assert!(has_permission(Role::Warehouse, Capability::RequestsSeparate));
        assert!(has_permission(Role::Warehouse, Capability::RequestsDeliver));
        assert!(has_permission(Role::Warehouse, Capability::TransfersShip));
        assert!(has_permission(Role::Warehouse, Capability::TransfersReceive));
        assert!(!has_permission(Role::Warehouse, Capability::RequestsApprove));
        assert!(!has_permission(Role::Warehouse, Capability::TransfersApprove));
    }

    #[test]
    fn requester_submits_but_does_not_approve() {
        assert!(has_permission(Role::Requester, Capability::RequestsCreate));
        assert!(has_permission(Role::Requester, Capability::RequestsSubmit));
        assert!(!has_permission(Role::Requester, Capability::RequestsApprove));
        assert!(!has_permission(Role::Requester, Capability::RequestsCancel));
    }

    #[test]
    fn contract_manager_approves_and_cancels() {
        assert!(has_permission(Role::ContractManager, Capability::RequestsApprove));
        assert!(has_permission(Role::ContractManager, Capability::RequestsCancel));
        assert!(has_permission(Role::ContractManager, Capability::TransfersApprove));
        assert!(!has_permission(Role::ContractManager, Capability::TransfersShip));
    }

    #[test]
    fn combinators() {
        let caps = [Capability::RequestsApprove, Capability::RequestsSeparate];
        assert!(has_all_permissions(Role::Admin, &caps));
        assert!(!has_all_permissions(Role::Supervisor, &caps));
        assert!(has_any_permission(Role::Supervisor, &caps));
        assert!(!has_any_permission(Role::Viewer, &caps));
        assert!(has_all_permissions(Role::Viewer, &[]));
        assert!(!has_any_permission(Role::Viewer, &[]));
    }

    #[test]
    fn capability_renders_as_dotted_name() {
        assert_eq!(Capability::RequestsApprove.to_string(), "requests.approve");
        assert_eq!(Capability::TransfersShip.to_string(), "transfers.ship");
    }

    #[test]
    fn role_renders_screaming_snake() {
        assert_eq!(Role::ContractManager.to_string(), "CONTRACT_MANAGER");
        assert_eq!(Role::Warehouse.to_string(), "WAREHOUSE");
    }
}

use super::NoData;
use crate::types::Auth;
use serde::Serialize;

/// Requests accepted by `call_client_method`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "name", content = "data", rename_all = "camelCase")]
pub enum ClientMethod {
    GetInfo(NoData),
    GetNetworkInfo(NoData),
    GetBech32Hrp(NoData),
    GetHealth {
        url: String,
    },
    GetNodeInfo {
        url: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        auth: Option<Auth>,
    },
}
